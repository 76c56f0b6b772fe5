// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use coretest_hal::{Classification, Detection};
use serde::Serialize;

/// Candidates scoring at least `threshold`, best first, at most `top_k` of them
pub fn select_top<T>(
    mut candidates: Vec<T>,
    score: impl Fn(&T) -> f32,
    threshold: f32,
    top_k: usize,
) -> Vec<T> {
    candidates.retain(|c| score(c) >= threshold);
    candidates.sort_by(|a, b| score(b).total_cmp(&score(a)));
    candidates.truncate(top_k);
    candidates
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRecord {
    pub id: i32,
    pub score: f32,
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
}

impl From<Detection> for DetectionRecord {
    fn from(d: Detection) -> Self {
        Self {
            id: d.id,
            score: d.score,
            xmin: d.xmin,
            xmax: d.xmax,
            ymin: d.ymin,
            ymax: d.ymax,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationRecord {
    pub id: i32,
    pub score: f32,
}

impl From<Classification> for ClassificationRecord {
    fn from(c: Classification) -> Self {
        Self {
            id: c.id,
            score: c.score,
        }
    }
}

/// Body of a successful inference command
#[derive(Debug, Serialize)]
pub struct InferenceReport<T> {
    pub results: Vec<T>,
    /// Preprocessing plus one timed invocation, in microseconds
    pub latency: u64,
}
