// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `coretest.toml`. Missing sections and fields fall back to
//! the defaults below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CoretestConfig {
    pub system: SystemConfig,
    pub bridge: BridgeConfig,
    pub resources: ResourcesConfig,
    pub inference: InferenceConfig,
    pub camera: CameraConfig,
    pub audio: AudioConfig,
}

/// System-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    /// One of trace, debug, info, warn, error
    pub log_level: String,
    /// Directory for rolling log files; console only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// Cross-core command bridge timing
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Bounded wait for the liveness probe that precedes every bridge call
    pub liveness_probe_ms: u64,
    /// Reply timeout for short calls (numeric transform)
    pub call_timeout_ms: u64,
    /// Reply timeout for the satellite benchmark
    pub benchmark_timeout_ms: u64,
    /// Liveness wait after booting the satellite
    pub start_probe_ms: u64,
    /// Iterations of the reference benchmark workload
    pub benchmark_iterations: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            liveness_probe_ms: 100,
            call_timeout_ms: 1000,
            benchmark_timeout_ms: 30_000,
            start_probe_ms: 1000,
            benchmark_iterations: 2000,
        }
    }
}

/// Resource store limits
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Upper bound on bytes held by all resources together (0 = unlimited)
    pub max_total_bytes: u64,
}

/// Accelerator operating point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTierSetting {
    Low,
    Medium,
    High,
    Max,
}

impl std::str::FromStr for PerformanceTierSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "max" => Ok(Self::Max),
            other => Err(format!("unknown performance tier '{}'", other)),
        }
    }
}

/// Inference command tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Scratch arena for detection models
    pub detection_arena_bytes: usize,
    /// Scratch arena for classification models
    pub classification_arena_bytes: usize,
    /// Scratch arena for the built-in pose model used by the stress run
    pub posenet_arena_bytes: usize,
    pub detection_threshold: f32,
    pub detection_top_k: usize,
    pub classification_threshold: f32,
    pub classification_top_k: usize,
    /// Tier used by classification and the self-test; detection always runs at `max`
    pub performance_tier: PerformanceTierSetting,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            detection_arena_bytes: 8 * 1024 * 1024,
            classification_arena_bytes: 1024 * 1024,
            posenet_arena_bytes: 8 * 1024 * 1024,
            detection_threshold: 0.7,
            detection_top_k: 3,
            classification_threshold: 0.0,
            classification_top_k: 1,
            performance_tier: PerformanceTierSetting::High,
        }
    }
}

/// Camera command tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Delay after powering the sensor before streaming starts
    pub power_settle_ms: u64,
    /// Frames dropped after streaming starts, before the first one is used
    pub stream_discard_frames: usize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            power_settle_ms: 500,
            stream_discard_frames: 100,
        }
    }
}

/// Audio capture limits
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Largest `num_buffers` a capture request may ask for
    pub max_buffers: usize,
    /// Longest capture, and longest single buffer, a request may ask for
    pub max_duration_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            max_buffers: 8,
            max_duration_ms: 60_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: CoretestConfig = toml::from_str("").unwrap();
        assert_eq!(config.bridge.call_timeout_ms, 1000);
        assert_eq!(config.inference.detection_top_k, 3);
        assert_eq!(config.inference.performance_tier, PerformanceTierSetting::High);
        assert_eq!(config.resources.max_total_bytes, 0);
        assert_eq!(config.audio.max_duration_ms, 60_000);
        assert_eq!(config.camera.stream_discard_frames, 100);
    }

    #[test]
    fn test_partial_section() {
        let config: CoretestConfig = toml::from_str(
            "[inference]\nperformance_tier = \"max\"\ndetection_threshold = 0.5\n",
        )
        .unwrap();
        assert_eq!(config.inference.performance_tier, PerformanceTierSetting::Max);
        assert_eq!(config.inference.detection_threshold, 0.5);
        assert_eq!(config.inference.classification_top_k, 1);
    }

    #[test]
    fn test_tier_from_str() {
        assert_eq!("MAX".parse::<PerformanceTierSetting>(), Ok(PerformanceTierSetting::Max));
        assert!("turbo".parse::<PerformanceTierSetting>().is_err());
    }
}
