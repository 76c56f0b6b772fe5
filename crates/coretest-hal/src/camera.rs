// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::error::HalResult;
use crate::session::Capability;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Frames flow continuously once enabled
    Streaming,
    /// One frame per `trigger`
    Triggered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPattern {
    None,
    /// Raw pixels cycle 0, 1, 2, 4, ... 128, 0, ...
    WalkingOnes,
    /// Eight vertical colour bars
    ColorBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraSettings {
    pub mode: CaptureMode,
    pub pattern: TestPattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One byte per pixel, straight from the sensor
    Raw,
    /// Three bytes per pixel
    Rgb,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Raw => 1,
            PixelFormat::Rgb => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

pub trait Camera: Capability<Config = CameraSettings> + Send {
    /// Sensor resolution as (width, height)
    fn sensor_dims(&self) -> (usize, usize);

    /// Request one frame in triggered mode
    fn trigger(&mut self) -> HalResult<()>;

    /// Fetch the next frame at sensor resolution
    fn capture(&mut self, format: PixelFormat) -> HalResult<Frame>;

    /// Drop the next `count` frames of a stream
    fn discard_frames(&mut self, count: usize) -> HalResult<()> {
        for _ in 0..count {
            self.capture(PixelFormat::Raw)?;
        }
        Ok(())
    }
}

/// Next value of the walking-ones sequence
pub fn next_walking_one(current: u8) -> u8 {
    if current == 0 {
        1
    } else {
        current << 1
    }
}

/// Check that `pixels` follow the walking-ones sequence from zero
pub fn matches_walking_ones(pixels: &[u8]) -> bool {
    let mut expected = 0u8;
    for pixel in pixels {
        if *pixel != expected {
            return false;
        }
        expected = next_walking_one(expected);
    }
    true
}
