// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::error::HalResult;
use crate::session::Capability;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRate {
    Hz16000,
    Hz48000,
}

impl SampleRate {
    pub fn from_hz(hz: i64) -> Option<Self> {
        match hz {
            16_000 => Some(SampleRate::Hz16000),
            48_000 => Some(SampleRate::Hz48000),
            _ => None,
        }
    }

    pub fn hz(self) -> usize {
        match self {
            SampleRate::Hz16000 => 16_000,
            SampleRate::Hz48000 => 48_000,
        }
    }

    pub fn samples_per_ms(self) -> usize {
        self.hz() / 1000
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSettings {
    pub sample_rate: SampleRate,
    /// Driver DMA buffers in rotation
    pub num_buffers: usize,
    pub samples_per_buffer: usize,
}

impl AudioSettings {
    pub fn buffer_duration_ms(&self) -> usize {
        self.samples_per_buffer / self.sample_rate.samples_per_ms().max(1)
    }
}

/// Receives each filled buffer of signed 32-bit PCM samples
pub type AudioSink = Box<dyn FnMut(&[i32]) + Send>;

/// Microphone input
pub trait AudioInput: Capability<Config = AudioSettings> + Send {
    /// Begin delivering buffers to `sink`
    fn start(&mut self, sink: AudioSink) -> HalResult<()>;

    /// Stop delivery; `sink` is not called again after this returns
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rates() {
        assert_eq!(SampleRate::from_hz(16000), Some(SampleRate::Hz16000));
        assert_eq!(SampleRate::from_hz(44100), None);
        assert_eq!(SampleRate::Hz48000.samples_per_ms(), 48);
    }

    #[test]
    fn test_buffer_duration() {
        let settings = AudioSettings {
            sample_rate: SampleRate::Hz16000,
            num_buffers: 4,
            samples_per_buffer: 800,
        };
        assert_eq!(settings.buffer_duration_ms(), 50);
    }
}
