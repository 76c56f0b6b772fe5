// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Microphone capture

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use coretest_config::AudioConfig;
use coretest_hal::{AudioSettings, DeviceSession, SampleRate};
use coretest_rpc::{Params, RpcError};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::debug;

use crate::context::CommandContext;
use crate::error::CommandResult;

/// Validated `capture_audio` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturePlan {
    pub sample_rate: SampleRate,
    pub num_buffers: usize,
    pub chunk_ms: usize,
    pub samples_per_chunk: usize,
    pub num_chunks: usize,
    pub total_samples: usize,
}

impl CapturePlan {
    pub fn from_params(params: &Params<'_>, limits: &AudioConfig) -> CommandResult<Self> {
        let sample_rate = SampleRate::from_hz(params.integer("sample_rate_hz")?).ok_or_else(|| {
            RpcError::bad_param("sample_rate_hz", "sample rate must be 16000 or 48000 Hz")
        })?;
        let max_ms = i64::try_from(limits.max_duration_ms).unwrap_or(i64::MAX);

        let duration_ms = params.integer("duration_ms")?;
        if duration_ms <= 0 {
            return Err(RpcError::bad_param("duration_ms", "duration must be positive").into());
        }
        if duration_ms > max_ms {
            return Err(RpcError::bad_param("duration_ms", "duration is too long").into());
        }

        let num_buffers = params.integer("num_buffers")?;
        if num_buffers <= 0 {
            return Err(
                RpcError::bad_param("num_buffers", "number of buffers must be positive").into(),
            );
        }
        let num_buffers = usize::try_from(num_buffers).unwrap_or(usize::MAX);
        if num_buffers > limits.max_buffers {
            return Err(RpcError::bad_param("num_buffers", "number of buffers is too big").into());
        }

        let buffer_size_ms = params.integer("buffer_size_ms")?;
        if buffer_size_ms <= 0 {
            return Err(
                RpcError::bad_param("buffer_size_ms", "buffer size must be positive").into(),
            );
        }
        if buffer_size_ms > max_ms {
            return Err(RpcError::bad_param("buffer_size_ms", "buffer size is too big").into());
        }

        let too_long = || RpcError::bad_param("duration_ms", "duration is too long");
        let too_big = || RpcError::bad_param("buffer_size_ms", "buffer size is too big");
        let duration_ms = usize::try_from(duration_ms).map_err(|_| too_long())?;
        let chunk_ms = usize::try_from(buffer_size_ms).map_err(|_| too_big())?;

        let samples_per_chunk = chunk_ms
            .checked_mul(sample_rate.samples_per_ms())
            .ok_or_else(too_big)?;
        // Rounded to the nearest whole chunk
        let num_chunks = duration_ms
            .checked_add(chunk_ms / 2)
            .map(|ms| ms / chunk_ms)
            .ok_or_else(too_long)?;
        let total_samples = num_chunks
            .checked_mul(samples_per_chunk)
            .filter(|samples| samples.checked_mul(4).is_some())
            .ok_or_else(too_long)?;

        Ok(Self {
            sample_rate,
            num_buffers,
            chunk_ms,
            samples_per_chunk,
            num_chunks,
            total_samples,
        })
    }

    /// Capture window plus a tenth of a chunk of slack
    pub fn capture_window(&self) -> Duration {
        let ms = self
            .num_chunks
            .saturating_mul(self.chunk_ms)
            .saturating_add(self.chunk_ms / 10);
        Duration::from_millis(u64::try_from(ms).unwrap_or(u64::MAX))
    }
}

/// Samples collected by the driver callback, capped at the planned length
struct SampleSink {
    samples: Vec<i32>,
    filled: usize,
}

impl SampleSink {
    fn accept(&mut self, chunk: &[i32]) {
        let end = self.filled + chunk.len();
        if let Some(target) = self.samples.get_mut(self.filled..end) {
            target.copy_from_slice(chunk);
            self.filled = end;
        }
    }
}

/// Record 32-bit signed PCM and return it base64-encoded (little-endian)
pub fn capture_audio(ctx: &mut CommandContext, params: &Params<'_>) -> CommandResult<Value> {
    let plan = CapturePlan::from_params(params, &ctx.config.audio)?;

    let mut samples = Vec::new();
    samples.try_reserve_exact(plan.total_samples).map_err(|_| {
        RpcError::failed(format!(
            "out of memory allocating {} audio samples",
            plan.total_samples
        ))
    })?;
    samples.resize(plan.total_samples, 0);
    let sink = Arc::new(Mutex::new(SampleSink { samples, filled: 0 }));

    {
        let mut audio = DeviceSession::acquire(
            ctx.audio.as_mut(),
            AudioSettings {
                sample_rate: plan.sample_rate,
                num_buffers: plan.num_buffers,
                samples_per_buffer: plan.samples_per_chunk,
            },
        )?;
        let callback_sink = Arc::clone(&sink);
        audio.start(Box::new(move |chunk: &[i32]| callback_sink.lock().accept(chunk)))?;
        thread::sleep(plan.capture_window());
        audio.stop();
    }

    let sink = sink.lock();
    debug!(
        target: "coretest-commands",
        "Captured {} of {} samples at {} Hz",
        sink.filled,
        sink.samples.len(),
        plan.sample_rate.hz()
    );
    let bytes: Vec<u8> = sink.samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    Ok(json!({ "data": STANDARD.encode(bytes) }))
}
