// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Camera-fed pose model stress run
//!
//! Holds the camera and the accelerator at the same time. Both sessions are plain locals, so
//! every early return powers both devices off.

use std::thread;
use std::time::Duration;

use coretest_hal::{
    AcceleratorSettings, BuiltinModel, CameraSettings, Capability, CaptureMode, DeviceSession,
    PerformanceTier, PixelFormat, TestPattern,
};
use coretest_rpc::{Params, RpcError};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::context::CommandContext;
use crate::error::CommandResult;
use crate::inference::{resize_into, ImageDims};

/// Run the built-in pose model on `iterations` live camera frames
pub fn posenet_stress_run(ctx: &mut CommandContext, params: &Params<'_>) -> CommandResult<Value> {
    let iterations = params.integer("iterations")?;
    if iterations < 0 {
        return Err(
            RpcError::bad_param("iterations", "iterations must not be negative").into(),
        );
    }
    let settle = Duration::from_millis(ctx.config.camera.power_settle_ms);
    let discard = ctx.config.camera.stream_discard_frames;
    let arena_bytes = ctx.config.inference.posenet_arena_bytes;

    // Sensor starts from a cold power cycle
    ctx.camera.power_off();
    thread::sleep(settle);
    let mut camera = DeviceSession::acquire(
        ctx.camera.as_mut(),
        CameraSettings {
            mode: CaptureMode::Streaming,
            pattern: TestPattern::None,
        },
    )?;
    let _accelerator = DeviceSession::acquire(
        ctx.accelerator.as_mut(),
        AcceleratorSettings {
            tier: PerformanceTier::Max,
        },
    )
    .map_err(|e| RpcError::DeviceUnavailable(format!("failed to open TPU: {}", e)))?;

    let mut arena = Vec::new();
    arena.try_reserve_exact(arena_bytes).map_err(|_| {
        RpcError::failed(format!(
            "out of memory allocating {} byte tensor arena",
            arena_bytes
        ))
    })?;
    arena.resize(arena_bytes, 0u8);

    let mut interpreter = ctx
        .runtime
        .load_builtin(BuiltinModel::Posenet, &mut arena)
        .map_err(|e| {
            warn!(target: "coretest-commands", "Posenet setup failed: {}", e);
            RpcError::failed("Posenet setup() failed")
        })?;

    // One pass on the zeroed input before any camera data
    if let Err(e) = interpreter.invoke() {
        warn!(target: "coretest-commands", "Posenet static pass failed: {}", e);
    }
    debug!(target: "coretest-commands", "Posenet static pass finished");

    camera.discard_frames(discard)?;

    let shape = interpreter.input_shape();
    for iteration in 0..iterations {
        let frame = camera.capture(PixelFormat::Rgb)?;
        let dims = ImageDims {
            height: frame.height,
            width: frame.width,
            depth: PixelFormat::Rgb.bytes_per_pixel(),
        };
        resize_into(&frame.data, dims, interpreter.input_mut(), shape)
            .map_err(|e| RpcError::failed(format!("failed to fit camera frame: {}", e)))?;

        if let Err(e) = interpreter.invoke() {
            warn!(
                target: "coretest-commands",
                "Posenet iteration {} of {} failed: {}",
                iteration + 1,
                iterations,
                e
            );
            return Err(RpcError::failed("Posenet loop() returned failure").into());
        }
    }

    info!(target: "coretest-commands", "Posenet stress run finished {} iterations", iterations);
    Ok(json!({}))
}
