// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Camera sensor checks

use std::thread;
use std::time::Duration;

use coretest_hal::camera::matches_walking_ones;
use coretest_hal::{CameraSettings, CaptureMode, DeviceSession, PixelFormat, TestPattern};
use coretest_rpc::{Params, RpcError};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::context::CommandContext;
use crate::error::CommandResult;

/// Resource that receives the last colour-bar frame from `get_frame`
pub const COLORBAR_RESOURCE: &str = "colorbar.raw";

/// Trigger one raw frame with the walking-ones pattern and verify every pixel
pub fn capture_test_pattern(ctx: &mut CommandContext, _params: &Params<'_>) -> CommandResult<Value> {
    let mut camera = DeviceSession::acquire(
        ctx.camera.as_mut(),
        CameraSettings {
            mode: CaptureMode::Triggered,
            pattern: TestPattern::WalkingOnes,
        },
    )?;
    camera.trigger()?;
    let frame = camera.capture(PixelFormat::Raw)?;

    if !matches_walking_ones(&frame.data) {
        warn!(
            target: "coretest-commands",
            "Walking-ones mismatch in {}x{} frame",
            frame.width,
            frame.height
        );
        return Err(RpcError::failed("camera test pattern mismatch").into());
    }
    Ok(json!({}))
}

/// Stream one RGB colour-bar frame and keep it as [`COLORBAR_RESOURCE`]
pub fn get_frame(ctx: &mut CommandContext, _params: &Params<'_>) -> CommandResult<Value> {
    let settle = Duration::from_millis(ctx.config.camera.power_settle_ms);
    let mut camera = DeviceSession::acquire(
        ctx.camera.as_mut(),
        CameraSettings {
            mode: CaptureMode::Streaming,
            pattern: TestPattern::ColorBar,
        },
    )?;
    thread::sleep(settle);

    let frame = camera
        .capture(PixelFormat::Rgb)
        .map_err(|e| RpcError::failed(format!("Call to GetFrame returned false: {}", e)))?;
    drop(camera);

    ctx.resources.begin(COLORBAR_RESOURCE, frame.data.len())?;
    ctx.resources.write(COLORBAR_RESOURCE, 0, &frame.data)?;
    debug!(
        target: "coretest-commands",
        "Stored {}x{} colour-bar frame as '{}'",
        frame.width,
        frame.height,
        COLORBAR_RESOURCE
    );
    Ok(json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context_with, params};
    use coretest_hal::sim::{SimCamera, COLOR_BARS};
    use coretest_rpc::codes;

    #[test]
    fn test_pattern_passes_and_powers_off() {
        let (board, mut ctx) = context_with(|board| board.camera = SimCamera::new(32, 8));
        capture_test_pattern(&mut ctx, &params(&json!({}))).unwrap();
        assert!(!board.camera.is_powered());
        assert_eq!(board.camera.power_cycles(), 1);
    }

    #[test]
    fn test_pattern_mismatch() {
        let (board, mut ctx) =
            context_with(|board| board.camera = SimCamera::new(32, 8).with_corrupt_pixel(17));
        let err = RpcError::from(capture_test_pattern(&mut ctx, &params(&json!({}))).unwrap_err());
        assert_eq!(err, RpcError::failed("camera test pattern mismatch"));
        assert!(!board.camera.is_powered());
    }

    #[test]
    fn test_missing_camera() {
        let (_board, mut ctx) = context_with(|board| board.camera = SimCamera::absent());
        let err = RpcError::from(capture_test_pattern(&mut ctx, &params(&json!({}))).unwrap_err());
        assert_eq!(err.code(), codes::DEVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "unable to detect camera");
    }

    #[test]
    fn test_get_frame_stores_colour_bars() {
        let (board, mut ctx) = context_with(|board| board.camera = SimCamera::new(16, 2));
        get_frame(&mut ctx, &params(&json!({}))).unwrap();
        assert!(!board.camera.is_powered());

        let frame = ctx.resources.get(COLORBAR_RESOURCE).unwrap();
        assert_eq!(frame.len(), 16 * 2 * 3);
        assert_eq!(&frame[0..3], &COLOR_BARS[0]);
        assert_eq!(&frame[frame.len() - 3..], &COLOR_BARS[7]);
    }
}
