// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use parking_lot::Mutex;

use crate::camera::{
    next_walking_one, Camera, CameraSettings, CaptureMode, Frame, PixelFormat, TestPattern,
};
use crate::error::{HalError, HalResult};
use crate::session::Capability;

pub const SIM_CAMERA_WIDTH: usize = 324;
pub const SIM_CAMERA_HEIGHT: usize = 324;

/// White, yellow, cyan, green, magenta, red, blue, black
pub const COLOR_BARS: [[u8; 3]; 8] = [
    [255, 255, 255],
    [255, 255, 0],
    [0, 255, 255],
    [0, 255, 0],
    [255, 0, 255],
    [255, 0, 0],
    [0, 0, 255],
    [0, 0, 0],
];

struct CameraState {
    present: bool,
    powered: bool,
    settings: Option<CameraSettings>,
    triggered: bool,
    width: usize,
    height: usize,
    corrupt_pixel: Option<usize>,
    power_cycles: usize,
    discarded: usize,
}

#[derive(Clone)]
pub struct SimCamera {
    state: Arc<Mutex<CameraState>>,
}

impl Default for SimCamera {
    fn default() -> Self {
        Self::new(SIM_CAMERA_WIDTH, SIM_CAMERA_HEIGHT)
    }
}

impl SimCamera {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(CameraState {
                present: true,
                powered: false,
                settings: None,
                triggered: false,
                width,
                height,
                corrupt_pixel: None,
                power_cycles: 0,
                discarded: 0,
            })),
        }
    }

    /// Camera that never answers on power-up
    pub fn absent() -> Self {
        let camera = Self::default();
        camera.state.lock().present = false;
        camera
    }

    /// Flip the raw pixel at `index` in every captured frame
    pub fn with_corrupt_pixel(self, index: usize) -> Self {
        self.state.lock().corrupt_pixel = Some(index);
        self
    }

    pub fn is_powered(&self) -> bool {
        self.state.lock().powered
    }

    pub fn power_cycles(&self) -> usize {
        self.state.lock().power_cycles
    }

    pub fn discarded_frames(&self) -> usize {
        self.state.lock().discarded
    }
}

fn raw_pixel(pattern: TestPattern, x: usize, y: usize, width: usize, walking: &mut u8) -> u8 {
    match pattern {
        TestPattern::WalkingOnes => {
            let value = *walking;
            *walking = next_walking_one(value);
            value
        }
        TestPattern::ColorBar => {
            let [r, g, b] = COLOR_BARS[x * COLOR_BARS.len() / width];
            ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8
        }
        TestPattern::None => (x + y) as u8,
    }
}

impl Capability for SimCamera {
    type Config = CameraSettings;

    fn name(&self) -> &'static str {
        "camera"
    }

    fn power_on(&mut self) -> HalResult<()> {
        let mut state = self.state.lock();
        if !state.present {
            return Err(HalError::NotDetected("camera"));
        }
        state.powered = true;
        state.power_cycles += 1;
        Ok(())
    }

    fn configure(&mut self, config: &CameraSettings) -> HalResult<()> {
        let mut state = self.state.lock();
        if !state.powered {
            return Err(HalError::NotPowered("camera"));
        }
        state.settings = Some(*config);
        state.triggered = false;
        Ok(())
    }

    fn power_off(&mut self) {
        let mut state = self.state.lock();
        state.powered = false;
        state.settings = None;
        state.triggered = false;
    }
}

impl Camera for SimCamera {
    fn sensor_dims(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.width, state.height)
    }

    fn trigger(&mut self) -> HalResult<()> {
        let mut state = self.state.lock();
        match state.settings {
            Some(CameraSettings {
                mode: CaptureMode::Triggered,
                ..
            }) => {
                state.triggered = true;
                Ok(())
            }
            Some(_) => Err(HalError::Configure {
                device: "camera",
                reason: "trigger requires triggered mode".to_string(),
            }),
            None => Err(HalError::NotPowered("camera")),
        }
    }

    fn capture(&mut self, format: PixelFormat) -> HalResult<Frame> {
        let mut state = self.state.lock();
        let settings = state.settings.ok_or(HalError::NotPowered("camera"))?;
        if settings.mode == CaptureMode::Triggered {
            if !state.triggered {
                return Err(HalError::Timeout {
                    device: "camera",
                    reason: "no frame was triggered".to_string(),
                });
            }
            state.triggered = false;
        }

        let (width, height) = (state.width, state.height);
        let mut data = Vec::with_capacity(width * height * format.bytes_per_pixel());
        let mut walking = 0u8;
        for y in 0..height {
            for x in 0..width {
                match (format, settings.pattern) {
                    (PixelFormat::Rgb, TestPattern::ColorBar) => {
                        data.extend_from_slice(&COLOR_BARS[x * COLOR_BARS.len() / width]);
                    }
                    (PixelFormat::Rgb, pattern) => {
                        let value = raw_pixel(pattern, x, y, width, &mut walking);
                        data.extend_from_slice(&[value, value, value]);
                    }
                    (PixelFormat::Raw, pattern) => {
                        data.push(raw_pixel(pattern, x, y, width, &mut walking));
                    }
                }
            }
        }

        if let Some(index) = state.corrupt_pixel {
            if let Some(pixel) = data.get_mut(index) {
                *pixel ^= 0x5a;
            }
        }

        Ok(Frame {
            width,
            height,
            format,
            data,
        })
    }

    fn discard_frames(&mut self, count: usize) -> HalResult<()> {
        let mut state = self.state.lock();
        match state.settings {
            Some(CameraSettings {
                mode: CaptureMode::Streaming,
                ..
            }) => {
                state.discarded += count;
                Ok(())
            }
            Some(_) => Err(HalError::Configure {
                device: "camera",
                reason: "discarding frames requires streaming mode".to_string(),
            }),
            None => Err(HalError::NotPowered("camera")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::matches_walking_ones;
    use crate::session::DeviceSession;

    fn triggered_walking_ones() -> CameraSettings {
        CameraSettings {
            mode: CaptureMode::Triggered,
            pattern: TestPattern::WalkingOnes,
        }
    }

    #[test]
    fn test_walking_ones_capture() {
        let mut camera = SimCamera::new(16, 4);
        let mut session = DeviceSession::acquire(&mut camera, triggered_walking_ones()).unwrap();
        session.trigger().unwrap();
        let frame = session.capture(PixelFormat::Raw).unwrap();
        assert_eq!(frame.data.len(), 64);
        assert!(matches_walking_ones(&frame.data));
    }

    #[test]
    fn test_triggered_capture_needs_trigger() {
        let mut camera = SimCamera::new(4, 4);
        let mut session = DeviceSession::acquire(&mut camera, triggered_walking_ones()).unwrap();
        assert!(matches!(
            session.capture(PixelFormat::Raw),
            Err(HalError::Timeout { .. })
        ));
    }

    #[test]
    fn test_color_bars_rgb() {
        let mut camera = SimCamera::new(8, 2);
        let mut session = DeviceSession::acquire(
            &mut camera,
            CameraSettings {
                mode: CaptureMode::Streaming,
                pattern: TestPattern::ColorBar,
            },
        )
        .unwrap();
        let frame = session.capture(PixelFormat::Rgb).unwrap();
        assert_eq!(frame.data.len(), 8 * 2 * 3);
        assert_eq!(&frame.data[0..3], &COLOR_BARS[0]);
        assert_eq!(&frame.data[21..24], &COLOR_BARS[7]);
    }

    #[test]
    fn test_corrupt_pixel_breaks_pattern() {
        let mut camera = SimCamera::new(8, 8).with_corrupt_pixel(5);
        let mut session = DeviceSession::acquire(&mut camera, triggered_walking_ones()).unwrap();
        session.trigger().unwrap();
        let frame = session.capture(PixelFormat::Raw).unwrap();
        assert!(!matches_walking_ones(&frame.data));
    }

    #[test]
    fn test_absent_camera() {
        let mut camera = SimCamera::absent();
        let probe = camera.clone();
        let result = DeviceSession::acquire(&mut camera, triggered_walking_ones());
        assert_eq!(result.err(), Some(HalError::NotDetected("camera")));
        assert!(!probe.is_powered());
    }
}
