// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # coretest-hal
//!
//! Narrow interfaces to the board's hardware, as seen by the test commands:
//! - power-managed capabilities ([`Camera`], [`Accelerator`], [`AudioInput`]) used through
//!   [`DeviceSession`]
//! - always-on peripherals ([`TemperatureSensors`], [`Gpio`], [`BoardInfo`])
//! - the [`InferenceRuntime`] seam
//!
//! [`sim`] provides deterministic host implementations of all of them.

pub mod accelerator;
pub mod audio;
pub mod board;
pub mod camera;
pub mod error;
pub mod inference;
pub mod session;
pub mod sim;

pub use accelerator::{Accelerator, AcceleratorSettings, PerformanceTier};
pub use audio::{AudioInput, AudioSettings, AudioSink, SampleRate};
pub use board::{BoardInfo, Gpio, GpioPin, TemperatureSensors};
pub use camera::{Camera, CameraSettings, CaptureMode, Frame, PixelFormat, TestPattern};
pub use error::{HalError, HalResult};
pub use inference::{BuiltinModel, Classification, Detection, InferenceRuntime, Interpreter, TensorShape};
pub use session::{Capability, DeviceSession};
