// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Simulated board for host runs and tests
//!
//! Every device is a cheap `Clone` over shared state, so a test can keep one handle for
//! inspection while the command context owns another.

mod accelerator;
mod audio;
mod camera;
mod peripherals;
mod runtime;

pub use accelerator::SimAccelerator;
pub use audio::SimAudio;
pub use camera::{SimCamera, COLOR_BARS, SIM_CAMERA_HEIGHT, SIM_CAMERA_WIDTH};
pub use peripherals::{SimBoard, SimGpio, SimTemperature};
pub use runtime::{RuntimeScript, RuntimeStats, ScriptedRuntime, TFLITE_SCHEMA_VERSION};
