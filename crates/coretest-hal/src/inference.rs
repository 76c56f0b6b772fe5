// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Seam to the on-device inference runtime
//!
//! The runtime itself (model parsing, kernels, accelerator delegation) lives outside this
//! workspace. Commands only need to load a model into a scratch arena, fill the input tensor,
//! invoke, and read decoded results.

use crate::accelerator::PerformanceTier;
use crate::error::HalResult;

/// Input tensor geometry, height x width x depth bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorShape {
    pub height: usize,
    pub width: usize,
    pub depth: usize,
}

impl TensorShape {
    /// Byte length, or `None` when it does not fit in `usize`
    pub fn len(&self) -> Option<usize> {
        self.height.checked_mul(self.width)?.checked_mul(self.depth)
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0 || self.depth == 0
    }
}

/// Decoded detection candidate; box coordinates are normalised to [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub id: i32,
    pub score: f32,
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub id: i32,
    pub score: f32,
}

/// Models compiled into the firmware image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinModel {
    /// Single-person pose estimation fed from the camera
    Posenet,
}

pub trait InferenceRuntime: Send {
    /// Model schema version this runtime understands
    fn supported_schema_version(&self) -> u32;

    /// Build an interpreter for `model` using `arena` as scratch memory
    fn load<'a>(
        &'a mut self,
        model: &'a [u8],
        arena: &'a mut [u8],
    ) -> HalResult<Box<dyn Interpreter + 'a>>;

    /// Build an interpreter for a firmware-resident model
    fn load_builtin<'a>(
        &'a mut self,
        model: BuiltinModel,
        arena: &'a mut [u8],
    ) -> HalResult<Box<dyn Interpreter + 'a>>;

    /// Run the built-in convolution self-test model at `tier`
    fn self_test(&mut self, tier: PerformanceTier) -> HalResult<()>;
}

pub trait Interpreter {
    fn input_shape(&self) -> TensorShape;

    fn input_mut(&mut self) -> &mut [u8];

    /// Input quantisation requires a preprocessing pass before use
    fn needs_preprocessing(&self) -> bool;

    fn preprocess(&mut self) -> HalResult<()>;

    fn invoke(&mut self) -> HalResult<()>;

    /// Every detection candidate from the last invocation, unfiltered
    fn detections(&self) -> Vec<Detection>;

    /// Every class score from the last invocation, unfiltered
    fn classifications(&self) -> Vec<Classification>;
}
