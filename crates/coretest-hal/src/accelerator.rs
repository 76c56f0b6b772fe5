// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::error::HalResult;
use crate::session::Capability;

/// Accelerator clock/power operating point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceTier {
    Low,
    Medium,
    High,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceleratorSettings {
    pub tier: PerformanceTier,
}

/// Inference accelerator
///
/// As a [`Capability`], `configure` opens the device at the requested tier. `set_power` is the
/// standalone switch behind the power-state command and leaves the device closed.
pub trait Accelerator: Capability<Config = AcceleratorSettings> + Send {
    fn is_powered(&self) -> bool;

    fn set_power(&mut self, enable: bool) -> HalResult<()>;

    /// Tier the device is currently open at
    fn open_tier(&self) -> Option<PerformanceTier>;
}
