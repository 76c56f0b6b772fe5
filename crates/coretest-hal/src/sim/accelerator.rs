// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use parking_lot::Mutex;

use crate::accelerator::{Accelerator, AcceleratorSettings, PerformanceTier};
use crate::error::{HalError, HalResult};
use crate::session::Capability;

#[derive(Default)]
struct AcceleratorState {
    powered: bool,
    open_tier: Option<PerformanceTier>,
    fail_open: bool,
    sessions: usize,
}

#[derive(Clone, Default)]
pub struct SimAccelerator {
    state: Arc<Mutex<AcceleratorState>>,
}

impl SimAccelerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accelerator that powers up but refuses to open
    pub fn failing_open() -> Self {
        let accelerator = Self::default();
        accelerator.state.lock().fail_open = true;
        accelerator
    }

    /// Number of successful power-on calls
    pub fn sessions(&self) -> usize {
        self.state.lock().sessions
    }
}

impl Capability for SimAccelerator {
    type Config = AcceleratorSettings;

    fn name(&self) -> &'static str {
        "accelerator"
    }

    fn power_on(&mut self) -> HalResult<()> {
        let mut state = self.state.lock();
        state.powered = true;
        state.sessions += 1;
        Ok(())
    }

    fn configure(&mut self, config: &AcceleratorSettings) -> HalResult<()> {
        let mut state = self.state.lock();
        if !state.powered {
            return Err(HalError::NotPowered("accelerator"));
        }
        if state.fail_open {
            return Err(HalError::Device("failed to open TPU".to_string()));
        }
        state.open_tier = Some(config.tier);
        Ok(())
    }

    fn power_off(&mut self) {
        let mut state = self.state.lock();
        state.powered = false;
        state.open_tier = None;
    }
}

impl Accelerator for SimAccelerator {
    fn is_powered(&self) -> bool {
        self.state.lock().powered
    }

    fn set_power(&mut self, enable: bool) -> HalResult<()> {
        let mut state = self.state.lock();
        state.powered = enable;
        if !enable {
            state.open_tier = None;
        }
        Ok(())
    }

    fn open_tier(&self) -> Option<PerformanceTier> {
        self.state.lock().open_tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DeviceSession;

    #[test]
    fn test_session_opens_at_tier() {
        let mut accelerator = SimAccelerator::new();
        let probe = accelerator.clone();
        {
            let _session = DeviceSession::acquire(
                &mut accelerator,
                AcceleratorSettings {
                    tier: PerformanceTier::Max,
                },
            )
            .unwrap();
            assert!(probe.is_powered());
            assert_eq!(probe.open_tier(), Some(PerformanceTier::Max));
        }
        assert!(!probe.is_powered());
        assert_eq!(probe.open_tier(), None);
    }

    #[test]
    fn test_failed_open_powers_off() {
        let mut accelerator = SimAccelerator::failing_open();
        let opened = DeviceSession::acquire(
            &mut accelerator,
            AcceleratorSettings {
                tier: PerformanceTier::High,
            },
        )
        .is_ok();
        assert!(!opened);
        assert!(!accelerator.is_powered());
    }
}
