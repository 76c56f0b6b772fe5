// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Scoped device acquisition
//!
//! A [`DeviceSession`] powers a capability on, applies its configuration, and powers it off
//! again when dropped. Every early return in a command therefore releases the hardware.

use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::error::HalResult;

/// Hardware block with an explicit power lifecycle
pub trait Capability {
    /// Settings fixed for the lifetime of one session
    type Config: fmt::Debug;

    fn name(&self) -> &'static str;

    fn power_on(&mut self) -> HalResult<()>;

    fn configure(&mut self, config: &Self::Config) -> HalResult<()>;

    /// Must be safe to call in any state, including after a failed `power_on`
    fn power_off(&mut self);
}

pub struct DeviceSession<'a, D: Capability + ?Sized> {
    device: &'a mut D,
    config: D::Config,
}

impl<'a, D: Capability + ?Sized> DeviceSession<'a, D> {
    /// Power on and configure `device`
    ///
    /// # Errors
    ///
    /// On any failure the device has already been powered off again.
    pub fn acquire(device: &'a mut D, config: D::Config) -> HalResult<Self> {
        if let Err(e) = device.power_on() {
            device.power_off();
            return Err(e);
        }
        debug!(target: "coretest-hal", "{} powered on with {:?}", device.name(), config);

        let session = Self { device, config };
        session.device.configure(&session.config)?;
        Ok(session)
    }

    pub fn config(&self) -> &D::Config {
        &self.config
    }
}

impl<D: Capability + ?Sized> Deref for DeviceSession<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.device
    }
}

impl<D: Capability + ?Sized> DerefMut for DeviceSession<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.device
    }
}

impl<D: Capability + ?Sized> Drop for DeviceSession<'_, D> {
    fn drop(&mut self) {
        self.device.power_off();
        debug!(target: "coretest-hal", "{} powered off", self.device.name());
    }
}
