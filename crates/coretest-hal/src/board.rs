// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Board peripherals used without a power session

use crate::error::HalResult;

pub trait BoardInfo: Send {
    fn serial_number(&self) -> String;
}

pub trait TemperatureSensors: Send {
    fn sensor_count(&self) -> usize;

    /// Reading in degrees Celsius; `InvalidArgument` for an index past `sensor_count`
    fn read_celsius(&mut self, sensor: usize) -> HalResult<f32>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GpioPin {
    /// Low selects the internal Wi-Fi antenna, high the external one
    AntennaSelect,
}

pub trait Gpio: Send {
    fn set(&mut self, pin: GpioPin, high: bool) -> HalResult<()>;

    fn get(&self, pin: GpioPin) -> bool;
}
