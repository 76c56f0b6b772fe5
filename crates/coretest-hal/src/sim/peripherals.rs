// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::board::{BoardInfo, Gpio, GpioPin, TemperatureSensors};
use crate::error::{HalError, HalResult};

/// CPU and TPU die readings
#[derive(Debug, Clone)]
pub struct SimTemperature {
    readings: Vec<f32>,
}

impl SimTemperature {
    pub fn new(readings: Vec<f32>) -> Self {
        Self { readings }
    }
}

impl Default for SimTemperature {
    fn default() -> Self {
        Self::new(vec![36.5, 41.0])
    }
}

impl TemperatureSensors for SimTemperature {
    fn sensor_count(&self) -> usize {
        self.readings.len()
    }

    fn read_celsius(&mut self, sensor: usize) -> HalResult<f32> {
        self.readings
            .get(sensor)
            .copied()
            .ok_or(HalError::InvalidArgument {
                what: "temperature sensor",
                value: sensor as i64,
            })
    }
}

/// Pins default low
#[derive(Debug, Clone, Default)]
pub struct SimGpio {
    levels: Arc<Mutex<BTreeMap<GpioPin, bool>>>,
}

impl SimGpio {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Gpio for SimGpio {
    fn set(&mut self, pin: GpioPin, high: bool) -> HalResult<()> {
        self.levels.lock().insert(pin, high);
        Ok(())
    }

    fn get(&self, pin: GpioPin) -> bool {
        self.levels.lock().get(&pin).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct SimBoard {
    serial: String,
}

impl SimBoard {
    pub fn new(serial: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
        }
    }
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new("0123456789ABCDEF")
    }
}

impl BoardInfo for SimBoard {
    fn serial_number(&self) -> String {
        self.serial.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_bounds() {
        let mut sensors = SimTemperature::default();
        assert_eq!(sensors.sensor_count(), 2);
        assert_eq!(sensors.read_celsius(1), Ok(41.0));
        assert_eq!(
            sensors.read_celsius(2),
            Err(HalError::InvalidArgument {
                what: "temperature sensor",
                value: 2
            })
        );
    }

    #[test]
    fn test_gpio_shared_state() {
        let mut gpio = SimGpio::new();
        let probe = gpio.clone();
        assert!(!probe.get(GpioPin::AntennaSelect));
        gpio.set(GpioPin::AntennaSelect, true).unwrap();
        assert!(probe.get(GpioPin::AntennaSelect));
    }
}
