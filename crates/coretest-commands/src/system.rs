// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Board identity, sensors, GPIO and accelerator power

use coretest_hal::{AcceleratorSettings, DeviceSession, GpioPin, HalError};
use coretest_rpc::{Params, RpcError};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::context::CommandContext;
use crate::error::CommandResult;

pub fn get_serial_number(ctx: &mut CommandContext, _params: &Params<'_>) -> CommandResult<Value> {
    Ok(json!({ "serial_number": ctx.board.serial_number() }))
}

pub fn get_temperature(ctx: &mut CommandContext, params: &Params<'_>) -> CommandResult<Value> {
    let sensor = params.integer("sensor")?;
    let invalid = || RpcError::bad_param("sensor", "Invalid temperature sensor");

    let index = usize::try_from(sensor).map_err(|_| invalid())?;
    let temperature = match ctx.temperature.read_celsius(index) {
        Ok(celsius) => celsius,
        Err(HalError::InvalidArgument { .. }) => return Err(invalid().into()),
        Err(e) => return Err(e.into()),
    };
    Ok(json!({ "temperature": temperature }))
}

pub fn set_tpu_power_state(ctx: &mut CommandContext, params: &Params<'_>) -> CommandResult<Value> {
    let enable = params.boolean("enable")?;
    ctx.accelerator.set_power(enable)?;
    info!(target: "coretest-commands", "TPU power {}", if enable { "on" } else { "off" });
    Ok(json!({}))
}

pub fn wifi_set_antenna(ctx: &mut CommandContext, params: &Params<'_>) -> CommandResult<Value> {
    let external = match params.integer("antenna")? {
        0 => false,
        1 => true,
        _ => return Err(RpcError::bad_param("antenna", "invalid antenna selection").into()),
    };
    ctx.gpio.set(GpioPin::AntennaSelect, external)?;
    Ok(json!({}))
}

/// Accelerator self-test convolution
///
/// Only runs once `set_tpu_power_state` has powered the accelerator.
pub fn run_testconv1(ctx: &mut CommandContext, _params: &Params<'_>) -> CommandResult<Value> {
    if !ctx.accelerator.is_powered() {
        return Err(RpcError::DeviceUnavailable("TPU power is not enabled".to_string()).into());
    }

    let tier = ctx.default_tier();
    let _session = DeviceSession::acquire(ctx.accelerator.as_mut(), AcceleratorSettings { tier })
        .map_err(|e| RpcError::DeviceUnavailable(format!("failed to open TPU: {}", e)))?;

    ctx.runtime.self_test(tier).map_err(|e| {
        warn!(target: "coretest-commands", "testconv1 failed: {}", e);
        RpcError::failed(format!("testconv1 failed: {}", e))
    })?;
    Ok(json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, params};
    use coretest_hal::{Accelerator, Gpio};
    use coretest_rpc::codes;

    #[test]
    fn test_serial_number() {
        let (_board, mut ctx) = context();
        let result = get_serial_number(&mut ctx, &params(&json!({}))).unwrap();
        assert_eq!(result, json!({"serial_number": "0123456789ABCDEF"}));
    }

    #[test]
    fn test_temperature_sensor_bounds() {
        let (_board, mut ctx) = context();
        let reading = get_temperature(&mut ctx, &params(&json!({"sensor": 0}))).unwrap();
        assert_eq!(reading, json!({"temperature": 36.5}));

        for sensor in [-1, 2] {
            let err = RpcError::from(
                get_temperature(&mut ctx, &params(&json!({ "sensor": sensor }))).unwrap_err(),
            );
            assert_eq!(err, RpcError::bad_param("sensor", "Invalid temperature sensor"));
        }
    }

    #[test]
    fn test_antenna_selection() {
        let (board, mut ctx) = context();
        wifi_set_antenna(&mut ctx, &params(&json!({"antenna": 1}))).unwrap();
        assert!(board.gpio.get(GpioPin::AntennaSelect));
        wifi_set_antenna(&mut ctx, &params(&json!({"antenna": 0}))).unwrap();
        assert!(!board.gpio.get(GpioPin::AntennaSelect));

        let err = RpcError::from(
            wifi_set_antenna(&mut ctx, &params(&json!({"antenna": 2}))).unwrap_err(),
        );
        assert_eq!(err.code(), codes::BAD_PARAMS);
        assert_eq!(err.data(), Some(json!({"param": "antenna"})));
    }

    #[test]
    fn test_testconv1_requires_power() {
        let (board, mut ctx) = context();
        let err = RpcError::from(run_testconv1(&mut ctx, &params(&json!({}))).unwrap_err());
        assert_eq!(err.code(), codes::DEVICE_UNAVAILABLE);
        assert_eq!(board.runtime.stats().self_tests, 0);

        set_tpu_power_state(&mut ctx, &params(&json!({"enable": true}))).unwrap();
        assert!(board.accelerator.is_powered());
        run_testconv1(&mut ctx, &params(&json!({}))).unwrap();
        assert_eq!(board.runtime.stats().self_tests, 1);
        assert!(!board.accelerator.is_powered());
    }
}
