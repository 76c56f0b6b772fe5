// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Name → handler table for every test command

use coretest_rpc::{Params, ProcedureRegistry, RegistryError, RpcError};
use serde_json::Value;

use crate::context::CommandContext;
use crate::error::CommandResult;
use crate::{audio, camera, inference, resources, satellite, stress, system};

type CommandFn = fn(&mut CommandContext, &Params<'_>) -> CommandResult<Value>;

const COMMANDS: &[(&str, CommandFn)] = &[
    ("get_serial_number", system::get_serial_number),
    ("run_testconv1", system::run_testconv1),
    ("set_tpu_power_state", system::set_tpu_power_state),
    ("posenet_stress_run", stress::posenet_stress_run),
    ("begin_upload_resource", resources::begin_upload_resource),
    ("upload_resource_chunk", resources::upload_resource_chunk),
    ("delete_resource", resources::delete_resource),
    ("run_classification_model", inference::run_classification_model),
    ("run_detection_model", inference::run_detection_model),
    ("start_m4", satellite::start_m4),
    ("get_temperature", system::get_temperature),
    ("capture_test_pattern", camera::capture_test_pattern),
    ("capture_audio", audio::capture_audio),
    ("wifi_set_antenna", system::wifi_set_antenna),
    ("m4_xor", satellite::m4_xor),
    ("m4_coremark", satellite::m4_coremark),
    ("m7_coremark", satellite::m7_coremark),
    ("get_frame", camera::get_frame),
];

/// Names of every command in registration order
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|(name, _)| *name)
}

/// Register the full catalog
///
/// Fails on the first name that is already taken; callers treat that as fatal.
pub fn install(registry: &mut ProcedureRegistry<CommandContext>) -> Result<(), RegistryError> {
    for &(name, handler) in COMMANDS {
        registry.register(name, move |ctx: &mut CommandContext, params: &Params<'_>| {
            handler(ctx, params).map_err(RpcError::from)
        })?;
    }
    Ok(())
}

pub fn build_registry() -> Result<ProcedureRegistry<CommandContext>, RegistryError> {
    let mut registry = ProcedureRegistry::new();
    install(&mut registry)?;
    Ok(registry)
}
