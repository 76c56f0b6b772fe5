// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Satellite (M4) core commands and the benchmark on both cores

use std::time::Duration;

use coretest_ipc::workload::run_reference_workload;
use coretest_rpc::{Params, RpcError};
use serde_json::{json, Value};
use tracing::info;

use crate::context::CommandContext;
use crate::error::CommandResult;

/// Boot the satellite application and wait for it to answer a ping
pub fn start_m4(ctx: &mut CommandContext, _params: &Params<'_>) -> CommandResult<Value> {
    if !ctx.satellite.has_application() {
        return Err(RpcError::failed("No M4 application present").into());
    }
    ctx.satellite
        .start()
        .map_err(|e| RpcError::failed(format!("failed to start M4: {}", e)))?;

    let within = Duration::from_millis(ctx.config.bridge.start_probe_ms);
    if !ctx.bridge.peer_alive(within) {
        return Err(RpcError::PeerUnresponsive("M4 did not come to life".to_string()).into());
    }
    info!(target: "coretest-commands", "M4 started");
    Ok(json!({}))
}

/// Round-trip a decimal value through the satellite's XOR transform
pub fn m4_xor(ctx: &mut CommandContext, params: &Params<'_>) -> CommandResult<Value> {
    let text = params.string("value")?;
    let value: u32 = text
        .trim()
        .parse()
        .map_err(|_| RpcError::bad_param("value", "param is not a decimal u32"))?;

    let reply = ctx.bridge.xor(value, ctx.call_timeout())?;
    Ok(json!({ "value": reply }))
}

pub fn m4_coremark(ctx: &mut CommandContext, _params: &Params<'_>) -> CommandResult<Value> {
    let report = ctx
        .bridge
        .benchmark(ctx.config.bridge.benchmark_iterations, ctx.benchmark_timeout())?;
    Ok(json!({ "coremark_results": report.to_string() }))
}

/// Same workload on this core
pub fn m7_coremark(ctx: &mut CommandContext, _params: &Params<'_>) -> CommandResult<Value> {
    let report = run_reference_workload(ctx.config.bridge.benchmark_iterations);
    Ok(json!({ "coremark_results": report.to_string() }))
}
