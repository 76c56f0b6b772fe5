// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Rack test server.
//!
//! Reads newline-delimited JSON-RPC requests from stdin and writes one response line per
//! request to stdout. Logs go to stderr (and to rolling files with `file-logging`).
//!
//! The binary drives the simulated board: satellite core on a loopback link plus simulated
//! camera, accelerator, audio, sensors and inference runtime.

use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use coretest::commands::{build_registry, SimulatedBoard};
use coretest::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, parse_cli_pairs,
    validate_config, ConfigError, CoretestConfig,
};
use coretest::ipc::loopback::LoopbackOptions;
use coretest::observability::{debug_flags_help, init_logging, parse_debug_flags};
use coretest::rpc::serve_lines;
use tracing::{error, info, warn};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: rack-test [--config <path>] [key=value ...] [--debug-<crate> ...]\n\n\
         Overrides:\n\
         - log_level, log_dir\n\
         - probe_ms, call_timeout_ms, benchmark_timeout_ms\n\
         - max_resource_bytes, performance_tier\n\n\
         {}",
        debug_flags_help()
    );
    process::exit(2);
}

/// `--config` path plus `key=value` overrides; `--debug-*` flags are read separately
fn parse_args() -> (Option<PathBuf>, Vec<String>) {
    let mut config_path = None;
    let mut overrides = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                config_path = Some(PathBuf::from(v));
            }
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => {}
            other if other.contains('=') => overrides.push(other.to_string()),
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    (config_path, overrides)
}

/// An explicit path must exist; without one a missing `coretest.toml` means defaults
fn resolve_config(config_path: Option<PathBuf>, overrides: Vec<String>) -> Result<CoretestConfig> {
    let cli = parse_cli_pairs(overrides);

    let config = match load_config(config_path.as_deref(), Some(&cli)) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(_)) if config_path.is_none() => {
            let mut config = CoretestConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &cli)?;
            config
        }
        Err(e) => return Err(e).context("Failed to load configuration"),
    };

    validate_config(&config).context("Invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let (config_path, overrides) = parse_args();
    let config = resolve_config(config_path, overrides)?;

    let debug_flags = parse_debug_flags();
    let _logging = init_logging(
        &debug_flags,
        &config.system.log_level,
        config.system.log_dir.as_deref(),
    )?;

    info!(target: "coretest", "rack-test {}", env!("CARGO_PKG_VERSION"));
    if debug_flags.any_enabled() {
        info!(target: "coretest", "Debug filter: {}", debug_flags.to_filter_string(&config.system.log_level));
    }

    let board = SimulatedBoard::new(LoopbackOptions::default())
        .context("Failed to bring up the satellite link")?;
    let mut ctx = board.context(config);

    let registry = match build_registry() {
        Ok(registry) => registry,
        Err(e) => {
            error!(target: "coretest", "Command catalog rejected: {}", e);
            process::exit(1);
        }
    };
    info!(target: "coretest", "{} commands registered", registry.len());

    let stdin = io::stdin();
    let stdout = io::stdout();
    match serve_lines(&registry, &mut ctx, stdin.lock(), stdout.lock()) {
        Ok(answered) => {
            info!(target: "coretest", "Host closed the stream after {} requests", answered);
            Ok(())
        }
        Err(e) => {
            warn!(target: "coretest", "Transport failed: {}", e);
            Err(e).context("JSON-RPC transport failed")
        }
    }
}
