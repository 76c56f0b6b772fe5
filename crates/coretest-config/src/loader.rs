// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers win:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, CoretestConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the configuration file
///
/// Search order:
/// 1. `CORETEST_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to five parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("CORETEST_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by CORETEST_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet CORETEST_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file and apply overrides
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, [`find_config_file`] is used.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is missing, unreadable, or not valid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<CoretestConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: CoretestConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `CORETEST_LOG_LEVEL` -> `system.log_level`
/// - `CORETEST_LOG_DIR` -> `system.log_dir`
/// - `CORETEST_BRIDGE_PROBE_MS` -> `bridge.liveness_probe_ms`
/// - `CORETEST_BRIDGE_CALL_TIMEOUT_MS` -> `bridge.call_timeout_ms`
/// - `CORETEST_BRIDGE_BENCHMARK_TIMEOUT_MS` -> `bridge.benchmark_timeout_ms`
/// - `CORETEST_RESOURCES_MAX_TOTAL_BYTES` -> `resources.max_total_bytes`
/// - `CORETEST_INFERENCE_TIER` -> `inference.performance_tier`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut CoretestConfig) {
    if let Ok(value) = env::var("CORETEST_LOG_LEVEL") {
        config.system.log_level = value;
    }
    if let Ok(value) = env::var("CORETEST_LOG_DIR") {
        config.system.log_dir = Some(PathBuf::from(value));
    }
    if let Ok(value) = env::var("CORETEST_BRIDGE_PROBE_MS") {
        if let Ok(ms) = value.parse::<u64>() {
            config.bridge.liveness_probe_ms = ms;
        }
    }
    if let Ok(value) = env::var("CORETEST_BRIDGE_CALL_TIMEOUT_MS") {
        if let Ok(ms) = value.parse::<u64>() {
            config.bridge.call_timeout_ms = ms;
        }
    }
    if let Ok(value) = env::var("CORETEST_BRIDGE_BENCHMARK_TIMEOUT_MS") {
        if let Ok(ms) = value.parse::<u64>() {
            config.bridge.benchmark_timeout_ms = ms;
        }
    }
    if let Ok(value) = env::var("CORETEST_RESOURCES_MAX_TOTAL_BYTES") {
        if let Ok(bytes) = value.parse::<u64>() {
            config.resources.max_total_bytes = bytes;
        }
    }
    if let Ok(value) = env::var("CORETEST_INFERENCE_TIER") {
        if let Ok(tier) = value.parse() {
            config.inference.performance_tier = tier;
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// Recognised keys: `log_level`, `log_dir`, `probe_ms`, `call_timeout_ms`,
/// `benchmark_timeout_ms`, `max_resource_bytes`, `performance_tier`.
///
/// # Errors
///
/// Unlike environment overrides, an explicit CLI value that does not parse is an error.
pub fn apply_cli_overrides(
    config: &mut CoretestConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.system.log_dir = Some(PathBuf::from(value));
    }
    if let Some(value) = cli_args.get("probe_ms") {
        config.bridge.liveness_probe_ms = parse_cli("probe_ms", value)?;
    }
    if let Some(value) = cli_args.get("call_timeout_ms") {
        config.bridge.call_timeout_ms = parse_cli("call_timeout_ms", value)?;
    }
    if let Some(value) = cli_args.get("benchmark_timeout_ms") {
        config.bridge.benchmark_timeout_ms = parse_cli("benchmark_timeout_ms", value)?;
    }
    if let Some(value) = cli_args.get("max_resource_bytes") {
        config.resources.max_total_bytes = parse_cli("max_resource_bytes", value)?;
    }
    if let Some(value) = cli_args.get("performance_tier") {
        config.inference.performance_tier = value.parse().map_err(ConfigError::InvalidValue)?;
    }
    Ok(())
}

fn parse_cli<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(format!("{}={}", key, value)))
}

/// Split `key=value` arguments into an override map, skipping anything else
pub fn parse_cli_pairs<I>(args: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .filter_map(|arg| {
            let (key, value) = arg.split_once('=')?;
            let key = key.trim_start_matches("--");
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}
