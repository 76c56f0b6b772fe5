// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # coretest configuration
//!
//! Type-safe configuration for the rack test server:
//! - TOML file parsing (`coretest.toml`)
//! - Environment variable overrides (`CORETEST_*`)
//! - CLI argument overrides (`key=value`)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use coretest_config::{load_config, validate_config};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! validate_config(&config).expect("Invalid config");
//! println!("Bridge call timeout: {} ms", config.bridge.call_timeout_ms);
//! ```
//!
//! Every field has a default that matches the board firmware constants, so an empty file (or
//! [`CoretestConfig::default`]) is a working configuration.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the configuration file searched for by [`find_config_file`].
pub const CONFIG_FILE_NAME: &str = "coretest.toml";

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    parse_cli_pairs,
};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
