// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks that timing values are usable and that inference thresholds and limits are within
//! the ranges the command handlers accept.

use crate::{ConfigError, ConfigResult, CoretestConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    ZeroDuration { field: String },
    OutOfRange { field: String, value: String, expected: String },
    Ordering { shorter: String, longer: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDuration { field } => write!(f, "{} must be greater than zero", field),
            Self::OutOfRange {
                field,
                value,
                expected,
            } => write!(f, "{} = {} is outside {}", field, value, expected),
            Self::Ordering { shorter, longer } => {
                write!(f, "{} must be shorter than {}", shorter, longer)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &CoretestConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_system(config, &mut errors);
    validate_bridge(config, &mut errors);
    validate_inference(config, &mut errors);

    if config.audio.max_buffers == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "audio.max_buffers".to_string(),
            reason: "at least one buffer is required".to_string(),
        });
    }
    if config.audio.max_duration_ms == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "audio.max_duration_ms".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_system(config: &CoretestConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.system.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "system.log_level".to_string(),
            reason: format!("'{}' is not one of {}", config.system.log_level, LOG_LEVELS.join(", ")),
        });
    }
}

fn validate_bridge(config: &CoretestConfig, errors: &mut Vec<ConfigValidationError>) {
    let bridge = &config.bridge;
    for (field, value) in [
        ("bridge.liveness_probe_ms", bridge.liveness_probe_ms),
        ("bridge.call_timeout_ms", bridge.call_timeout_ms),
        ("bridge.benchmark_timeout_ms", bridge.benchmark_timeout_ms),
        ("bridge.start_probe_ms", bridge.start_probe_ms),
    ] {
        if value == 0 {
            errors.push(ConfigValidationError::ZeroDuration {
                field: field.to_string(),
            });
        }
    }

    if bridge.liveness_probe_ms >= bridge.call_timeout_ms && bridge.call_timeout_ms > 0 {
        errors.push(ConfigValidationError::Ordering {
            shorter: "bridge.liveness_probe_ms".to_string(),
            longer: "bridge.call_timeout_ms".to_string(),
        });
    }

    if bridge.benchmark_iterations == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "bridge.benchmark_iterations".to_string(),
            reason: "must run at least one iteration".to_string(),
        });
    }
}

fn validate_inference(config: &CoretestConfig, errors: &mut Vec<ConfigValidationError>) {
    let inference = &config.inference;
    for (field, value) in [
        ("inference.detection_threshold", inference.detection_threshold),
        (
            "inference.classification_threshold",
            inference.classification_threshold,
        ),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigValidationError::OutOfRange {
                field: field.to_string(),
                value: value.to_string(),
                expected: "[0.0, 1.0]".to_string(),
            });
        }
    }

    for (field, value) in [
        ("inference.detection_top_k", inference.detection_top_k),
        ("inference.classification_top_k", inference.classification_top_k),
        ("inference.detection_arena_bytes", inference.detection_arena_bytes),
        (
            "inference.classification_arena_bytes",
            inference.classification_arena_bytes,
        ),
        ("inference.posenet_arena_bytes", inference.posenet_arena_bytes),
    ] {
        if value == 0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: field.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
    }
}
