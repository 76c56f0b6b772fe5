// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Hardware-level failures reported by capability implementations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    #[error("unable to detect {0}")]
    NotDetected(&'static str),

    #[error("{0} is not powered")]
    NotPowered(&'static str),

    #[error("{device} configuration failed: {reason}")]
    Configure { device: &'static str, reason: String },

    #[error("invalid {what}: {value}")]
    InvalidArgument { what: &'static str, value: i64 },

    #[error("{device} timed out: {reason}")]
    Timeout { device: &'static str, reason: String },

    #[error("{0}")]
    Device(String),
}

pub type HalResult<T> = Result<T, HalError>;
