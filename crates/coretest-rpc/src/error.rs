// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy shared by every procedure

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Numeric JSON-RPC error codes
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const BAD_PARAMS: i64 = -32602;

    pub const OPERATION_FAILED: i64 = -32000;
    pub const RESOURCE_NOT_FOUND: i64 = -32001;
    pub const RESOURCE_ALLOCATION_FAILED: i64 = -32002;
    pub const RESOURCE_OVERFLOW: i64 = -32003;
    pub const DEVICE_UNAVAILABLE: i64 = -32004;
    pub const UNSUPPORTED_MODEL: i64 = -32005;
    pub const PEER_UNRESPONSIVE: i64 = -32006;
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RpcError {
    /// Missing, mistyped or semantically invalid parameter
    #[error("{reason}")]
    BadParams { param: String, reason: String },

    #[error("method not found")]
    MethodNotFound(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    OperationFailed(String),

    #[error("unknown resource")]
    ResourceNotFound { resource: String },

    #[error("{0}")]
    ResourceAllocationFailed(String),

    #[error("{0}")]
    ResourceOverflow(String),

    #[error("{0}")]
    DeviceUnavailable(String),

    #[error("model schema version unsupported: {0}")]
    UnsupportedModel(u32),

    #[error("{0}")]
    PeerUnresponsive(String),
}

pub type RpcResult<T> = Result<T, RpcError>;

impl RpcError {
    pub fn bad_param(param: impl Into<String>, reason: impl Into<String>) -> Self {
        RpcError::BadParams {
            param: param.into(),
            reason: reason.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        RpcError::OperationFailed(message.into())
    }

    pub fn resource_not_found(resource: impl Into<String>) -> Self {
        RpcError::ResourceNotFound {
            resource: resource.into(),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            RpcError::BadParams { .. } => codes::BAD_PARAMS,
            RpcError::MethodNotFound(_) => codes::METHOD_NOT_FOUND,
            RpcError::ParseError(_) => codes::PARSE_ERROR,
            RpcError::InvalidRequest(_) => codes::INVALID_REQUEST,
            RpcError::OperationFailed(_) => codes::OPERATION_FAILED,
            RpcError::ResourceNotFound { .. } => codes::RESOURCE_NOT_FOUND,
            RpcError::ResourceAllocationFailed(_) => codes::RESOURCE_ALLOCATION_FAILED,
            RpcError::ResourceOverflow(_) => codes::RESOURCE_OVERFLOW,
            RpcError::DeviceUnavailable(_) => codes::DEVICE_UNAVAILABLE,
            RpcError::UnsupportedModel(_) => codes::UNSUPPORTED_MODEL,
            RpcError::PeerUnresponsive(_) => codes::PEER_UNRESPONSIVE,
        }
    }

    /// Structured detail attached to the error object
    pub fn data(&self) -> Option<Value> {
        match self {
            RpcError::BadParams { param, .. } => Some(json!({ "param": param })),
            RpcError::ResourceNotFound { resource } => Some(json!({ "resource": resource })),
            RpcError::MethodNotFound(method) => Some(json!({ "method": method })),
            _ => None,
        }
    }

    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject {
            code: self.code(),
            message: self.to_string(),
            data: self.data(),
        }
    }
}

/// JSON-RPC `error` member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<RpcError> for ErrorObject {
    fn from(err: RpcError) -> Self {
        err.to_error_object()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_params_object() {
        let object = RpcError::bad_param("size", "missing param").to_error_object();
        assert_eq!(object.code, -32602);
        assert_eq!(object.message, "missing param");
        assert_eq!(object.data, Some(json!({"param": "size"})));
    }

    #[test]
    fn test_resource_not_found_object() {
        let object: ErrorObject = RpcError::resource_not_found("model").into();
        assert_eq!(object.code, codes::RESOURCE_NOT_FOUND);
        assert_eq!(object.message, "unknown resource");
        assert_eq!(object.data, Some(json!({"resource": "model"})));
    }

    #[test]
    fn test_data_omitted_when_absent() {
        let object = RpcError::UnsupportedModel(0).to_error_object();
        assert_eq!(object.message, "model schema version unsupported: 0");
        let text = serde_json::to_string(&object).unwrap();
        assert!(!text.contains("data"));
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            RpcError::bad_param("p", "r"),
            RpcError::MethodNotFound("m".into()),
            RpcError::ParseError("x".into()),
            RpcError::InvalidRequest("x".into()),
            RpcError::failed("x"),
            RpcError::resource_not_found("x"),
            RpcError::ResourceAllocationFailed("x".into()),
            RpcError::ResourceOverflow("x".into()),
            RpcError::DeviceUnavailable("x".into()),
            RpcError::UnsupportedModel(1),
            RpcError::PeerUnresponsive("x".into()),
        ];
        let mut codes: Vec<i64> = errors.iter().map(RpcError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
