// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! JSON-RPC 2.0 request and response envelopes

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorObject, RpcError};

pub const JSONRPC_VERSION: &str = "2.0";

/// Transport-agnostic procedure call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl Request {
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }

    /// Parse one request document
    ///
    /// # Errors
    ///
    /// Malformed JSON yields `ParseError`. Well-formed JSON that is not a 2.0 request yields
    /// `InvalidRequest`. Both carry the id when one could be recovered.
    pub fn parse(text: &str) -> Result<Request, (Value, RpcError)> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| (Value::Null, RpcError::ParseError(e.to_string())))?;

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: Request = serde_json::from_value(value)
            .map_err(|e| (id.clone(), RpcError::InvalidRequest(e.to_string())))?;

        if request.jsonrpc != JSONRPC_VERSION {
            return Err((
                id,
                RpcError::InvalidRequest(format!("unsupported jsonrpc version '{}'", request.jsonrpc)),
            ));
        }
        Ok(request)
    }
}

/// Reply to one [`Request`]; exactly one of `result` and `error` is present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: &RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error.to_error_object()),
        }
    }

    pub fn from_result(id: Value, result: Result<Value, RpcError>) -> Self {
        match result {
            Ok(value) => Self::success(id, value),
            Err(err) => Self::failure(id, &err),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
