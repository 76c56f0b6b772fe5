// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Typed parameter extraction
//!
//! Each accessor checks existence and type independently and fails with `BadParams` naming the
//! parameter. Handlers pull all of their parameters with `?` before touching hardware.

use serde_json::{Map, Value};

use crate::error::{RpcError, RpcResult};

pub const MISSING_PARAM: &str = "missing param";
pub const NOT_A_NUMBER: &str = "param is not a number";
pub const NOT_AN_INTEGER: &str = "param is not an integer";
pub const NOT_A_BOOL: &str = "param is not a bool";
pub const NOT_A_STRING: &str = "param is not a string";

/// Longest string value accepted from a request
pub const MAX_STRING_LEN: usize = 256;

/// View over a request's parameter set
///
/// Accepts either an object (`{"name": ...}`) or a positional array whose first element is
/// that object (`[{"name": ...}]`). Anything else behaves as an empty set.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> Params<'a> {
    pub fn new(params: &'a Value) -> Self {
        let fields = match params {
            Value::Object(map) => Some(map),
            Value::Array(items) => items.first().and_then(Value::as_object),
            _ => None,
        };
        Self { fields }
    }

    fn lookup(&self, name: &str) -> RpcResult<&'a Value> {
        self.fields
            .and_then(|map| map.get(name))
            .ok_or_else(|| RpcError::bad_param(name, MISSING_PARAM))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.is_some_and(|map| map.contains_key(name))
    }

    pub fn integer(&self, name: &str) -> RpcResult<i64> {
        let value = self.lookup(name)?;
        if !value.is_number() {
            return Err(RpcError::bad_param(name, NOT_A_NUMBER));
        }
        value
            .as_i64()
            .ok_or_else(|| RpcError::bad_param(name, NOT_AN_INTEGER))
    }

    pub fn boolean(&self, name: &str) -> RpcResult<bool> {
        self.lookup(name)?
            .as_bool()
            .ok_or_else(|| RpcError::bad_param(name, NOT_A_BOOL))
    }

    /// Owned copy of a string parameter, rejected when longer than [`MAX_STRING_LEN`] bytes
    pub fn string(&self, name: &str) -> RpcResult<String> {
        let text = self
            .lookup(name)?
            .as_str()
            .ok_or_else(|| RpcError::bad_param(name, NOT_A_STRING))?;
        if text.len() > MAX_STRING_LEN {
            return Err(RpcError::bad_param(name, "param is too long"));
        }
        Ok(text.to_string())
    }

    /// Borrowed string parameter with no length cap (bulk payloads such as base64 chunks)
    pub fn text(&self, name: &str) -> RpcResult<&'a str> {
        self.lookup(name)?
            .as_str()
            .ok_or_else(|| RpcError::bad_param(name, NOT_A_STRING))
    }

    /// Integer parameter converted to `T`, `BadParams` when it does not fit
    pub fn integer_as<T: TryFrom<i64>>(&self, name: &str) -> RpcResult<T> {
        let value = self.integer(name)?;
        T::try_from(value).map_err(|_| RpcError::bad_param(name, "param is out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reason(err: RpcError) -> (String, String) {
        match err {
            RpcError::BadParams { param, reason } => (param, reason),
            other => panic!("expected BadParams, got {:?}", other),
        }
    }

    #[test]
    fn test_object_and_array_forms() {
        let object = json!({"size": 10});
        let array = json!([{"size": 10}]);
        assert_eq!(Params::new(&object).integer("size"), Ok(10));
        assert_eq!(Params::new(&array).integer("size"), Ok(10));
    }

    #[test]
    fn test_missing() {
        let value = json!({});
        let err = Params::new(&value).integer("size").unwrap_err();
        assert_eq!(reason(err), ("size".to_string(), MISSING_PARAM.to_string()));
    }

    #[test]
    fn test_null_params_are_empty() {
        let value = Value::Null;
        let params = Params::new(&value);
        assert!(!params.contains("enable"));
        assert_eq!(reason(params.boolean("enable").unwrap_err()).1, MISSING_PARAM);
    }

    #[test]
    fn test_type_mismatches() {
        let value = json!({"n": "12", "b": 1, "s": false, "f": 1.5});
        let params = Params::new(&value);
        assert_eq!(reason(params.integer("n").unwrap_err()).1, NOT_A_NUMBER);
        assert_eq!(reason(params.boolean("b").unwrap_err()).1, NOT_A_BOOL);
        assert_eq!(reason(params.string("s").unwrap_err()).1, NOT_A_STRING);
        assert_eq!(reason(params.integer("f").unwrap_err()).1, NOT_AN_INTEGER);
    }

    #[test]
    fn test_values() {
        let value = json!([{"enable": true, "name": "model", "offset": -4}]);
        let params = Params::new(&value);
        assert_eq!(params.boolean("enable"), Ok(true));
        assert_eq!(params.string("name"), Ok("model".to_string()));
        assert_eq!(params.integer("offset"), Ok(-4));
    }

    #[test]
    fn test_range_conversion() {
        let value = json!({"offset": -4, "size": 300});
        let params = Params::new(&value);
        assert!(params.integer_as::<usize>("offset").is_err());
        assert_eq!(params.integer_as::<usize>("size"), Ok(300));
        assert!(params.integer_as::<u8>("size").is_err());
    }

    #[test]
    fn test_string_length_cap() {
        let value = json!({"name": "x".repeat(MAX_STRING_LEN + 1), "data": "y".repeat(4096)});
        let params = Params::new(&value);
        assert!(params.string("name").is_err());
        assert_eq!(params.text("data").map(str::len), Ok(4096));
    }
}
