// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Procedure registry
//!
//! Maps procedure names to handlers over a caller-owned context `C`. Registration happens at
//! startup; afterwards the registry is only read.

use std::collections::BTreeMap;
use std::time::Instant;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::envelope::{Request, Response};
use crate::error::{RpcError, RpcResult};
use crate::params::Params;

pub type Handler<C> = Box<dyn Fn(&mut C, &Params<'_>) -> RpcResult<Value> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("procedure '{0}' is already registered")]
    Duplicate(String),
}

pub struct ProcedureRegistry<C> {
    procedures: BTreeMap<String, Handler<C>>,
}

impl<C> Default for ProcedureRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ProcedureRegistry<C> {
    pub fn new() -> Self {
        Self {
            procedures: BTreeMap::new(),
        }
    }

    /// Bind `name` to `handler`
    ///
    /// # Errors
    ///
    /// `Duplicate` if the name is taken; the existing binding is kept.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(&mut C, &Params<'_>) -> RpcResult<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.procedures.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        debug!(target: "coretest-rpc", "Registered procedure {}", name);
        self.procedures.insert(name, Box::new(handler));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.procedures.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.procedures.keys().map(String::as_str)
    }

    /// Run `method` to completion with `params`
    pub fn call(&self, ctx: &mut C, method: &str, params: &Value) -> RpcResult<Value> {
        let handler = self
            .procedures
            .get(method)
            .ok_or_else(|| RpcError::MethodNotFound(method.to_string()))?;
        handler(ctx, &Params::new(params))
    }

    /// Run one request and wrap the outcome in a response envelope
    pub fn dispatch(&self, ctx: &mut C, request: &Request) -> Response {
        let started = Instant::now();
        let result = self.call(ctx, &request.method, &request.params);
        let elapsed_us = started.elapsed().as_micros();

        match &result {
            Ok(_) => debug!(
                target: "coretest-rpc",
                "{} ok in {} us",
                request.method,
                elapsed_us
            ),
            Err(err) => warn!(
                target: "coretest-rpc",
                "{} failed ({}): {}",
                request.method,
                err.code(),
                err
            ),
        }

        Response::from_result(request.id.clone(), result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Counter {
        hits: i64,
    }

    fn registry() -> ProcedureRegistry<Counter> {
        let mut registry = ProcedureRegistry::new();
        registry
            .register("add", |ctx: &mut Counter, params: &Params<'_>| {
                let by = params.integer("by")?;
                ctx.hits += by;
                Ok(json!({ "hits": ctx.hits }))
            })
            .unwrap();
        registry
    }

    #[test]
    fn test_dispatch_mutates_context() {
        let registry = registry();
        let mut ctx = Counter::default();

        let response = registry.dispatch(&mut ctx, &Request::new(1, "add", json!({"by": 2})));
        assert_eq!(response.result, Some(json!({"hits": 2})));
        registry.dispatch(&mut ctx, &Request::new(2, "add", json!([{"by": 3}])));
        assert_eq!(ctx.hits, 5);
    }

    #[test]
    fn test_unknown_method() {
        let registry = registry();
        let mut ctx = Counter::default();

        let response = registry.dispatch(&mut ctx, &Request::new(7, "subtract", json!({})));
        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(response.id, json!(7));
    }

    #[test]
    fn test_bad_params_leave_context_untouched() {
        let registry = registry();
        let mut ctx = Counter::default();

        let response = registry.dispatch(&mut ctx, &Request::new(1, "add", json!({"by": "2"})));
        assert_eq!(response.error.unwrap().data, Some(json!({"param": "by"})));
        assert_eq!(ctx.hits, 0);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = registry();
        let result = registry.register("add", |_: &mut Counter, _: &Params<'_>| Ok(Value::Null));
        assert_eq!(result, Err(RegistryError::Duplicate("add".to_string())));
        assert_eq!(registry.len(), 1);

        // Original binding survives
        let mut ctx = Counter::default();
        assert_eq!(registry.call(&mut ctx, "add", &json!({"by": 1})), Ok(json!({"hits": 1})));
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = registry();
        registry
            .register("a_first", |_: &mut Counter, _: &Params<'_>| Ok(Value::Null))
            .unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a_first", "add"]);
    }
}
