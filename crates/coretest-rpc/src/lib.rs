// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # coretest-rpc
//!
//! JSON-RPC 2.0 plumbing for the test command server: envelopes, the error taxonomy, typed
//! parameter extraction, the procedure registry and a newline-delimited stream adapter.

pub mod envelope;
pub mod error;
pub mod params;
pub mod registry;
pub mod server;

pub use envelope::{Request, Response, JSONRPC_VERSION};
pub use error::{codes, ErrorObject, RpcError, RpcResult};
pub use params::Params;
pub use registry::{Handler, ProcedureRegistry, RegistryError};
pub use server::{handle_line, serve_lines};
