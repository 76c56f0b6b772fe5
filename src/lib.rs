// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # coretest - rack test server for dual-core vision boards
//!
//! A host on the factory rack drives the board through newline-delimited JSON-RPC 2.0. Each
//! request names one test command (upload a model, run an inference, grab a camera frame,
//! ping the satellite core...) and receives exactly one response.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! coretest = "0.1"  # Default: command catalog + logging
//! ```
//!
//! ## Feature Flags
//!
//! - **`server`** (default): command catalog, simulated board, logging setup
//! - **`file-logging`**: rolling log files under `system.log_dir`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use coretest::prelude::*;
//!
//! let board = SimulatedBoard::new(LoopbackOptions::default())?;
//! let mut ctx = board.context(CoretestConfig::default());
//! let registry = build_registry()?;
//!
//! let response = handle_line(
//!     &registry,
//!     &mut ctx,
//!     r#"{"jsonrpc":"2.0","id":1,"method":"get_serial_number"}"#,
//! );
//! assert!(!response.is_error());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Transport: coretest-rpc                                │
//! │  (line framing, registry, parameter extraction)         │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Commands: coretest-commands                            │
//! │  (resources, inference, camera, audio, satellite)       │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌──────────────────────────┐  ┌──────────────────────────┐
//! │  coretest-resources      │  │  coretest-hal            │
//! │  (named upload buffers)  │  │  (scoped device sessions)│
//! └──────────────────────────┘  └──────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Cross-core: coretest-ipc                               │
//! │  (message channel, blocking command bridge)             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use coretest_config as config;
pub use coretest_resources as resources;
pub use coretest_rpc as rpc;

// Re-export board layer
pub use coretest_hal as hal;
pub use coretest_ipc as ipc;

// Re-export server layer
#[cfg(feature = "server")]
pub use coretest_commands as commands;

#[cfg(feature = "server")]
pub use coretest_observability as observability;

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::config::{load_config, validate_config, CoretestConfig};
    pub use crate::hal::{DeviceSession, HalError};
    pub use crate::ipc::loopback::LoopbackOptions;
    pub use crate::ipc::{BridgeError, CommandBridge};
    pub use crate::resources::{ResourceStore, StoreError};
    pub use crate::rpc::{
        codes, handle_line, serve_lines, Params, ProcedureRegistry, Response, RpcError,
    };

    #[cfg(feature = "server")]
    pub use crate::commands::{build_registry, CommandContext, SimulatedBoard};

    #[cfg(feature = "server")]
    pub use crate::observability::{init_logging, parse_debug_flags};
}
