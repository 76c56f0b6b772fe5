// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # coretest-observability
//!
//! Logging setup shared by the rack test binaries, with per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: rolling log files under a timestamped run folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Crate names accepted by `--debug-<crate>` and `CORETEST_DEBUG`
///
/// Each crate logs under an explicit target equal to its name.
pub const KNOWN_CRATES: &[&str] = &[
    "coretest-config",
    "coretest-ipc",
    "coretest-rpc",
    "coretest-resources",
    "coretest-hal",
    "coretest-commands",
    "coretest",
];
