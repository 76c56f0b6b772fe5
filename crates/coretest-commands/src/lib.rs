// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # coretest-commands
//!
//! The test command catalog. Each command is a plain function over [`CommandContext`]:
//! it pulls its parameters first, then touches the resource store, a scoped device session or
//! the cross-core bridge, and returns a JSON result.
//!
//! [`install`] binds every command into a [`coretest_rpc::ProcedureRegistry`].

pub mod audio;
pub mod camera;
pub mod catalog;
pub mod context;
pub mod error;
pub mod inference;
pub mod resources;
pub mod satellite;
pub mod stress;
pub mod system;

pub use catalog::{build_registry, command_names, install};
pub use context::{CommandContext, SimulatedBoard};
pub use error::{CommandError, CommandResult};

#[cfg(test)]
pub(crate) mod testing {
    use coretest_config::CoretestConfig;
    use coretest_ipc::loopback::LoopbackOptions;
    use coretest_rpc::Params;
    use serde_json::Value;

    use crate::context::{CommandContext, SimulatedBoard};

    pub fn config() -> CoretestConfig {
        let mut config = CoretestConfig::default();
        config.camera.power_settle_ms = 0;
        config
    }

    pub fn context_with(
        customise: impl FnOnce(&mut SimulatedBoard),
    ) -> (SimulatedBoard, CommandContext) {
        let mut board = SimulatedBoard::new(LoopbackOptions::default()).unwrap();
        customise(&mut board);
        let ctx = board.context(config());
        (board, ctx)
    }

    pub fn context() -> (SimulatedBoard, CommandContext) {
        context_with(|_| {})
    }

    pub fn params(value: &Value) -> Params<'_> {
        Params::new(value)
    }
}
