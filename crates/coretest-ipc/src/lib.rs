// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # coretest-ipc
//!
//! Messaging between the primary core and the satellite core.
//!
//! - [`MessageChannel`]: fire-and-forget fixed-size messages, replies delivered to a callback
//! - [`CommandBridge`]: blocking request/reply with timeout on top of a channel
//! - [`loopback`]: in-process satellite used on hosts and in tests

use std::time::Duration;

pub mod bridge;
pub mod loopback;
pub mod message;
pub mod wake;
pub mod workload;

pub use bridge::{BridgeError, CommandBridge};
pub use message::{AppMessage, BenchmarkReport, ControlMessage, DecodeError, Message, MESSAGE_SIZE};
pub use wake::WakeSlot;

/// Channel-level failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IpcError {
    #[error("channel disconnected")]
    Disconnected,
    #[error("no satellite application present")]
    NoApplication,
    #[error("satellite failed to start: {0}")]
    StartFailed(String),
}

pub type Result<T> = std::result::Result<T, IpcError>;

/// Callback invoked for every inbound application message
///
/// Runs on the receive path. Implementations must not block: stash the value and signal.
pub type AppHandler = Box<dyn Fn(u16, AppMessage) + Send + Sync>;

/// Transport between the two cores
pub trait MessageChannel: Send + Sync {
    /// Queue one message for the peer
    fn send(&self, message: Message) -> Result<()>;

    /// Install the inbound application handler, replacing any previous one
    fn register_app_handler(&self, handler: AppHandler);

    /// Ping the peer and wait up to `within` for the pong
    fn peer_alive(&self, within: Duration) -> bool;
}

/// Lifecycle control of the satellite core
pub trait Satellite: Send + Sync {
    /// An application image is installed
    fn has_application(&self) -> bool;

    /// Boot the application; starting a running satellite is a no-op
    fn start(&self) -> Result<()>;
}
