// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Blocking command bridge
//!
//! Turns the callback-driven [`MessageChannel`] into `call(request, timeout) -> reply`.
//! Only one call is outstanding at a time. Each request carries a fresh sequence number and
//! replies with any other sequence are dropped, so a reply that shows up after its caller
//! timed out cannot satisfy a later call.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::message::{AppMessage, BenchmarkReport, Message};
use crate::wake::WakeSlot;
use crate::{IpcError, MessageChannel};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    #[error("peer did not answer the liveness probe")]
    PeerUnresponsive,
    #[error("timed out after {timeout_ms} ms waiting for response from peer")]
    TimedOut { timeout_ms: u64 },
    #[error("unexpected reply: {0}")]
    UnexpectedReply(&'static str),
    #[error(transparent)]
    Channel(#[from] IpcError),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

pub struct CommandBridge {
    channel: Arc<dyn MessageChannel>,
    replies: Arc<WakeSlot<(u16, AppMessage)>>,
    call_lock: Mutex<()>,
    next_seq: AtomicU16,
    liveness_probe: Duration,
}

impl CommandBridge {
    /// Attach to `channel` and install the reply handler
    ///
    /// `liveness_probe` bounds the ping that precedes every call.
    pub fn new(channel: Arc<dyn MessageChannel>, liveness_probe: Duration) -> Self {
        let replies: Arc<WakeSlot<(u16, AppMessage)>> = Arc::new(WakeSlot::new());
        let slot = Arc::clone(&replies);
        channel.register_app_handler(Box::new(move |seq, body| match body {
            AppMessage::XorReply(_) | AppMessage::BenchmarkReply(_) => slot.post((seq, body)),
            AppMessage::Unknown(tag) => {
                warn!(target: "coretest-ipc", "Dropping message with unknown sub-tag {}", tag)
            }
            other => {
                warn!(target: "coretest-ipc", "Dropping unexpected inbound {}", other.name())
            }
        }));

        Self {
            channel,
            replies,
            call_lock: Mutex::new(()),
            next_seq: AtomicU16::new(1),
            liveness_probe,
        }
    }

    pub fn liveness_probe(&self) -> Duration {
        self.liveness_probe
    }

    pub fn peer_alive(&self, within: Duration) -> bool {
        self.channel.peer_alive(within)
    }

    /// Send `request` and block until the matching reply or `timeout`
    ///
    /// # Errors
    ///
    /// `PeerUnresponsive` when the probe fails (the request is never sent), `TimedOut` when no
    /// matching reply arrives in time.
    pub fn call(&self, request: AppMessage, timeout: Duration) -> BridgeResult<AppMessage> {
        let _exclusive = self.call_lock.lock();

        if !self.channel.peer_alive(self.liveness_probe) {
            warn!(target: "coretest-ipc", "Peer unresponsive, not sending {}", request.name());
            return Err(BridgeError::PeerUnresponsive);
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.replies.clear();
        self.channel.send(Message::App { seq, body: request })?;
        debug!(target: "coretest-ipc", "Sent {} seq={}", request.name(), seq);

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.replies.wait(remaining) {
                Some((reply_seq, body)) if reply_seq == seq => {
                    debug!(target: "coretest-ipc", "Received {} seq={}", body.name(), seq);
                    return Ok(body);
                }
                Some((reply_seq, body)) => {
                    debug!(
                        target: "coretest-ipc",
                        "Discarding stale {} seq={} (waiting for {})",
                        body.name(),
                        reply_seq,
                        seq
                    );
                }
                None => {
                    warn!(target: "coretest-ipc", "Timed out waiting for seq={}", seq);
                    return Err(BridgeError::TimedOut {
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
            }
        }
    }

    /// XOR `value` with the satellite's key
    pub fn xor(&self, value: u32, timeout: Duration) -> BridgeResult<u32> {
        match self.call(AppMessage::XorRequest(value), timeout)? {
            AppMessage::XorReply(result) => Ok(result),
            other => Err(BridgeError::UnexpectedReply(other.name())),
        }
    }

    /// Run the reference benchmark on the satellite
    pub fn benchmark(&self, iterations: u32, timeout: Duration) -> BridgeResult<BenchmarkReport> {
        match self.call(AppMessage::BenchmarkRequest { iterations }, timeout)? {
            AppMessage::BenchmarkReply(report) => Ok(report),
            other => Err(BridgeError::UnexpectedReply(other.name())),
        }
    }
}
