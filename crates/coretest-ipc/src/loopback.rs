// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-process satellite core for host builds and tests
//!
//! [`LoopbackLink`] plays both sides of the link. Frames travel over `std::sync::mpsc` queues
//! as encoded [`MESSAGE_SIZE`] records. A receive thread stands in for the primary core's
//! interrupt handler and a satellite thread runs the firmware loop:
//!
//! ```text
//! send() ──frame──▶ satellite thread ──frame──▶ receive thread ──▶ app handler / pong slot
//! ```
//!
//! Until [`Satellite::start`] is called, frames sent to the satellite queue up unanswered.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::message::{AppMessage, ControlMessage, Message, MESSAGE_SIZE};
use crate::wake::WakeSlot;
use crate::workload::run_reference_workload;
use crate::{AppHandler, IpcError, MessageChannel, Result, Satellite};

/// Key the simulated satellite XORs numeric requests with
pub const SATELLITE_XOR_KEY: u32 = 0xFEED_FACE;

type Frame = [u8; MESSAGE_SIZE];

/// Behaviour of the simulated satellite
#[derive(Debug, Clone)]
pub struct LoopbackOptions {
    /// When false, `start` fails with `NoApplication`
    pub has_application: bool,
    pub xor_key: u32,
    /// Processing time added before every application reply
    pub reply_delay: Duration,
    /// When false, the running satellite never answers pings
    pub answers_ping: bool,
}

impl Default for LoopbackOptions {
    fn default() -> Self {
        Self {
            has_application: true,
            xor_key: SATELLITE_XOR_KEY,
            reply_delay: Duration::ZERO,
            answers_ping: true,
        }
    }
}

struct Inbound {
    handler: RwLock<Option<AppHandler>>,
    pong: WakeSlot<()>,
}

pub struct LoopbackLink {
    options: LoopbackOptions,
    to_satellite: Mutex<Sender<Frame>>,
    // Satellite ends of both queues, held until the satellite is started
    parked: Mutex<Option<(Receiver<Frame>, Sender<Frame>)>>,
    inbound: Arc<Inbound>,
}

impl LoopbackLink {
    /// Create the link and spawn its receive thread; the satellite is not started
    pub fn new(options: LoopbackOptions) -> Result<Self> {
        let (to_satellite, satellite_rx) = mpsc::channel::<Frame>();
        let (to_primary, primary_rx) = mpsc::channel::<Frame>();

        let inbound = Arc::new(Inbound {
            handler: RwLock::new(None),
            pong: WakeSlot::new(),
        });

        let receiver_state = Arc::clone(&inbound);
        thread::Builder::new()
            .name("coretest-ipc-rx".to_string())
            .spawn(move || receive_loop(primary_rx, receiver_state))
            .map_err(|e| IpcError::StartFailed(e.to_string()))?;

        Ok(Self {
            options,
            to_satellite: Mutex::new(to_satellite),
            parked: Mutex::new(Some((satellite_rx, to_primary))),
            inbound,
        })
    }

    /// Create a link whose satellite is already running
    pub fn started(options: LoopbackOptions) -> Result<Self> {
        let link = Self::new(options)?;
        link.start()?;
        Ok(link)
    }

    pub fn is_started(&self) -> bool {
        self.parked.lock().is_none()
    }
}

impl MessageChannel for LoopbackLink {
    fn send(&self, message: Message) -> Result<()> {
        self.to_satellite
            .lock()
            .send(message.encode())
            .map_err(|_| IpcError::Disconnected)
    }

    fn register_app_handler(&self, handler: AppHandler) {
        *self.inbound.handler.write() = Some(handler);
    }

    fn peer_alive(&self, within: Duration) -> bool {
        self.inbound.pong.clear();
        if self.send(Message::Control(ControlMessage::Ping)).is_err() {
            return false;
        }
        self.inbound.pong.wait(within).is_some()
    }
}

impl Satellite for LoopbackLink {
    fn has_application(&self) -> bool {
        self.options.has_application
    }

    fn start(&self) -> Result<()> {
        if !self.options.has_application {
            return Err(IpcError::NoApplication);
        }

        let mut parked = self.parked.lock();
        let Some((satellite_rx, to_primary)) = parked.take() else {
            debug!(target: "coretest-ipc", "Satellite already running");
            return Ok(());
        };

        let options = self.options.clone();
        thread::Builder::new()
            .name("coretest-satellite".to_string())
            .spawn(move || satellite_loop(satellite_rx, to_primary, options))
            .map_err(|e| IpcError::StartFailed(e.to_string()))?;

        info!(target: "coretest-ipc", "Satellite core started");
        Ok(())
    }
}

/// Primary-side receive path; must stay non-blocking apart from the queue read
fn receive_loop(frames: Receiver<Frame>, inbound: Arc<Inbound>) {
    for frame in frames {
        match Message::decode(&frame) {
            Ok(Message::Control(ControlMessage::Pong)) => inbound.pong.post(()),
            Ok(Message::Control(ControlMessage::Ping)) => {
                debug!(target: "coretest-ipc", "Ignoring ping from satellite")
            }
            Ok(Message::App { seq, body }) => match inbound.handler.read().as_ref() {
                Some(handler) => handler(seq, body),
                None => warn!(target: "coretest-ipc", "No handler for inbound {}", body.name()),
            },
            Err(e) => warn!(target: "coretest-ipc", "Dropping undecodable frame: {}", e),
        }
    }
}

fn satellite_loop(frames: Receiver<Frame>, to_primary: Sender<Frame>, options: LoopbackOptions) {
    for frame in frames {
        let reply = match Message::decode(&frame) {
            Ok(Message::Control(ControlMessage::Ping)) => options
                .answers_ping
                .then_some(Message::Control(ControlMessage::Pong)),
            Ok(Message::App {
                seq,
                body: AppMessage::XorRequest(value),
            }) => {
                thread::sleep(options.reply_delay);
                Some(Message::App {
                    seq,
                    body: AppMessage::XorReply(value ^ options.xor_key),
                })
            }
            Ok(Message::App {
                seq,
                body: AppMessage::BenchmarkRequest { iterations },
            }) => {
                thread::sleep(options.reply_delay);
                Some(Message::App {
                    seq,
                    body: AppMessage::BenchmarkReply(run_reference_workload(iterations)),
                })
            }
            Ok(other) => {
                debug!(target: "coretest-ipc", "Satellite ignoring {:?}", other);
                None
            }
            Err(e) => {
                warn!(target: "coretest-ipc", "Satellite dropping frame: {}", e);
                None
            }
        };

        if let Some(reply) = reply {
            if to_primary.send(reply.encode()).is_err() {
                break;
            }
        }
    }
}
