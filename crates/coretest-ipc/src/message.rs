// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-size inter-core messages
//!
//! Every message occupies exactly [`MESSAGE_SIZE`] bytes on the wire:
//!
//! | offset | size | field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 1    | kind (`0` control, `1` application)     |
//! | 1      | 1    | sub-tag                                 |
//! | 2      | 2    | sequence number (LE, application only)  |
//! | 4      | 20   | payload, zero padded                    |
//!
//! Integers are little-endian.

use std::fmt;

/// Size of one encoded message, fixed by the largest payload (benchmark report)
pub const MESSAGE_SIZE: usize = 24;

const KIND_CONTROL: u8 = 0;
const KIND_APP: u8 = 1;

const CONTROL_PING: u8 = 0;
const CONTROL_PONG: u8 = 1;

const APP_XOR_REQUEST: u8 = 1;
const APP_XOR_REPLY: u8 = 2;
const APP_BENCHMARK_REQUEST: u8 = 3;
const APP_BENCHMARK_REPLY: u8 = 4;

const PAYLOAD: usize = 4;

/// Channel bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    Ping,
    Pong,
}

/// Result of one benchmark run, carried back in-band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkReport {
    pub iterations: u32,
    pub elapsed_us: u64,
    pub checksum: u32,
    pub iterations_per_sec: f32,
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Iterations       : {}", self.iterations)?;
        writeln!(f, "Total time (us)  : {}", self.elapsed_us)?;
        writeln!(f, "Iterations/Sec   : {:.3}", self.iterations_per_sec)?;
        write!(f, "Checksum         : 0x{:08x}", self.checksum)
    }
}

/// Command-specific traffic between the cores
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMessage {
    XorRequest(u32),
    XorReply(u32),
    BenchmarkRequest { iterations: u32 },
    BenchmarkReply(BenchmarkReport),
    /// Sub-tag this build does not know; kept so receivers can log it
    Unknown(u8),
}

impl AppMessage {
    pub fn tag(&self) -> u8 {
        match self {
            AppMessage::XorRequest(_) => APP_XOR_REQUEST,
            AppMessage::XorReply(_) => APP_XOR_REPLY,
            AppMessage::BenchmarkRequest { .. } => APP_BENCHMARK_REQUEST,
            AppMessage::BenchmarkReply(_) => APP_BENCHMARK_REPLY,
            AppMessage::Unknown(tag) => *tag,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AppMessage::XorRequest(_) => "xor request",
            AppMessage::XorReply(_) => "xor reply",
            AppMessage::BenchmarkRequest { .. } => "benchmark request",
            AppMessage::BenchmarkReply(_) => "benchmark reply",
            AppMessage::Unknown(_) => "unknown",
        }
    }
}

/// One message exchanged over the channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Control(ControlMessage),
    App { seq: u16, body: AppMessage },
}

/// Reasons a received frame cannot be turned into a [`Message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown message kind {0}")]
    UnknownKind(u8),
    #[error("unknown control message {0}")]
    UnknownControl(u8),
}

impl Message {
    pub fn encode(&self) -> [u8; MESSAGE_SIZE] {
        let mut frame = [0u8; MESSAGE_SIZE];
        match self {
            Message::Control(control) => {
                frame[0] = KIND_CONTROL;
                frame[1] = match control {
                    ControlMessage::Ping => CONTROL_PING,
                    ControlMessage::Pong => CONTROL_PONG,
                };
            }
            Message::App { seq, body } => {
                frame[0] = KIND_APP;
                frame[1] = body.tag();
                frame[2..4].copy_from_slice(&seq.to_le_bytes());
                let payload = &mut frame[PAYLOAD..];
                match body {
                    AppMessage::XorRequest(value) | AppMessage::XorReply(value) => {
                        payload[0..4].copy_from_slice(&value.to_le_bytes());
                    }
                    AppMessage::BenchmarkRequest { iterations } => {
                        payload[0..4].copy_from_slice(&iterations.to_le_bytes());
                    }
                    AppMessage::BenchmarkReply(report) => {
                        payload[0..4].copy_from_slice(&report.iterations.to_le_bytes());
                        payload[4..12].copy_from_slice(&report.elapsed_us.to_le_bytes());
                        payload[12..16].copy_from_slice(&report.checksum.to_le_bytes());
                        payload[16..20]
                            .copy_from_slice(&report.iterations_per_sec.to_bits().to_le_bytes());
                    }
                    AppMessage::Unknown(_) => {}
                }
            }
        }
        frame
    }

    pub fn decode(frame: &[u8; MESSAGE_SIZE]) -> Result<Message, DecodeError> {
        match frame[0] {
            KIND_CONTROL => match frame[1] {
                CONTROL_PING => Ok(Message::Control(ControlMessage::Ping)),
                CONTROL_PONG => Ok(Message::Control(ControlMessage::Pong)),
                other => Err(DecodeError::UnknownControl(other)),
            },
            KIND_APP => {
                let seq = u16::from_le_bytes([frame[2], frame[3]]);
                let payload = &frame[PAYLOAD..];
                let body = match frame[1] {
                    APP_XOR_REQUEST => AppMessage::XorRequest(read_u32(payload, 0)),
                    APP_XOR_REPLY => AppMessage::XorReply(read_u32(payload, 0)),
                    APP_BENCHMARK_REQUEST => AppMessage::BenchmarkRequest {
                        iterations: read_u32(payload, 0),
                    },
                    APP_BENCHMARK_REPLY => AppMessage::BenchmarkReply(BenchmarkReport {
                        iterations: read_u32(payload, 0),
                        elapsed_us: read_u64(payload, 4),
                        checksum: read_u32(payload, 12),
                        iterations_per_sec: f32::from_bits(read_u32(payload, 16)),
                    }),
                    other => AppMessage::Unknown(other),
                };
                Ok(Message::App { seq, body })
            }
            other => Err(DecodeError::UnknownKind(other)),
        }
    }
}

fn read_u32(payload: &[u8], at: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&payload[at..at + 4]);
    u32::from_le_bytes(bytes)
}

fn read_u64(payload: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&payload[at..at + 8]);
    u64::from_le_bytes(bytes)
}
