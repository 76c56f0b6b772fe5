// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Schema version lookup in a TFLite flatbuffer
//!
//! The version is field 0 of the root table. Only the offsets needed to reach it are read, each
//! one bounds-checked; an absent field reads as 0, the flatbuffer default.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed model: {0}")]
pub struct ModelFormatError(&'static str);

fn read_u16(buf: &[u8], at: usize) -> Result<u16, ModelFormatError> {
    buf.get(at..at + 2)
        .and_then(|b| b.try_into().ok())
        .map(u16::from_le_bytes)
        .ok_or(ModelFormatError("offset past end of buffer"))
}

fn read_u32(buf: &[u8], at: usize) -> Result<u32, ModelFormatError> {
    buf.get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(ModelFormatError("offset past end of buffer"))
}

pub fn schema_version(model: &[u8]) -> Result<u32, ModelFormatError> {
    let table = read_u32(model, 0)? as usize;
    let soffset = read_u32(model, table)? as i32;
    let vtable = i64::try_from(table)
        .ok()
        .map(|t| t - i64::from(soffset))
        .and_then(|v| usize::try_from(v).ok())
        .ok_or(ModelFormatError("vtable outside buffer"))?;

    let vtable_len = read_u16(model, vtable)? as usize;
    // vtable header is two u16s; field 0 follows when present
    if vtable_len < 6 {
        return Ok(0);
    }
    let field = read_u16(model, vtable + 4)? as usize;
    if field == 0 {
        return Ok(0);
    }
    read_u32(model, table + field)
}
