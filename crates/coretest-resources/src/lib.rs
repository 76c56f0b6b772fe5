// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # coretest-resources
//!
//! Named byte buffers that outlive a single command. Large assets (models, images) are uploaded
//! with `begin` followed by any number of offset-addressed base64 `chunk` writes, then referred
//! to by name from later commands.
//!
//! A buffer's size is fixed by `begin` and never changes; writes past the end are rejected.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown resource")]
    NotFound { name: String },

    #[error("failed to allocate {size} bytes for resource '{name}'")]
    AllocationFailed { name: String, size: usize },

    #[error("chunk of {len} bytes at offset {offset} overflows resource '{name}' ({size} bytes)")]
    Overflow {
        name: String,
        offset: usize,
        len: usize,
        size: usize,
    },

    #[error("invalid base64 data: {0}")]
    InvalidEncoding(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Default)]
pub struct ResourceStore {
    entries: HashMap<String, Box<[u8]>>,
    total_bytes: usize,
    /// 0 means unlimited
    max_total_bytes: usize,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that refuses `begin` calls pushing the total above `max_total_bytes`
    pub fn with_budget(max_total_bytes: usize) -> Self {
        Self {
            max_total_bytes,
            ..Self::default()
        }
    }

    /// Allocate `size` zero bytes under `name`
    ///
    /// An existing resource with the same name is released first, even if the new allocation
    /// then fails.
    pub fn begin(&mut self, name: &str, size: usize) -> StoreResult<()> {
        if let Some(previous) = self.entries.remove(name) {
            self.total_bytes -= previous.len();
            debug!(target: "coretest-resources", "Replacing resource '{}' ({} bytes)", name, previous.len());
        }

        let over_budget = self.max_total_bytes > 0
            && self
                .total_bytes
                .checked_add(size)
                .map_or(true, |total| total > self.max_total_bytes);
        if over_budget {
            return Err(StoreError::AllocationFailed {
                name: name.to_string(),
                size,
            });
        }

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(size)
            .map_err(|_| StoreError::AllocationFailed {
                name: name.to_string(),
                size,
            })?;
        buffer.resize(size, 0u8);

        self.entries.insert(name.to_string(), buffer.into_boxed_slice());
        self.total_bytes += size;
        info!(target: "coretest-resources", "Began resource '{}' ({} bytes)", name, size);
        Ok(())
    }

    /// Copy `bytes` into `name` at `offset`
    ///
    /// Nothing is written when the range does not fit.
    pub fn write(&mut self, name: &str, offset: usize, bytes: &[u8]) -> StoreResult<()> {
        let buffer = self
            .entries
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })?;

        let size = buffer.len();
        let end = offset
            .checked_add(bytes.len())
            .filter(|end| *end <= size)
            .ok_or_else(|| StoreError::Overflow {
                name: name.to_string(),
                offset,
                len: bytes.len(),
                size,
            })?;

        buffer[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Decode base64 `encoded` and write it at `offset`; returns the decoded length
    pub fn chunk(&mut self, name: &str, offset: usize, encoded: &str) -> StoreResult<usize> {
        if !self.entries.contains_key(name) {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        }
        let decoded = STANDARD
            .decode(encoded)
            .map_err(|e| StoreError::InvalidEncoding(e.to_string()))?;

        self.write(name, offset, &decoded)?;
        debug!(
            target: "coretest-resources",
            "Wrote {} bytes to '{}' at offset {}",
            decoded.len(),
            name,
            offset
        );
        Ok(decoded.len())
    }

    pub fn delete(&mut self, name: &str) -> StoreResult<()> {
        let removed = self.entries.remove(name).ok_or_else(|| StoreError::NotFound {
            name: name.to_string(),
        })?;
        self.total_bytes -= removed.len();
        info!(target: "coretest-resources", "Deleted resource '{}'", name);
        Ok(())
    }

    pub fn get(&self, name: &str) -> StoreResult<&[u8]> {
        self.entries
            .get(name)
            .map(|buffer| &buffer[..])
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Resource names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_begin_zero_fills() {
        let mut store = ResourceStore::new();
        store.begin("image", 16).unwrap();
        assert_eq!(store.get("image").unwrap(), &[0u8; 16]);
        assert_eq!(store.total_bytes(), 16);
    }

    #[test]
    fn test_chunk_writes_in_place() {
        let mut store = ResourceStore::new();
        store.begin("model", 8).unwrap();
        assert_eq!(store.chunk("model", 2, &b64(&[1, 2, 3])), Ok(3));
        assert_eq!(store.get("model").unwrap(), &[0, 0, 1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn test_chunk_exactly_at_end() {
        let mut store = ResourceStore::new();
        store.begin("model", 4).unwrap();
        assert!(store.chunk("model", 1, &b64(&[9, 9, 9])).is_ok());
        assert!(store.chunk("model", 4, &b64(&[])).is_ok());
    }

    #[test]
    fn test_overflow_writes_nothing() {
        let mut store = ResourceStore::new();
        store.begin("model", 4).unwrap();
        let err = store.chunk("model", 2, &b64(&[7, 7, 7])).unwrap_err();
        assert_eq!(
            err,
            StoreError::Overflow {
                name: "model".to_string(),
                offset: 2,
                len: 3,
                size: 4
            }
        );
        assert_eq!(store.get("model").unwrap(), &[0u8; 4]);
    }

    #[test]
    fn test_offset_near_usize_max() {
        let mut store = ResourceStore::new();
        store.begin("model", 4).unwrap();
        assert!(matches!(
            store.write("model", usize::MAX, &[1]),
            Err(StoreError::Overflow { .. })
        ));
    }

    #[test]
    fn test_unknown_names() {
        let mut store = ResourceStore::new();
        let missing = StoreError::NotFound {
            name: "ghost".to_string(),
        };
        assert_eq!(store.get("ghost").unwrap_err(), missing);
        assert_eq!(store.chunk("ghost", 0, "AAAA").unwrap_err(), missing);
        assert_eq!(store.delete("ghost").unwrap_err(), missing);
    }

    #[test]
    fn test_delete_then_get() {
        let mut store = ResourceStore::new();
        store.begin("image", 3).unwrap();
        store.delete("image").unwrap();
        assert!(matches!(store.get("image"), Err(StoreError::NotFound { .. })));
        assert!(store.is_empty());
        assert_eq!(store.total_bytes(), 0);
    }

    #[test]
    fn test_begin_replaces() {
        let mut store = ResourceStore::new();
        store.begin("image", 3).unwrap();
        store.chunk("image", 0, &b64(&[5, 5, 5])).unwrap();
        store.begin("image", 5).unwrap();
        assert_eq!(store.get("image").unwrap(), &[0u8; 5]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_bytes(), 5);
    }

    #[test]
    fn test_invalid_base64() {
        let mut store = ResourceStore::new();
        store.begin("image", 3).unwrap();
        assert!(matches!(
            store.chunk("image", 0, "not base64!"),
            Err(StoreError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_budget() {
        let mut store = ResourceStore::with_budget(10);
        store.begin("a", 6).unwrap();
        assert!(matches!(
            store.begin("b", 5),
            Err(StoreError::AllocationFailed { size: 5, .. })
        ));
        // Replacing "a" credits its bytes back first
        store.begin("a", 10).unwrap();
        assert_eq!(store.total_bytes(), 10);
        assert_eq!(store.names(), vec!["a"]);
    }

    #[test]
    fn test_huge_allocation_fails_cleanly() {
        let mut store = ResourceStore::new();
        assert!(matches!(
            store.begin("huge", usize::MAX),
            Err(StoreError::AllocationFailed { .. })
        ));
        assert!(!store.contains("huge"));
    }
}
