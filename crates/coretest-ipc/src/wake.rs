// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Single-slot wake handle
//!
//! The producer side (`post`) only takes a short lock and notifies, so it is safe to call from
//! the receive path. A second post before the waiter wakes overwrites the first value.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

pub struct WakeSlot<T> {
    value: Mutex<Option<T>>,
    ready: Condvar,
}

impl<T> Default for WakeSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WakeSlot<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Store `value` and wake one waiter
    pub fn post(&self, value: T) {
        *self.value.lock() = Some(value);
        self.ready.notify_one();
    }

    /// Drop anything left over from an earlier exchange
    pub fn clear(&self) {
        self.value.lock().take();
    }

    /// Take the posted value, blocking for at most `timeout`
    pub fn wait(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.value.lock();
        loop {
            if let Some(value) = slot.take() {
                return Some(value);
            }
            if self.ready.wait_until(&mut slot, deadline).timed_out() {
                return slot.take();
            }
        }
    }
}
