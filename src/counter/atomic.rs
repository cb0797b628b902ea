//! Atomic counter cell
//!
//! The correct implementation: the read-modify-write is a single
//! hardware atomic, so concurrent increments can never overlap in a
//! way that drops an update.

use std::sync::atomic::{AtomicU64, Ordering};

use super::Counter;

/// Atomically-updatable cell, initial value 0
pub struct AtomicCounter {
    value: AtomicU64,
}

impl AtomicCounter {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Counter for AtomicCounter {
    fn increment(&self) {
        // AcqRel pairs with the Acquire load in get(): an increment
        // that finished before the read is visible to the read.
        self.value.fetch_add(1, Ordering::AcqRel);
    }

    fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }
}
