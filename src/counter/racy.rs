//! Racy counter cell (negative control)
//!
//! Reproduces the lost-update defect: the read and the write are each
//! atomic, but the read-modify-write sequence is not. Two concurrent
//! increments can both read N and both write N+1, dropping one update.
//! Exists so the harness can prove it detects the bug it targets.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use super::Counter;

/// Unsynchronized read-modify-write cell, initial value 0
pub struct RacyCounter {
    value: AtomicU64,
}

impl RacyCounter {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }
}

impl Default for RacyCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Counter for RacyCounter {
    fn increment(&self) {
        let seen = self.value.load(Ordering::Relaxed);
        // Widen the window between read and write so a concurrent
        // increment reliably interleaves within a bounded trial count.
        thread::yield_now();
        self.value.store(seen + 1, Ordering::Relaxed);
    }

    fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_threaded_increment_is_correct() {
        // Without concurrency the defect cannot manifest.
        let counter = RacyCounter::new();

        counter.increment();
        counter.increment();

        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_starts_at_zero() {
        assert_eq!(RacyCounter::new().get(), 0);
    }
}
