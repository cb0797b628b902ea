//! Shared counter cells under test
//!
//! A trial races two concurrent increments against one cell and reads
//! it back after joining both tasks. The atomic cell is the correct
//! implementation; the racy cell reproduces the lost-update defect the
//! harness exists to surface.

pub mod atomic;
pub mod racy;

use std::fmt;
use std::sync::Arc;

use clap::ValueEnum;

pub use atomic::AtomicCounter;
pub use racy::RacyCounter;

/// Contract for the cell each trial mutates.
///
/// Implementations start at zero. The net effect of K concurrent
/// `increment` calls must be +K for a correct implementation, under any
/// interleaving.
pub trait Counter: Send + Sync {
    /// Add one to the cell.
    fn increment(&self);

    /// Read the cell. Reflects every increment that completed
    /// (happens-before) prior to the call.
    fn get(&self) -> u64;
}

/// Counter implementation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CounterKind {
    /// Hardware-atomic read-modify-write
    Atomic,
    /// Unsynchronized read-modify-write (negative control)
    Racy,
}

impl CounterKind {
    /// Allocate a fresh cell at zero. Each trial gets its own.
    pub fn build(&self) -> Arc<dyn Counter> {
        match self {
            CounterKind::Atomic => Arc::new(AtomicCounter::new()),
            CounterKind::Racy => Arc::new(RacyCounter::new()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKind::Atomic => "atomic",
            CounterKind::Racy => "racy",
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
