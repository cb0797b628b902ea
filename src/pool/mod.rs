//! Worker pool and task joining
//!
//! This module provides the execution collaborator trials submit to:
//! - WorkerPool: fixed set of reusable slots over one shared queue
//! - TaskHandle / join_all: joinable handles and the barrier over them
//! - Two-stage escalating shutdown (drain, force-cancel, report)

pub mod handle;
pub mod worker_pool;

pub use handle::{join_all, TaskHandle, TaskOutcome};
pub use worker_pool::WorkerPool;
