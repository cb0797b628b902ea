//! Trial orchestration
//!
//! A trial is an ephemeral unit of work: one fresh counter, two
//! increment tasks on the shared pool, one join, one check. This module
//! provides the runner for single trials, the sequential trial loop,
//! and the aggregate report.

pub mod report;
pub mod runner;

pub use report::{format_count, TrialReport};
pub use runner::{run_trial, run_trials, TrialOutcome};
