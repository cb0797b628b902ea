//! Harness configuration derived from CLI arguments

use std::time::Duration;

use super::cli::CliArgs;
use crate::counter::CounterKind;

/// Complete harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    // Trials
    pub trials: u64,
    pub counter: CounterKind,

    // Pool
    pub workers: usize,
    pub shutdown_timeout_secs: u64,

    // Output
    pub quiet: bool,
    pub verbose: bool,
}

impl HarnessConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, String> {
        // Validate first
        args.validate()?;

        Ok(Self {
            trials: args.trials,
            counter: args.counter,
            workers: args.workers,
            shutdown_timeout_secs: args.shutdown_timeout_secs,
            quiet: args.quiet,
            verbose: args.verbose,
        })
    }

    /// Bounded wait applied to each shutdown stage
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
