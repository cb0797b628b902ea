//! Command-line argument parsing
//!
//! The reference configuration (10,000 trials, 4 workers, 10 second
//! shutdown stages) is the default; every tunable is exposed as a flag.

use clap::Parser;

use crate::counter::CounterKind;

/// Harness validating concurrent counter increments against lost updates
#[derive(Parser, Debug, Clone)]
#[command(name = "counter-race-harness")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    // ===== Trial Parameters =====
    /// Number of independent trials to run
    #[arg(short = 'n', long = "trials", default_value_t = 10_000)]
    pub trials: u64,

    /// Counter implementation under test
    #[arg(long = "counter", value_enum, default_value_t = CounterKind::Atomic)]
    pub counter: CounterKind,

    // ===== Pool Parameters =====
    /// Number of concurrent execution slots in the shared pool
    #[arg(long = "workers", default_value_t = 4)]
    pub workers: usize,

    /// Seconds to wait per shutdown stage before escalating
    #[arg(long = "shutdown-timeout", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,

    // ===== Output =====
    /// Suppress banner and progress output
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.trials == 0 {
            return Err("at least one trial is required".to_string());
        }
        if self.workers == 0 {
            return Err("at least one worker is required".to_string());
        }
        if self.shutdown_timeout_secs == 0 {
            return Err("shutdown timeout must be at least one second".to_string());
        }
        Ok(())
    }
}
