//! Error types for counter-race-harness

use std::io;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Worker-pool errors
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Pool is shutting down and rejecting new tasks")]
    ShuttingDown,

    #[error("Worker queue disconnected")]
    Disconnected,

    #[error("Worker thread '{0}' panicked")]
    WorkerPanicked(String),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
