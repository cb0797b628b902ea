//! counter-race-harness - lost-update detection harness
//!
//! Runs many independent trials, each pairing two concurrent increments
//! against one shared counter on a fixed-size worker pool, and reports
//! any trial where an update was lost.

use anyhow::Result;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use counter_race_harness::config::{CliArgs, HarnessConfig};
use counter_race_harness::pool::WorkerPool;
use counter_race_harness::trial::{format_count, run_trials};

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn print_banner(config: &HarnessConfig) {
    if config.quiet {
        return;
    }

    println!("counter-race-harness v{}", env!("CARGO_PKG_VERSION"));
    println!("====================================");
    println!(
        "Workers: {}, Trials: {}",
        config.workers,
        format_count(config.trials)
    );
    println!("Counter: {}", config.counter);
    println!(
        "Shutdown timeout: {}s per stage",
        config.shutdown_timeout_secs
    );
    println!("====================================\n");
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse_args();

    // Setup logging
    setup_logging(args.verbose, args.quiet);

    // Build configuration
    let config = HarnessConfig::from_cli(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    // Print banner
    print_banner(&config);

    // The pool is the only resource shared across trials; it is owned
    // here and passed into the trial loop.
    let pool = WorkerPool::new(config.workers)?;

    let report = run_trials(&pool, &config)?;

    // Best-effort teardown with escalating timeouts; a panicked worker
    // is the only fatal outcome.
    pool.shutdown(config.shutdown_timeout())?;

    report.print_summary();

    if report.is_clean() {
        info!("No lost updates observed");
    } else {
        info!(
            "{} of {} checked trials observed a lost update",
            report.violations,
            report.checked()
        );
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
