//! Command-line driver for maze-chase simulations.
//!
//! Run with: `cargo run -p maze-sim -- <command>`

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use commands::{Compare, Run, Strategies};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Maze-chase agent simulator
#[derive(Parser)]
#[command(name = "maze-sim")]
#[command(about = "Simulate and benchmark maze-chase agents", long_about = None)]
#[command(version)]
struct Cli {
    /// Also write logs to `<dir>/maze-sim.log`
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Play games and record the results
    Run(Run),

    /// Compare search algorithms on a layout
    Compare(Compare),

    /// List the registered strategies
    Strategies(Strategies),
}

fn main() -> Result<()> {
    // Load .env file if it exists (MAZE_SEED, MAZE_RESULTS_DIR, ...)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_dir.as_deref())?;

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
        Command::Compare(cmd) => cmd.execute(),
        Command::Strategies(cmd) => cmd.execute(),
    }
}

/// Logs to stderr, and to a file when `log_dir` is given.
fn setup_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let Some(dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)?;
    let file_appender = tracing_appender::rolling::never(dir, "maze-sim.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::info!("Log file: {}/maze-sim.log", dir.display());
    Ok(Some(guard))
}
