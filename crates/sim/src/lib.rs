//! Headless maze-chase simulation.
//!
//! Drives [`maze_agent::StrategyEngine`]s against adversaries on a
//! [`maze_core::Grid`], resolves collisions and scoring, and records
//! benchmark runs through a [`telemetry::TelemetrySink`].
pub mod benchmark;
pub mod config;
pub mod ghost;
pub mod telemetry;
pub mod world;

pub use benchmark::{
    AlgorithmTotals, BenchmarkLog, RunRecord, Summary, compare_live, run_batch, run_once,
};
pub use config::SimConfig;
pub use ghost::{Ghost, GhostController, GhostMode};
pub use telemetry::{JsonSink, MemorySink, TelemetryError, TelemetrySink, emit, open_sink};
pub use world::{Outcome, Player, RunStats, SimCommand, World};
