//! Simulation configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use maze_agent::{StrategyConfig, StrategyKind};
use maze_core::MotionConfig;

/// Parameters of one simulated game.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub seed: u64,
    /// Runs end as incomplete after this many ticks.
    pub max_ticks: u64,
    /// Adversaries spawned, capped by the spawn points in the layout.
    pub ghosts: usize,
    pub strategy: StrategyKind,
    /// Where benchmark records are written; `None` disables the JSON sink.
    pub results_dir: Option<PathBuf>,
    pub agent: StrategyConfig,
    pub adversary_motion: MotionConfig,
    /// Expansion cap of an adversary's pursuit search.
    pub chase_cap: usize,
    /// Steps planned per pursuit search.
    pub chase_lookahead: usize,
}

impl SimConfig {
    pub const DEFAULT_SEED: u64 = 7;
    pub const DEFAULT_MAX_TICKS: u64 = 20_000;
    pub const DEFAULT_GHOSTS: usize = 4;
    pub const DEFAULT_CHASE_CAP: usize = 200;
    pub const DEFAULT_CHASE_LOOKAHEAD: usize = 16;

    pub fn new() -> Self {
        Self {
            seed: Self::DEFAULT_SEED,
            max_ticks: Self::DEFAULT_MAX_TICKS,
            ghosts: Self::DEFAULT_GHOSTS,
            strategy: StrategyKind::default(),
            results_dir: None,
            agent: StrategyConfig::new(),
            adversary_motion: MotionConfig::adversary(),
            chase_cap: Self::DEFAULT_CHASE_CAP,
            chase_lookahead: Self::DEFAULT_CHASE_LOOKAHEAD,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `MAZE_SEED` - RNG seed for agents and adversaries (default: 7)
    /// - `MAZE_MAX_TICKS` - Tick limit per run (default: 20000)
    /// - `MAZE_GHOSTS` - Number of adversaries (default: 4)
    /// - `MAZE_STRATEGY` - Strategy name, e.g. `smart_hunter` (default: reflex)
    /// - `MAZE_RESULTS_DIR` - Directory for benchmark JSON (default: none)
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Some(seed) = read_env::<u64>("MAZE_SEED") {
            config.seed = seed;
        }
        if let Some(ticks) = read_env::<u64>("MAZE_MAX_TICKS") {
            config.max_ticks = ticks.max(1);
        }
        if let Some(ghosts) = read_env::<usize>("MAZE_GHOSTS") {
            config.ghosts = ghosts;
        }
        if let Some(strategy) = read_env::<StrategyKind>("MAZE_STRATEGY") {
            config.strategy = strategy;
        }
        config.results_dir = env::var("MAZE_RESULTS_DIR").ok().map(PathBuf::from);

        config
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_ghosts(mut self, ghosts: usize) -> Self {
        self.ghosts = ghosts;
        self
    }

    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks.max(1);
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
