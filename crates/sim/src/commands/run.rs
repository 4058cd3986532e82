//! Play games and record benchmark runs.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use maze_agent::StrategyKind;
use maze_sim::{JsonSink, SimConfig, Summary, open_sink, run_batch};

use super::{LayoutArg, load_layout};

/// Play games and record the results
///
/// Flags override `MAZE_*` environment variables.
#[derive(Parser, Debug)]
pub struct Run {
    #[command(flatten)]
    layout: LayoutArg,

    /// Strategy to play (e.g. reflex, smart_hunter, simple_bfs)
    #[arg(short, long)]
    strategy: Option<StrategyKind>,

    /// Play every registered strategy in turn
    #[arg(long, conflicts_with = "strategy")]
    all: bool,

    /// Games per strategy, with consecutive seeds
    #[arg(short, long, default_value_t = 1)]
    runs: usize,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    max_ticks: Option<u64>,

    /// Number of adversaries
    #[arg(long)]
    ghosts: Option<usize>,

    /// Directory for benchmark.json
    #[arg(long)]
    results_dir: Option<PathBuf>,
}

impl Run {
    pub fn execute(self) -> Result<()> {
        let (layout, name) = load_layout(self.layout.layout.as_deref())?;

        let mut config = SimConfig::from_env();
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(ticks) = self.max_ticks {
            config = config.with_max_ticks(ticks);
        }
        if let Some(ghosts) = self.ghosts {
            config = config.with_ghosts(ghosts);
        }
        if let Some(dir) = self.results_dir {
            config.results_dir = Some(dir);
        }

        let mut sink = open_sink(config.results_dir.as_deref());

        let strategies = if self.all {
            StrategyKind::ALL.to_vec()
        } else {
            vec![self.strategy.unwrap_or(config.strategy)]
        };

        println!(
            "{:<14} {:>5} {:>5} {:>6} {:>6} {:>10} {:>10}",
            "strategy", "runs", "wins", "losses", "win%", "avg moves", "avg score"
        );
        for strategy in strategies {
            let config = config.clone().with_strategy(strategy);
            let records = run_batch(&layout, &name, &config, self.runs, sink.as_mut());
            let summary = Summary::of(&records);
            println!(
                "{:<14} {:>5} {:>5} {:>6} {:>5.1}% {:>10.1} {:>10.1}",
                strategy.as_ref(),
                summary.runs,
                summary.wins,
                summary.losses,
                summary.win_rate * 100.0,
                summary.average_moves,
                summary.average_score,
            );
        }

        if let Some(dir) = &config.results_dir {
            println!("results: {}", dir.join(JsonSink::FILE_NAME).display());
        }
        Ok(())
    }
}
