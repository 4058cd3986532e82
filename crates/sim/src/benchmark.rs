//! Benchmark runs, algorithm comparison and summaries.

use std::fs;
use std::path::Path;
use std::time::Duration;

use maze_agent::{Algorithm, SearchStats, StrategyKind, compare};
use maze_core::{Cell, GridIndex, Layout};

use crate::config::SimConfig;
use crate::telemetry::{TelemetryError, TelemetrySink, emit};
use crate::world::{Outcome, RunStats, World};

/// Totals for one algorithm over many start/goal pairs.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AlgorithmTotals {
    pub algorithm: Algorithm,
    pub searches: usize,
    /// Searches that returned a route.
    pub found: usize,
    pub total_length: usize,
    pub total_expanded: usize,
    pub elapsed: Duration,
}

impl AlgorithmTotals {
    fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            searches: 0,
            found: 0,
            total_length: 0,
            total_expanded: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn mean_expanded(&self) -> f64 {
        if self.searches == 0 {
            0.0
        } else {
            self.total_expanded as f64 / self.searches as f64
        }
    }
}

/// Runs every algorithm from `start` to each live collectible.
pub fn compare_live<G: GridIndex + ?Sized>(grid: &G, start: Cell) -> Vec<AlgorithmTotals> {
    let mut totals: Vec<AlgorithmTotals> =
        Algorithm::ALL.into_iter().map(AlgorithmTotals::new).collect();
    let goals = grid.pellets().iter().chain(grid.power_pellets()).copied();

    for goal in goals.filter(|goal| *goal != start) {
        for (total, report) in totals.iter_mut().zip(compare(grid, start, goal)) {
            total.searches += 1;
            if report.path_length > 0 {
                total.found += 1;
            }
            total.total_length += report.path_length;
            total.total_expanded += report.expanded;
            total.elapsed += report.elapsed;
        }
    }
    totals
}

/// Everything recorded about one finished run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunRecord {
    pub strategy: StrategyKind,
    pub layout: String,
    pub seed: u64,
    pub result: Outcome,
    pub score: u32,
    #[serde(flatten)]
    pub stats: RunStats,
    /// Decision-time search effort of the first agent.
    pub search: SearchStats,
    /// Uniform-cost comparison from the first spawn at the start of the run.
    pub algorithms: Vec<AlgorithmTotals>,
}

/// Aggregate over a set of runs.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Summary {
    pub runs: usize,
    pub wins: usize,
    pub losses: usize,
    pub incomplete: usize,
    pub win_rate: f64,
    pub average_moves: f64,
    pub average_score: f64,
}

impl Summary {
    pub fn of<'r>(records: impl IntoIterator<Item = &'r RunRecord>) -> Self {
        let mut summary = Self::default();
        let mut moves = 0_u64;
        let mut score = 0_u64;
        for record in records {
            summary.runs += 1;
            match record.result {
                Outcome::Win => summary.wins += 1,
                Outcome::Loss => summary.losses += 1,
                Outcome::Incomplete => summary.incomplete += 1,
            }
            moves += record.stats.moves;
            score += u64::from(record.score);
        }
        if summary.runs > 0 {
            let runs = summary.runs as f64;
            summary.win_rate = summary.wins as f64 / runs;
            summary.average_moves = moves as f64 / runs;
            summary.average_score = score as f64 / runs;
        }
        summary
    }
}

/// Persisted list of run records.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkLog {
    pub records: Vec<RunRecord>,
}

impl BenchmarkLog {
    pub fn push(&mut self, record: RunRecord) {
        self.records.push(record);
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.records)
    }

    /// Summary restricted to one strategy.
    pub fn summary_for(&self, strategy: StrategyKind) -> Summary {
        Summary::of(self.records.iter().filter(|r| r.strategy == strategy))
    }

    /// Writes pretty JSON through a temp file and an atomic rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TelemetryError> {
        let path = path.as_ref();
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&temp, path)?;
        tracing::debug!(path = %path.display(), records = self.records.len(), "benchmark saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TelemetryError> {
        let bytes = fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Plays `runs` games with consecutive seeds and reports each to `sink`.
pub fn run_batch(
    layout: &Layout,
    layout_name: &str,
    config: &SimConfig,
    runs: usize,
    sink: &mut dyn TelemetrySink,
) -> Vec<RunRecord> {
    (0..runs)
        .map(|i| {
            let config = config.clone().with_seed(config.seed.wrapping_add(i as u64));
            let record = run_once(layout.clone(), layout_name, &config);
            emit(sink, &record);
            record
        })
        .collect()
}

/// Plays one game to completion or the tick limit.
pub fn run_once(layout: Layout, layout_name: &str, config: &SimConfig) -> RunRecord {
    let algorithms = layout
        .agent_spawns
        .first()
        .map(|spawn| compare_live(&layout.grid, *spawn))
        .unwrap_or_default();

    let mut world = World::new(layout, config);
    let result = world.run(config.max_ticks);
    let search = world
        .players()
        .first()
        .map(|p| *p.engine.stats())
        .unwrap_or_default();

    tracing::info!(
        strategy = %config.strategy,
        seed = config.seed,
        %result,
        score = world.score(),
        ticks = world.tick(),
        "run complete"
    );
    RunRecord {
        strategy: config.strategy,
        layout: layout_name.to_string(),
        seed: config.seed,
        result,
        score: world.score(),
        stats: *world.stats(),
        search,
        algorithms,
    }
}
