//! Search-algorithm comparison.

use anyhow::{Result, bail};
use clap::Parser;
use maze_core::Cell;
use maze_sim::compare_live;

use super::{LayoutArg, load_layout};

/// Run every search algorithm from one cell to each live collectible
#[derive(Parser, Debug)]
pub struct Compare {
    #[command(flatten)]
    layout: LayoutArg,

    /// Start column (default: first agent spawn)
    #[arg(long, requires = "y")]
    x: Option<i32>,

    /// Start row (default: first agent spawn)
    #[arg(long, requires = "x")]
    y: Option<i32>,
}

impl Compare {
    pub fn execute(self) -> Result<()> {
        let (layout, name) = load_layout(self.layout.layout.as_deref())?;
        let start = match (self.x, self.y) {
            (Some(x), Some(y)) => Cell::new(x, y),
            _ => match layout.agent_spawns.first() {
                Some(spawn) => *spawn,
                None => bail!("layout {name} has no agent spawn; pass --x and --y"),
            },
        };

        let totals = compare_live(&layout.grid, start);
        println!("layout {name}, start {start}");
        println!(
            "{:<6} {:>8} {:>6} {:>10} {:>12} {:>10}",
            "alg", "searches", "found", "length", "mean nodes", "time"
        );
        for total in &totals {
            println!(
                "{:<6} {:>8} {:>6} {:>10} {:>12.1} {:>10.2?}",
                total.algorithm.as_ref(),
                total.searches,
                total.found,
                total.total_length,
                total.mean_expanded(),
                total.elapsed,
            );
        }
        Ok(())
    }
}
