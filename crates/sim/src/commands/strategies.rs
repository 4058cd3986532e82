//! List registered strategies.

use anyhow::Result;
use clap::Parser;
use maze_agent::StrategyKind;

/// List the registered strategies and their routing profiles
#[derive(Parser, Debug)]
pub struct Strategies {}

impl Strategies {
    pub fn execute(self) -> Result<()> {
        println!(
            "{:<14} {:<10} {:>7} {:>6} {:>9} {:>9}",
            "strategy", "algorithm", "danger", "avoid", "discount", "weighted"
        );
        for kind in StrategyKind::ALL {
            let profile = kind.profile();
            println!(
                "{:<14} {:<10} {:>7} {:>6} {:>9} {:>9}",
                kind.as_ref(),
                profile.algorithm.as_ref(),
                profile.danger_radius,
                profile.avoid,
                profile.pellet_discount,
                profile.weighted_targets,
            );
        }
        Ok(())
    }
}
