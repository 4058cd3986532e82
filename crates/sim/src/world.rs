//! Tick-driven game world.
//!
//! One [`World::step`] runs, in order:
//!
//! ```text
//! 1. frighten or calm adversaries from the agents' power timers
//! 2. snapshot adversary sightings (shared by every agent this tick)
//! 3. per agent: decision tick, then motion
//! 4. adversary motion
//! 5. collisions: eat or be eaten
//! 6. win / loss check
//! ```
//!
//! Everything is seeded, so identical configs replay identically.

use maze_agent::{AdversarySighting, StrategyEngine, StrategyKind};
use maze_core::{
    AgentState, Cell, CollectibleKind, Grid, GridIndex, Layout, MotionController, MotionOutcome,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::SimConfig;
use crate::ghost::{Ghost, GhostController, GhostMode};

/// How a run ended.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every collectible was eaten.
    Win,
    /// Every agent ran out of lives.
    Loss,
    /// Tick limit reached first.
    Incomplete,
}

/// Debug commands accepted from the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimCommand {
    SetStrategy { player: usize, kind: StrategyKind },
    CycleStrategy { player: usize },
    ResetAgent { player: usize },
}

/// Counters accumulated over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RunStats {
    pub ticks: u64,
    pub moves: u64,
    pub pellets: u32,
    pub power_pellets: u32,
    pub ghosts_eaten: u32,
    pub deaths: u32,
}

/// An agent and the engine that drives it.
pub struct Player {
    pub agent: AgentState,
    pub engine: StrategyEngine,
}

pub struct World {
    grid: Grid,
    players: Vec<Player>,
    ghosts: Vec<Ghost>,
    motion: MotionController,
    ghost_motion: GhostController,
    rng: StdRng,
    invincibility: u32,
    tick: u64,
    stats: RunStats,
    outcome: Option<Outcome>,
}

impl World {
    /// Places one agent per spawn point and up to `config.ghosts` adversaries.
    pub fn new(layout: Layout, config: &SimConfig) -> Self {
        let motion = config.agent.motion;
        let players = layout
            .agent_spawns
            .iter()
            .enumerate()
            .map(|(i, spawn)| Player {
                agent: AgentState::new(*spawn, motion.lives),
                engine: StrategyEngine::new(
                    config.strategy,
                    config.agent,
                    config.seed.wrapping_add(i as u64),
                ),
            })
            .collect();
        let ghosts = layout
            .adversary_spawns
            .iter()
            .take(config.ghosts)
            .enumerate()
            .map(|(i, home)| Ghost::new(i, *home))
            .collect();

        Self {
            grid: layout.grid,
            players,
            ghosts,
            motion: MotionController::new(motion),
            ghost_motion: GhostController::new(
                config.adversary_motion,
                config.chase_lookahead,
                config.chase_cap,
            ),
            rng: StdRng::seed_from_u64(config.seed),
            invincibility: motion.invincibility_duration,
            tick: 0,
            stats: RunStats::default(),
            outcome: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Adversaries as agents see them this tick.
    pub fn sightings(&self) -> Vec<AdversarySighting> {
        self.ghosts.iter().map(Ghost::sighting).collect()
    }

    pub fn apply(&mut self, command: SimCommand) {
        match command {
            SimCommand::SetStrategy { player, kind } => {
                if let Some(p) = self.players.get_mut(player) {
                    p.engine.set_strategy(kind);
                }
            }
            SimCommand::CycleStrategy { player } => {
                if let Some(p) = self.players.get_mut(player) {
                    p.engine.cycle_strategy();
                }
            }
            SimCommand::ResetAgent { player } => {
                if let Some(p) = self.players.get_mut(player) {
                    p.agent.reset();
                }
            }
        }
    }

    /// Steps until the run ends or `max_ticks` have elapsed in total.
    pub fn run(&mut self, max_ticks: u64) -> Outcome {
        while self.tick < max_ticks {
            if let Some(outcome) = self.step() {
                return outcome;
            }
        }
        self.outcome = Some(Outcome::Incomplete);
        Outcome::Incomplete
    }

    /// Advances the world by one tick. Returns the outcome once decided.
    pub fn step(&mut self) -> Option<Outcome> {
        if self.outcome.is_some() {
            return self.outcome;
        }
        self.tick += 1;
        self.stats.ticks = self.tick;

        let frightened = self
            .players
            .iter()
            .any(|p| p.agent.is_alive() && p.agent.is_empowered());
        for ghost in &mut self.ghosts {
            ghost.mode = if frightened {
                GhostMode::Frightened
            } else {
                GhostMode::Chase
            };
        }

        let sightings = self.sightings();
        let before: Vec<Cell> = self.players.iter().map(|p| p.agent.position).collect();
        for player in self.players.iter_mut().filter(|p| p.agent.is_alive()) {
            player.engine.tick(&self.grid, &mut player.agent, &sightings);
            match self.motion.advance(&mut self.grid, &mut player.agent) {
                MotionOutcome::Arrived { collected, .. } => {
                    self.stats.moves += 1;
                    match collected {
                        Some(CollectibleKind::Pellet) => self.stats.pellets += 1,
                        Some(CollectibleKind::PowerPellet) => self.stats.power_pellets += 1,
                        None => {}
                    }
                }
                MotionOutcome::NoLegalMove => {
                    tracing::warn!(at = %player.agent.position, "agent has no legal move");
                }
                _ => {}
            }
        }

        let prey: Vec<Cell> = self
            .players
            .iter()
            .filter(|p| p.agent.is_alive() && !p.agent.is_invincible())
            .map(|p| p.agent.position)
            .collect();
        let ghosts_before: Vec<Cell> = self.ghosts.iter().map(|g| g.position).collect();
        for ghost in &mut self.ghosts {
            self.ghost_motion
                .advance(&self.grid, ghost, &prey, &mut self.rng);
        }

        self.resolve_collisions(&before, &ghosts_before);

        self.outcome = if self.grid.is_cleared() {
            Some(Outcome::Win)
        } else if self.players.iter().all(|p| !p.agent.is_alive()) {
            Some(Outcome::Loss)
        } else {
            None
        };
        if let Some(outcome) = self.outcome {
            tracing::debug!(tick = self.tick, %outcome, score = self.score(), "run finished");
        }
        self.outcome
    }

    /// Total score over all agents.
    pub fn score(&self) -> u32 {
        self.players.iter().map(|p| p.agent.score).sum()
    }

    /// Contact is sharing a cell, or swapping cells within the tick.
    fn resolve_collisions(&mut self, players_before: &[Cell], ghosts_before: &[Cell]) {
        let points = self.grid.scores().adversary;
        for (player, was) in self.players.iter_mut().zip(players_before) {
            if !player.agent.is_alive() {
                continue;
            }
            for (ghost, ghost_was) in self.ghosts.iter_mut().zip(ghosts_before) {
                let agent = &mut player.agent;
                let contact = ghost.position == agent.position
                    || (ghost.position == *was && *ghost_was == agent.position);
                if !contact {
                    continue;
                }

                if agent.is_empowered() {
                    agent.score += points;
                    self.stats.ghosts_eaten += 1;
                    tracing::debug!(ghost = ghost.id, at = %agent.position, "ghost eaten");
                    ghost.respawn();
                } else if !agent.is_invincible() {
                    self.stats.deaths += 1;
                    let alive = agent.lose_life(self.invincibility);
                    tracing::debug!(at = %agent.position, lives = agent.lives, "agent caught");
                    if alive {
                        agent.reset();
                        agent.invincibility_timer = self.invincibility;
                    }
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_core::Direction;

    fn world(rows: &[&str]) -> World {
        let layout = Layout::from_rows(rows).unwrap();
        World::new(layout, &SimConfig::new())
    }

    #[test]
    fn ghost_contact_costs_a_life_and_grants_invincibility() {
        let mut world = world(&["#######", "#P  G.#", "#######"]);
        world.ghosts[0].position = Cell::new(1, 1);

        world.resolve_collisions(&[Cell::new(1, 1)], &[Cell::new(2, 1)]);
        let agent = &world.players[0].agent;
        assert_eq!(agent.lives, 2);
        assert!(agent.is_invincible());
        assert_eq!(agent.position, agent.spawn);
        assert_eq!(world.stats.deaths, 1);

        // Invincible agents are not hit again.
        world.resolve_collisions(&[Cell::new(1, 1)], &[Cell::new(2, 1)]);
        assert_eq!(world.players[0].agent.lives, 2);
    }

    #[test]
    fn empowered_agent_eats_ghost_and_sends_it_home() {
        let mut world = world(&["#######", "#P  G.#", "#######"]);
        world.players[0].agent.power_timer = 100;
        world.ghosts[0].position = Cell::new(2, 1);
        world.ghosts[0].heading = Some(Direction::Left);

        // Swapped cells within the tick.
        world.players[0].agent.position = Cell::new(2, 1);
        world.ghosts[0].position = Cell::new(1, 1);
        world.resolve_collisions(&[Cell::new(1, 1)], &[Cell::new(2, 1)]);

        assert_eq!(world.players[0].agent.score, 200);
        assert_eq!(world.ghosts[0].position, world.ghosts[0].home);
        assert_eq!(world.stats.ghosts_eaten, 1);
        assert_eq!(world.players[0].agent.lives, 3);
    }

    #[test]
    fn clearing_the_maze_wins() {
        let mut world = world(&["#####", "#P..#", "#####"]);
        assert_eq!(world.run(1_000), Outcome::Win);
        assert_eq!(world.stats().pellets, 2);
        assert_eq!(world.score(), 20);
        assert!(world.grid().is_cleared());
    }

    #[test]
    fn losing_every_life_loses() {
        let mut world = world(&["#####", "#P..#", "#####"]);
        world.players[0].agent.lives = 1;
        world.ghosts.push(Ghost::new(0, Cell::new(3, 1)));

        world.ghosts[0].position = Cell::new(1, 1);
        world.resolve_collisions(&[Cell::new(1, 1)], &[Cell::new(2, 1)]);
        assert_eq!(world.step(), Some(Outcome::Loss));
    }

    #[test]
    fn tick_limit_ends_incomplete() {
        let mut world = world(&["#########", "#P     .#", "#########"]);
        assert_eq!(world.run(3), Outcome::Incomplete);
        assert_eq!(world.tick(), 3);
        assert_eq!(world.outcome(), Some(Outcome::Incomplete));
    }

    #[test]
    fn debug_commands_switch_and_reset() {
        let mut world = world(&["#####", "#P..#", "#####"]);
        world.apply(SimCommand::SetStrategy {
            player: 0,
            kind: StrategyKind::Corners,
        });
        assert_eq!(world.players()[0].engine.kind(), StrategyKind::Corners);

        world.apply(SimCommand::CycleStrategy { player: 0 });
        assert_eq!(world.players()[0].engine.kind(), StrategyKind::Reflex);

        world.players[0].agent.position = Cell::new(3, 1);
        world.apply(SimCommand::ResetAgent { player: 0 });
        assert_eq!(world.players()[0].agent.position, Cell::new(1, 1));

        // Unknown players are ignored.
        world.apply(SimCommand::ResetAgent { player: 9 });
    }
}
