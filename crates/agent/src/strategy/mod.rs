//! Decision layer: a priority cascade evaluated on a fixed cadence.
//!
//! Every strategy is a behavior tree [`Selector`](behavior_tree::Selector)
//! over the same node catalogue; strategies differ in which branches they
//! include, which search algorithm they route with and how close an adversary
//! must be before they flee.
//!
//! ```text
//! reflex()
//!   └─ Selector
//!       ├─ escape       (Sequence: InDanger → Escape)
//!       ├─ seek_power   (Sequence: !Empowered → SeekPower)
//!       ├─ hunt
//!       ├─ collect
//!       ├─ explore
//!       └─ wander       (never fails while a legal move exists)
//! ```
//!
//! The [`StrategyEngine`] owns the active [`StrategyKind`] and the seeded RNG,
//! rebuilds the tree once per decision tick and writes the result into the
//! agent's [`AgentState`]. The anti-stuck override runs before the cascade
//! and bypasses it entirely.

mod context;
mod escape;
mod nodes;
pub mod presets;

use behavior_tree::Behavior;
use maze_core::{AgentState, Cell, Direction, GridIndex, MotionController};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::{StrategyConfig, TargetWeights};
use crate::search::{Algorithm, CostProfile};
use crate::targeting::{Target, TargetPolicy};
use crate::threat::{AdversarySighting, ThreatAssessment};

pub use context::DecisionContext;
pub use escape::{EscapeCandidate, EscapePlanner};

/// Registered strategies, in cycling order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StrategyKind {
    /// Full cascade with A* and adversary-aware costs.
    #[default]
    Reflex,
    /// Tighter escape radius, weighted targeting, hunts while empowered.
    SmartHunter,
    SimpleBfs,
    SimpleDfs,
    SimpleUcs,
    SimpleAstar,
    /// Escapes, otherwise covers the least-visited parts of the maze.
    Explorer,
    /// Escapes, otherwise visits the four maze corners before collecting.
    Corners,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 8] = [
        StrategyKind::Reflex,
        StrategyKind::SmartHunter,
        StrategyKind::SimpleBfs,
        StrategyKind::SimpleDfs,
        StrategyKind::SimpleUcs,
        StrategyKind::SimpleAstar,
        StrategyKind::Explorer,
        StrategyKind::Corners,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub const fn profile(self) -> StrategyProfile {
        match self {
            StrategyKind::Reflex => StrategyProfile {
                algorithm: Algorithm::Astar,
                danger_radius: 4,
                avoid: true,
                pellet_discount: CostProfile::DEFAULT_PELLET_DISCOUNT,
                weighted_targets: true,
            },
            StrategyKind::SmartHunter => StrategyProfile {
                algorithm: Algorithm::Astar,
                danger_radius: 3,
                avoid: true,
                pellet_discount: 0,
                weighted_targets: true,
            },
            StrategyKind::SimpleBfs => StrategyProfile::simple(Algorithm::Bfs),
            StrategyKind::SimpleDfs => StrategyProfile::simple(Algorithm::Dfs),
            StrategyKind::SimpleUcs => StrategyProfile::simple(Algorithm::Ucs),
            StrategyKind::SimpleAstar => StrategyProfile::simple(Algorithm::Astar),
            StrategyKind::Explorer => StrategyProfile::simple(Algorithm::Bfs),
            StrategyKind::Corners => StrategyProfile::simple(Algorithm::Astar),
        }
    }
}

/// Per-strategy routing and targeting parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrategyProfile {
    pub algorithm: Algorithm,
    /// Adversary distance at or below which the escape branch fires.
    pub danger_radius: u32,
    /// Route around adversaries with the danger surcharge.
    pub avoid: bool,
    pub pellet_discount: u32,
    /// Use the weighted selector instead of plain nearest-collectible.
    pub weighted_targets: bool,
}

impl StrategyProfile {
    const fn simple(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            danger_radius: 4,
            avoid: false,
            pellet_discount: 0,
            weighted_targets: false,
        }
    }

    /// Step-cost model for this strategy's searches.
    pub fn cost(&self, config: &StrategyConfig) -> CostProfile {
        let base = if self.avoid {
            CostProfile {
                ignore_beyond: Some(config.threat.detection_radius),
                ..config.cost
            }
        } else {
            CostProfile::UNIFORM
        };
        base.with_pellet_discount(self.pellet_discount)
    }

    pub fn policy(&self, weights: TargetWeights) -> TargetPolicy {
        if self.weighted_targets {
            TargetPolicy::new(weights)
        } else {
            TargetPolicy::nearest()
        }
    }
}

/// How much the remaining power time can be relied on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PowerTier {
    Aggressive,
    Balanced,
    /// About to expire; treated as unpowered.
    Cautious,
}

impl PowerTier {
    pub fn of(power_timer: u32, config: &StrategyConfig) -> Self {
        if power_timer > config.aggressive_power {
            PowerTier::Aggressive
        } else if power_timer > config.cautious_power {
            PowerTier::Balanced
        } else {
            PowerTier::Cautious
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecisionAction {
    Escape,
    SeekPower,
    Hunt,
    Collect,
    Explore,
    /// Heading for an unvisited maze corner.
    Corner,
    Unstick,
    /// Nothing committed; the agent keeps its current direction.
    Hold,
}

/// Outcome of one decision tick, published for presentation and telemetry.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub action: DecisionAction,
    pub direction: Option<Direction>,
    /// Committed route, starting at the first cell after the planning origin.
    pub path: Vec<Cell>,
    pub target: Option<Target>,
    pub strategy: StrategyKind,
}

impl Decision {
    fn hold(agent: &AgentState, strategy: StrategyKind) -> Self {
        Self {
            action: DecisionAction::Hold,
            direction: agent.direction,
            path: Vec::new(),
            target: None,
            strategy,
        }
    }
}

/// Search effort spent by one engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    pub decisions: u64,
    pub expanded: u64,
    pub peak_expanded: usize,
}

impl SearchStats {
    fn record(&mut self, expanded: usize) {
        self.decisions += 1;
        self.expanded += expanded as u64;
        self.peak_expanded = self.peak_expanded.max(expanded);
    }

    pub fn mean_expanded(&self) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            self.expanded as f64 / self.decisions as f64
        }
    }
}

/// Decision engine for one agent.
pub struct StrategyEngine {
    kind: StrategyKind,
    config: StrategyConfig,
    motion: MotionController,
    rng: StdRng,
    last: Option<Decision>,
    stats: SearchStats,
}

impl StrategyEngine {
    pub fn new(kind: StrategyKind, config: StrategyConfig, seed: u64) -> Self {
        Self {
            kind,
            motion: MotionController::new(config.motion),
            config,
            rng: StdRng::seed_from_u64(seed),
            last: None,
            stats: SearchStats::default(),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn last_decision(&self) -> Option<&Decision> {
        self.last.as_ref()
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Switches strategy; takes effect on the next decision tick.
    pub fn set_strategy(&mut self, kind: StrategyKind) {
        if kind != self.kind {
            tracing::info!(from = %self.kind, to = %kind, "strategy changed");
            self.kind = kind;
        }
    }

    pub fn cycle_strategy(&mut self) -> StrategyKind {
        self.set_strategy(self.kind.next());
        self.kind
    }

    /// Runs one tick of the decision layer.
    ///
    /// Returns `Some` when a decision was taken this tick: either the
    /// anti-stuck override fired or the cascade was due.
    pub fn tick<G: GridIndex>(
        &mut self,
        grid: &G,
        agent: &mut AgentState,
        adversaries: &[AdversarySighting],
    ) -> Option<Decision> {
        agent.decision_timer += 1;

        if agent.stuck_ticks > self.config.effective_stuck_threshold() {
            let decision = self.unstick(grid, agent);
            self.last = Some(decision.clone());
            return Some(decision);
        }

        let idle = agent.direction.is_none()
            && agent.pending.is_none()
            && agent.next_waypoint().is_none();
        if agent.decision_timer < self.config.decision_interval && !idle {
            return None;
        }

        agent.decision_timer = 0;
        let decision = self.decide(grid, agent, adversaries);
        self.last = Some(decision.clone());
        Some(decision)
    }

    /// Evaluates the cascade immediately.
    pub fn decide(
        &mut self,
        grid: &dyn GridIndex,
        agent: &mut AgentState,
        adversaries: &[AdversarySighting],
    ) -> Decision {
        agent.prune_blacklist(|cell| grid.collectible_at(cell).is_some());

        let kind = self.kind;
        let profile = kind.profile();
        let origin = self.planning_origin(grid, agent);
        let threat = ThreatAssessment::new(self.config.threat).assess(
            grid,
            origin,
            adversaries,
            profile.danger_radius,
        );

        let mut ctx = DecisionContext {
            grid,
            agent,
            adversaries,
            threat,
            config: &self.config,
            profile,
            strategy: kind,
            origin,
            rng: &mut self.rng,
            expanded: 0,
            decision: None,
        };
        let tree = presets::build(kind);
        tree.tick(&mut ctx);

        let expanded = ctx.expanded;
        let decision = ctx.decision.take();
        let agent = ctx.agent;
        self.stats.record(expanded);

        let decision = decision.unwrap_or_else(|| {
            tracing::warn!(at = %agent.position, strategy = %kind, "cascade committed nothing, holding");
            Decision::hold(agent, kind)
        });
        tracing::debug!(
            strategy = %kind,
            action = %decision.action,
            direction = ?decision.direction,
            steps = decision.path.len(),
            expanded,
            "decision"
        );
        decision
    }

    /// Cell the next plan starts from.
    ///
    /// Past the commit window the agent is bound to finish the current step,
    /// so planning starts at the cell it is entering.
    fn planning_origin(&self, grid: &dyn GridIndex, agent: &AgentState) -> Cell {
        match agent.direction {
            Some(direction) if agent.progress >= self.motion.config().commit_threshold => {
                let entering = agent.position.step(direction);
                if grid.is_walkable(entering) {
                    entering
                } else {
                    agent.position
                }
            }
            _ => agent.position,
        }
    }

    /// Forces a random legal direction, avoiding the current one if possible.
    fn unstick(&mut self, grid: &dyn GridIndex, agent: &mut AgentState) -> Decision {
        let legal = MotionController::legal_directions(grid, agent.position);
        let mut choices: Vec<Direction> = legal
            .iter()
            .copied()
            .filter(|d| Some(*d) != agent.direction)
            .collect();
        if choices.is_empty() {
            choices = legal.to_vec();
        }

        let Some(direction) = choices.choose(&mut self.rng).copied() else {
            tracing::warn!(at = %agent.position, "stuck with no legal move");
            return Decision::hold(agent, self.kind);
        };

        if let Err(err) = self.motion.force(grid, agent, direction) {
            tracing::warn!(code = maze_core::MazeError::error_code(&err), %err, "unstick rejected");
            return Decision::hold(agent, self.kind);
        }
        agent.clear_path();
        agent.target = None;
        agent.decision_timer = 0;
        tracing::debug!(at = %agent.position, %direction, "anti-stuck override");

        Decision {
            action: DecisionAction::Unstick,
            direction: Some(direction),
            path: Vec::new(),
            target: None,
            strategy: self.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn strategy_names_round_trip_and_cycle() {
        assert_eq!(StrategyKind::from_str("smart_hunter"), Ok(StrategyKind::SmartHunter));
        assert_eq!(StrategyKind::from_str("SIMPLE_ASTAR"), Ok(StrategyKind::SimpleAstar));
        assert!(StrategyKind::from_str("greedy").is_err());

        let mut kind = StrategyKind::Reflex;
        for _ in 0..StrategyKind::ALL.len() {
            kind = kind.next();
        }
        assert_eq!(kind, StrategyKind::Reflex);
        assert_eq!(StrategyKind::Reflex.previous(), StrategyKind::Corners);
    }

    #[test]
    fn power_tiers_split_on_thresholds() {
        let config = StrategyConfig::new();
        assert_eq!(PowerTier::of(300, &config), PowerTier::Aggressive);
        assert_eq!(PowerTier::of(180, &config), PowerTier::Balanced);
        assert_eq!(PowerTier::of(61, &config), PowerTier::Balanced);
        assert_eq!(PowerTier::of(60, &config), PowerTier::Cautious);
        assert_eq!(PowerTier::of(0, &config), PowerTier::Cautious);
    }

    #[test]
    fn only_adversarial_profiles_pay_danger() {
        let config = StrategyConfig::new();
        assert!(StrategyKind::SimpleUcs.profile().cost(&config).is_uniform());
        let reflex = StrategyKind::Reflex.profile().cost(&config);
        assert_eq!(reflex.pellet_discount, CostProfile::DEFAULT_PELLET_DISCOUNT);
        assert_eq!(reflex.ignore_beyond, Some(config.threat.detection_radius));
    }

    #[test]
    fn cycling_changes_the_active_strategy() {
        let mut engine = StrategyEngine::new(StrategyKind::Corners, StrategyConfig::new(), 7);
        assert_eq!(engine.cycle_strategy(), StrategyKind::Reflex);
        engine.set_strategy(StrategyKind::SimpleDfs);
        assert_eq!(engine.kind(), StrategyKind::SimpleDfs);
    }
}
