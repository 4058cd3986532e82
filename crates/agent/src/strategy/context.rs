//! Blackboard shared by the nodes of one cascade evaluation.

use maze_core::{AgentState, Cell, Direction, GridIndex};
use rand::rngs::StdRng;

use super::{Decision, DecisionAction, StrategyKind, StrategyProfile};
use crate::config::StrategyConfig;
use crate::search::SearchResult;
use crate::targeting::Target;
use crate::threat::{AdversarySighting, ThreatSnapshot};

/// Everything a node may read, plus the single decision it may write.
///
/// The first node that calls [`DecisionContext::commit`] wins; later commits
/// are ignored so a Selector cannot overwrite its own result.
pub struct DecisionContext<'a> {
    pub grid: &'a dyn GridIndex,
    pub agent: &'a mut AgentState,
    pub adversaries: &'a [AdversarySighting],
    /// Assessed from [`DecisionContext::origin`] with the profile's radius.
    pub threat: ThreatSnapshot,
    pub config: &'a StrategyConfig,
    pub profile: StrategyProfile,
    pub strategy: StrategyKind,
    /// Cell plans start from: the agent's cell, or the one it is entering.
    pub origin: Cell,
    pub rng: &'a mut StdRng,
    /// Nodes expanded by every search run during this evaluation.
    pub expanded: usize,
    pub(crate) decision: Option<Decision>,
}

impl DecisionContext<'_> {
    pub fn decision(&self) -> Option<&Decision> {
        self.decision.as_ref()
    }

    pub fn is_committed(&self) -> bool {
        self.decision.is_some()
    }

    /// Adds a search's effort to the evaluation total and hands it back.
    pub fn account(&mut self, result: SearchResult) -> SearchResult {
        self.expanded += result.expanded;
        result
    }

    /// Commits `path` (starting after [`Self::origin`]) as the agent's route.
    ///
    /// Returns false when the path is empty or does not start next to the
    /// origin.
    pub fn commit(&mut self, action: DecisionAction, path: Vec<Cell>, target: Option<Target>) -> bool {
        if self.decision.is_some() {
            return false;
        }
        let Some(direction) = path.first().and_then(|first| Direction::between(self.origin, *first))
        else {
            return false;
        };

        let mut route = Vec::with_capacity(path.len() + 1);
        if self.origin != self.agent.position {
            route.push(self.origin);
        }
        route.extend_from_slice(&path);
        self.agent.set_path(route);
        self.agent.target = target.map(|t| t.cell);

        self.decision = Some(Decision {
            action,
            direction: Some(direction),
            path,
            target,
            strategy: self.strategy,
        });
        true
    }

    /// Commits a single step from the origin.
    pub fn commit_direction(&mut self, action: DecisionAction, direction: Direction) -> bool {
        let next = self.origin.step(direction);
        if !self.grid.is_walkable(next) {
            return false;
        }
        self.commit(action, vec![next], None)
    }

    /// Legal directions out of the origin, in compass order.
    pub fn legal_directions(&self) -> Vec<Direction> {
        self.grid
            .neighbors(self.origin)
            .iter()
            .map(|(_, d)| *d)
            .collect()
    }

    /// Ticks the agent needs to cover `cells` cells.
    pub fn agent_ticks(&self, cells: u32) -> f32 {
        cells as f32 * self.config.motion.ticks_per_cell()
    }

    /// Ticks an adversary needs to cover `cells` cells.
    pub fn adversary_ticks(&self, cells: u32) -> f32 {
        cells as f32 * self.config.adversary_motion.ticks_per_cell()
    }
}
