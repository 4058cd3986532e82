//! Target scoring.
//!
//! Every live collectible (and, while empowered, every frightened adversary)
//! is a candidate. A candidate scores `weight / (1 + distance)` plus an
//! exploration bonus that grows in rarely visited neighbourhoods; the highest
//! score wins and the first candidate encountered wins ties.
//!
//! Targets the agent failed to route to are blacklisted on its
//! [`AgentState`]. They are skipped while any other candidate exists; once
//! nothing else remains, the most recently blacklisted target that is still
//! live is returned so the agent keeps trying instead of idling.

use maze_core::{AgentState, Cell, CollectibleKind, Direction, GridIndex};

use crate::config::TargetWeights;
use crate::threat::ThreatSnapshot;

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
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetKind {
    Pellet,
    PowerPellet,
    /// A frightened adversary.
    Adversary,
    /// A stop on a corner tour.
    Corner,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Target {
    pub cell: Cell,
    pub kind: TargetKind,
    pub score: f32,
    /// Picked from the blacklist because nothing else was left.
    pub from_blacklist: bool,
}

/// Which candidates a selector considers and how it weighs them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetPolicy {
    pub weights: TargetWeights,
    pub include_power: bool,
    /// Consider frightened adversaries while the agent is empowered.
    pub hunt: bool,
}

impl TargetPolicy {
    pub const fn new(weights: TargetWeights) -> Self {
        Self {
            weights,
            include_power: true,
            hunt: true,
        }
    }

    /// Plain nearest-collectible policy.
    pub const fn nearest() -> Self {
        Self {
            weights: TargetWeights::nearest(),
            include_power: true,
            hunt: false,
        }
    }
}

impl Default for TargetPolicy {
    fn default() -> Self {
        Self::new(TargetWeights::new())
    }
}

/// Picks the best pursuit target for one decision.
#[derive(Clone, Debug)]
pub struct TargetSelector<'r> {
    policy: TargetPolicy,
    /// Extra cells to skip for this decision only (targets that just failed).
    rejected: &'r [Cell],
}

impl TargetSelector<'static> {
    pub fn new(policy: TargetPolicy) -> Self {
        Self {
            policy,
            rejected: &[],
        }
    }
}

impl<'r> TargetSelector<'r> {
    pub fn excluding<'n>(self, rejected: &'n [Cell]) -> TargetSelector<'n> {
        TargetSelector {
            policy: self.policy,
            rejected,
        }
    }

    pub fn policy(&self) -> &TargetPolicy {
        &self.policy
    }

    /// Every scored candidate, in evaluation order.
    ///
    /// `origin` is the cell distances are measured from; a candidate on
    /// `origin` itself is skipped since it is collected on arrival.
    pub fn candidates<G: GridIndex + ?Sized>(
        &self,
        grid: &G,
        agent: &AgentState,
        threat: &ThreatSnapshot,
        origin: Cell,
    ) -> Vec<Target> {
        let weights = &self.policy.weights;
        let mut out = Vec::new();

        let mut push = |cell: Cell, kind: TargetKind, weight: f32| {
            if cell == origin || agent.is_blacklisted(cell) || self.rejected.contains(&cell) {
                return;
            }
            out.push(Target {
                cell,
                kind,
                score: self.score(agent, origin, cell, weight),
                from_blacklist: false,
            });
        };

        for cell in grid.pellets() {
            push(*cell, TargetKind::Pellet, weights.pellet);
        }
        if self.policy.include_power {
            for cell in grid.power_pellets() {
                push(*cell, TargetKind::PowerPellet, weights.power_pellet);
            }
        }
        if self.policy.hunt && agent.is_empowered() {
            for (cell, _) in &threat.huntable {
                push(*cell, TargetKind::Adversary, weights.adversary);
            }
        }
        out
    }

    /// Highest-scoring candidate, falling back to the blacklist.
    pub fn select<G: GridIndex + ?Sized>(
        &self,
        grid: &G,
        agent: &AgentState,
        threat: &ThreatSnapshot,
        origin: Cell,
    ) -> Option<Target> {
        let best = self
            .candidates(grid, agent, threat, origin)
            .into_iter()
            .fold(None, |best: Option<Target>, candidate| match best {
                Some(b) if candidate.score <= b.score => Some(b),
                _ => Some(candidate),
            });

        if best.is_some() {
            return best;
        }
        self.from_blacklist(grid, agent, origin)
    }

    /// Most recently blacklisted collectible that is still on the grid.
    fn from_blacklist<G: GridIndex + ?Sized>(
        &self,
        grid: &G,
        agent: &AgentState,
        origin: Cell,
    ) -> Option<Target> {
        let target = agent.blacklisted().iter().rev().find_map(|cell| {
            if *cell == origin || self.rejected.contains(cell) {
                return None;
            }
            let kind = match grid.collectible_at(*cell)? {
                CollectibleKind::Pellet => TargetKind::Pellet,
                CollectibleKind::PowerPellet if self.policy.include_power => {
                    TargetKind::PowerPellet
                }
                CollectibleKind::PowerPellet => return None,
            };
            Some(Target {
                cell: *cell,
                kind,
                score: 0.0,
                from_blacklist: true,
            })
        });
        if let Some(target) = &target {
            tracing::debug!(cell = %target.cell, "eating from blacklist");
        }
        target
    }

    fn score(&self, agent: &AgentState, origin: Cell, cell: Cell, weight: f32) -> f32 {
        let distance = origin.manhattan(cell) as f32;
        let mut score = weight / (1.0 + distance);

        let exploration = self.policy.weights.exploration;
        if exploration > 0.0 {
            let traffic: u32 = std::iter::once(cell)
                .chain(Direction::ALL.map(|d| cell.step(d)))
                .map(|c| agent.visit_count(c))
                .sum();
            score += exploration / (1.0 + traffic as f32);
        }
        score
    }
}

/// Leftmost and rightmost walkable cells of the topmost and bottommost rows
/// that have any, without duplicates.
///
/// Order is top-left, top-right, bottom-left, bottom-right.
pub fn maze_corners<G: GridIndex + ?Sized>(grid: &G) -> Vec<Cell> {
    let dims = grid.dimensions();
    let walkable_row = |y: i32| -> Vec<Cell> {
        (0..dims.width as i32)
            .map(|x| Cell::new(x, y))
            .filter(|cell| grid.is_walkable(*cell))
            .collect()
    };
    let rows = 0..dims.height as i32;
    let top = rows.clone().map(walkable_row).find(|row| !row.is_empty());
    let bottom = rows.rev().map(walkable_row).find(|row| !row.is_empty());
    let (Some(top), Some(bottom)) = (top, bottom) else {
        return Vec::new();
    };

    let mut corners: Vec<Cell> = Vec::with_capacity(4);
    for cell in [top.first(), top.last(), bottom.first(), bottom.last()]
        .into_iter()
        .flatten()
    {
        if !corners.contains(cell) {
            corners.push(*cell);
        }
    }
    corners
}
