//! Adversary proximity and short-horizon movement prediction.
//!
//! Adversaries move like the maze ghosts they model: they chase their target
//! and never reverse unless the corridor dead-ends. [`pursuit_path`] encodes
//! that rule and is shared by the prediction here and the adversary
//! controller in the simulation driver.

use std::collections::{BTreeSet, HashMap};

use maze_core::{Cell, Direction, GridIndex, Neighbors};

use crate::config::ThreatConfig;
use crate::search::{Discipline, Frontier};

/// Consistent view of one adversary, captured once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdversarySighting {
    pub cell: Cell,
    /// Last movement direction; used to forbid U-turns in prediction.
    pub heading: Option<Direction>,
    /// Frightened adversaries flee the agent and can be eaten.
    pub frightened: bool,
}

impl AdversarySighting {
    pub fn new(cell: Cell, heading: Option<Direction>) -> Self {
        Self {
            cell,
            heading,
            frightened: false,
        }
    }

    #[must_use]
    pub fn frightened(mut self) -> Self {
        self.frightened = true;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThreatSnapshot {
    /// Dangerous adversaries and their Manhattan distance to the agent.
    pub distances: Vec<(Cell, u32)>,
    /// Frightened adversaries and their distance; hunt candidates.
    pub huntable: Vec<(Cell, u32)>,
    pub immediate_danger: bool,
    pub level: u32,
    /// Cells dangerous adversaries may occupy within the lookahead.
    pub predicted: BTreeSet<Cell>,
}

impl ThreatSnapshot {
    pub fn min_distance(&self) -> Option<u32> {
        self.distances.iter().map(|(_, d)| *d).min()
    }

    /// Closest dangerous adversary; the first listed wins ties.
    pub fn nearest(&self) -> Option<(Cell, u32)> {
        self.distances
            .iter()
            .copied()
            .fold(None, |best: Option<(Cell, u32)>, candidate| match best {
                Some(b) if b.1 <= candidate.1 => Some(b),
                _ => Some(candidate),
            })
    }

    /// Distance from `cell` to the nearest dangerous adversary.
    pub fn min_distance_from(&self, cell: Cell) -> Option<u32> {
        self.distances
            .iter()
            .map(|(adversary, _)| cell.manhattan(*adversary))
            .min()
    }

    pub fn is_predicted(&self, cell: Cell) -> bool {
        self.predicted.contains(&cell)
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.distances.iter().any(|(adversary, _)| *adversary == cell)
    }

    /// True when a dangerous adversary is within `radius`.
    pub fn within(&self, radius: u32) -> bool {
        self.min_distance().is_some_and(|d| d <= radius)
    }
}

/// Builds [`ThreatSnapshot`]s for one agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThreatAssessment {
    config: ThreatConfig,
}

impl ThreatAssessment {
    pub fn new(config: ThreatConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThreatConfig {
        &self.config
    }

    /// Assesses `adversaries` from `agent`'s point of view.
    ///
    /// Immediate danger and threat level both use `danger_radius`;
    /// frightened adversaries never count as dangerous.
    pub fn assess<G: GridIndex + ?Sized>(
        &self,
        grid: &G,
        agent: Cell,
        adversaries: &[AdversarySighting],
        danger_radius: u32,
    ) -> ThreatSnapshot {
        let mut snapshot = ThreatSnapshot::default();

        for sighting in adversaries {
            let distance = agent.manhattan(sighting.cell);
            if sighting.frightened {
                snapshot.huntable.push((sighting.cell, distance));
                continue;
            }
            snapshot.distances.push((sighting.cell, distance));
            if distance <= danger_radius {
                snapshot.level += (danger_radius - distance + 1) * self.config.level_weight;
            }
            snapshot
                .predicted
                .extend(self.predict(grid, *sighting, agent));
        }

        snapshot.immediate_danger = snapshot.within(danger_radius);

        if snapshot.immediate_danger {
            tracing::debug!(
                %agent,
                min_distance = snapshot.min_distance(),
                level = snapshot.level,
                predicted = snapshot.predicted.len(),
                "adversary in danger radius"
            );
        }
        snapshot
    }

    /// Cells `sighting` may reach within the lookahead while chasing `agent`.
    ///
    /// Union of the no-U-turn pursuit path and straight projections in every
    /// direction until a wall.
    pub fn predict<G: GridIndex + ?Sized>(
        &self,
        grid: &G,
        sighting: AdversarySighting,
        agent: Cell,
    ) -> BTreeSet<Cell> {
        let lookahead = self.config.lookahead as usize;
        let mut cells: BTreeSet<Cell> = pursuit_path(
            grid,
            sighting.cell,
            sighting.heading,
            agent,
            lookahead,
            self.config.prediction_cap,
        )
        .into_iter()
        .collect();

        for direction in Direction::ALL {
            let mut cursor = sighting.cell;
            for _ in 0..lookahead {
                cursor = cursor.step(direction);
                if !grid.is_walkable(cursor) {
                    break;
                }
                cells.insert(cursor);
            }
        }
        cells
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct Heading {
    cell: Cell,
    arrived: Option<Direction>,
}

/// Moves out of `cell` when arriving via `arrived`: every walkable neighbor
/// except the reverse, unless reversing is the only way out.
pub fn forward_moves<G: GridIndex + ?Sized>(
    grid: &G,
    cell: Cell,
    arrived: Option<Direction>,
) -> Neighbors {
    let neighbors = grid.neighbors(cell);
    let reverse = arrived.map(Direction::opposite);
    let forward: Neighbors = neighbors
        .iter()
        .copied()
        .filter(|(_, d)| Some(*d) != reverse)
        .collect();
    if forward.is_empty() { neighbors } else { forward }
}

/// Best-first pursuit from `from` toward `target` without U-turns.
///
/// Returns at most `max_len` cells (excluding `from`). When the target is not
/// reached within `cap` expansions or `max_len` steps, the path to the
/// explored cell closest to the target is returned instead, shorter paths
/// winning ties. Empty only when `from` has no way out.
pub fn pursuit_path<G: GridIndex + ?Sized>(
    grid: &G,
    from: Cell,
    heading: Option<Direction>,
    target: Cell,
    max_len: usize,
    cap: usize,
) -> Vec<Cell> {
    if from == target || max_len == 0 {
        return Vec::new();
    }

    let root = Heading {
        cell: from,
        arrived: heading,
    };
    let mut frontier = Frontier::new(Discipline::Priority);
    let mut parent: HashMap<Heading, Heading> = HashMap::new();
    let mut depth: HashMap<Heading, usize> = HashMap::from([(root, 0)]);
    let mut closest: Option<(u32, usize, Heading)> = None;
    let mut expanded = 0;

    frontier.push(root, from.manhattan(target));

    while let Some(state) = frontier.pop() {
        let steps = depth.get(&state).copied().unwrap_or(0);
        let remaining = state.cell.manhattan(target);
        if steps > 0 && closest.is_none_or(|(r, s, _)| (remaining, steps) < (r, s)) {
            closest = Some((remaining, steps, state));
        }
        if state.cell == target {
            break;
        }
        if steps >= max_len || expanded >= cap {
            continue;
        }
        expanded += 1;

        for (next, direction) in forward_moves(grid, state.cell, state.arrived) {
            let child = Heading {
                cell: next,
                arrived: Some(direction),
            };
            if depth.contains_key(&child) {
                continue;
            }
            depth.insert(child, steps + 1);
            parent.insert(child, state);
            frontier.push(child, (steps + 1) as u32 + next.manhattan(target));
        }
    }

    let Some((_, _, mut cursor)) = closest else {
        return Vec::new();
    };
    let mut path = Vec::new();
    while cursor != root {
        path.push(cursor.cell);
        match parent.get(&cursor) {
            Some(previous) => cursor = *previous,
            None => break,
        }
    }
    path.reverse();
    path.truncate(max_len);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_core::{Grid, Layout};

    fn open() -> Grid {
        Grid::bordered(12, 12).unwrap()
    }

    #[test]
    fn level_grows_with_proximity_and_count() {
        let grid = open();
        let assess = ThreatAssessment::default();
        let agent = Cell::new(5, 5);

        let one = assess.assess(&grid, agent, &[AdversarySighting::new(Cell::new(5, 7), None)], 4);
        assert_eq!(one.level, (4 - 2 + 1) * 10);
        assert!(one.immediate_danger);

        let two = assess.assess(
            &grid,
            agent,
            &[
                AdversarySighting::new(Cell::new(5, 7), None),
                AdversarySighting::new(Cell::new(5, 6), None),
            ],
            4,
        );
        assert!(two.level > one.level);
        assert_eq!(two.nearest(), Some((Cell::new(5, 6), 1)));
    }

    #[test]
    fn far_or_frightened_adversaries_are_not_danger() {
        let grid = open();
        let assess = ThreatAssessment::default();
        let agent = Cell::new(2, 2);
        let snapshot = assess.assess(
            &grid,
            agent,
            &[
                AdversarySighting::new(Cell::new(9, 9), None),
                AdversarySighting::new(Cell::new(2, 3), None).frightened(),
            ],
            4,
        );
        assert!(!snapshot.immediate_danger);
        assert_eq!(snapshot.level, 0);
        assert_eq!(snapshot.huntable, vec![(Cell::new(2, 3), 1)]);
        assert_eq!(snapshot.min_distance(), Some(14));
    }

    #[test]
    fn pursuit_never_reverses_in_corridor() {
        let grid = Layout::from_rows(&["#########", "#       #", "#########"])
            .unwrap()
            .grid;
        // Heading right with the target behind: the only move is forward.
        let path = pursuit_path(&grid, Cell::new(3, 1), Some(Direction::Right), Cell::new(1, 1), 3, 50);
        assert_eq!(path.first(), Some(&Cell::new(4, 1)));
        assert!(!path.contains(&Cell::new(2, 1)));

        // At the dead end reversing is the only way out.
        let path = pursuit_path(&grid, Cell::new(7, 1), Some(Direction::Right), Cell::new(1, 1), 3, 50);
        assert_eq!(path, vec![Cell::new(6, 1), Cell::new(5, 1), Cell::new(4, 1)]);
    }

    #[test]
    fn pursuit_reaches_target_when_free_to_turn() {
        let grid = open();
        let path = pursuit_path(&grid, Cell::new(2, 2), None, Cell::new(5, 2), 8, 50);
        assert_eq!(path.last(), Some(&Cell::new(5, 2)));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn prediction_includes_straight_projections() {
        let grid = Layout::from_rows(&[
            "#######",
            "### ###",
            "#     #",
            "### ###",
            "#######",
        ])
        .unwrap()
        .grid;
        let assess = ThreatAssessment::default();
        let sighting = AdversarySighting::new(Cell::new(3, 2), Some(Direction::Left));
        let predicted = assess.predict(&grid, sighting, Cell::new(5, 2));
        for cell in [Cell::new(1, 2), Cell::new(3, 1), Cell::new(3, 3), Cell::new(5, 2)] {
            assert!(predicted.contains(&cell), "{cell}");
        }
    }
}
