//! Escape routing.
//!
//! A breadth-first scan from the planning origin, bounded by the escape
//! lookahead, scores every reachable cell and the agent commits to the path
//! toward the best one. Cells occupied by an adversary are never entered.
//!
//! Score of a cell at depth `k`:
//!
//! ```text
//!   distance_weight × (Manhattan distance to the nearest adversary)
//! − predicted_penalty      if an adversary may be there within the lookahead
//! − intersection_penalty   if degree ≥ 3
//! + dead_end_bonus         if degree ≤ 1
//! + corridor_bonus         if degree = 2
//! − depth_penalty × k
//! + pellet_bonus − d       toward the nearest pellet, once clear of contact
//! + power_bonus − 2d       toward the nearest power pellet, while pressed
//! ```
//!
//! Candidates whose first step increases the distance to the nearest
//! adversary are preferred whenever one exists.

use std::collections::{BTreeSet, HashMap, VecDeque};

use maze_core::{Cell, GridIndex};

use crate::config::EscapeConfig;
use crate::threat::ThreatSnapshot;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscapeCandidate {
    pub cell: Cell,
    /// Route from the origin, excluding it.
    pub path: Vec<Cell>,
    pub score: i32,
    /// The first step moves away from the nearest adversary.
    pub gains_distance: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EscapePlanner {
    config: EscapeConfig,
}

impl EscapePlanner {
    pub fn new(config: EscapeConfig) -> Self {
        Self { config }
    }

    /// Score of standing on `cell` after `depth` steps.
    pub fn score<G: GridIndex + ?Sized>(
        &self,
        grid: &G,
        threat: &ThreatSnapshot,
        cell: Cell,
        depth: usize,
    ) -> i32 {
        let c = &self.config;
        let distance = threat.min_distance_from(cell).unwrap_or(c.lookahead) as i32;
        let mut score = distance * c.distance_weight;

        if threat.is_predicted(cell) {
            score -= c.predicted_penalty;
        }
        score += match grid.degree(cell) {
            0 | 1 => c.dead_end_bonus,
            2 => c.corridor_bonus,
            _ => -c.intersection_penalty,
        };
        score -= depth as i32 * c.depth_penalty;

        let contact = threat.min_distance();
        if contact.is_some_and(|d| d > c.safe_distance)
            && let Some(d) = nearest(grid.pellets(), cell)
        {
            score += (c.pellet_bonus - d as i32).max(0);
        }
        if contact.is_some_and(|d| d <= c.power_bonus_range)
            && let Some(d) = nearest(grid.power_pellets(), cell)
        {
            score += (c.power_bonus - 2 * d as i32).max(0);
        }
        score
    }

    /// Every cell reachable within the lookahead, in breadth-first order.
    pub fn candidates<G: GridIndex + ?Sized>(
        &self,
        grid: &G,
        threat: &ThreatSnapshot,
        origin: Cell,
    ) -> Vec<EscapeCandidate> {
        let baseline = threat.min_distance_from(origin);
        let mut parent: HashMap<Cell, Cell> = HashMap::new();
        let mut seen = BTreeSet::from([origin]);
        let mut queue = VecDeque::from([(origin, 0_usize)]);
        let mut out = Vec::new();

        while let Some((cell, depth)) = queue.pop_front() {
            if cell != origin {
                let path = route(&parent, origin, cell);
                let first = path[0];
                out.push(EscapeCandidate {
                    cell,
                    score: self.score(grid, threat, cell, depth),
                    gains_distance: match (threat.min_distance_from(first), baseline) {
                        (Some(after), Some(before)) => after > before,
                        _ => false,
                    },
                    path,
                });
            }
            if depth >= self.config.lookahead as usize {
                continue;
            }
            for (next, _) in grid.neighbors(cell) {
                if threat.is_occupied(next) || !seen.insert(next) {
                    continue;
                }
                parent.insert(next, cell);
                queue.push_back((next, depth + 1));
            }
        }
        out
    }

    /// Path to follow, or `None` when the origin has no legal neighbour.
    pub fn plan<G: GridIndex + ?Sized>(
        &self,
        grid: &G,
        threat: &ThreatSnapshot,
        origin: Cell,
    ) -> Option<Vec<Cell>> {
        let candidates = self.candidates(grid, threat, origin);
        let pool: Vec<&EscapeCandidate> = if candidates.iter().any(|c| c.gains_distance) {
            candidates.iter().filter(|c| c.gains_distance).collect()
        } else {
            candidates.iter().collect()
        };
        if let Some(best) = best_by(pool, |c| c.score) {
            return Some(best.path.clone());
        }

        let neighbors = grid.neighbors(origin);

        let scored = neighbors
            .iter()
            .filter(|(cell, _)| !threat.is_occupied(*cell));
        if let Some((cell, _)) = best_by(scored, |(cell, _)| self.score(grid, threat, *cell, 1)) {
            tracing::warn!(%origin, to = %cell, "escape scan empty, best neighbour");
            return Some(vec![*cell]);
        }

        if let Some((cell, _)) = neighbors.iter().find(|(cell, _)| {
            threat
                .min_distance_from(*cell)
                .is_none_or(|d| d > self.config.safe_distance)
        }) {
            tracing::warn!(%origin, to = %cell, "escape falling back to safe neighbour");
            return Some(vec![*cell]);
        }

        let (cell, _) = neighbors.first()?;
        tracing::warn!(%origin, to = %cell, "escape falling back to any legal neighbour");
        Some(vec![*cell])
    }
}

/// Highest-scoring item; the first one wins ties.
fn best_by<T, I, F>(items: I, mut score: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> i32,
{
    let mut best: Option<(T, i32)> = None;
    for item in items {
        let s = score(&item);
        if best.as_ref().is_none_or(|(_, b)| s > *b) {
            best = Some((item, s));
        }
    }
    best.map(|(item, _)| item)
}

fn route(parent: &HashMap<Cell, Cell>, origin: Cell, cell: Cell) -> Vec<Cell> {
    let mut path = vec![cell];
    let mut cursor = cell;
    while let Some(previous) = parent.get(&cursor) {
        if *previous == origin {
            break;
        }
        path.push(*previous);
        cursor = *previous;
    }
    path.reverse();
    path
}

fn nearest(cells: &BTreeSet<Cell>, from: Cell) -> Option<u32> {
    cells.iter().map(|c| c.manhattan(from)).min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threat::{AdversarySighting, ThreatAssessment};
    use maze_core::{Grid, Layout};

    fn snapshot(grid: &Grid, agent: Cell, adversary: Cell) -> ThreatSnapshot {
        ThreatAssessment::default().assess(grid, agent, &[AdversarySighting::new(adversary, None)], 4)
    }

    #[test]
    fn adjacent_adversary_pushes_agent_away() {
        let grid = Grid::bordered(11, 11).unwrap();
        let agent = Cell::new(5, 5);
        let adversary = Cell::new(6, 5);
        let threat = snapshot(&grid, agent, adversary);

        let path = EscapePlanner::default().plan(&grid, &threat, agent).unwrap();
        assert!(path[0].manhattan(adversary) > agent.manhattan(adversary));
    }

    #[test]
    fn scan_never_enters_adversary_cells() {
        let grid = Layout::from_rows(&["#######", "#     #", "#######"]).unwrap().grid;
        let agent = Cell::new(3, 1);
        let adversary = Cell::new(4, 1);
        let threat = snapshot(&grid, agent, adversary);

        let candidates = EscapePlanner::default().candidates(&grid, &threat, agent);
        assert!(candidates.iter().all(|c| !c.path.contains(&adversary)));
        assert_eq!(
            candidates.iter().map(|c| c.cell).collect::<Vec<_>>(),
            vec![Cell::new(2, 1), Cell::new(1, 1)]
        );
    }

    #[test]
    fn zero_lookahead_falls_back_to_best_neighbour() {
        let grid = Grid::bordered(9, 9).unwrap();
        let agent = Cell::new(4, 4);
        let adversary = Cell::new(4, 3);
        let threat = snapshot(&grid, agent, adversary);
        let planner = EscapePlanner::new(EscapeConfig {
            lookahead: 0,
            ..EscapeConfig::new()
        });

        assert!(planner.candidates(&grid, &threat, agent).is_empty());
        // Straight down stays in the adversary's line of travel.
        let path = planner.plan(&grid, &threat, agent).unwrap();
        assert_eq!(path, vec![Cell::new(3, 4)]);
    }

    #[test]
    fn walled_in_origin_has_no_escape() {
        let grid = Layout::from_rows(&["###", "# #", "###"]).unwrap().grid;
        let threat = snapshot(&grid, Cell::new(1, 1), Cell::new(3, 3));
        assert!(EscapePlanner::default().plan(&grid, &threat, Cell::new(1, 1)).is_none());
    }
}
