//! Grid path search.
//!
//! All four algorithms run through one driver, [`search`], and differ only in
//! frontier discipline and cost model:
//!
//! | algorithm | frontier | priority |
//! |-----------|----------|----------|
//! | BFS       | FIFO     | -        |
//! | DFS       | LIFO     | -        |
//! | UCS       | min-heap | accumulated cost |
//! | A*        | min-heap | cost + Manhattan heuristic |
//!
//! Neighbors expand in compass order (UP, DOWN, LEFT, RIGHT) and heap ties
//! pop in insertion order, so identical inputs always give identical paths.
//!
//! An empty [`SearchResult`] means "no route" or "already at goal". Callers
//! tell the two apart by comparing start and goal; searches never fail loudly.

mod cost;
mod frontier;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::{Duration, Instant};

use maze_core::{Cell, Direction, ErrorSeverity, GridIndex, MazeError};

pub use cost::{CostProfile, MIN_STEP, UNIT};
pub use frontier::Discipline;
pub(crate) use frontier::Frontier;

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
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Algorithm {
    Bfs,
    Dfs,
    Ucs,
    Astar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::Ucs,
        Algorithm::Astar,
    ];

    pub const fn discipline(self) -> Discipline {
        match self {
            Algorithm::Bfs => Discipline::Fifo,
            Algorithm::Dfs => Discipline::Lifo,
            Algorithm::Ucs | Algorithm::Astar => Discipline::Priority,
        }
    }

    /// Whether the step-cost profile influences this algorithm.
    pub const fn is_weighted(self) -> bool {
        matches!(self, Algorithm::Ucs | Algorithm::Astar)
    }
}

/// Reasons a request is answered with an empty path without searching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("start and goal are both {cell}")]
    StartEqualsGoal { cell: Cell },

    #[error("{cell} is outside the grid")]
    OutOfBounds { cell: Cell },

    #[error("goal {cell} is a wall")]
    GoalBlocked { cell: Cell },
}

impl MazeError for SearchError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            SearchError::StartEqualsGoal { .. } => "SEARCH_START_EQUALS_GOAL",
            SearchError::OutOfBounds { .. } => "SEARCH_OUT_OF_BOUNDS",
            SearchError::GoalBlocked { .. } => "SEARCH_GOAL_BLOCKED",
        }
    }
}

/// One routing query. Built fresh per call.
#[derive(Clone, Debug)]
pub struct SearchRequest<'v> {
    pub start: Cell,
    pub goal: Cell,
    pub algorithm: Algorithm,
    /// Adversary cells paired with their distance from the agent when observed.
    pub avoidance: Vec<(Cell, u32)>,
    pub cost: CostProfile,
    pub visits: Option<&'v BTreeMap<Cell, u32>>,
    /// Upper bound on expanded nodes. `None` runs to natural completion.
    pub max_expansions: Option<usize>,
}

impl<'v> SearchRequest<'v> {
    pub fn new(start: Cell, goal: Cell, algorithm: Algorithm) -> Self {
        Self {
            start,
            goal,
            algorithm,
            avoidance: Vec::new(),
            cost: CostProfile::UNIFORM,
            visits: None,
            max_expansions: None,
        }
    }

    #[must_use]
    pub fn avoiding(mut self, avoidance: impl IntoIterator<Item = (Cell, u32)>) -> Self {
        self.avoidance = avoidance.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: CostProfile) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn with_visits(mut self, visits: &'v BTreeMap<Cell, u32>) -> Self {
        self.visits = Some(visits);
        self
    }

    #[must_use]
    pub fn capped(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    pub fn validate<G: GridIndex + ?Sized>(&self, grid: &G) -> Result<(), SearchError> {
        if self.start == self.goal {
            return Err(SearchError::StartEqualsGoal { cell: self.start });
        }
        for cell in [self.start, self.goal] {
            if !grid.contains(cell) {
                return Err(SearchError::OutOfBounds { cell });
            }
        }
        if !grid.is_walkable(self.goal) {
            return Err(SearchError::GoalBlocked { cell: self.goal });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// Cells after the start up to and including the goal.
    pub path: Vec<Cell>,
    /// Nodes expanded while searching.
    pub expanded: usize,
    /// Accumulated step cost in tenths (hop count × [`UNIT`] for BFS/DFS).
    pub cost: u32,
}

impl SearchResult {
    pub fn empty(expanded: usize) -> Self {
        Self {
            path: Vec::new(),
            expanded,
            cost: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn first_step(&self) -> Option<Cell> {
        self.path.first().copied()
    }

    pub fn first_direction(&self, start: Cell) -> Option<Direction> {
        self.first_step()
            .and_then(|step| Direction::between(start, step))
    }
}

#[derive(Clone, Copy)]
struct Node {
    cell: Cell,
    cost: u32,
}

/// Routes `request.start` to `request.goal`.
pub fn search<G: GridIndex + ?Sized>(grid: &G, request: &SearchRequest<'_>) -> SearchResult {
    if let Err(err) = request.validate(grid) {
        tracing::trace!(code = err.error_code(), %err, "search skipped");
        return SearchResult::empty(0);
    }

    let discipline = request.algorithm.discipline();
    let weighted = request.algorithm.is_weighted();
    let heuristic = |cell: Cell| match request.algorithm {
        Algorithm::Astar => cell.manhattan(request.goal) * UNIT,
        _ => 0,
    };

    let mut frontier = Frontier::new(discipline);
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut best: HashMap<Cell, u32> = HashMap::new();
    let mut seen: HashSet<Cell> = HashSet::new();
    let mut expanded = 0;

    frontier.push(
        Node {
            cell: request.start,
            cost: 0,
        },
        heuristic(request.start),
    );
    best.insert(request.start, 0);
    seen.insert(request.start);

    while let Some(node) = frontier.pop() {
        // Stale heap entry: a cheaper route to this cell was queued later.
        if weighted && best.get(&node.cell).is_some_and(|b| node.cost > *b) {
            continue;
        }

        if node.cell == request.goal {
            let path = reconstruct(&came_from, request.start, request.goal);
            tracing::trace!(
                algorithm = %request.algorithm,
                steps = path.len(),
                expanded,
                "search reached goal"
            );
            return SearchResult {
                path,
                expanded,
                cost: node.cost,
            };
        }

        if request.max_expansions.is_some_and(|cap| expanded >= cap) {
            tracing::debug!(
                algorithm = %request.algorithm,
                expanded,
                open = frontier.len(),
                "search hit expansion cap"
            );
            return SearchResult::empty(expanded);
        }
        expanded += 1;

        for (next, _) in grid.neighbors(node.cell) {
            if weighted {
                let step = request
                    .cost
                    .step_cost(grid, next, &request.avoidance, request.visits);
                let cost = node.cost + step;
                if best.get(&next).is_none_or(|b| cost < *b) {
                    best.insert(next, cost);
                    came_from.insert(next, node.cell);
                    frontier.push(Node { cell: next, cost }, cost + heuristic(next));
                }
            } else if seen.insert(next) {
                came_from.insert(next, node.cell);
                frontier.push(
                    Node {
                        cell: next,
                        cost: node.cost + UNIT,
                    },
                    0,
                );
            }
        }
    }

    SearchResult::empty(expanded)
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, start: Cell, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(previous) = came_from.get(&current) {
        if *previous == start {
            break;
        }
        path.push(*previous);
        current = *previous;
    }
    path.reverse();
    path
}

/// Capped breadth-first flood from `start`, returning the path to the first
/// cell (other than `start`) accepted by `accept`.
///
/// Used by exploratory scans that have no single goal.
pub fn nearest<G, F>(grid: &G, start: Cell, cap: usize, mut accept: F) -> Option<SearchResult>
where
    G: GridIndex + ?Sized,
    F: FnMut(Cell, usize) -> bool,
{
    let mut frontier = Frontier::new(Discipline::Fifo);
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut seen: HashSet<Cell> = HashSet::from([start]);
    let mut expanded = 0;
    frontier.push((start, 0_usize), 0);

    while let Some((cell, depth)) = frontier.pop() {
        if cell != start && accept(cell, depth) {
            let path = reconstruct(&came_from, start, cell);
            return Some(SearchResult {
                cost: path.len() as u32 * UNIT,
                path,
                expanded,
            });
        }
        if expanded >= cap {
            break;
        }
        expanded += 1;
        for (next, _) in grid.neighbors(cell) {
            if seen.insert(next) {
                came_from.insert(next, cell);
                frontier.push((next, depth + 1), 0);
            }
        }
    }
    None
}

/// Capped breadth-first scan returning the route to the reached cell with the
/// lowest `rank`.
///
/// Cells are ranked in the order the scan reaches them, so ties go to the
/// nearest cell. At most `cap` cells are expanded.
pub fn lowest<G, K, F>(grid: &G, start: Cell, cap: usize, mut rank: F) -> Option<SearchResult>
where
    G: GridIndex + ?Sized,
    K: Ord,
    F: FnMut(Cell) -> K,
{
    let mut frontier = Frontier::new(Discipline::Fifo);
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut seen: HashSet<Cell> = HashSet::from([start]);
    let mut best: Option<(K, Cell)> = None;
    let mut expanded = 0;
    frontier.push(start, 0);

    while let Some(cell) = frontier.pop() {
        if cell != start {
            let key = rank(cell);
            if best.as_ref().is_none_or(|(lowest, _)| key < *lowest) {
                best = Some((key, cell));
            }
        }
        if expanded >= cap {
            break;
        }
        expanded += 1;
        for (next, _) in grid.neighbors(cell) {
            if seen.insert(next) {
                came_from.insert(next, cell);
                frontier.push(next, 0);
            }
        }
    }

    let (_, goal) = best?;
    let path = reconstruct(&came_from, start, goal);
    Some(SearchResult {
        cost: path.len() as u32 * UNIT,
        path,
        expanded,
    })
}

/// Per-algorithm outcome of [`compare`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlgorithmReport {
    pub algorithm: Algorithm,
    pub path_length: usize,
    pub expanded: usize,
    pub elapsed: Duration,
}

/// Runs every algorithm with uniform cost between the same endpoints.
pub fn compare<G: GridIndex + ?Sized>(grid: &G, start: Cell, goal: Cell) -> Vec<AlgorithmReport> {
    Algorithm::ALL
        .into_iter()
        .map(|algorithm| {
            let request = SearchRequest::new(start, goal, algorithm);
            let started = Instant::now();
            let result = search(grid, &request);
            let elapsed = started.elapsed();
            AlgorithmReport {
                algorithm,
                path_length: result.len(),
                expanded: result.expanded,
                elapsed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_core::{Grid, Layout};

    fn maze() -> Grid {
        Layout::from_rows(&[
            "#########",
            "#   #   #",
            "# # # # #",
            "# #   # #",
            "# ##### #",
            "#       #",
            "#########",
        ])
        .unwrap()
        .grid
    }

    fn hops(grid: &Grid, start: Cell, goal: Cell) -> usize {
        nearest(grid, start, usize::MAX, |cell, _| cell == goal)
            .map_or(0, |route| route.len())
    }

    #[test]
    fn bfs_is_hop_optimal() {
        let grid = maze();
        let start = Cell::new(1, 1);
        for goal in grid.walkable_cells().filter(|c| *c != start) {
            let result = search(&grid, &SearchRequest::new(start, goal, Algorithm::Bfs));
            assert_eq!(result.len(), hops(&grid, start, goal), "goal {goal}");
            assert_eq!(result.path.last(), Some(&goal));
        }
    }

    #[test]
    fn paths_are_contiguous_and_exclude_start() {
        let grid = maze();
        let start = Cell::new(1, 1);
        let goal = Cell::new(7, 1);
        for algorithm in Algorithm::ALL {
            let result = search(&grid, &SearchRequest::new(start, goal, algorithm));
            assert!(!result.path.contains(&start), "{algorithm}");
            let mut previous = start;
            for cell in &result.path {
                assert_eq!(previous.manhattan(*cell), 1, "{algorithm}");
                assert!(grid.is_walkable(*cell));
                previous = *cell;
            }
        }
    }

    #[test]
    fn start_equals_goal_is_empty_for_every_algorithm() {
        let grid = maze();
        let cell = Cell::new(3, 3);
        for algorithm in Algorithm::ALL {
            let request = SearchRequest::new(cell, cell, algorithm);
            assert!(search(&grid, &request).is_empty());
            assert_eq!(
                request.validate(&grid),
                Err(SearchError::StartEqualsGoal { cell })
            );
        }
    }

    #[test]
    fn unreachable_goals_are_empty() {
        let grid = maze();
        let start = Cell::new(1, 1);
        for algorithm in Algorithm::ALL {
            let wall = search(&grid, &SearchRequest::new(start, Cell::new(0, 0), algorithm));
            assert!(wall.is_empty());
            let outside = search(&grid, &SearchRequest::new(start, Cell::new(40, 2), algorithm));
            assert!(outside.is_empty());
        }

        let mut island = maze();
        for cell in [Cell::new(3, 2), Cell::new(4, 3)] {
            island.set_wall(cell, true);
        }
        for algorithm in Algorithm::ALL {
            let result = search(&island, &SearchRequest::new(start, Cell::new(3, 3), algorithm));
            assert!(result.is_empty(), "{algorithm}");
            assert!(result.expanded > 0);
        }
    }

    #[test]
    fn informed_searches_never_lose_to_dfs() {
        let grid = maze();
        let cells: Vec<Cell> = grid.walkable_cells().collect();
        for &start in &cells {
            for &goal in &cells {
                if start == goal {
                    continue;
                }
                let len = |algorithm| search(&grid, &SearchRequest::new(start, goal, algorithm)).len();
                let dfs = len(Algorithm::Dfs);
                assert!(len(Algorithm::Astar) <= dfs);
                assert!(len(Algorithm::Bfs) <= dfs);
                assert_eq!(len(Algorithm::Astar), len(Algorithm::Bfs));
                assert_eq!(len(Algorithm::Ucs), len(Algorithm::Bfs));
            }
        }
    }

    #[test]
    fn danger_cost_routes_around_adversary() {
        let grid = Layout::from_rows(&[
            "#######",
            "#     #",
            "# ### #",
            "#     #",
            "#######",
        ])
        .unwrap()
        .grid;
        let start = Cell::new(1, 1);
        let goal = Cell::new(5, 3);
        let adversary = Cell::new(3, 1);

        let plain = search(&grid, &SearchRequest::new(start, goal, Algorithm::Ucs));
        assert_eq!(plain.first_direction(start), Some(Direction::Down));

        // Both routes take six steps; the surcharge keeps the path off the adversary's row.
        let biased = search(
            &grid,
            &SearchRequest::new(start, goal, Algorithm::Astar)
                .avoiding([(adversary, 2)])
                .with_cost(CostProfile::adversarial()),
        );
        assert_eq!(biased.len(), 6);
        assert!(!biased.path.contains(&adversary));
    }

    #[test]
    fn expansion_cap_bounds_work() {
        let grid = Grid::bordered(30, 30).unwrap();
        let request =
            SearchRequest::new(Cell::new(1, 1), Cell::new(28, 28), Algorithm::Bfs).capped(20);
        let result = search(&grid, &request);
        assert!(result.is_empty());
        assert_eq!(result.expanded, 20);
    }

    #[test]
    fn nearest_finds_closest_accepted_cell() {
        let grid = maze();
        let found = nearest(&grid, Cell::new(1, 1), 500, |cell, _| cell == Cell::new(3, 1)).unwrap();
        assert_eq!(found.path, vec![Cell::new(2, 1), Cell::new(3, 1)]);
        assert!(nearest(&grid, Cell::new(1, 1), 500, |_, _| false).is_none());
    }

    #[test]
    fn lowest_prefers_rank_then_distance() {
        let grid = Grid::bordered(9, 3).unwrap();
        let start = Cell::new(4, 1);
        // Equal rank everywhere: the first cell reached wins.
        let tie = lowest(&grid, start, 100, |_| 0).unwrap();
        assert_eq!(tie.len(), 1);

        let far = lowest(&grid, start, 100, |cell| u32::from(cell != Cell::new(7, 1))).unwrap();
        assert_eq!(far.path.last(), Some(&Cell::new(7, 1)));
        assert_eq!(far.len(), 3);
    }

    #[test]
    fn lowest_stops_at_the_expansion_cap() {
        let grid = Grid::bordered(200, 200).unwrap();
        let found = lowest(&grid, Cell::new(100, 100), 500, |cell| cell.x).unwrap();
        assert_eq!(found.expanded, 500);
        assert!(found.len() <= 20);
    }

    #[test]
    fn compare_reports_every_algorithm() {
        let grid = maze();
        let reports = compare(&grid, Cell::new(1, 1), Cell::new(7, 5));
        assert_eq!(reports.len(), 4);
        let bfs = reports.iter().find(|r| r.algorithm == Algorithm::Bfs).unwrap();
        for report in &reports {
            assert!(report.path_length >= bfs.path_length);
            assert!(report.expanded > 0);
        }
    }
}
