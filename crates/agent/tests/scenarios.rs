//! End-to-end decision scenarios: engine plus motion controller on real grids.

use maze_agent::{
    AdversarySighting, Algorithm, DecisionAction, SearchRequest, StrategyConfig, StrategyEngine,
    StrategyKind, maze_corners, search,
};
use maze_core::{AgentState, Cell, Grid, GridIndex, Layout, MotionController, MotionOutcome};

/// 19×11 maze that is solid wall except for row 5, x = 4..=14.
fn corridor() -> Grid {
    let rows: Vec<String> = (0..11)
        .map(|y| {
            (0..19)
                .map(|x| match (x, y) {
                    (14, 5) => '.',
                    (4..=13, 5) => ' ',
                    _ => '#',
                })
                .collect()
        })
        .collect();
    Layout::from_rows(rows.as_slice()).unwrap().grid
}

fn engine(kind: StrategyKind) -> StrategyEngine {
    StrategyEngine::new(kind, StrategyConfig::new(), 42)
}

#[test]
fn corridor_route_is_ten_hops_for_bfs_and_astar() {
    let grid = corridor();
    let start = Cell::new(4, 5);
    let goal = Cell::new(14, 5);
    for algorithm in [Algorithm::Bfs, Algorithm::Astar] {
        let result = search(&grid, &SearchRequest::new(start, goal, algorithm));
        assert_eq!(result.len(), 10, "{algorithm}");
        assert_eq!(result.path.last(), Some(&goal));
    }
}

#[test]
fn start_equal_to_goal_yields_empty_route() {
    let grid = corridor();
    let cell = Cell::new(6, 5);
    for algorithm in Algorithm::ALL {
        assert!(search(&grid, &SearchRequest::new(cell, cell, algorithm)).is_empty());
    }
}

#[test]
fn adjacent_adversary_triggers_escape_to_a_farther_cell() {
    let grid = Grid::bordered(11, 11).unwrap();
    let mut agent = AgentState::new(Cell::new(5, 5), 3);
    let adversary = Cell::new(5, 4);
    let sightings = [AdversarySighting::new(adversary, Some(maze_core::Direction::Down))];

    let decision = engine(StrategyKind::Reflex).decide(&grid, &mut agent, &sightings);
    assert_eq!(decision.action, DecisionAction::Escape);
    let first = decision.path[0];
    assert!(first.manhattan(adversary) > agent.position.manhattan(adversary));
    assert_eq!(agent.next_waypoint(), Some(first));
}

#[test]
fn everything_blacklisted_still_commits_a_direction() {
    let grid = Layout::from_rows(&["#########", "#  . . .#", "#########"])
        .unwrap()
        .grid;
    let mut agent = AgentState::new(Cell::new(1, 1), 3);
    for pellet in grid.pellets().clone() {
        agent.blacklist(pellet);
    }

    let decision = engine(StrategyKind::SimpleBfs).decide(&grid, &mut agent, &[]);
    assert_eq!(decision.action, DecisionAction::Collect);
    let target = decision.target.unwrap();
    assert!(target.from_blacklist);
    assert_eq!(target.cell, Cell::new(7, 1));
    assert_eq!(decision.direction, Some(maze_core::Direction::Right));
}

#[test]
fn anti_stuck_override_forces_a_legal_direction() {
    let grid = Grid::bordered(7, 7).unwrap();
    let mut agent = AgentState::new(Cell::new(3, 3), 3);
    agent.direction = Some(maze_core::Direction::Left);
    agent.stuck_ticks = 100;

    let mut engine = engine(StrategyKind::Reflex);
    let decision = engine.tick(&grid, &mut agent, &[]).unwrap();
    assert_eq!(decision.action, DecisionAction::Unstick);
    let direction = decision.direction.unwrap();
    assert_ne!(direction, maze_core::Direction::Left);
    assert!(grid.is_walkable(agent.position.step(direction)));
    assert_eq!(agent.direction, Some(direction));
    assert_eq!(agent.stuck_ticks, 0);
}

#[test]
fn decisions_follow_the_cadence() {
    let grid = Grid::bordered(9, 9).unwrap();
    let mut agent = AgentState::new(Cell::new(4, 4), 3);
    let mut engine = engine(StrategyKind::Explorer);

    // Idle agents decide immediately.
    assert!(engine.tick(&grid, &mut agent, &[]).is_some());
    agent.direction = Some(maze_core::Direction::Up);
    let interval = engine.config().decision_interval;
    let decided = (0..interval)
        .filter(|_| engine.tick(&grid, &mut agent, &[]).is_some())
        .count();
    assert_eq!(decided, 1);
}

#[test]
fn agent_clears_pellets_on_the_reference_maze() {
    let layout = Layout::reference().unwrap();
    let mut grid = layout.grid;
    let initial = grid.remaining();
    let mut agent = AgentState::new(layout.agent_spawns[0], 3);
    let mut engine = engine(StrategyKind::SimpleBfs);
    let motion = MotionController::new(engine.config().motion);

    for _ in 0..2_000 {
        engine.tick(&grid, &mut agent, &[]);
        let outcome = motion.advance(&mut grid, &mut agent);
        assert_ne!(outcome, MotionOutcome::NoLegalMove);
        assert!(grid.is_walkable(agent.position));
        assert!((0.0..1.0).contains(&agent.progress));
    }

    assert!(agent.score >= 100, "score {}", agent.score);
    assert!(grid.remaining() < initial);
    assert!(engine.stats().decisions > 0);
}

#[test]
fn corner_tour_visits_every_corner() {
    let mut grid = Grid::bordered(9, 7).unwrap();
    let corners = maze_corners(&grid);
    assert_eq!(corners.len(), 4);

    let mut agent = AgentState::new(Cell::new(4, 3), 3);
    let mut engine = engine(StrategyKind::Corners);
    let motion = MotionController::new(engine.config().motion);

    for _ in 0..2_000 {
        if corners.iter().all(|corner| agent.visit_count(*corner) > 0) {
            break;
        }
        engine.tick(&grid, &mut agent, &[]);
        motion.advance(&mut grid, &mut agent);
    }

    for corner in &corners {
        assert!(agent.visit_count(*corner) > 0, "corner {corner} never visited");
    }
}
