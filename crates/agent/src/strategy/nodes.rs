//! Condition and action nodes of the strategy cascade.
//!
//! Conditions only read the [`DecisionContext`]. Actions try to commit a
//! decision and return `Success` only when they did, so a Selector falls
//! through to the next branch otherwise.

use behavior_tree::{Behavior, Status};
use maze_core::{Cell, Direction};
use rand::distributions::{Distribution, WeightedIndex};

use super::escape::EscapePlanner;
use super::{DecisionAction, DecisionContext, PowerTier};
use crate::search::{self, Algorithm, SearchRequest};
use crate::targeting::{Target, TargetKind, TargetSelector, maze_corners};

/// An adversary is inside the strategy's danger radius and the agent cannot
/// shrug it off.
///
/// Empowerment protects only above the cautious power tier.
pub struct InDanger;

impl Behavior<DecisionContext<'_>> for InDanger {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        if !ctx.threat.immediate_danger || ctx.agent.is_invincible() {
            return Status::Failure;
        }
        let relying_on_power = ctx.agent.is_empowered()
            && PowerTier::of(ctx.agent.power_timer, ctx.config) != PowerTier::Cautious;
        Status::from_bool(!relying_on_power)
    }
}

pub struct IsEmpowered;

impl Behavior<DecisionContext<'_>> for IsEmpowered {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        Status::from_bool(ctx.agent.is_empowered())
    }
}

/// Flees along the best-scoring escape route.
pub struct Escape;

impl Behavior<DecisionContext<'_>> for Escape {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        let planner = EscapePlanner::new(ctx.config.escape);
        let Some(path) = planner.plan(ctx.grid, &ctx.threat, ctx.origin) else {
            return Status::Failure;
        };
        tracing::debug!(
            origin = %ctx.origin,
            min_distance = ctx.threat.min_distance(),
            first = %path[0],
            "escaping"
        );
        Status::from_bool(ctx.commit(DecisionAction::Escape, path, None))
    }
}

/// Races to the nearest power pellet when an adversary is pressing or the
/// maze is nearly cleared, provided the agent gets there first.
///
/// The race is in ticks: the agent's route length against every adversary's
/// Manhattan distance to the pellet, each at its own speed.
pub struct SeekPower;

impl Behavior<DecisionContext<'_>> for SeekPower {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        if ctx.grid.power_pellets().is_empty() {
            return Status::Failure;
        }
        let pressed = ctx.threat.within(ctx.config.threat.elevated_radius);
        let endgame = ctx.grid.remaining() <= ctx.config.endgame_remaining;
        if !pressed && !endgame {
            return Status::Failure;
        }

        let grid = ctx.grid;
        let power = grid.power_pellets();
        let Some(route) = search::nearest(grid, ctx.origin, ctx.config.exploration_cap, |cell, _| {
            power.contains(&cell)
        }) else {
            return Status::Failure;
        };
        let route = ctx.account(route);
        let Some(&pellet) = route.path.last() else {
            return Status::Failure;
        };

        let ours = ctx.agent_ticks(route.len() as u32);
        let wins_race = ctx
            .threat
            .distances
            .iter()
            .map(|(adversary, _)| ctx.adversary_ticks(adversary.manhattan(pellet)))
            .all(|theirs| ours < theirs);
        if !wins_race {
            tracing::debug!(%pellet, steps = route.len(), "power pellet race lost");
            return Status::Failure;
        }

        let target = Target {
            cell: pellet,
            kind: TargetKind::PowerPellet,
            score: 0.0,
            from_blacklist: false,
        };
        Status::from_bool(ctx.commit(DecisionAction::SeekPower, route.path, Some(target)))
    }
}

/// Chases the nearest frightened adversary the remaining power can cover.
pub struct Hunt;

impl Behavior<DecisionContext<'_>> for Hunt {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        if !ctx.agent.is_empowered() {
            return Status::Failure;
        }
        let range = match PowerTier::of(ctx.agent.power_timer, ctx.config) {
            PowerTier::Aggressive => ctx.config.hunting_range,
            PowerTier::Balanced => ctx.config.hunting_range / 2,
            PowerTier::Cautious => return Status::Failure,
        };

        let mut prey: Vec<(Cell, u32)> = ctx
            .threat
            .huntable
            .iter()
            .copied()
            .filter(|(_, d)| *d <= range)
            .collect();
        prey.sort_by_key(|(_, d)| *d);

        let power_left = ctx.agent.power_timer as f32;
        let margin = ctx.config.hunt_margin as f32;
        let cost = ctx.profile.cost(ctx.config);

        for (cell, distance) in prey {
            if power_left <= ctx.agent_ticks(distance) + margin {
                continue;
            }
            let request = SearchRequest::new(ctx.origin, cell, Algorithm::Astar)
                .avoiding(ctx.threat.distances.iter().copied())
                .with_cost(cost);
            let result = search::search(ctx.grid, &request);
            let result = ctx.account(result);
            if result.is_empty() {
                continue;
            }
            let target = Target {
                cell,
                kind: TargetKind::Adversary,
                score: 0.0,
                from_blacklist: false,
            };
            return Status::from_bool(ctx.commit(DecisionAction::Hunt, result.path, Some(target)));
        }
        Status::Failure
    }
}

/// Routes to the selector's best target with the strategy's algorithm,
/// blacklisting targets that turn out unreachable.
pub struct Collect;

impl Behavior<DecisionContext<'_>> for Collect {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        let policy = ctx.profile.policy(ctx.config.weights);
        let cost = ctx.profile.cost(ctx.config);
        let mut rejected: Vec<Cell> = Vec::new();

        for _ in 0..ctx.config.collect_retries {
            let selector = TargetSelector::new(policy).excluding(&rejected);
            let Some(target) = selector.select(ctx.grid, ctx.agent, &ctx.threat, ctx.origin) else {
                return Status::Failure;
            };

            let result = {
                let mut request = SearchRequest::new(ctx.origin, target.cell, ctx.profile.algorithm)
                    .with_cost(cost)
                    .with_visits(ctx.agent.visits());
                if ctx.profile.avoid {
                    request = request.avoiding(ctx.threat.distances.iter().copied());
                }
                search::search(ctx.grid, &request)
            };
            let result = ctx.account(result);

            if result.is_empty() {
                if target.kind != TargetKind::Adversary && !target.from_blacklist {
                    ctx.agent.blacklist(target.cell);
                }
                rejected.push(target.cell);
                continue;
            }
            return Status::from_bool(ctx.commit(DecisionAction::Collect, result.path, Some(target)));
        }
        tracing::debug!(tried = rejected.len(), "no reachable target");
        Status::Failure
    }
}

/// Tours the maze corners, routing with A* to the nearest one not visited yet.
///
/// Visits come from the agent's history, so a reset restarts the tour.
pub struct VisitCorners;

impl Behavior<DecisionContext<'_>> for VisitCorners {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        let origin = ctx.origin;
        let mut pending: Vec<Cell> = maze_corners(ctx.grid)
            .into_iter()
            .filter(|corner| *corner != origin && ctx.agent.visit_count(*corner) == 0)
            .collect();
        pending.sort_by_key(|corner| corner.manhattan(origin));

        let cost = ctx.profile.cost(ctx.config);
        for corner in pending {
            let request = SearchRequest::new(origin, corner, Algorithm::Astar).with_cost(cost);
            let result = search::search(ctx.grid, &request);
            let result = ctx.account(result);
            if result.is_empty() {
                continue;
            }
            tracing::debug!(%corner, steps = result.len(), "touring corners");
            let target = Target {
                cell: corner,
                kind: TargetKind::Corner,
                score: 0.0,
                from_blacklist: false,
            };
            return Status::from_bool(ctx.commit(DecisionAction::Corner, result.path, Some(target)));
        }
        Status::Failure
    }
}

/// Heads for the least-visited reachable cell, nearest first on ties.
pub struct Explore;

impl Behavior<DecisionContext<'_>> for Explore {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        let agent = &*ctx.agent;
        let found = search::lowest(ctx.grid, ctx.origin, ctx.config.exploration_cap, |cell| {
            agent.visit_count(cell)
        });
        let Some(route) = found else {
            return Status::Failure;
        };
        let route = ctx.account(route);
        Status::from_bool(ctx.commit(DecisionAction::Explore, route.path, None))
    }
}

/// Random legal step, weighted against reversing and against recent cells.
///
/// Fails only when the origin has no legal neighbour.
pub struct Wander;

impl Wander {
    const BASE_WEIGHT: u32 = 10;
    const REVERSE_WEIGHT: u32 = 2;
}

impl Behavior<DecisionContext<'_>> for Wander {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        let legal = ctx.legal_directions();
        if legal.is_empty() {
            return Status::Failure;
        }
        let reverse = ctx.agent.direction.map(Direction::opposite);
        let weights: Vec<u32> = legal
            .iter()
            .map(|direction| {
                let weight = if Some(*direction) == reverse {
                    Self::REVERSE_WEIGHT
                } else {
                    Self::BASE_WEIGHT
                };
                let repeats = ctx.agent.recent.occurrences(ctx.origin.step(*direction));
                (weight / (1 + repeats as u32)).max(1)
            })
            .collect();

        let direction = match WeightedIndex::new(&weights) {
            Ok(index) => legal[index.sample(&mut *ctx.rng)],
            Err(_) => legal[0],
        };
        Status::from_bool(ctx.commit_direction(DecisionAction::Explore, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyConfig;
    use crate::strategy::{Decision, StrategyKind};
    use crate::threat::{AdversarySighting, ThreatAssessment};
    use maze_core::{AgentState, Grid, GridIndex, Layout};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn run<B: for<'a> Behavior<DecisionContext<'a>>>(
        node: &B,
        grid: &Grid,
        agent: &mut AgentState,
        adversaries: &[AdversarySighting],
        kind: StrategyKind,
    ) -> (Status, Option<Decision>) {
        let config = StrategyConfig::new();
        let mut rng = StdRng::seed_from_u64(1);
        let profile = kind.profile();
        let origin = agent.position;
        let threat =
            ThreatAssessment::new(config.threat).assess(grid, origin, adversaries, profile.danger_radius);
        let mut ctx = DecisionContext {
            grid,
            agent,
            adversaries,
            threat,
            config: &config,
            profile,
            strategy: kind,
            origin,
            rng: &mut rng,
            expanded: 0,
            decision: None,
        };
        let status = node.tick(&mut ctx);
        (status, ctx.decision)
    }

    #[test]
    fn power_protects_only_above_cautious_tier() {
        let grid = Grid::bordered(9, 9).unwrap();
        let adversary = [AdversarySighting::new(Cell::new(4, 5), None)];
        let mut agent = AgentState::new(Cell::new(4, 4), 3);

        let (status, _) = run(&InDanger, &grid, &mut agent, &adversary, StrategyKind::Reflex);
        assert!(status.is_success());

        agent.power_timer = 200;
        let (status, _) = run(&InDanger, &grid, &mut agent, &adversary, StrategyKind::Reflex);
        assert!(status.is_failure());

        agent.power_timer = 30;
        let (status, _) = run(&InDanger, &grid, &mut agent, &adversary, StrategyKind::Reflex);
        assert!(status.is_success());
    }

    #[test]
    fn unreachable_target_is_blacklisted_and_next_one_tried() {
        // (1,1) is sealed off from the agent's corridor.
        let grid = Layout::from_rows(&["#########", "#.#  . .#", "#########"])
            .unwrap()
            .grid;
        let mut agent = AgentState::new(Cell::new(3, 1), 3);

        let (status, decision) = run(&Collect, &grid, &mut agent, &[], StrategyKind::SimpleBfs);
        assert!(status.is_success());
        let decision = decision.unwrap();
        assert_eq!(decision.action, DecisionAction::Collect);
        assert_eq!(decision.target.map(|t| t.cell), Some(Cell::new(5, 1)));
        assert!(agent.is_blacklisted(Cell::new(1, 1)));
    }

    #[test]
    fn seek_power_needs_to_win_the_race() {
        let grid = Layout::from_rows(&["###########", "#o        #", "###########"])
            .unwrap()
            .grid;
        let mut agent = AgentState::new(Cell::new(4, 1), 3);

        let far = [AdversarySighting::new(Cell::new(8, 1), None)];
        let (status, decision) = run(&SeekPower, &grid, &mut agent, &far, StrategyKind::Reflex);
        assert!(status.is_success());
        assert_eq!(decision.unwrap().path.last(), Some(&Cell::new(1, 1)));

        let near_pellet = [AdversarySighting::new(Cell::new(2, 1), None)];
        let (status, _) = run(&SeekPower, &grid, &mut agent, &near_pellet, StrategyKind::Reflex);
        assert!(status.is_failure());

        // A trailing adversary is close to the agent but far from the pellet.
        let trailing = [AdversarySighting::new(Cell::new(6, 1), None)];
        let (status, _) = run(&SeekPower, &grid, &mut agent, &trailing, StrategyKind::Reflex);
        assert!(status.is_success());
    }

    #[test]
    fn hunt_requires_power_and_range() {
        let grid = Grid::bordered(12, 5).unwrap();
        let prey = [AdversarySighting::new(Cell::new(6, 2), None).frightened()];
        let mut agent = AgentState::new(Cell::new(2, 2), 3);

        let (status, _) = run(&Hunt, &grid, &mut agent, &prey, StrategyKind::SmartHunter);
        assert!(status.is_failure());

        agent.power_timer = 250;
        let (status, decision) = run(&Hunt, &grid, &mut agent, &prey, StrategyKind::SmartHunter);
        assert!(status.is_success());
        let decision = decision.unwrap();
        assert_eq!(decision.action, DecisionAction::Hunt);
        assert_eq!(decision.path.last(), Some(&Cell::new(6, 2)));

        // Balanced tier halves the range to four cells.
        agent.power_timer = 150;
        let far = [AdversarySighting::new(Cell::new(9, 2), None).frightened()];
        let (status, _) = run(&Hunt, &grid, &mut agent, &far, StrategyKind::SmartHunter);
        assert!(status.is_failure());
    }

    #[test]
    fn explore_heads_for_unvisited_cells() {
        let grid = Layout::from_rows(&["#######", "#     #", "#######"]).unwrap().grid;
        let mut agent = AgentState::new(Cell::new(1, 1), 3);
        for x in 2..=4 {
            agent.record_arrival(Cell::new(x, 1));
        }
        agent.record_arrival(Cell::new(3, 1));

        let (status, decision) = run(&Explore, &grid, &mut agent, &[], StrategyKind::Explorer);
        assert!(status.is_success());
        assert_eq!(decision.unwrap().path.last(), Some(&Cell::new(5, 1)));
    }

    #[test]
    fn explore_ignores_visited_cells_far_away() {
        let grid = Grid::bordered(40, 40).unwrap();
        let mut agent = AgentState::new(Cell::new(30, 30), 3);
        for x in 1..=14 {
            for y in 1..=38 {
                agent.record_arrival(Cell::new(x, y));
            }
        }
        agent.record_arrival(Cell::new(30, 30));

        let (status, decision) = run(&Explore, &grid, &mut agent, &[], StrategyKind::Explorer);
        assert!(status.is_success());
        let goal = *decision.unwrap().path.last().unwrap();
        assert_eq!(agent.visit_count(goal), 0);
        assert_eq!(goal.manhattan(Cell::new(30, 30)), 1);
    }

    #[test]
    fn corner_tour_skips_visited_corners() {
        let grid = Grid::bordered(9, 7).unwrap();
        let mut agent = AgentState::new(Cell::new(2, 2), 3);

        let (status, decision) = run(&VisitCorners, &grid, &mut agent, &[], StrategyKind::Corners);
        assert!(status.is_success());
        let decision = decision.unwrap();
        assert_eq!(decision.action, DecisionAction::Corner);
        assert_eq!(decision.path.last(), Some(&Cell::new(1, 1)));

        agent.record_arrival(Cell::new(1, 1));
        agent.record_arrival(Cell::new(2, 2));
        let (_, decision) = run(&VisitCorners, &grid, &mut agent, &[], StrategyKind::Corners);
        assert_eq!(decision.unwrap().path.last(), Some(&Cell::new(1, 5)));

        for corner in [Cell::new(7, 1), Cell::new(1, 5), Cell::new(7, 5)] {
            agent.record_arrival(corner);
        }
        let (status, _) = run(&VisitCorners, &grid, &mut agent, &[], StrategyKind::Corners);
        assert!(status.is_failure());
    }

    #[test]
    fn wander_always_commits_a_legal_step() {
        let grid = Grid::bordered(5, 5).unwrap();
        let mut agent = AgentState::new(Cell::new(2, 2), 3);
        agent.direction = Some(Direction::Up);

        let (status, decision) = run(&Wander, &grid, &mut agent, &[], StrategyKind::Reflex);
        assert!(status.is_success());
        let direction = decision.unwrap().direction.unwrap();
        assert!(grid.is_walkable(Cell::new(2, 2).step(direction)));
    }
}
