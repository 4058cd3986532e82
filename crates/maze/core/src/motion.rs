//! Sub-cell motion for agents.
//!
//! Decisions happen on a slower cadence than frames. Between decisions the
//! [`MotionController`] keeps the agent moving along its committed direction,
//! follows path waypoints, collects whatever it lands on and counts ticks
//! without progress so the strategy layer can detect a stuck agent.

use arrayvec::ArrayVec;

use crate::agent::AgentState;
use crate::cell::{Cell, Direction};
use crate::config::MotionConfig;
use crate::error::{ErrorSeverity, MazeError};
use crate::grid::{CollectibleKind, Grid, GridIndex};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MotionError {
    #[error("moving {direction} from {from} runs into a wall")]
    Blocked { from: Cell, direction: Direction },

    #[error("no walkable neighbor around {at}")]
    NoLegalMove { at: Cell },
}

impl MazeError for MotionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            MotionError::Blocked { .. } => "MOTION_BLOCKED",
            MotionError::NoLegalMove { .. } => "MOTION_NO_LEGAL_MOVE",
        }
    }
}

/// What happened to an agent during one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionOutcome {
    /// Still between cells.
    Moving { progress: f32 },
    /// Snapped onto a new cell.
    Arrived {
        cell: Cell,
        collected: Option<CollectibleKind>,
        points: u32,
    },
    /// The active direction leads into a wall; motion halted.
    Blocked { direction: Direction },
    /// No direction committed.
    Idle,
    /// Every neighbor is a wall.
    NoLegalMove,
}

impl MotionOutcome {
    /// True when the strategy layer should pick another direction now.
    pub fn needs_redirect(&self) -> bool {
        matches!(self, MotionOutcome::Blocked { .. } | MotionOutcome::Idle)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionController {
    config: MotionConfig,
}

impl MotionController {
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Legal directions out of `cell`, in compass order.
    pub fn legal_directions<G: GridIndex + ?Sized>(grid: &G, cell: Cell) -> ArrayVec<Direction, 4> {
        grid.neighbors(cell).into_iter().map(|(_, d)| d).collect()
    }

    /// Queues `direction` for the next commit window.
    ///
    /// Rejects directions that lead into a wall from the current cell.
    pub fn request<G: GridIndex + ?Sized>(
        &self,
        grid: &G,
        agent: &mut AgentState,
        direction: Direction,
    ) -> Result<(), MotionError> {
        if !grid.is_walkable(agent.position.step(direction)) {
            return Err(MotionError::Blocked {
                from: agent.position,
                direction,
            });
        }
        agent.pending = Some(direction);
        Ok(())
    }

    /// Replaces the active direction immediately, bypassing the commit window.
    ///
    /// Used by overrides (anti-stuck, blocked recovery). Progress restarts
    /// from the current cell.
    pub fn force<G: GridIndex + ?Sized>(
        &self,
        grid: &G,
        agent: &mut AgentState,
        direction: Direction,
    ) -> Result<(), MotionError> {
        if grid.degree(agent.position) == 0 {
            return Err(MotionError::NoLegalMove { at: agent.position });
        }
        if !grid.is_walkable(agent.position.step(direction)) {
            return Err(MotionError::Blocked {
                from: agent.position,
                direction,
            });
        }
        agent.direction = Some(direction);
        agent.pending = None;
        agent.progress = 0.0;
        agent.stuck_ticks = 0;
        Ok(())
    }

    /// Advances `agent` by one tick.
    pub fn advance(&self, grid: &mut Grid, agent: &mut AgentState) -> MotionOutcome {
        agent.tick_timers();

        self.steer_toward_waypoint(grid, agent);
        self.commit_pending(grid, agent);

        let Some(direction) = agent.direction else {
            agent.stuck_ticks += 1;
            return if grid.degree(agent.position) == 0 {
                MotionOutcome::NoLegalMove
            } else {
                MotionOutcome::Idle
            };
        };

        let next = agent.position.step(direction);
        if !grid.is_walkable(next) {
            agent.stuck_ticks += 1;
            agent.progress = 0.0;
            agent.direction = None;
            if grid.degree(agent.position) == 0 {
                return MotionOutcome::NoLegalMove;
            }
            tracing::debug!(at = %agent.position, %direction, "motion blocked");
            return MotionOutcome::Blocked { direction };
        }

        agent.progress += self.config.step_fraction();
        if agent.progress < 1.0 {
            agent.stuck_ticks += 1;
            return MotionOutcome::Moving {
                progress: agent.progress,
            };
        }

        agent.progress = 0.0;
        agent.record_arrival(next);
        agent.advance_waypoint(next);

        let collected = grid.take(next);
        let points = collected.map_or(0, |kind| kind.points(grid.scores()));
        agent.score += points;
        if collected == Some(CollectibleKind::PowerPellet) {
            agent.power_timer = self.config.power_duration;
            tracing::debug!(cell = %next, ticks = agent.power_timer, "agent empowered");
        }

        self.steer_toward_waypoint(grid, agent);

        MotionOutcome::Arrived {
            cell: next,
            collected,
            points,
        }
    }

    /// Queues the step toward the next path waypoint when it is adjacent.
    fn steer_toward_waypoint(&self, grid: &Grid, agent: &mut AgentState) {
        let Some(waypoint) = agent.next_waypoint() else {
            return;
        };
        match Direction::between(agent.position, waypoint) {
            Some(direction) if grid.is_walkable(waypoint) => {
                if agent.direction != Some(direction) {
                    agent.pending = Some(direction);
                }
            }
            // Off the path: drop it and let the next decision replan.
            _ => agent.clear_path(),
        }
    }

    fn commit_pending(&self, grid: &Grid, agent: &mut AgentState) {
        let Some(pending) = agent.pending else {
            return;
        };
        if agent.progress >= self.config.commit_threshold {
            return;
        }
        if grid.is_walkable(agent.position.step(pending)) {
            if agent.direction != Some(pending) {
                agent.progress = 0.0;
            }
            agent.direction = Some(pending);
            agent.pending = None;
        }
    }
}
