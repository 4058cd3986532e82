//! Adversary controller.
//!
//! Adversaries move between cell centres like agents but never collect.
//! Direction is chosen only on arrival at a cell:
//!
//! - chasing: first step of a no-U-turn pursuit toward the nearest agent
//!   that can be hurt
//! - frightened (any agent empowered): a random forward move
//!
//! An eaten adversary is sent straight back to its home cell.

use maze_agent::threat::forward_moves;
use maze_agent::{AdversarySighting, pursuit_path};
use maze_core::{Cell, Direction, GridIndex, MotionConfig};
use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum GhostMode {
    Chase,
    Frightened,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ghost {
    pub id: usize,
    pub home: Cell,
    pub position: Cell,
    /// Fraction of the way to `position.step(heading)`.
    pub progress: f32,
    pub heading: Option<Direction>,
    pub mode: GhostMode,
}

impl Ghost {
    pub fn new(id: usize, home: Cell) -> Self {
        Self {
            id,
            home,
            position: home,
            progress: 0.0,
            heading: None,
            mode: GhostMode::Chase,
        }
    }

    /// What agents are allowed to see of this adversary.
    pub fn sighting(&self) -> AdversarySighting {
        let sighting = AdversarySighting::new(self.position, self.heading);
        match self.mode {
            GhostMode::Chase => sighting,
            GhostMode::Frightened => sighting.frightened(),
        }
    }

    pub fn respawn(&mut self) {
        tracing::debug!(ghost = self.id, home = %self.home, "ghost respawned");
        self.position = self.home;
        self.progress = 0.0;
        self.heading = None;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostController {
    motion: MotionConfig,
    lookahead: usize,
    cap: usize,
}

impl GhostController {
    pub fn new(motion: MotionConfig, lookahead: usize, cap: usize) -> Self {
        Self {
            motion,
            lookahead: lookahead.max(1),
            cap,
        }
    }

    /// Moves `ghost` by one tick. Returns the cell it arrived at, if any.
    ///
    /// `prey` are the cells of agents the ghost may chase.
    pub fn advance<G, R>(&self, grid: &G, ghost: &mut Ghost, prey: &[Cell], rng: &mut R) -> Option<Cell>
    where
        G: GridIndex + ?Sized,
        R: Rng + ?Sized,
    {
        if ghost.progress == 0.0 {
            ghost.heading = self.choose(grid, ghost, prey, rng);
        }
        let direction = ghost.heading?;
        let next = ghost.position.step(direction);
        if !grid.is_walkable(next) {
            ghost.heading = None;
            ghost.progress = 0.0;
            return None;
        }

        ghost.progress += self.motion.step_fraction();
        if ghost.progress < 1.0 {
            return None;
        }
        ghost.progress = 0.0;
        ghost.position = next;
        Some(next)
    }

    /// Direction out of the ghost's current cell.
    pub fn choose<G, R>(&self, grid: &G, ghost: &Ghost, prey: &[Cell], rng: &mut R) -> Option<Direction>
    where
        G: GridIndex + ?Sized,
        R: Rng + ?Sized,
    {
        let moves = forward_moves(grid, ghost.position, ghost.heading);
        if ghost.mode == GhostMode::Chase
            && let Some(target) = prey.iter().copied().min_by_key(|c| c.manhattan(ghost.position))
        {
            let path = pursuit_path(
                grid,
                ghost.position,
                ghost.heading,
                target,
                self.lookahead,
                self.cap,
            );
            if let Some(direction) = path
                .first()
                .and_then(|first| Direction::between(ghost.position, *first))
            {
                return Some(direction);
            }
        }
        moves.choose(rng).map(|(_, direction)| *direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_core::{Grid, Layout};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn controller() -> GhostController {
        GhostController::new(MotionConfig::adversary(), 16, 200)
    }

    #[test]
    fn chasing_ghost_heads_for_nearest_prey() {
        let grid = Grid::bordered(9, 9).unwrap();
        let ghost = Ghost::new(0, Cell::new(4, 4));
        let mut rng = StdRng::seed_from_u64(1);

        let direction = controller()
            .choose(&grid, &ghost, &[Cell::new(4, 1), Cell::new(7, 7)], &mut rng)
            .unwrap();
        assert_eq!(direction, Direction::Up);
    }

    #[test]
    fn frightened_ghost_never_reverses_in_a_corridor() {
        let grid = Layout::from_rows(&["#######", "#     #", "#######"]).unwrap().grid;
        let mut ghost = Ghost::new(0, Cell::new(3, 1));
        ghost.heading = Some(Direction::Right);
        ghost.mode = GhostMode::Frightened;
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..20 {
            let direction = controller().choose(&grid, &ghost, &[], &mut rng);
            assert_eq!(direction, Some(Direction::Right));
        }
    }

    #[test]
    fn ghost_crosses_a_cell_in_about_forty_ticks() {
        let grid = Grid::bordered(9, 9).unwrap();
        let mut ghost = Ghost::new(0, Cell::new(1, 4));
        let mut rng = StdRng::seed_from_u64(3);
        let prey = [Cell::new(7, 4)];

        let ticks = (1..=100)
            .find(|_| controller().advance(&grid, &mut ghost, &prey, &mut rng).is_some())
            .unwrap();
        assert!((39..=41).contains(&ticks), "arrived after {ticks} ticks");
        assert_eq!(ghost.position, Cell::new(2, 4));
    }

    #[test]
    fn respawn_returns_home_and_sighting_reflects_mode() {
        let mut ghost = Ghost::new(2, Cell::new(5, 5));
        ghost.position = Cell::new(1, 1);
        ghost.heading = Some(Direction::Left);
        ghost.mode = GhostMode::Frightened;
        assert!(ghost.sighting().frightened);

        ghost.respawn();
        assert_eq!(ghost.position, ghost.home);
        assert_eq!(ghost.heading, None);
    }
}
