use std::collections::BTreeSet;

use arrayvec::ArrayVec;

use crate::cell::{Cell, Direction};
use crate::config::ScoreTable;
use crate::layout::LayoutError;

/// Static classification of a layout tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileKind {
    Open,
    Wall,
    Pellet,
    PowerPellet,
}

impl TileKind {
    pub fn is_walkable(self) -> bool {
        !matches!(self, TileKind::Wall)
    }

    pub fn collectible(self) -> Option<CollectibleKind> {
        match self {
            TileKind::Pellet => Some(CollectibleKind::Pellet),
            TileKind::PowerPellet => Some(CollectibleKind::PowerPellet),
            TileKind::Open | TileKind::Wall => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectibleKind {
    Pellet,
    PowerPellet,
}

impl CollectibleKind {
    pub fn points(self, table: &ScoreTable) -> u32 {
        match self {
            CollectibleKind::Pellet => table.pellet,
            CollectibleKind::PowerPellet => table.power_pellet,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridDimensions {
    pub width: u32,
    pub height: u32,
}

impl GridDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width as i32 && cell.y < self.height as i32
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Walkable neighbors of a cell, tagged with the step direction.
pub type Neighbors = ArrayVec<(Cell, Direction), 4>;

/// Read interface over a maze used by search, threat and targeting code.
///
/// Implementors only provide the primitive queries; neighbor enumeration is
/// derived so that every grid expands in [`Direction::ALL`] order.
pub trait GridIndex {
    fn dimensions(&self) -> GridDimensions;

    /// Out-of-bounds cells are never walkable.
    fn is_walkable(&self, cell: Cell) -> bool;

    fn collectible_at(&self, cell: Cell) -> Option<CollectibleKind>;

    fn pellets(&self) -> &BTreeSet<Cell>;

    fn power_pellets(&self) -> &BTreeSet<Cell>;

    fn contains(&self, cell: Cell) -> bool {
        self.dimensions().contains(cell)
    }

    fn neighbors(&self, cell: Cell) -> Neighbors {
        let mut out = Neighbors::new();
        for direction in Direction::ALL {
            let next = cell.step(direction);
            if self.is_walkable(next) {
                out.push((next, direction));
            }
        }
        out
    }

    /// Number of walkable neighbors: 3+ is an intersection, 1 a dead end.
    fn degree(&self, cell: Cell) -> usize {
        self.neighbors(cell).len()
    }

    fn remaining(&self) -> usize {
        self.pellets().len() + self.power_pellets().len()
    }

    fn is_cleared(&self) -> bool {
        self.remaining() == 0
    }
}

/// Mutable maze: fixed walls plus the live collectible sets.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    dimensions: GridDimensions,
    walls: Vec<bool>,
    pellets: BTreeSet<Cell>,
    power_pellets: BTreeSet<Cell>,
    initial_pellets: usize,
    initial_power_pellets: usize,
    scores: ScoreTable,
}

impl Grid {
    /// Builds a grid from row-major tiles.
    pub fn new(width: u32, height: u32, tiles: Vec<TileKind>) -> Result<Self, LayoutError> {
        let dimensions = GridDimensions::new(width, height);
        if dimensions.area() == 0 {
            return Err(LayoutError::Empty);
        }
        if tiles.len() != dimensions.area() {
            return Err(LayoutError::TileCount {
                expected: dimensions.area(),
                found: tiles.len(),
            });
        }

        let mut walls = Vec::with_capacity(tiles.len());
        let mut pellets = BTreeSet::new();
        let mut power_pellets = BTreeSet::new();
        for (index, tile) in tiles.into_iter().enumerate() {
            let cell = Cell::new((index % width as usize) as i32, (index / width as usize) as i32);
            walls.push(!tile.is_walkable());
            match tile.collectible() {
                Some(CollectibleKind::Pellet) => {
                    pellets.insert(cell);
                }
                Some(CollectibleKind::PowerPellet) => {
                    power_pellets.insert(cell);
                }
                None => {}
            }
        }

        Ok(Self {
            dimensions,
            walls,
            initial_pellets: pellets.len(),
            initial_power_pellets: power_pellets.len(),
            pellets,
            power_pellets,
            scores: ScoreTable::default(),
        })
    }

    /// Grid of the given size with a wall border and an open interior.
    pub fn bordered(width: u32, height: u32) -> Result<Self, LayoutError> {
        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let border = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
                tiles.push(if border { TileKind::Wall } else { TileKind::Open });
            }
        }
        Self::new(width, height, tiles)
    }

    #[must_use]
    pub fn with_scores(mut self, scores: ScoreTable) -> Self {
        self.scores = scores;
        self
    }

    pub fn scores(&self) -> &ScoreTable {
        &self.scores
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.dimensions
            .contains(cell)
            .then(|| cell.y as usize * self.dimensions.width as usize + cell.x as usize)
    }

    /// Current tile kind; out-of-bounds reads as a wall.
    pub fn tile(&self, cell: Cell) -> TileKind {
        match self.index(cell) {
            None => TileKind::Wall,
            Some(index) if self.walls[index] => TileKind::Wall,
            Some(_) if self.pellets.contains(&cell) => TileKind::Pellet,
            Some(_) if self.power_pellets.contains(&cell) => TileKind::PowerPellet,
            Some(_) => TileKind::Open,
        }
    }

    /// Turns a cell into a wall or back into open floor, dropping any
    /// collectible on it. Returns false for out-of-bounds cells.
    pub fn set_wall(&mut self, cell: Cell, wall: bool) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        self.walls[index] = wall;
        if wall {
            self.pellets.remove(&cell);
            self.power_pellets.remove(&cell);
        }
        true
    }

    /// Places a collectible on a walkable cell. Returns false if the cell is
    /// a wall or already holds a collectible.
    pub fn place(&mut self, cell: Cell, kind: CollectibleKind) -> bool {
        if !self.is_walkable(cell) || self.collectible_at(cell).is_some() {
            return false;
        }
        match kind {
            CollectibleKind::Pellet => self.pellets.insert(cell),
            CollectibleKind::PowerPellet => self.power_pellets.insert(cell),
        }
    }

    /// Removes every collectible, leaving the walls intact.
    pub fn clear_collectibles(&mut self) {
        self.pellets.clear();
        self.power_pellets.clear();
    }

    /// Removes the collectible at `cell` and reports what it was.
    pub fn take(&mut self, cell: Cell) -> Option<CollectibleKind> {
        if self.pellets.remove(&cell) {
            tracing::trace!(%cell, "pellet collected");
            Some(CollectibleKind::Pellet)
        } else if self.power_pellets.remove(&cell) {
            tracing::trace!(%cell, "power pellet collected");
            Some(CollectibleKind::PowerPellet)
        } else {
            None
        }
    }

    /// Removes the collectible at `cell` and returns its point value, or 0.
    pub fn collect(&mut self, cell: Cell) -> u32 {
        self.take(cell)
            .map_or(0, |kind| kind.points(&self.scores))
    }

    pub fn initial_pellets(&self) -> usize {
        self.initial_pellets
    }

    pub fn initial_power_pellets(&self) -> usize {
        self.initial_power_pellets
    }

    pub fn walkable_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let width = self.dimensions.width as usize;
        self.walls
            .iter()
            .enumerate()
            .filter(|(_, wall)| !**wall)
            .map(move |(index, _)| Cell::new((index % width) as i32, (index / width) as i32))
    }
}

impl GridIndex for Grid {
    fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    fn is_walkable(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|index| !self.walls[index])
    }

    fn collectible_at(&self, cell: Cell) -> Option<CollectibleKind> {
        if self.pellets.contains(&cell) {
            Some(CollectibleKind::Pellet)
        } else if self.power_pellets.contains(&cell) {
            Some(CollectibleKind::PowerPellet)
        } else {
            None
        }
    }

    fn pellets(&self) -> &BTreeSet<Cell> {
        &self.pellets
    }

    fn power_pellets(&self) -> &BTreeSet<Cell> {
        &self.power_pellets
    }
}
