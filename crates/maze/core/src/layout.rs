//! ASCII maze layouts.
//!
//! | glyph | meaning |
//! |-------|---------|
//! | `#`   | wall |
//! | `.`   | pellet |
//! | `o`   | power pellet |
//! | ` ` `-` | open floor |
//! | `P`   | agent spawn (open floor) |
//! | `G`   | adversary spawn (open floor) |

use core::fmt;
use core::str::FromStr;

use crate::cell::Cell;
use crate::error::{ErrorSeverity, MazeError};
use crate::grid::{Grid, GridIndex, TileKind};

/// 19×11 maze with four power pellets, one agent spawn and two adversary
/// spawns in the central pocket.
pub const REFERENCE_LAYOUT: [&str; 11] = [
    "###################",
    "#o.......#.......o#",
    "#.##.###.#.###.##.#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#..G.G..#....#",
    "####.#.## ##.#.####",
    "#........P........#",
    "#.##.###.#.###.##.#",
    "#o.......#.......o#",
    "###################",
];

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,

    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown glyph {glyph:?} at {cell}")]
    UnknownGlyph { glyph: char, cell: Cell },

    #[error("expected {expected} tiles, found {found}")]
    TileCount { expected: usize, found: usize },
}

impl MazeError for LayoutError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            LayoutError::Empty => "LAYOUT_EMPTY",
            LayoutError::RaggedRow { .. } => "LAYOUT_RAGGED_ROW",
            LayoutError::UnknownGlyph { .. } => "LAYOUT_UNKNOWN_GLYPH",
            LayoutError::TileCount { .. } => "LAYOUT_TILE_COUNT",
        }
    }
}

/// Parsed maze plus the spawn points marked in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub grid: Grid,
    pub agent_spawns: Vec<Cell>,
    pub adversary_spawns: Vec<Cell>,
}

impl Layout {
    pub const WALL: char = '#';
    pub const PELLET: char = '.';
    pub const POWER_PELLET: char = 'o';
    pub const OPEN: char = ' ';
    pub const OPEN_ALT: char = '-';
    pub const AGENT_SPAWN: char = 'P';
    pub const ADVERSARY_SPAWN: char = 'G';

    pub fn reference() -> Result<Self, LayoutError> {
        Self::from_rows(&REFERENCE_LAYOUT)
    }

    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        let first = rows.first().ok_or(LayoutError::Empty)?;
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(LayoutError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        let mut agent_spawns = Vec::new();
        let mut adversary_spawns = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(LayoutError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let cell = Cell::new(x as i32, y as i32);
                let tile = match glyph {
                    Self::WALL => TileKind::Wall,
                    Self::PELLET => TileKind::Pellet,
                    Self::POWER_PELLET => TileKind::PowerPellet,
                    Self::OPEN | Self::OPEN_ALT => TileKind::Open,
                    Self::AGENT_SPAWN => {
                        agent_spawns.push(cell);
                        TileKind::Open
                    }
                    Self::ADVERSARY_SPAWN => {
                        adversary_spawns.push(cell);
                        TileKind::Open
                    }
                    other => return Err(LayoutError::UnknownGlyph { glyph: other, cell }),
                };
                tiles.push(tile);
            }
        }

        let grid = Grid::new(width as u32, rows.len() as u32, tiles)?;
        Ok(Self {
            grid,
            agent_spawns,
            adversary_spawns,
        })
    }

    /// Parses newline-separated rows. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        Self::from_rows(&rows)
    }
}

impl FromStr for Layout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims = self.dimensions();
        for y in 0..dims.height as i32 {
            for x in 0..dims.width as i32 {
                let glyph = match self.tile(Cell::new(x, y)) {
                    TileKind::Wall => Layout::WALL,
                    TileKind::Pellet => Layout::PELLET,
                    TileKind::PowerPellet => Layout::POWER_PELLET,
                    TileKind::Open => Layout::OPEN,
                };
                write!(f, "{glyph}")?;
            }
            if y + 1 < dims.height as i32 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_layout_is_19_by_11() {
        let layout = Layout::reference().unwrap();
        let dims = layout.grid.dimensions();
        assert_eq!((dims.width, dims.height), (19, 11));
        assert_eq!(layout.agent_spawns, vec![Cell::new(9, 7)]);
        assert_eq!(layout.adversary_spawns, vec![Cell::new(8, 5), Cell::new(10, 5)]);
        assert_eq!(layout.grid.power_pellets().len(), 4);
    }

    #[test]
    fn reference_border_is_wall() {
        let layout = Layout::reference().unwrap();
        let dims = layout.grid.dimensions();
        for x in 0..dims.width as i32 {
            assert!(!layout.grid.is_walkable(Cell::new(x, 0)));
            assert!(!layout.grid.is_walkable(Cell::new(x, dims.height as i32 - 1)));
        }
        for y in 0..dims.height as i32 {
            assert!(!layout.grid.is_walkable(Cell::new(0, y)));
            assert!(!layout.grid.is_walkable(Cell::new(dims.width as i32 - 1, y)));
        }
    }

    #[test]
    fn parse_skips_blank_lines_and_renders_back() {
        let text = "\n#####\n#o.P#\n#####\n";
        let layout: Layout = text.parse().unwrap();
        assert_eq!(layout.agent_spawns, vec![Cell::new(3, 1)]);
        assert_eq!(layout.grid.to_string(), "#####\n#o. #\n#####");
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Layout::from_rows(&["###", "#.", "###"]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
        assert_eq!(err.error_code(), "LAYOUT_RAGGED_ROW");
    }

    #[test]
    fn unknown_glyph_reports_its_cell() {
        let err = Layout::from_rows(&["#x#"]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::UnknownGlyph {
                glyph: 'x',
                cell: Cell::new(1, 0)
            }
        );
        assert_eq!(err.severity(), ErrorSeverity::Validation);
    }
}
