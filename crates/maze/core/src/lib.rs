//! Deterministic maze model shared by agents and the simulation driver.
//!
//! `maze-core` owns the grid (walls, pellets, power pellets), per-agent
//! motion state and the controller that turns a committed direction into
//! sub-cell movement. Nothing here decides *where* to go; that lives in
//! `maze-agent`.
pub mod agent;
pub mod cell;
pub mod config;
pub mod error;
pub mod grid;
pub mod layout;
pub mod motion;

pub use agent::{AgentState, RecentCells};
pub use cell::{Cell, Direction};
pub use config::{MotionConfig, ScoreTable};
pub use error::{ErrorSeverity, MazeError};
pub use grid::{CollectibleKind, Grid, GridDimensions, GridIndex, Neighbors, TileKind};
pub use layout::{Layout, LayoutError};
pub use motion::{MotionController, MotionError, MotionOutcome};
