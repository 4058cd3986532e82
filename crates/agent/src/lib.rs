//! Decision and pathfinding core for maze-chase agents.
//!
//! Each decision tick the [`StrategyEngine`] asks [`threat`] how dangerous
//! the neighbourhood is, asks [`targeting`] what is worth chasing, routes
//! there with [`search`] and commits a direction into the agent's
//! [`maze_core::AgentState`]. The motion controller in `maze-core` carries
//! that commitment out frame by frame.
//!
//! # Modules
//!
//! - [`search`]: BFS, DFS, uniform-cost and A* over one generic driver
//! - [`threat`]: adversary distances, danger flag, predicted occupancy
//! - [`targeting`]: weighted target scoring with an unreachable-target blacklist
//! - [`strategy`]: priority cascade built from behavior trees, plus the
//!   strategy registry and anti-stuck override

pub mod config;
pub mod search;
pub mod strategy;
pub mod targeting;
pub mod threat;

pub use config::{EscapeConfig, StrategyConfig, TargetWeights, ThreatConfig};
pub use search::{
    Algorithm, AlgorithmReport, CostProfile, SearchError, SearchRequest, SearchResult, compare,
    search,
};
pub use strategy::{
    Decision, DecisionAction, PowerTier, SearchStats, StrategyEngine, StrategyKind, StrategyProfile,
};
pub use targeting::{Target, TargetKind, TargetPolicy, TargetSelector, maze_corners};
pub use threat::{AdversarySighting, ThreatAssessment, ThreatSnapshot, pursuit_path};
