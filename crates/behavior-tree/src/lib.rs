//! Behavior tree nodes evaluated once per decision tick.
//!
//! Agents in a real-time maze re-plan on a fixed cadence rather than every
//! frame. Each evaluation walks the tree from the root exactly once and every
//! node reports `Success` or `Failure` immediately; there is no `Running`
//! state because motion between decisions is handled outside the tree.
//!
//! # Architecture
//!
//! - [`Behavior`]: Core trait for all nodes
//! - [`Status`]: Success or Failure
//! - Composite nodes: [`Sequence`], [`Selector`]
//! - Decorator nodes: [`Inverter`], [`Traced`]
//! - Leaf nodes: [`Condition`], [`Action`] wrapping plain functions
//!
//! A priority cascade is a [`Selector`] whose children are tried in order;
//! the first child that commits to something ends the evaluation.

pub mod behavior;
pub mod builder;
pub mod composite;
pub mod decorator;
pub mod leaf;
pub mod status;

pub use behavior::{Behavior, Node};
pub use composite::{Selector, Sequence};
pub use decorator::{Inverter, Traced};
pub use leaf::{Action, Condition};
pub use status::Status;
