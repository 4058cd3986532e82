//! Complete cascades for every [`StrategyKind`].
//!
//! Trees are assembled from the nodes in `nodes` with the shorthand
//! constructors of [`behavior_tree::builder`]. Every top-level branch is
//! wrapped in a traced decorator so `RUST_LOG=behavior_tree=trace` shows
//! which branch committed.
//!
//! Each preset ends with `wander`, which succeeds whenever the origin has a
//! legal neighbour, so a cascade only commits nothing when the agent is
//! walled in.

use behavior_tree::{Behavior, Node};
use behavior_tree::builder::{condition, inverter, selector, sequence, traced};

use super::StrategyKind;
use super::context::DecisionContext;
use super::nodes::{
    Collect, Escape, Explore, Hunt, InDanger, IsEmpowered, SeekPower, VisitCorners, Wander,
};

/// Boxed cascade borrowing the same data as the context it evaluates.
pub type StrategyTree<'a> = Node<'a, DecisionContext<'a>>;

pub fn build<'a>(kind: StrategyKind) -> StrategyTree<'a> {
    match kind {
        StrategyKind::Reflex => reflex(),
        StrategyKind::SmartHunter => smart_hunter(),
        StrategyKind::SimpleBfs
        | StrategyKind::SimpleDfs
        | StrategyKind::SimpleUcs
        | StrategyKind::SimpleAstar => simple(),
        StrategyKind::Explorer => explorer(),
        StrategyKind::Corners => corners(),
    }
}

// ============================================================================
// Branches
// ============================================================================

fn leaf<'a, B>(node: B) -> StrategyTree<'a>
where
    B: Behavior<DecisionContext<'a>> + 'a,
{
    Box::new(node)
}

fn escape_when_threatened<'a>() -> StrategyTree<'a> {
    traced(
        "escape",
        sequence(vec![leaf(InDanger), leaf(Escape)]),
    )
}

fn seek_power_unless_empowered<'a>() -> StrategyTree<'a> {
    traced(
        "seek_power",
        sequence(vec![inverter(leaf(IsEmpowered)), leaf(SeekPower)]),
    )
}

fn hunt<'a>() -> StrategyTree<'a> {
    traced("hunt", leaf(Hunt))
}

fn collect<'a>() -> StrategyTree<'a> {
    traced(
        "collect",
        sequence(vec![
            condition(|ctx: &DecisionContext<'a>| !ctx.grid.is_cleared()),
            leaf(Collect),
        ]),
    )
}

fn explore<'a>() -> StrategyTree<'a> {
    traced("explore", leaf(Explore))
}

fn visit_corners<'a>() -> StrategyTree<'a> {
    traced("corners", leaf(VisitCorners))
}

fn wander<'a>() -> StrategyTree<'a> {
    traced("wander", leaf(Wander))
}

// ============================================================================
// Presets
// ============================================================================

/// Escape, power race, hunt, collect, explore.
pub fn reflex<'a>() -> StrategyTree<'a> {
    selector(vec![
        escape_when_threatened(),
        seek_power_unless_empowered(),
        hunt(),
        collect(),
        explore(),
        wander(),
    ])
}

/// Like [`reflex`] without the power race; power pellets are reached through
/// their target weight instead.
pub fn smart_hunter<'a>() -> StrategyTree<'a> {
    selector(vec![
        escape_when_threatened(),
        hunt(),
        collect(),
        explore(),
        wander(),
    ])
}

/// Escape, then nearest collectible with the strategy's own algorithm.
pub fn simple<'a>() -> StrategyTree<'a> {
    selector(vec![escape_when_threatened(), collect(), wander()])
}

pub fn explorer<'a>() -> StrategyTree<'a> {
    selector(vec![escape_when_threatened(), explore(), wander()])
}

/// Escape, then the corner tour, then nearest collectible once every corner
/// has been visited.
pub fn corners<'a>() -> StrategyTree<'a> {
    selector(vec![escape_when_threatened(), visit_corners(), collect(), wander()])
}
