//! Shorthand constructors returning boxed nodes.

use crate::{Action, Condition, Inverter, Node, Selector, Sequence, Traced};

#[inline]
pub fn sequence<'a, C: 'a>(children: Vec<Node<'a, C>>) -> Node<'a, C> {
    Box::new(Sequence::new(children))
}

#[inline]
pub fn selector<'a, C: 'a>(children: Vec<Node<'a, C>>) -> Node<'a, C> {
    Box::new(Selector::new(children))
}

#[inline]
pub fn inverter<'a, C: 'a>(child: Node<'a, C>) -> Node<'a, C> {
    Box::new(Inverter::new(child))
}

#[inline]
pub fn traced<'a, C: 'a>(label: &'static str, child: Node<'a, C>) -> Node<'a, C> {
    Box::new(Traced::new(label, child))
}

/// Wraps a predicate as a condition node.
#[inline]
pub fn condition<'a, C, F>(predicate: F) -> Node<'a, C>
where
    C: 'a,
    F: Fn(&C) -> bool + Send + Sync + 'a,
{
    Box::new(Condition::new(predicate))
}

/// Wraps a committing routine as an action node.
#[inline]
pub fn action<'a, C, F>(run: F) -> Node<'a, C>
where
    C: 'a,
    F: Fn(&mut C) -> bool + Send + Sync + 'a,
{
    Box::new(Action::new(run))
}
