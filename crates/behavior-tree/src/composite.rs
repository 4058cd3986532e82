//! Composite nodes: [`Sequence`] (AND) and [`Selector`] (OR / priority cascade).

use crate::{Behavior, Node, Status};

/// Runs children left to right and stops at the first `Failure`.
///
/// Used to guard an action with its preconditions:
/// `sequence([in_danger, escape])` only escapes when danger was detected.
pub struct Sequence<'a, C> {
    children: Vec<Node<'a, C>>,
}

impl<'a, C> Sequence<'a, C> {
    /// # Panics
    ///
    /// Panics if `children` is empty.
    pub fn new(children: Vec<Node<'a, C>>) -> Self {
        assert!(!children.is_empty(), "Sequence must have at least one child");
        Self { children }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<C> Behavior<C> for Sequence<'_, C> {
    fn tick(&self, ctx: &mut C) -> Status {
        for child in &self.children {
            if child.tick(ctx).is_failure() {
                return Status::Failure;
            }
        }
        Status::Success
    }
}

/// Runs children left to right and stops at the first `Success`.
///
/// Child order is priority order. A cascade such as
/// escape > power > hunt > collect > explore is a single selector whose
/// children appear in that order.
pub struct Selector<'a, C> {
    children: Vec<Node<'a, C>>,
}

impl<'a, C> Selector<'a, C> {
    /// # Panics
    ///
    /// Panics if `children` is empty.
    pub fn new(children: Vec<Node<'a, C>>) -> Self {
        assert!(!children.is_empty(), "Selector must have at least one child");
        Self { children }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<C> Behavior<C> for Selector<'_, C> {
    fn tick(&self, ctx: &mut C) -> Status {
        for child in &self.children {
            if child.tick(ctx).is_success() {
                return Status::Success;
            }
        }
        Status::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{action, condition, sequence};

    #[derive(Default)]
    struct Blackboard {
        danger: bool,
        trail: Vec<&'static str>,
    }

    fn record(name: &'static str, result: bool) -> Node<'static, Blackboard> {
        action(move |bb: &mut Blackboard| {
            bb.trail.push(name);
            result
        })
    }

    #[test]
    fn sequence_stops_at_first_failure() {
        let seq = Sequence::new(vec![
            record("check", true),
            record("plan", false),
            record("commit", true),
        ]);

        let mut bb = Blackboard::default();
        assert_eq!(seq.tick(&mut bb), Status::Failure);
        assert_eq!(bb.trail, vec!["check", "plan"]);
    }

    #[test]
    fn sequence_succeeds_when_every_child_does() {
        let seq = Sequence::new(vec![record("a", true), record("b", true)]);

        let mut bb = Blackboard::default();
        assert_eq!(seq.tick(&mut bb), Status::Success);
        assert_eq!(bb.trail.len(), 2);
    }

    #[test]
    fn selector_takes_highest_priority_branch_that_commits() {
        let cascade = Selector::new(vec![
            sequence(vec![
                condition(|bb: &Blackboard| bb.danger),
                record("escape", true),
            ]),
            record("collect", true),
            record("explore", true),
        ]);

        let mut calm = Blackboard::default();
        assert_eq!(cascade.tick(&mut calm), Status::Success);
        assert_eq!(calm.trail, vec!["collect"]);

        let mut threatened = Blackboard {
            danger: true,
            ..Default::default()
        };
        assert_eq!(cascade.tick(&mut threatened), Status::Success);
        assert_eq!(threatened.trail, vec!["escape"]);
    }

    #[test]
    fn selector_fails_when_no_branch_commits() {
        let sel = Selector::new(vec![record("a", false), record("b", false)]);

        let mut bb = Blackboard::default();
        assert_eq!(sel.tick(&mut bb), Status::Failure);
        assert_eq!(bb.trail, vec!["a", "b"]);
    }

    #[test]
    #[should_panic(expected = "Selector must have at least one child")]
    fn empty_selector_is_rejected() {
        let _ = Selector::<Blackboard>::new(Vec::new());
    }
}
