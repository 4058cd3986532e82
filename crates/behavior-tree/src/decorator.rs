//! Decorator nodes wrapping a single child.

use crate::{Behavior, Node, Status};

/// Logical NOT of the child's result.
pub struct Inverter<'a, C> {
    child: Node<'a, C>,
}

impl<'a, C> Inverter<'a, C> {
    pub fn new(child: Node<'a, C>) -> Self {
        Self { child }
    }
}

impl<C> Behavior<C> for Inverter<'_, C> {
    fn tick(&self, ctx: &mut C) -> Status {
        self.child.tick(ctx).invert()
    }
}

/// Emits a `trace` event with the node label and the child's result.
///
/// The status passes through unchanged.
pub struct Traced<'a, C> {
    label: &'static str,
    child: Node<'a, C>,
}

impl<'a, C> Traced<'a, C> {
    pub fn new(label: &'static str, child: Node<'a, C>) -> Self {
        Self { label, child }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl<C> Behavior<C> for Traced<'_, C> {
    fn tick(&self, ctx: &mut C) -> Status {
        let status = self.child.tick(ctx);
        tracing::trace!(node = self.label, ?status, "behavior evaluated");
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::{Action, Condition};

    struct Counter {
        value: i32,
    }

    fn bump_then(result: bool) -> Node<'static, Counter> {
        Box::new(Action::new(move |c: &mut Counter| {
            c.value += 1;
            result
        }))
    }

    #[test]
    fn inverter_negates_condition() {
        let not_positive = Inverter::new(Box::new(Condition::new(|c: &Counter| c.value > 0)));

        assert_eq!(not_positive.tick(&mut Counter { value: 3 }), Status::Failure);
        assert_eq!(not_positive.tick(&mut Counter { value: -3 }), Status::Success);
    }

    #[test]
    fn traced_passes_status_through() {
        let traced = Traced::new("bump", bump_then(false));

        let mut counter = Counter { value: 0 };
        assert_eq!(traced.label(), "bump");
        assert_eq!(traced.tick(&mut counter), Status::Failure);
        assert_eq!(counter.value, 1);
    }
}
