//! Core behavior trait.

use crate::Status;

/// A node that can be evaluated against a decision context.
///
/// The context is the blackboard shared by every node of one evaluation.
/// Conditions read it, actions write their commitment into it.
pub trait Behavior<C>: Send + Sync {
    /// Evaluate this node once.
    fn tick(&self, ctx: &mut C) -> Status;
}

/// Boxed node borrowing data for `'a`.
///
/// Trees that read a borrowed blackboard are rebuilt per evaluation, so
/// nodes only need to live as long as the data they close over.
pub type Node<'a, C> = Box<dyn Behavior<C> + 'a>;

impl<C> Behavior<C> for Box<dyn Behavior<C> + '_> {
    #[inline]
    fn tick(&self, ctx: &mut C) -> Status {
        (**self).tick(ctx)
    }
}
