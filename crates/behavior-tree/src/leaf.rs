//! Leaf nodes built from plain functions.
//!
//! Most agent behaviors are a predicate over the blackboard or a routine
//! that tries to commit a decision. Wrapping them as closures keeps the
//! node catalogue small.

use core::marker::PhantomData;

use crate::{Behavior, Status};

/// Read-only predicate node.
pub struct Condition<C, F> {
    predicate: F,
    _context: PhantomData<fn(&C)>,
}

impl<C, F> Condition<C, F>
where
    F: Fn(&C) -> bool + Send + Sync,
{
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            _context: PhantomData,
        }
    }
}

impl<C, F> Behavior<C> for Condition<C, F>
where
    F: Fn(&C) -> bool + Send + Sync,
{
    fn tick(&self, ctx: &mut C) -> Status {
        Status::from_bool((self.predicate)(ctx))
    }
}

/// Mutating node. Returns `true` when it committed something.
pub struct Action<C, F> {
    run: F,
    _context: PhantomData<fn(&mut C)>,
}

impl<C, F> Action<C, F>
where
    F: Fn(&mut C) -> bool + Send + Sync,
{
    pub fn new(run: F) -> Self {
        Self {
            run,
            _context: PhantomData,
        }
    }
}

impl<C, F> Behavior<C> for Action<C, F>
where
    F: Fn(&mut C) -> bool + Send + Sync,
{
    fn tick(&self, ctx: &mut C) -> Status {
        Status::from_bool((self.run)(ctx))
    }
}
