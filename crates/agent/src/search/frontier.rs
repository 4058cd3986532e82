use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// Order in which discovered nodes are expanded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Discipline {
    Fifo,
    Lifo,
    /// Lowest priority first, insertion order among equals.
    Priority,
}

/// Heap entry ordered as a min-heap on `(priority, seq)`.
pub(crate) struct Ranked<T> {
    priority: u32,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Open set shared by every search in the crate.
pub(crate) enum Frontier<T> {
    Fifo(VecDeque<T>),
    Lifo(Vec<T>),
    Priority { heap: BinaryHeap<Ranked<T>>, seq: u64 },
}

impl<T> Frontier<T> {
    pub(crate) fn new(discipline: Discipline) -> Self {
        match discipline {
            Discipline::Fifo => Frontier::Fifo(VecDeque::new()),
            Discipline::Lifo => Frontier::Lifo(Vec::new()),
            Discipline::Priority => Frontier::Priority {
                heap: BinaryHeap::new(),
                seq: 0,
            },
        }
    }

    /// `priority` is ignored by the FIFO and LIFO disciplines.
    pub(crate) fn push(&mut self, item: T, priority: u32) {
        match self {
            Frontier::Fifo(queue) => queue.push_back(item),
            Frontier::Lifo(stack) => stack.push(item),
            Frontier::Priority { heap, seq } => {
                heap.push(Ranked {
                    priority,
                    seq: *seq,
                    item,
                });
                *seq += 1;
            }
        }
    }

    pub(crate) fn pop(&mut self) -> Option<T> {
        match self {
            Frontier::Fifo(queue) => queue.pop_front(),
            Frontier::Lifo(stack) => stack.pop(),
            Frontier::Priority { heap, .. } => heap.pop().map(|ranked| ranked.item),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Frontier::Fifo(queue) => queue.len(),
            Frontier::Lifo(stack) => stack.len(),
            Frontier::Priority { heap, .. } => heap.len(),
        }
    }
}
