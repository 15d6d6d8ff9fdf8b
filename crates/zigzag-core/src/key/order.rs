//! Module: key::order
//! Responsibility: comparator policy for fixed-width key tuples.
//! Does not own: stream traversal mechanics.
//! Boundary: centralizes ASC/DESC comparison behavior for the merger and cursors.

use crate::direction::Direction;
use std::cmp::Ordering;

///
/// KeyComparator
///
/// Injected total order over key tuples. Both arguments always carry the
/// merger's key arity; implementations compare them lexicographically.
///

pub trait KeyComparator<V> {
    fn compare(&self, left: &[V], right: &[V]) -> Ordering;
}

impl<V, F> KeyComparator<V> for F
where
    F: Fn(&[V], &[V]) -> Ordering,
{
    fn compare(&self, left: &[V], right: &[V]) -> Ordering {
        self(left, right)
    }
}

///
/// OrderedKeyComparator
///
/// Comparator over `Ord` slot values. Keeps merge decisions comparator-driven
/// instead of branching on traversal direction at each call site.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OrderedKeyComparator {
    direction: Direction,
}

impl OrderedKeyComparator {
    #[must_use]
    pub const fn from_direction(direction: Direction) -> Self {
        Self { direction }
    }

    #[must_use]
    pub const fn direction(self) -> Direction {
        self.direction
    }

    // Human-readable direction label for invariant diagnostics.
    #[must_use]
    pub const fn order_label(self) -> &'static str {
        match self.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl<V> KeyComparator<V> for OrderedKeyComparator
where
    V: Ord,
{
    fn compare(&self, left: &[V], right: &[V]) -> Ordering {
        match self.direction {
            Direction::Asc => left.cmp(right),
            Direction::Desc => right.cmp(left),
        }
    }
}
