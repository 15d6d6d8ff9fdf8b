//! Module: config
//! Responsibility: merger runtime policy selected by the owning query executor.
//! Does not own: which columns form keys (see `stream::IndexStreamOptions`).

use crate::{direction::Direction, key::OrderedKeyComparator};
use serde::{Deserialize, Serialize};

///
/// CONSTANTS
///

/// Default initial capacity reserved for each stream's run buffer.
pub const DEFAULT_RUN_BUFFER_CAPACITY: usize = 8;

///
/// MergerConfig
///
/// Policy knobs for one merger instance. Every field has a default so
/// partial documents decode.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct MergerConfig {
    /// Traversal direction all participating cursors iterate in.
    pub direction: Direction,

    /// Detect cursors that break key monotonicity or buffer arity and fail
    /// with an invariant violation instead of producing undefined output.
    pub check_monotonicity: bool,

    /// Initial capacity of each per-stream run buffer.
    pub run_buffer_capacity: usize,
}

impl MergerConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            direction: Direction::Asc,
            check_monotonicity: true,
            run_buffer_capacity: DEFAULT_RUN_BUFFER_CAPACITY,
        }
    }

    #[must_use]
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub const fn with_check_monotonicity(mut self, check_monotonicity: bool) -> Self {
        self.check_monotonicity = check_monotonicity;
        self
    }

    #[must_use]
    pub const fn with_run_buffer_capacity(mut self, run_buffer_capacity: usize) -> Self {
        self.run_buffer_capacity = run_buffer_capacity;
        self
    }

    /// Comparator over `Ord` slot values matching this config's direction.
    #[must_use]
    pub const fn comparator(&self) -> OrderedKeyComparator {
        OrderedKeyComparator::from_direction(self.direction)
    }
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self::new()
    }
}
