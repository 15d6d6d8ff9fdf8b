//! Module: merge
//! Responsibility: zigzag intersection of N sorted index streams and
//! resumable cross-product emission of every matching entry combination.
//! Does not own: cursor implementations, key/projection column selection,
//! or the decision to run an index join at all.
//! Boundary: executors pull rows through `IndexMerger::next`.

mod align;
mod merger;
mod product;
mod state;
mod streak;

#[cfg(test)]
mod tests;

pub use merger::{IndexMerger, IndexMergerBuilder, MergeStats, MergerBuildError, MergerPhase};
pub use state::StreamDescriptor;
