//! Core runtime for zigzag: the multi-way sorted-index stream merger, the
//! index cursor contract it consumes, and the key/value vocabulary shared by
//! both.
#![warn(unreachable_pub)]

pub mod config;
pub mod direction;
pub mod error;
pub mod key;
pub mod merge;
pub mod obs;
pub mod stream;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains the vocabulary needed to build and drive a merger.
/// No metrics or error internals are re-exported here.
///

pub mod prelude {
    pub use crate::{
        config::MergerConfig,
        direction::Direction,
        key::{KeyBuffer, KeyComparator, OrderedKeyComparator, ProjectionBuffer},
        merge::{IndexMerger, IndexMergerBuilder, StreamDescriptor},
        stream::{IndexStreamIterator, IndexStreamOptions, StreamAdvance, VecIndexStream},
        value::Value,
    };
}
