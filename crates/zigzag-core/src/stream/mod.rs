//! Module: stream
//! Responsibility: index cursor contract consumed by the merger, plus the
//! column-mapping options and an in-memory reference cursor.
//! Does not own: merge control flow or key retention policy.
//! Boundary: storage engines implement `IndexStreamIterator`; the merger only
//! ever talks to cursors through it.

mod contracts;
mod options;
mod vec;


pub use contracts::{IndexStreamIterator, StreamAdvance};
pub use options::{IndexStreamOptions, StreamOptionsError};
pub use vec::{IndexEntry, VecIndexStream};
