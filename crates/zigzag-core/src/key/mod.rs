//! Module: key
//! Responsibility: key comparator policy and owned fixed-width slot buffers.
//! Does not own: cursor traversal or merge control flow.
//! Boundary: every key the merger retains lives in a `SlotBuffer` it owns.

mod buffer;
mod order;


pub use buffer::{KeyBuffer, ProjectionBuffer, SlotBuffer};
pub use order::{KeyComparator, OrderedKeyComparator};
