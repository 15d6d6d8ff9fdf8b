use serde::{Deserialize, Serialize};

///
/// Direction
///
/// Traversal direction shared by index cursors and the merge comparator.
/// Every participating cursor must iterate in the merger's direction.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}
