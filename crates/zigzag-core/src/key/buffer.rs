use crate::error::InternalError;
use derive_more::Deref;

///
/// SlotBuffer
///
/// Owned, fixed-width buffer of slot values. Cursors write into it by copy;
/// nothing outside the owner can hold a borrow into it across calls, so one
/// stream's seek can never clobber another stream's retained key.
///

#[derive(Clone, Debug, Deref, Eq, PartialEq)]
pub struct SlotBuffer<V> {
    #[deref(forward)]
    slots: Vec<V>,
    width: usize,
}

/// Buffer holding the leading key components of one index entry.
pub type KeyBuffer<V> = SlotBuffer<V>;

/// Buffer holding the projected (non-key) values of one index entry.
pub type ProjectionBuffer<V> = SlotBuffer<V>;

impl<V> SlotBuffer<V> {
    /// Build an empty buffer that accepts exactly `width` values.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            slots: Vec::with_capacity(width),
            width,
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Whether the buffer currently holds a full tuple.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.slots.len() == self.width
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    #[must_use]
    pub fn as_slice(&self) -> &[V] {
        &self.slots
    }

    /// Overwrite the buffer with the values produced by `values`.
    ///
    /// The write is rejected (and the buffer left cleared) when the value
    /// count does not match the buffer width.
    pub fn write<I>(&mut self, values: I) -> Result<(), InternalError>
    where
        I: IntoIterator<Item = V>,
    {
        self.slots.clear();
        self.slots.extend(values);
        self.check_width()
    }

    /// Overwrite the buffer with a copy of `values`, reusing its allocation.
    pub fn write_from_slice(&mut self, values: &[V]) -> Result<(), InternalError>
    where
        V: Clone,
    {
        self.slots.clear();
        self.slots.extend_from_slice(values);
        self.check_width()
    }

    /// Overwrite the buffer with a copy of another buffer of the same width.
    pub fn copy_from(&mut self, other: &Self)
    where
        V: Clone,
    {
        debug_assert_eq!(self.width, other.width, "slot buffer width mismatch");
        self.slots.clone_from(&other.slots);
    }

    fn check_width(&mut self) -> Result<(), InternalError> {
        if self.slots.len() == self.width {
            return Ok(());
        }

        let found = self.slots.len();
        self.slots.clear();

        Err(InternalError::stream_invariant(format!(
            "slot buffer expects exactly {} values, cursor wrote {found}",
            self.width
        )))
    }
}
