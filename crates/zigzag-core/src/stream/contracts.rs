use crate::{
    error::InternalError,
    key::{KeyBuffer, ProjectionBuffer},
};

///
/// StreamAdvance
///
/// Outcome of moving an index cursor one entry forward.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StreamAdvance<D> {
    /// The new entry shares the key passed in; its document id is attached
    /// and its projections were written.
    HasMore(D),

    /// The new entry carries a different key, which was written back into
    /// the key buffer. No document is produced for this call.
    RangeExhausted,

    /// No entries remain at all.
    IteratorExhausted,
}

///
/// IndexStreamIterator
///
/// Pull-based cursor over one sorted index, as consumed by the merger.
///
/// Implementations must produce keys in non-decreasing order under the
/// merger's comparator. Keys and projections are always copied into the
/// caller-owned buffers; a cursor never hands out borrows of its own scratch
/// memory. Storage failures are reported through `Err`.
///

pub trait IndexStreamIterator {
    type Value;
    type DocumentId;

    /// Write the current key without advancing. Returns `false` when the
    /// cursor has nothing left.
    fn position(&mut self, key: &mut KeyBuffer<Self::Value>) -> Result<bool, InternalError>;

    /// Advance to the first entry whose key is not below the key held in
    /// `key`, then overwrite `key` with the key actually found. Returns
    /// `false` (cursor exhausted) if no such entry exists.
    fn seek(&mut self, key: &mut KeyBuffer<Self::Value>) -> Result<bool, InternalError>;

    /// Return the document id at the current position and write its
    /// projections. Does not advance.
    fn load(
        &mut self,
        projections: &mut ProjectionBuffer<Self::Value>,
    ) -> Result<Self::DocumentId, InternalError>;

    /// Move to the next entry, comparing its key against `key`.
    fn advance(
        &mut self,
        key: &mut KeyBuffer<Self::Value>,
        projections: &mut ProjectionBuffer<Self::Value>,
    ) -> Result<StreamAdvance<Self::DocumentId>, InternalError>;

    /// Copy the current key into `key`, storage the caller keeps private to
    /// this cursor while other cursors are being moved.
    fn cache_current_key(&mut self, key: &mut KeyBuffer<Self::Value>) -> Result<(), InternalError> {
        if self.position(key)? {
            Ok(())
        } else {
            Err(InternalError::stream_invariant(
                "cannot cache the current key of an exhausted index stream",
            ))
        }
    }

    /// Rewind to the first entry so the cursor can be consumed again.
    fn reset(&mut self) -> Result<(), InternalError> {
        Err(InternalError::stream_unsupported(
            "index stream does not support reset",
        ))
    }
}

impl<T> IndexStreamIterator for Box<T>
where
    T: IndexStreamIterator + ?Sized,
{
    type Value = T::Value;
    type DocumentId = T::DocumentId;

    fn position(&mut self, key: &mut KeyBuffer<Self::Value>) -> Result<bool, InternalError> {
        self.as_mut().position(key)
    }

    fn seek(&mut self, key: &mut KeyBuffer<Self::Value>) -> Result<bool, InternalError> {
        self.as_mut().seek(key)
    }

    fn load(
        &mut self,
        projections: &mut ProjectionBuffer<Self::Value>,
    ) -> Result<Self::DocumentId, InternalError> {
        self.as_mut().load(projections)
    }

    fn advance(
        &mut self,
        key: &mut KeyBuffer<Self::Value>,
        projections: &mut ProjectionBuffer<Self::Value>,
    ) -> Result<StreamAdvance<Self::DocumentId>, InternalError> {
        self.as_mut().advance(key, projections)
    }

    fn cache_current_key(&mut self, key: &mut KeyBuffer<Self::Value>) -> Result<(), InternalError> {
        self.as_mut().cache_current_key(key)
    }

    fn reset(&mut self) -> Result<(), InternalError> {
        self.as_mut().reset()
    }
}

impl<T> IndexStreamIterator for &mut T
where
    T: IndexStreamIterator + ?Sized,
{
    type Value = T::Value;
    type DocumentId = T::DocumentId;

    fn position(&mut self, key: &mut KeyBuffer<Self::Value>) -> Result<bool, InternalError> {
        (**self).position(key)
    }

    fn seek(&mut self, key: &mut KeyBuffer<Self::Value>) -> Result<bool, InternalError> {
        (**self).seek(key)
    }

    fn load(
        &mut self,
        projections: &mut ProjectionBuffer<Self::Value>,
    ) -> Result<Self::DocumentId, InternalError> {
        (**self).load(projections)
    }

    fn advance(
        &mut self,
        key: &mut KeyBuffer<Self::Value>,
        projections: &mut ProjectionBuffer<Self::Value>,
    ) -> Result<StreamAdvance<Self::DocumentId>, InternalError> {
        (**self).advance(key, projections)
    }

    fn cache_current_key(&mut self, key: &mut KeyBuffer<Self::Value>) -> Result<(), InternalError> {
        (**self).cache_current_key(key)
    }

    fn reset(&mut self) -> Result<(), InternalError> {
        (**self).reset()
    }
}
