use crate::{
    error::InternalError,
    key::{KeyBuffer, KeyComparator, ProjectionBuffer},
    stream::IndexStreamIterator,
};

///
/// StreamDescriptor
///
/// One participating index: the cursor the merger takes ownership of, plus
/// the number of projection values each of its entries carries.
///

#[derive(Debug)]
pub struct StreamDescriptor<I> {
    pub(super) iterator: I,
    projection_count: usize,
}

impl<I> StreamDescriptor<I> {
    #[must_use]
    pub const fn new(iterator: I, projection_count: usize) -> Self {
        Self {
            iterator,
            projection_count,
        }
    }

    #[must_use]
    pub const fn projection_count(&self) -> usize {
        self.projection_count
    }
}

///
/// RunBuffer
///
/// Collected streak for one stream. Projections are stored flat with a
/// fixed stride so clearing keeps every allocation for the next key.
///

#[derive(Debug)]
pub(super) struct RunBuffer<D, V> {
    documents: Vec<D>,
    projections: Vec<V>,
    stride: usize,
}

impl<D, V> RunBuffer<D, V> {
    pub(super) fn with_capacity(stride: usize, capacity: usize) -> Self {
        Self {
            documents: Vec::with_capacity(capacity),
            projections: Vec::with_capacity(capacity.saturating_mul(stride)),
            stride,
        }
    }

    pub(super) fn clear(&mut self) {
        self.documents.clear();
        self.projections.clear();
    }

    pub(super) const fn len(&self) -> usize {
        self.documents.len()
    }

    pub(super) fn push(&mut self, document: D, projections: &[V]) -> Result<(), InternalError>
    where
        V: Clone,
    {
        if projections.len() != self.stride {
            return Err(InternalError::stream_invariant(format!(
                "index stream produced {} projection values, expected {}",
                projections.len(),
                self.stride
            )));
        }

        self.documents.push(document);
        self.projections.extend_from_slice(projections);

        Ok(())
    }

    /// Document id and projections of the `index`th collected entry.
    pub(super) fn entry(&self, index: usize) -> Option<(&D, &[V])> {
        let document = self.documents.get(index)?;
        let start = index.checked_mul(self.stride)?;
        let projections = self.projections.get(start..start + self.stride)?;

        Some((document, projections))
    }
}

///
/// StreamState
///
/// Per-stream merge state. `key` is the scratch buffer handed to cursor
/// calls; `cached_key` is the retained snapshot, private to this stream,
/// and is the only key alignment ever compares.
///

pub(super) struct StreamState<I>
where
    I: IndexStreamIterator,
{
    pub(super) descriptor: StreamDescriptor<I>,
    pub(super) key: KeyBuffer<I::Value>,
    pub(super) cached_key: KeyBuffer<I::Value>,
    pub(super) projections: ProjectionBuffer<I::Value>,
    pub(super) run: RunBuffer<I::DocumentId, I::Value>,
    pub(super) positioned: bool,
    pub(super) exhausted: bool,
}

impl<I> StreamState<I>
where
    I: IndexStreamIterator,
{
    pub(super) fn new(
        descriptor: StreamDescriptor<I>,
        key_components: usize,
        run_capacity: usize,
    ) -> Self {
        let projection_count = descriptor.projection_count;

        Self {
            descriptor,
            key: KeyBuffer::new(key_components),
            cached_key: KeyBuffer::new(key_components),
            projections: ProjectionBuffer::new(projection_count),
            run: RunBuffer::with_capacity(projection_count, run_capacity),
            positioned: false,
            exhausted: false,
        }
    }

    // Snapshot the cursor's current key before this stream stops being the
    // active one. With `checked`, the snapshot must agree with the key the
    // cursor just reported into the scratch buffer.
    pub(super) fn retain_current_key<C>(
        &mut self,
        comparator: &C,
        checked: bool,
    ) -> Result<(), InternalError>
    where
        C: KeyComparator<I::Value>,
    {
        self.descriptor
            .iterator
            .cache_current_key(&mut self.cached_key)?;

        if checked {
            if !self.cached_key.is_filled() {
                return Err(InternalError::stream_invariant(format!(
                    "index stream cached a key of width {}, expected {}",
                    self.cached_key.len(),
                    self.cached_key.width()
                )));
            }
            if !comparator.compare(&self.cached_key, &self.key).is_eq() {
                return Err(InternalError::stream_invariant(
                    "index stream cached a key different from its reported position",
                ));
            }
        }
        self.positioned = true;

        Ok(())
    }

    // Forget all per-key state; buffers keep their allocations.
    pub(super) fn clear(&mut self) {
        self.key.clear();
        self.cached_key.clear();
        self.projections.clear();
        self.run.clear();
        self.positioned = false;
        self.exhausted = false;
    }
}
