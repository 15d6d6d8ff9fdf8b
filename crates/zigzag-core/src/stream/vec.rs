use crate::{
    error::InternalError,
    key::{KeyBuffer, KeyComparator, ProjectionBuffer},
    stream::{IndexStreamIterator, IndexStreamOptions, StreamAdvance, StreamOptionsError},
};

///
/// IndexEntry
///
/// One materialized index entry: its key prefix, projections, and the
/// document it points at.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexEntry<V, D> {
    pub document: D,
    pub key: Vec<V>,
    pub projections: Vec<V>,
}

impl<V, D> IndexEntry<V, D> {
    #[must_use]
    pub const fn new(document: D, key: Vec<V>, projections: Vec<V>) -> Self {
        Self {
            document,
            key,
            projections,
        }
    }
}

///
/// VecIndexStream
///
/// In-memory sorted index cursor. Entries are ordered once at construction
/// (stable, so equal keys keep input order); seeks gallop forward from the
/// current position and never move backwards.
///

#[derive(Debug)]
pub struct VecIndexStream<V, D, C> {
    entries: Vec<IndexEntry<V, D>>,
    cursor: usize,
    comparator: C,
}

impl<V, D, C> VecIndexStream<V, D, C>
where
    C: KeyComparator<V>,
{
    /// Build a cursor from already-split index entries.
    #[must_use]
    pub fn from_entries(mut entries: Vec<IndexEntry<V, D>>, comparator: C) -> Self {
        entries.sort_by(|left, right| comparator.compare(&left.key, &right.key));

        Self {
            entries,
            cursor: 0,
            comparator,
        }
    }

    /// Build a cursor from physical rows, splitting each row into key and
    /// projection slots according to `options`.
    pub fn from_rows(
        rows: Vec<(D, Vec<V>)>,
        options: &IndexStreamOptions,
        comparator: C,
    ) -> Result<Self, InternalError>
    where
        V: Clone,
    {
        let row_width = rows.first().map_or_else(
            || {
                options
                    .used_key_fields
                    .iter()
                    .chain(options.projected_fields.iter())
                    .max()
                    .map_or(0, |field| field + 1)
            },
            |(_, row)| row.len(),
        );
        options.validate(row_width)?;

        let mut entries = Vec::with_capacity(rows.len());
        for (index, (document, row)) in rows.into_iter().enumerate() {
            if row.len() != row_width {
                return Err(StreamOptionsError::RowWidthMismatch {
                    row: index,
                    expected: row_width,
                    found: row.len(),
                }
                .into());
            }

            entries.push(IndexEntry::new(
                document,
                options.extract_key(&row),
                options.extract_projections(&row),
            ));
        }

        Ok(Self::from_entries(entries, comparator))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries at or after the current position.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.entries.len().saturating_sub(self.cursor)
    }

    // Locate the first entry at or after the cursor whose key is not below
    // `target`: exponential probing followed by a binary search of the last gap.
    fn gallop_to(&self, target: &[V]) -> usize {
        let below =
            |entry: &IndexEntry<V, D>| self.comparator.compare(&entry.key, target).is_lt();
        let len = self.entries.len();

        let mut lo = self.cursor;
        let mut hi = self.cursor;
        let mut step = 1usize;
        while hi < len && below(&self.entries[hi]) {
            lo = hi + 1;
            hi = self.cursor.saturating_add(step);
            step = step.saturating_mul(2);
        }
        let hi = hi.min(len);

        lo + self.entries[lo..hi].partition_point(below)
    }
}

impl<V, D, C> IndexStreamIterator for VecIndexStream<V, D, C>
where
    V: Clone,
    D: Clone,
    C: KeyComparator<V>,
{
    type Value = V;
    type DocumentId = D;

    fn position(&mut self, key: &mut KeyBuffer<V>) -> Result<bool, InternalError> {
        let Some(entry) = self.entries.get(self.cursor) else {
            return Ok(false);
        };
        key.write_from_slice(&entry.key)?;

        Ok(true)
    }

    fn seek(&mut self, key: &mut KeyBuffer<V>) -> Result<bool, InternalError> {
        self.cursor = self.gallop_to(key.as_slice());

        self.position(key)
    }

    fn load(&mut self, projections: &mut ProjectionBuffer<V>) -> Result<D, InternalError> {
        let Some(entry) = self.entries.get(self.cursor) else {
            return Err(InternalError::stream_invariant(
                "cannot load a document from an exhausted index stream",
            ));
        };
        projections.write_from_slice(&entry.projections)?;

        Ok(entry.document.clone())
    }

    fn advance(
        &mut self,
        key: &mut KeyBuffer<V>,
        projections: &mut ProjectionBuffer<V>,
    ) -> Result<StreamAdvance<D>, InternalError> {
        if self.cursor >= self.entries.len() {
            return Ok(StreamAdvance::IteratorExhausted);
        }
        self.cursor += 1;

        let Some(entry) = self.entries.get(self.cursor) else {
            return Ok(StreamAdvance::IteratorExhausted);
        };

        if self.comparator.compare(&entry.key, key.as_slice()).is_eq() {
            projections.write_from_slice(&entry.projections)?;
            return Ok(StreamAdvance::HasMore(entry.document.clone()));
        }
        key.write_from_slice(&entry.key)?;

        Ok(StreamAdvance::RangeExhausted)
    }

    fn reset(&mut self) -> Result<(), InternalError> {
        self.cursor = 0;

        Ok(())
    }
}
