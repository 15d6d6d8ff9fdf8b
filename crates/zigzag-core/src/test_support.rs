//! Shared fixtures for merge tests: ordered cursors over `u64` keys, an
//! instrumented cursor wrapper, and row collection helpers.

use crate::{
    config::MergerConfig,
    direction::Direction,
    error::InternalError,
    key::{KeyBuffer, KeyComparator, OrderedKeyComparator, ProjectionBuffer},
    merge::IndexMerger,
    stream::{IndexEntry, IndexStreamIterator, StreamAdvance, VecIndexStream},
};
use std::{cell::RefCell, rc::Rc};

/// Document id: (stream number, entry ordinal within that stream).
pub(crate) type DocId = (usize, usize);

pub(crate) type TestStream = VecIndexStream<u64, DocId, OrderedKeyComparator>;

pub(crate) type Row = (Vec<DocId>, Vec<u64>);

/// Ascending cursor over single-component keys. Each entry projects its own
/// key so emitted rows can be checked for key agreement.
pub(crate) fn ordered_stream(stream: usize, keys: &[u64]) -> TestStream {
    let entries = keys
        .iter()
        .enumerate()
        .map(|(ordinal, key)| IndexEntry::new((stream, ordinal), vec![*key], vec![*key]))
        .collect();

    VecIndexStream::from_entries(
        entries,
        OrderedKeyComparator::from_direction(Direction::Asc),
    )
}

/// Merger over `ordered_stream`s with one key component and one projection each.
pub(crate) fn merger_over(streams: &[&[u64]]) -> IndexMerger<TestStream, OrderedKeyComparator> {
    let mut builder = IndexMerger::builder(1, OrderedKeyComparator::default());
    for (index, keys) in streams.iter().enumerate() {
        builder = builder.stream(ordered_stream(index, keys), 1);
    }

    builder.build().expect("test merger should build")
}

/// Drain a merger with a callback that always wants more.
pub(crate) fn collect_rows<I, C>(
    merger: &mut IndexMerger<I, C>,
) -> Vec<(Vec<I::DocumentId>, Vec<I::Value>)>
where
    I: IndexStreamIterator,
    I::Value: Clone,
    I::DocumentId: Clone,
    C: KeyComparator<I::Value>,
{
    let mut rows = Vec::new();
    while merger
        .next(|documents, projections| {
            rows.push((documents.to_vec(), projections.to_vec()));
            true
        })
        .expect("merge should succeed")
    {}

    rows
}

/// Drain a merger, declining after every `batch` rows.
pub(crate) fn collect_rows_in_batches<I, C>(
    merger: &mut IndexMerger<I, C>,
    batch: usize,
) -> Vec<(Vec<I::DocumentId>, Vec<I::Value>)>
where
    I: IndexStreamIterator,
    I::Value: Clone,
    I::DocumentId: Clone,
    C: KeyComparator<I::Value>,
{
    let mut rows = Vec::new();
    loop {
        let mut taken = 0usize;
        let more = merger
            .next(|documents, projections| {
                rows.push((documents.to_vec(), projections.to_vec()));
                taken += 1;
                taken < batch
            })
            .expect("merge should succeed");
        if !more {
            break;
        }
    }

    rows
}

/// Same merge shape with an explicit config.
pub(crate) fn merger_with_config(
    streams: &[&[u64]],
    config: MergerConfig,
) -> IndexMerger<TestStream, OrderedKeyComparator> {
    let mut builder = IndexMerger::builder(1, config.comparator()).config(config);
    for (index, keys) in streams.iter().enumerate() {
        builder = builder.stream(ordered_stream(index, keys), 1);
    }

    builder.build().expect("test merger should build")
}

///
/// CallLog
///
/// Shared record of cursor calls, tagged with the stream number.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct CallLog(Rc<RefCell<Vec<(usize, &'static str)>>>);

impl CallLog {
    fn push(&self, stream: usize, call: &'static str) {
        self.0.borrow_mut().push((stream, call));
    }

    pub(crate) fn calls(&self) -> Vec<(usize, &'static str)> {
        self.0.borrow().clone()
    }

    pub(crate) fn count(&self, call: &'static str) -> usize {
        self.0.borrow().iter().filter(|(_, name)| *name == call).count()
    }
}

///
/// Fault
///
/// Contract breach or storage failure a `ScriptedStream` injects.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Fault {
    None,
    /// Every seek reports the key it was asked for minus one.
    SeekBelowTarget,
    /// Range changes report the key they were given unchanged.
    StaleRangeKey,
    /// Cached keys are off by one from the reported position.
    WrongCachedKey,
    /// The Nth seek fails with a storage error.
    SeekFailure(usize),
}

///
/// ScriptedStream
///
/// Instrumented wrapper around `TestStream` that logs every call and can
/// inject one `Fault`.
///

pub(crate) struct ScriptedStream {
    inner: TestStream,
    stream: usize,
    log: CallLog,
    fault: Fault,
    seeks: usize,
}

impl ScriptedStream {
    pub(crate) fn new(stream: usize, keys: &[u64], log: CallLog, fault: Fault) -> Self {
        Self {
            inner: ordered_stream(stream, keys),
            stream,
            log,
            fault,
            seeks: 0,
        }
    }
}

impl IndexStreamIterator for ScriptedStream {
    type Value = u64;
    type DocumentId = DocId;

    fn position(&mut self, key: &mut KeyBuffer<u64>) -> Result<bool, InternalError> {
        self.log.push(self.stream, "position");
        self.inner.position(key)
    }

    fn seek(&mut self, key: &mut KeyBuffer<u64>) -> Result<bool, InternalError> {
        self.log.push(self.stream, "seek");
        self.seeks += 1;

        match self.fault {
            Fault::SeekFailure(nth) if nth == self.seeks => {
                Err(InternalError::stream_internal("scripted storage failure"))
            }
            Fault::SeekBelowTarget => {
                let below = key[0].saturating_sub(1);
                key.write([below])?;
                Ok(true)
            }
            _ => self.inner.seek(key),
        }
    }

    fn load(&mut self, projections: &mut ProjectionBuffer<u64>) -> Result<DocId, InternalError> {
        self.log.push(self.stream, "load");
        self.inner.load(projections)
    }

    fn advance(
        &mut self,
        key: &mut KeyBuffer<u64>,
        projections: &mut ProjectionBuffer<u64>,
    ) -> Result<StreamAdvance<DocId>, InternalError> {
        self.log.push(self.stream, "advance");
        let held = key[0];
        let outcome = self.inner.advance(key, projections)?;

        if self.fault == Fault::StaleRangeKey && outcome == StreamAdvance::RangeExhausted {
            key.write([held])?;
        }

        Ok(outcome)
    }

    fn cache_current_key(&mut self, key: &mut KeyBuffer<u64>) -> Result<(), InternalError> {
        self.log.push(self.stream, "cache");
        self.inner.cache_current_key(key)?;

        if self.fault == Fault::WrongCachedKey {
            let off = key[0] + 1;
            key.write([off])?;
        }

        Ok(())
    }

    fn reset(&mut self) -> Result<(), InternalError> {
        self.log.push(self.stream, "reset");
        self.seeks = 0;
        self.inner.reset()
    }
}
