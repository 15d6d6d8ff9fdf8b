use crate::{
    config::MergerConfig,
    error::InternalError,
    key::{KeyBuffer, KeyComparator, OrderedKeyComparator},
    merge::{
        align::{AlignOutcome, Aligner},
        product::ProductCursor,
        state::{StreamDescriptor, StreamState},
        streak::StreakCollector,
    },
    obs::sink::{self, MetricsEvent},
    stream::IndexStreamIterator,
};
use derive_more::{Add, AddAssign};
use thiserror::Error as ThisError;

///
/// MergerBuildError
///
/// Rejections raised while assembling a merger.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MergerBuildError {
    #[error("index merger requires at least one stream")]
    NoStreams,

    #[error("index merger requires at least one key component")]
    NoKeyComponents,
}

impl From<MergerBuildError> for InternalError {
    fn from(err: MergerBuildError) -> Self {
        Self::config_unsupported(err.to_string())
    }
}

///
/// MergerPhase
///
/// Coarse merger state as observed between `next` calls. `Collecting` is
/// only ever visible while a cursor call inside `next` is running.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MergerPhase {
    Aligning,
    Collecting,
    Emitting,
    Exhausted,
}

///
/// MergeStats
///
/// Cumulative work counters for one merger. `seeks` is what the query layer
/// reports as index seeks for the join.
///

#[derive(Add, AddAssign, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MergeStats {
    pub seeks: u64,
    pub keys_aligned: u64,
    pub entries_collected: u64,
    pub rows_emitted: u64,
    pub pauses: u64,
}

///
/// EmitOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum EmitOutcome {
    Paused,
    Finished,
}

///
/// IndexMerger
///
/// Pull-based inner join of N sorted index streams over their shared key
/// prefix. For every key present in all streams, it emits the full cross
/// product of the matching entries, one row per `callback` invocation.
///
/// Rows carry one document id per stream (in stream order) and the
/// concatenation of every stream's projections. Within a key, rows follow
/// odometer order over each stream's native entry order; keys ascend under
/// the comparator.
///
/// After any `Err` the merger is fused and every later `next` returns
/// `Ok(false)`.
///

pub struct IndexMerger<I, C>
where
    I: IndexStreamIterator,
{
    streams: Vec<StreamState<I>>,
    comparator: C,
    config: MergerConfig,
    target: KeyBuffer<I::Value>,
    product: ProductCursor,
    documents: Vec<I::DocumentId>,
    row_projections: Vec<I::Value>,
    phase: MergerPhase,
    stats: MergeStats,
    finish_recorded: bool,
}

impl<I, C> IndexMerger<I, C>
where
    I: IndexStreamIterator,
    I::Value: Clone,
    I::DocumentId: Clone,
    C: KeyComparator<I::Value>,
{
    /// Build a merger over `streams`, comparing the leading
    /// `key_components` slots of every entry.
    pub fn new(
        streams: Vec<StreamDescriptor<I>>,
        key_components: usize,
        comparator: C,
        config: MergerConfig,
    ) -> Result<Self, InternalError> {
        if streams.is_empty() {
            return Err(MergerBuildError::NoStreams.into());
        }
        if key_components == 0 {
            return Err(MergerBuildError::NoKeyComponents.into());
        }

        let stream_count = streams.len();
        let projection_width = streams
            .iter()
            .map(StreamDescriptor::projection_count)
            .sum();
        let streams = streams
            .into_iter()
            .map(|descriptor| {
                StreamState::new(descriptor, key_components, config.run_buffer_capacity)
            })
            .collect();

        sink::record(MetricsEvent::MergeStart {
            streams: stream_count,
        });
        tracing::debug!(
            streams = stream_count,
            key_components,
            "index merger constructed"
        );

        Ok(Self {
            streams,
            comparator,
            config,
            target: KeyBuffer::new(key_components),
            product: ProductCursor::default(),
            documents: Vec::with_capacity(stream_count),
            row_projections: Vec::with_capacity(projection_width),
            phase: MergerPhase::Aligning,
            stats: MergeStats::default(),
            finish_recorded: false,
        })
    }

    /// Start assembling a merger with an explicit comparator.
    #[must_use]
    pub const fn builder(key_components: usize, comparator: C) -> IndexMergerBuilder<I, C> {
        IndexMergerBuilder::new(key_components, comparator)
    }

    #[must_use]
    pub const fn phase(&self) -> MergerPhase {
        self.phase
    }

    #[must_use]
    pub const fn stats(&self) -> MergeStats {
        self.stats
    }

    #[must_use]
    pub const fn config(&self) -> &MergerConfig {
        &self.config
    }

    #[must_use]
    pub const fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Pull rows into `callback` until it declines or the merge runs dry.
    ///
    /// `callback(documents, projections)` returns whether it wants more rows.
    /// Declining pauses the merge after the row just delivered; the next call
    /// resumes with the following row. Returns `true` if any row was delivered
    /// or work remains, and `false` once the merge is exhausted.
    pub fn next<F>(&mut self, mut callback: F) -> Result<bool, InternalError>
    where
        F: FnMut(&[I::DocumentId], &[I::Value]) -> bool,
    {
        if self.phase == MergerPhase::Exhausted {
            return Ok(false);
        }

        let before = self.stats;
        let result = self.drive(&mut callback);
        if result.is_err() {
            self.finish();
        }

        // Progress for this call lands before the merge is reported finished.
        self.report_progress(before);
        if self.phase == MergerPhase::Exhausted {
            self.record_finish();
        }

        result
    }

    /// Rewind every stream and drop all in-flight merge state so the join
    /// can run again from the start. Stats stay cumulative.
    ///
    /// A cursor that fails to rewind fuses the merger.
    pub fn reset(&mut self) -> Result<(), InternalError> {
        let rewound = self
            .streams
            .iter_mut()
            .try_for_each(|stream| -> Result<(), InternalError> {
                stream.descriptor.iterator.reset()?;
                stream.clear();

                Ok(())
            });
        if let Err(err) = rewound {
            self.finish();
            self.record_finish();

            return Err(err);
        }
        self.target.clear();
        self.product.clear();
        self.phase = MergerPhase::Aligning;
        self.finish_recorded = false;

        sink::record(MetricsEvent::MergeStart {
            streams: self.streams.len(),
        });
        tracing::debug!(streams = self.streams.len(), "index merger reset");

        Ok(())
    }

    fn drive<F>(&mut self, callback: &mut F) -> Result<bool, InternalError>
    where
        F: FnMut(&[I::DocumentId], &[I::Value]) -> bool,
    {
        let mut emitted_any = false;

        loop {
            // Phase 1: finish (or resume) the product in flight.
            if self.product.is_active() {
                emitted_any = true;
                if self.emit(callback)? == EmitOutcome::Paused {
                    return Ok(true);
                }
            }

            // Once any stream has run dry no further key can match everywhere.
            if self.streams.iter().any(|stream| stream.exhausted) {
                self.finish();
                return Ok(emitted_any);
            }

            // Phase 2: zigzag every stream onto the next common key.
            self.phase = MergerPhase::Aligning;
            let aligner = Aligner {
                comparator: &self.comparator,
                checked: self.config.check_monotonicity,
            };
            if aligner.align(&mut self.streams, &mut self.target, &mut self.stats)?
                == AlignOutcome::Exhausted
            {
                self.finish();
                return Ok(emitted_any);
            }

            // Phase 3: collect each stream's streak for that key.
            self.phase = MergerPhase::Collecting;
            let collector = StreakCollector {
                comparator: &self.comparator,
                checked: self.config.check_monotonicity,
            };
            let mut collected = 0usize;
            for stream in &mut self.streams {
                collected = collected.saturating_add(collector.collect(stream, &self.target)?);
            }
            let collected = u64::try_from(collected).unwrap_or(u64::MAX);
            self.stats.keys_aligned = self.stats.keys_aligned.saturating_add(1);
            self.stats.entries_collected = self.stats.entries_collected.saturating_add(collected);
            sink::record(MetricsEvent::KeyAligned {
                entries_collected: collected,
            });
            tracing::trace!(entries = collected, "index merge aligned key");

            // Phase 4: arm the odometer.
            self.product.begin(self.streams.len());
            self.phase = MergerPhase::Emitting;
        }
    }

    // Emit rows from the current product until the callback declines or the
    // odometer overflows. The counter steps before the callback runs, so a
    // declined row is never delivered twice.
    fn emit<F>(&mut self, callback: &mut F) -> Result<EmitOutcome, InternalError>
    where
        F: FnMut(&[I::DocumentId], &[I::Value]) -> bool,
    {
        loop {
            self.build_row()?;
            let streams = &self.streams;
            let has_more = self
                .product
                .increment(|position| streams[position].run.len());
            self.stats.rows_emitted = self.stats.rows_emitted.saturating_add(1);

            let wants_more = callback(&self.documents, &self.row_projections);
            if !has_more {
                self.phase = MergerPhase::Aligning;
            }
            if !wants_more {
                self.stats.pauses = self.stats.pauses.saturating_add(1);
                sink::record(MetricsEvent::Paused);
                return Ok(EmitOutcome::Paused);
            }
            if !has_more {
                return Ok(EmitOutcome::Finished);
            }
        }
    }

    fn build_row(&mut self) -> Result<(), InternalError> {
        self.documents.clear();
        self.row_projections.clear();

        for (position, (stream, digit)) in
            self.streams.iter().zip(self.product.digits()).enumerate()
        {
            let Some((document, projections)) = stream.run.entry(*digit) else {
                return Err(InternalError::merger_invariant(format!(
                    "cross product digit {digit} is outside the run of stream {position}"
                )));
            };
            self.documents.push(document.clone());
            self.row_projections.extend_from_slice(projections);
        }

        Ok(())
    }

    fn finish(&mut self) {
        self.phase = MergerPhase::Exhausted;
        self.product.clear();
    }

    fn record_finish(&mut self) {
        if self.finish_recorded {
            return;
        }
        self.finish_recorded = true;

        sink::record(MetricsEvent::MergeFinish {
            rows_emitted: self.stats.rows_emitted,
            seeks: self.stats.seeks,
        });
        tracing::debug!(
            rows = self.stats.rows_emitted,
            seeks = self.stats.seeks,
            keys = self.stats.keys_aligned,
            "index merger exhausted"
        );
    }

    fn report_progress(&self, before: MergeStats) {
        let seeks = self.stats.seeks.saturating_sub(before.seeks);
        if seeks > 0 {
            sink::record(MetricsEvent::Seeks { count: seeks });
        }

        let rows = self.stats.rows_emitted.saturating_sub(before.rows_emitted);
        if rows > 0 {
            sink::record(MetricsEvent::RowsEmitted { rows });
        }
    }
}

///
/// IndexMergerBuilder
///
/// Collects `(cursor, projection count)` pairs plus key arity, comparator,
/// and config before building an `IndexMerger`.
///

pub struct IndexMergerBuilder<I, C> {
    streams: Vec<StreamDescriptor<I>>,
    key_components: usize,
    comparator: C,
    config: MergerConfig,
}

impl<I, C> IndexMergerBuilder<I, C> {
    #[must_use]
    pub const fn new(key_components: usize, comparator: C) -> Self {
        Self {
            streams: Vec::new(),
            key_components,
            comparator,
            config: MergerConfig::new(),
        }
    }

    /// Add one participating index stream.
    #[must_use]
    pub fn stream(mut self, iterator: I, projection_count: usize) -> Self {
        self.streams
            .push(StreamDescriptor::new(iterator, projection_count));
        self
    }

    #[must_use]
    pub const fn config(mut self, config: MergerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<IndexMerger<I, C>, InternalError>
    where
        I: IndexStreamIterator,
        I::Value: Clone,
        I::DocumentId: Clone,
        C: KeyComparator<I::Value>,
    {
        IndexMerger::new(
            self.streams,
            self.key_components,
            self.comparator,
            self.config,
        )
    }
}

impl<I> IndexMergerBuilder<I, OrderedKeyComparator> {
    /// Builder whose comparator follows `config.direction` over `Ord` values.
    #[must_use]
    pub const fn from_config(key_components: usize, config: MergerConfig) -> Self {
        Self {
            streams: Vec::new(),
            key_components,
            comparator: config.comparator(),
            config,
        }
    }
}
