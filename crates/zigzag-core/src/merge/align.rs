use crate::{
    error::InternalError,
    key::{KeyBuffer, KeyComparator},
    merge::{MergeStats, state::StreamState},
    stream::IndexStreamIterator,
};

///
/// AlignOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum AlignOutcome {
    /// Every stream retains the key now held in the target buffer.
    Aligned,
    /// Some stream ran out; no key can match across all streams again.
    Exhausted,
}

///
/// Aligner
///
/// Zigzag synchronization over all stream states. Only lagging streams are
/// moved, each by one seek to the current maximum key per round; rounds
/// repeat while a seek overshoots.
///

pub(super) struct Aligner<'a, C> {
    pub(super) comparator: &'a C,
    pub(super) checked: bool,
}

impl<C> Aligner<'_, C> {
    pub(super) fn align<I>(
        &self,
        streams: &mut [StreamState<I>],
        target: &mut KeyBuffer<I::Value>,
        stats: &mut MergeStats,
    ) -> Result<AlignOutcome, InternalError>
    where
        I: IndexStreamIterator,
        I::Value: Clone,
        C: KeyComparator<I::Value>,
    {
        // Phase 1: every stream must retain its current key.
        for stream in streams.iter_mut() {
            if stream.positioned {
                continue;
            }
            if !stream.descriptor.iterator.position(&mut stream.key)? {
                stream.exhausted = true;
                return Ok(AlignOutcome::Exhausted);
            }
            stream.retain_current_key(self.comparator, self.checked)?;
        }

        // Phase 2: seek laggards to the maximum until all keys agree.
        loop {
            let Some(max_index) = self.max_key_index(streams) else {
                return Ok(AlignOutcome::Exhausted);
            };
            target.copy_from(&streams[max_index].cached_key);

            let mut aligned = true;
            for stream in streams.iter_mut() {
                if !self
                    .comparator
                    .compare(&stream.cached_key, target.as_slice())
                    .is_lt()
                {
                    continue;
                }

                stream.key.copy_from(target);
                stream.positioned = false;
                stats.seeks = stats.seeks.saturating_add(1);
                if !stream.descriptor.iterator.seek(&mut stream.key)? {
                    stream.exhausted = true;
                    return Ok(AlignOutcome::Exhausted);
                }

                if self.checked
                    && self
                        .comparator
                        .compare(&stream.key, target.as_slice())
                        .is_lt()
                {
                    return Err(InternalError::stream_invariant(
                        "index stream seek landed below its target key",
                    ));
                }
                stream.retain_current_key(self.comparator, self.checked)?;

                if !self
                    .comparator
                    .compare(&stream.cached_key, target.as_slice())
                    .is_eq()
                {
                    aligned = false;
                }
            }

            if aligned {
                return Ok(AlignOutcome::Aligned);
            }
            tracing::trace!("index merge seek overshot target key, realigning");
        }
    }

    fn max_key_index<I>(&self, streams: &[StreamState<I>]) -> Option<usize>
    where
        I: IndexStreamIterator,
        C: KeyComparator<I::Value>,
    {
        let mut best: Option<usize> = None;
        for (index, stream) in streams.iter().enumerate() {
            let replace = best.is_none_or(|current| {
                self.comparator
                    .compare(&stream.cached_key, &streams[current].cached_key)
                    .is_gt()
            });
            if replace {
                best = Some(index);
            }
        }

        best
    }
}
