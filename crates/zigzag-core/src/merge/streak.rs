use crate::{
    error::InternalError,
    key::{KeyBuffer, KeyComparator},
    merge::state::StreamState,
    stream::{IndexStreamIterator, StreamAdvance},
};

///
/// StreakCollector
///
/// Pulls every consecutive entry sharing the aligned key out of one stream
/// into its run buffer. The entry that caused alignment is always the first
/// run element, so a successful collection never leaves the run empty.
///

pub(super) struct StreakCollector<'a, C> {
    pub(super) comparator: &'a C,
    pub(super) checked: bool,
}

impl<C> StreakCollector<'_, C> {
    /// Collect one stream's streak for `aligned`, returning the run length.
    pub(super) fn collect<I>(
        &self,
        stream: &mut StreamState<I>,
        aligned: &KeyBuffer<I::Value>,
    ) -> Result<usize, InternalError>
    where
        I: IndexStreamIterator,
        I::Value: Clone,
        C: KeyComparator<I::Value>,
    {
        stream.run.clear();
        stream.key.copy_from(aligned);
        stream.positioned = false;

        let document = stream.descriptor.iterator.load(&mut stream.projections)?;
        stream.run.push(document, &stream.projections)?;

        loop {
            let outcome = stream
                .descriptor
                .iterator
                .advance(&mut stream.key, &mut stream.projections)?;

            match outcome {
                StreamAdvance::HasMore(document) => {
                    stream.run.push(document, &stream.projections)?;
                }
                StreamAdvance::RangeExhausted => {
                    if self.checked && !self.comparator.compare(&stream.key, aligned).is_gt() {
                        return Err(InternalError::stream_invariant(
                            "index stream reported a range change without moving past the aligned key",
                        ));
                    }
                    stream.retain_current_key(self.comparator, self.checked)?;
                    break;
                }
                StreamAdvance::IteratorExhausted => {
                    stream.exhausted = true;
                    break;
                }
            }
        }

        Ok(stream.run.len())
    }
}
