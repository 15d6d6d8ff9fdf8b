//! Metrics sink boundary.
//!
//! Merge logic MUST NOT depend on obs::metrics directly.
//! This module is the only bridge between execution and metrics state.

use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    MergeStart { streams: usize },
    KeyAligned { entries_collected: u64 },
    Seeks { count: u64 },
    RowsEmitted { rows: u64 },
    Paused,
    MergeFinish { rows_emitted: u64, seeks: u64 },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into the metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::MergeStart { .. } => {
                m.ops.merges_started = m.ops.merges_started.saturating_add(1);
            }
            MetricsEvent::KeyAligned { entries_collected } => {
                m.ops.keys_aligned = m.ops.keys_aligned.saturating_add(1);
                m.ops.entries_collected =
                    m.ops.entries_collected.saturating_add(entries_collected);
            }
            MetricsEvent::Seeks { count } => {
                m.ops.seeks = m.ops.seeks.saturating_add(count);
            }
            MetricsEvent::RowsEmitted { rows } => {
                m.ops.rows_emitted = m.ops.rows_emitted.saturating_add(rows);
            }
            MetricsEvent::Paused => {
                m.ops.pauses = m.ops.pauses.saturating_add(1);
            }
            MetricsEvent::MergeFinish { .. } => {
                m.ops.merges_finished = m.ops.merges_finished.saturating_add(1);
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state on the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}
