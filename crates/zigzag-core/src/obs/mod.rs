//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Merge logic never touches metrics state directly; every counter update
//! flows through `MetricsEvent` and the active `MetricsSink`.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{EventOps, EventReport, EventState};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
