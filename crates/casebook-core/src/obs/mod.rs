//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Core logic never touches `metrics` directly; everything flows through
//! `MetricsEvent` and `MetricsSink`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, IndexCounters};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all};
