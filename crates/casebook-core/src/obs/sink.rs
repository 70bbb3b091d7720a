//! Metrics sink boundary.
//!
//! This module is the only allowed bridge between core logic and the
//! global metrics state.

use crate::{db::index::ViewIndex, obs::metrics};
use std::cell::Cell;

thread_local! {
    static SINK_OVERRIDE: Cell<Option<&'static dyn MetricsSink>> = const { Cell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ListingPlanned { index: ViewIndex },
    RowsScanned { index: ViewIndex, rows: u64 },
    RecordCreated,
    RecordSaved,
    HistoryAppended { changes: u64 },
    HistorySkipped,
    WriteConflict,
}

///
/// MetricsSink
///

pub trait MetricsSink: Sync {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ListingPlanned { index } => {
                metrics::with_state_mut(|m| {
                    m.ops.plans = m.ops.plans.saturating_add(1);
                    let entry = m.indexes.entry(index.name().to_string()).or_default();
                    entry.plans = entry.plans.saturating_add(1);
                });
            }

            MetricsEvent::RowsScanned { index, rows } => {
                metrics::with_state_mut(|m| {
                    m.ops.rows_scanned = m.ops.rows_scanned.saturating_add(rows);
                    let entry = m.indexes.entry(index.name().to_string()).or_default();
                    entry.rows_scanned = entry.rows_scanned.saturating_add(rows);
                });
            }

            MetricsEvent::RecordCreated => {
                metrics::with_state_mut(|m| m.ops.creates = m.ops.creates.saturating_add(1));
            }

            MetricsEvent::RecordSaved => {
                metrics::with_state_mut(|m| m.ops.saves = m.ops.saves.saturating_add(1));
            }

            MetricsEvent::HistoryAppended { changes } => {
                metrics::with_state_mut(|m| {
                    m.ops.history_entries = m.ops.history_entries.saturating_add(1);
                    m.ops.history_fields = m.ops.history_fields.saturating_add(changes);
                });
            }

            MetricsEvent::HistorySkipped => {
                metrics::with_state_mut(|m| {
                    m.ops.history_noops = m.ops.history_noops.saturating_add(1);
                });
            }

            MetricsEvent::WriteConflict => {
                metrics::with_state_mut(|m| {
                    m.ops.write_conflicts = m.ops.write_conflicts.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    match SINK_OVERRIDE.with(Cell::get) {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub(crate) fn with_metrics_sink<T>(sink: &'static dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<&'static dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| cell.set(self.0));
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.replace(Some(sink)));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CaptureSink(Mutex<Vec<MetricsEvent>>);

    impl MetricsSink for CaptureSink {
        fn record(&self, event: MetricsEvent) {
            if let Ok(mut events) = self.0.lock() {
                events.push(event);
            }
        }
    }

    static CAPTURE: CaptureSink = CaptureSink(Mutex::new(Vec::new()));

    #[test]
    fn global_sink_counts_plans_per_index() {
        metrics_reset_all();
        record(MetricsEvent::ListingPlanned {
            index: ViewIndex::ByStatus,
        });
        record(MetricsEvent::RowsScanned {
            index: ViewIndex::ByStatus,
            rows: 3,
        });

        let report = metrics_report();
        assert_eq!(report.ops.plans, 1);
        assert_eq!(report.ops.rows_scanned, 3);
        assert_eq!(
            report.indexes.get("by_status").map(|c| c.rows_scanned),
            Some(3)
        );
    }

    #[test]
    fn override_captures_events_and_restores_global() {
        metrics_reset_all();
        with_metrics_sink(&CAPTURE, || record(MetricsEvent::RecordSaved));
        record(MetricsEvent::RecordCreated);

        let captured = CAPTURE.0.lock().expect("capture lock").clone();
        assert_eq!(captured, vec![MetricsEvent::RecordSaved]);

        let report = metrics_report();
        assert_eq!(report.ops.saves, 0);
        assert_eq!(report.ops.creates, 1);
    }
}
