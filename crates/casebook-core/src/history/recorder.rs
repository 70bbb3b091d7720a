use crate::{
    error::InternalError,
    history::{DiffEngine, HistoryEntry},
    obs::sink::{MetricsEvent, record as record_metric},
    record::Record,
    types::{Actor, history_datetime},
};
use time::OffsetDateTime;

///
/// HistoryRecorder
///
/// Appends one entry per qualifying write. The entry is always the diff
/// against the snapshot passed as `previous`, so callers must hand in the
/// version actually being superseded.
///

#[derive(Clone, Debug, Default)]
pub struct HistoryRecorder {
    engine: DiffEngine,
}

impl HistoryRecorder {
    #[must_use]
    pub const fn new(engine: DiffEngine) -> Self {
        Self { engine }
    }

    #[must_use]
    pub const fn engine(&self) -> &DiffEngine {
        &self.engine
    }

    /// Diff `previous` → `record` and append an entry when anything changed.
    ///
    /// Returns the appended entry, or `None` for a no-op write.
    pub fn record_if_changed<'r>(
        &self,
        record: &'r mut Record,
        previous: &Record,
        actor: &Actor,
        now: OffsetDateTime,
    ) -> Result<Option<&'r HistoryEntry>, InternalError> {
        ensure_successor(record, previous)?;

        let changes = self.engine.diff(previous, record);
        if changes.is_empty() {
            record_metric(MetricsEvent::HistorySkipped);
            return Ok(None);
        }

        let entry = HistoryEntry {
            datetime: history_datetime(now)?,
            user_name: actor.user_name.clone(),
            user_organisation: actor.organisation.clone(),
            changes,
        };
        record_metric(MetricsEvent::HistoryAppended {
            changes: entry.changes.len() as u64,
        });
        tracing::debug!(
            record = %record.id(),
            user = %actor.user_name,
            fields = entry.changes.len(),
            "history entry appended"
        );

        record.push_history(entry);

        Ok(record.histories().last())
    }

    /// Append client-recorded entries that the record does not hold yet.
    ///
    /// Offline clients ship their own history with a sync; entries already
    /// present (by value) are skipped so a resend never duplicates them.
    pub fn merge_client_entries(
        &self,
        record: &mut Record,
        previous: &Record,
        entries: Vec<HistoryEntry>,
    ) -> Result<usize, InternalError> {
        ensure_successor(record, previous)?;

        let mut appended = 0;
        for entry in entries {
            if record.histories().contains(&entry) {
                continue;
            }
            record_metric(MetricsEvent::HistoryAppended {
                changes: entry.changes.len() as u64,
            });
            record.push_history(entry);
            appended += 1;
        }

        Ok(appended)
    }
}

// The log only ever grows: the incoming record must carry its predecessor's
// history unchanged as a prefix.
fn ensure_successor(record: &Record, previous: &Record) -> Result<(), InternalError> {
    if record.id() != previous.id() {
        return Err(InternalError::history_invariant(format!(
            "history diff across records: {} vs {}",
            record.id(),
            previous.id()
        )));
    }

    if !record.histories().starts_with(previous.histories()) {
        return Err(InternalError::history_invariant(format!(
            "history of {} does not extend its predecessor",
            record.id()
        )));
    }

    Ok(())
}
