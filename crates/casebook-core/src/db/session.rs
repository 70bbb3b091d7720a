//! Module: db::session
//! Responsibility: the record-store facade; identity assignment, history
//! recording and compare-and-swap persistence for every write.
//! Does not own: change detection (`history`) or listing plans (`db::plan`).

use crate::{
    db::{
        Direction,
        executor::{Page, Paginator},
        index::{IndexKey, KeyRange, OrderedIndex, ScanRequest, ViewIndex},
        plan::ViewQueryPlan,
        store::RecordBackend,
    },
    error::InternalError,
    history::{DiffEngine, HistoryEntry, HistoryPolicy, HistoryRecorder},
    obs::sink::{MetricsEvent, MetricsSink, record as record_metric, with_metrics_sink},
    record::{Attachment, AttachmentKey, Record, field},
    types::{
        Actor, Clock, IdSource, RecordId, ShortId, SystemClock, UlidIds, history_datetime,
    },
    value::Value,
};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Default number of trailing unique-identifier characters in a short id.
pub const DEFAULT_SHORT_ID_LEN: usize = 7;

///
/// RecordDraft
///
/// Content for a record that does not exist yet. Offline clients may fix
/// the id and unique identifier themselves; everything else is assigned.
///

#[derive(Clone, Debug, Default)]
pub struct RecordDraft {
    pub id: Option<RecordId>,
    pub unique_identifier: Option<String>,
    pub fields: BTreeMap<String, Value>,
    pub attachments: Vec<(AttachmentKey, Attachment)>,
}

impl RecordDraft {
    #[must_use]
    pub fn new(fields: BTreeMap<String, Value>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn with_unique_identifier(mut self, unique_identifier: impl Into<String>) -> Self {
        self.unique_identifier = Some(unique_identifier.into());
        self
    }

    #[must_use]
    pub fn with_attachment(mut self, key: AttachmentKey, attachment: Attachment) -> Self {
        self.attachments.push((key, attachment));
        self
    }
}

///
/// WriteOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WriteOutcome {
    pub revision: u64,
    pub history_appended: bool,
}

// How a write produces its history.
enum HistorySource {
    Diff,
    Client(Vec<HistoryEntry>),
}

///
/// RecordStore
///
/// Session-scoped handle over a backend, with policy (clock, ids, history
/// suppression, metrics) fixed at construction.
///

pub struct RecordStore<B> {
    backend: B,
    clock: Box<dyn Clock + Send + Sync>,
    ids: Box<dyn IdSource + Send + Sync>,
    recorder: HistoryRecorder,
    short_id_len: usize,
    metrics: Option<&'static dyn MetricsSink>,
}

impl<B> RecordStore<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            clock: Box::new(SystemClock::default()),
            ids: Box::new(UlidIds),
            recorder: HistoryRecorder::default(),
            short_id_len: DEFAULT_SHORT_ID_LEN,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[must_use]
    pub fn with_ids(mut self, ids: impl IdSource + Send + Sync + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: HistoryPolicy) -> Self {
        self.recorder = HistoryRecorder::new(DiffEngine::new(policy));
        self
    }

    /// Zero keeps the default length.
    #[must_use]
    pub const fn with_short_id_len(mut self, len: usize) -> Self {
        if len > 0 {
            self.short_id_len = len;
        }
        self
    }

    #[must_use]
    pub const fn metrics_sink(mut self, sink: &'static dyn MetricsSink) -> Self {
        self.metrics = Some(sink);
        self
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub const fn short_id_len(&self) -> usize {
        self.short_id_len
    }

    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// Mint a fresh attachment key for `role` at the current local time.
    pub fn new_attachment_key(&self, role: &str) -> Result<AttachmentKey, InternalError> {
        AttachmentKey::generate(role, self.ids.as_ref(), self.clock.now())
    }

    /// Short id a record with `unique_identifier` is (or would be) filed under.
    #[must_use]
    pub fn short_id_for(&self, unique_identifier: &str) -> ShortId {
        ShortId::from_unique_identifier(unique_identifier, self.short_id_len)
    }

    fn with_metrics<T>(&self, f: impl FnOnce() -> T) -> T {
        if let Some(sink) = self.metrics {
            with_metrics_sink(sink, f)
        } else {
            f()
        }
    }
}

impl<B: RecordBackend> RecordStore<B> {
    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Absent ids are `Ok(None)`, never an error.
    pub fn get(&self, id: &RecordId) -> Result<Option<Record>, InternalError> {
        self.backend.load(id)
    }

    pub fn get_by_short_id(&self, short_id: &ShortId) -> Result<Option<Record>, InternalError> {
        self.backend.load_by_short_id(short_id)
    }

    // ---------------------------------------------------------------------
    // Creation
    // ---------------------------------------------------------------------

    /// Create a record from form fields with generated identity.
    pub fn create(
        &self,
        fields: BTreeMap<String, Value>,
        actor: &Actor,
    ) -> Result<Record, InternalError> {
        self.create_from(RecordDraft::new(fields), actor)
    }

    /// Create a record under a caller-chosen id.
    pub fn create_with_id(
        &self,
        id: RecordId,
        fields: BTreeMap<String, Value>,
        actor: &Actor,
    ) -> Result<Record, InternalError> {
        self.create_from(RecordDraft::new(fields).with_id(id), actor)
    }

    pub fn create_from(&self, draft: RecordDraft, actor: &Actor) -> Result<Record, InternalError> {
        self.with_metrics(|| self.insert(draft, actor, HistorySource::Diff))
    }

    /// Create a synced record whose history the client recorded itself.
    ///
    /// The client entries stand in for the creation diff and the record is
    /// written once. An empty list falls back to the creation diff.
    pub fn create_from_with_client_history(
        &self,
        draft: RecordDraft,
        actor: &Actor,
        entries: Vec<HistoryEntry>,
    ) -> Result<Record, InternalError> {
        self.with_metrics(|| self.insert(draft, actor, HistorySource::Client(entries)))
    }

    fn insert(
        &self,
        draft: RecordDraft,
        actor: &Actor,
        source: HistorySource,
    ) -> Result<Record, InternalError> {
        let now = self.clock.now();
        let id = draft
            .id
            .unwrap_or_else(|| RecordId::generate(self.ids.as_ref()));
        let unique_identifier = draft
            .unique_identifier
            .unwrap_or_else(|| RecordId::generate(self.ids.as_ref()).to_string());
        let short_id = self.short_id_for(&unique_identifier);

        let mut record = Record::new(
            id,
            unique_identifier,
            short_id,
            actor,
            history_datetime(now)?,
        );
        for (name, value) in draft.fields {
            record.set(name, value)?;
        }
        for (key, attachment) in draft.attachments {
            record.attach(key, attachment);
        }

        let baseline = record.creation_baseline();
        self.append_history(&mut record, &baseline, actor, now, source)?;

        let revision = self.backend.put(&record, None)?;
        record.set_revision(revision);
        record.clear_removals();

        record_metric(MetricsEvent::RecordCreated);
        tracing::info!(
            record = %record.id(),
            short_id = %record.short_id(),
            user = %actor.user_name,
            "record created"
        );

        Ok(record)
    }

    // ---------------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------------

    /// Record history against the stored predecessor, then persist.
    ///
    /// `record` must be a copy read at its current stored revision; a stale
    /// copy fails with a retryable conflict and is left untouched.
    pub fn save(&self, record: &mut Record, actor: &Actor) -> Result<WriteOutcome, InternalError> {
        self.with_metrics(|| self.write(record, actor, HistorySource::Diff))
    }

    /// Persist a synced record whose history the client recorded itself.
    ///
    /// Client entries are merged append-only in place of the server-side
    /// diff. When none of them is new, the diff is recorded as for `save`.
    pub fn save_with_client_history(
        &self,
        record: &mut Record,
        actor: &Actor,
        entries: Vec<HistoryEntry>,
    ) -> Result<WriteOutcome, InternalError> {
        self.with_metrics(|| self.write(record, actor, HistorySource::Client(entries)))
    }

    fn write(
        &self,
        record: &mut Record,
        actor: &Actor,
        source: HistorySource,
    ) -> Result<WriteOutcome, InternalError> {
        let now = self.clock.now();

        // Phase 1: resolve the predecessor the diff is taken against.
        let (baseline, expected) = match self.backend.load(record.id())? {
            Some(stored) if stored.revision() == record.revision() => {
                let revision = stored.revision();
                (stored, Some(revision))
            }
            Some(stored) => {
                return Err(self.conflict(record, stored.revision()));
            }
            None if record.revision() == 0 => (record.creation_baseline(), None),
            None => {
                return Err(self.conflict(record, 0));
            }
        };

        // Phase 2: history and bookkeeping on a working copy, so a failed
        // write leaves the caller's record as it was.
        let mut next = record.clone();
        let history_appended = self.append_history(&mut next, &baseline, actor, now, source)?;
        if history_appended {
            next.stamp_update(actor, history_datetime(now)?);
        }

        // Phase 3: compare-and-swap.
        let revision = match self.backend.put(&next, expected) {
            Ok(revision) => revision,
            Err(err) if err.is_retryable() => {
                record_metric(MetricsEvent::WriteConflict);
                tracing::warn!(record = %next.id(), error = %err, "write conflict");
                return Err(err);
            }
            Err(err) => return Err(err),
        };
        next.set_revision(revision);
        next.clear_removals();
        *record = next;

        record_metric(MetricsEvent::RecordSaved);
        tracing::debug!(record = %record.id(), revision, history_appended, "record saved");

        Ok(WriteOutcome {
            revision,
            history_appended,
        })
    }

    // Client entries replace the diff only when at least one of them is new;
    // a resent log must not hide changes made since it was recorded.
    fn append_history(
        &self,
        next: &mut Record,
        baseline: &Record,
        actor: &Actor,
        now: OffsetDateTime,
        source: HistorySource,
    ) -> Result<bool, InternalError> {
        if let HistorySource::Client(entries) = source
            && self.recorder.merge_client_entries(next, baseline, entries)? > 0
        {
            return Ok(true);
        }

        Ok(self
            .recorder
            .record_if_changed(next, baseline, actor, now)?
            .is_some())
    }

    fn conflict(&self, record: &Record, stored: u64) -> InternalError {
        record_metric(MetricsEvent::WriteConflict);
        tracing::warn!(
            record = %record.id(),
            read = record.revision(),
            stored,
            "stale predecessor"
        );

        InternalError::store_conflict(format!(
            "record {} was read at revision {} but is stored at {stored}",
            record.id(),
            record.revision()
        ))
    }

    // ---------------------------------------------------------------------
    // Duplicates
    // ---------------------------------------------------------------------

    /// Mark `id` as a duplicate of `of`. Returns `None` when `id` is absent.
    pub fn mark_duplicate(
        &self,
        id: &RecordId,
        of: &RecordId,
        actor: &Actor,
    ) -> Result<Option<Record>, InternalError> {
        let Some(mut record) = self.get(id)? else {
            return Ok(None);
        };

        record.set(field::DUPLICATE, true)?;
        record.set(field::DUPLICATE_OF, of.as_str())?;
        self.save(&mut record, actor)?;

        Ok(Some(record))
    }
}

impl<B: RecordBackend + OrderedIndex> RecordStore<B> {
    // ---------------------------------------------------------------------
    // Listing
    // ---------------------------------------------------------------------

    #[must_use]
    pub const fn paginator(&self) -> Paginator<'_, B> {
        Paginator::new(&self.backend)
    }

    pub fn list(&self, plan: &ViewQueryPlan) -> Result<Page, InternalError> {
        self.with_metrics(|| self.paginator().fetch(plan))
    }

    /// Records marked as duplicates of `id`, in id order.
    pub fn duplicates_of(&self, id: &RecordId) -> Result<Vec<Record>, InternalError> {
        let index = ViewIndex::ByDuplicateOf;
        if !self.backend.declares(index) {
            return Err(InternalError::index_invariant(format!(
                "index '{index}' is not declared"
            )));
        }

        let prefix = IndexKey::default().with(id.as_str());
        let range = KeyRange::new(prefix.clone(), prefix.with_open(), Direction::Asc);

        self.with_metrics(|| {
            self.backend.scan(&ScanRequest {
                index,
                range,
                skip: 0,
                limit: usize::MAX,
            })
        })
    }
}
