//! Module: sync
//! Responsibility: reconcile records pushed by offline clients, matching on
//! short id so a resync updates rather than duplicates.
//! Boundary: the history blob is decoded here, never inside the core.

use crate::update::{RecordUpdate, UpdateError, form_fields};
use casebook_core::{
    db::{RecordBackend, RecordDraft, RecordStore},
    error::InternalError,
    history::HistoryEntry,
    record::{Record, field},
    types::{Actor, RecordId},
    value::Value,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// SyncError
///

#[derive(Debug, ThisError)]
pub enum SyncError {
    #[error("client history is not valid: {0}")]
    HistoryBlob(#[from] serde_json::Error),

    #[error(transparent)]
    Update(#[from] UpdateError),

    #[error(transparent)]
    Core(#[from] InternalError),
}

///
/// ClientHistories
///
/// Mobile clients send their history as pre-serialized JSON text; newer
/// clients send the structured list.
///

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ClientHistories {
    Blob(String),
    Entries(Vec<HistoryEntry>),
}

impl ClientHistories {
    pub fn into_entries(self) -> Result<Vec<HistoryEntry>, SyncError> {
        match self {
            Self::Blob(blob) => decode_history_blob(&blob),
            Self::Entries(entries) => Ok(entries),
        }
    }
}

/// Decode a pre-serialized history list. `"deleted": null` reads as empty.
pub fn decode_history_blob(blob: &str) -> Result<Vec<HistoryEntry>, SyncError> {
    Ok(serde_json::from_str(blob)?)
}

///
/// SyncPayload
///
/// Wire shape of one pushed record. Every key not named here is a form
/// field; envelope keys such as `_id` or `created_by` are dropped.
///

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SyncPayload {
    #[serde(default)]
    pub id: Option<RecordId>,

    #[serde(default)]
    pub unique_identifier: Option<String>,

    #[serde(default)]
    pub histories: Option<ClientHistories>,

    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

///
/// SyncOutcome
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncOutcome {
    pub record: Record,
    pub created: bool,
    pub history_appended: bool,
}

///
/// Reconciler
///

pub struct Reconciler<'a, B> {
    store: &'a RecordStore<B>,
}

impl<'a, B: RecordBackend> Reconciler<'a, B> {
    #[must_use]
    pub const fn new(store: &'a RecordStore<B>) -> Self {
        Self { store }
    }

    /// Update the record the payload identifies, or create it.
    ///
    /// A payload carrying a unique identifier is matched by its short id;
    /// otherwise by its id when one is supplied.
    pub fn reconcile(&self, payload: SyncPayload, actor: &Actor) -> Result<SyncOutcome, SyncError> {
        let entries = payload
            .histories
            .map(ClientHistories::into_entries)
            .transpose()?;

        let existing = match (&payload.unique_identifier, &payload.id) {
            (Some(unique_identifier), _) => self
                .store
                .get_by_short_id(&self.store.short_id_for(unique_identifier))?,
            (None, Some(id)) => self.store.get(id)?,
            (None, None) => None,
        };

        match existing {
            Some(record) => self.update(record, payload.fields, entries, actor),
            None => self.create(
                payload.id,
                payload.unique_identifier,
                payload.fields,
                entries,
                actor,
            ),
        }
    }

    fn update(
        &self,
        mut record: Record,
        fields: BTreeMap<String, Value>,
        entries: Option<Vec<HistoryEntry>>,
        actor: &Actor,
    ) -> Result<SyncOutcome, SyncError> {
        RecordUpdate::new(fields).apply(self.store, &mut record)?;

        let outcome = match entries {
            Some(entries) => self
                .store
                .save_with_client_history(&mut record, actor, entries)?,
            None => self.store.save(&mut record, actor)?,
        };
        tracing::info!(
            record = %record.id(),
            short_id = %record.short_id(),
            user = %actor.user_name,
            history_appended = outcome.history_appended,
            "sync reconciled onto existing record"
        );

        Ok(SyncOutcome {
            record,
            created: false,
            history_appended: outcome.history_appended,
        })
    }

    fn create(
        &self,
        id: Option<RecordId>,
        unique_identifier: Option<String>,
        fields: BTreeMap<String, Value>,
        entries: Option<Vec<HistoryEntry>>,
        actor: &Actor,
    ) -> Result<SyncOutcome, SyncError> {
        let mut fields = form_fields(fields);
        fields.insert(field::VERIFIED.to_string(), Value::Bool(actor.verified));

        let mut draft = RecordDraft::new(fields);
        draft.id = id;
        draft.unique_identifier = unique_identifier;

        let record = match entries {
            Some(entries) => self
                .store
                .create_from_with_client_history(draft, actor, entries)?,
            None => self.store.create_from(draft, actor)?,
        };
        let history_appended = !record.histories().is_empty();

        Ok(SyncOutcome {
            record,
            created: true,
            history_appended,
        })
    }
}
