//! Module: record
//! Responsibility: the case record envelope and its mutation surface.
//! Does not own: change detection (`history`) or persistence (`db::store`).

mod attachment;
pub mod field;


use crate::{
    error::InternalError,
    history::HistoryEntry,
    types::{Actor, RecordId, ShortId},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// re-exports
pub use attachment::{Attachment, AttachmentKey};

///
/// Record
///
/// A case record: free-form fields, keyed attachments, and an append-only
/// history. Identity (`id`, `short_id`, creator) is fixed at construction and
/// has no setters.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Record {
    id: RecordId,
    short_id: ShortId,
    unique_identifier: String,
    created_by: String,
    created_by_organisation: String,
    #[serde(default)]
    created_by_full_name: Option<String>,
    created_at: String,
    #[serde(default)]
    last_updated_at: Option<String>,
    #[serde(default)]
    last_updated_by: Option<String>,
    #[serde(default)]
    last_updated_by_full_name: Option<String>,
    #[serde(default)]
    revision: u64,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
    #[serde(default)]
    attachments: BTreeMap<AttachmentKey, Attachment>,
    #[serde(default)]
    histories: Vec<HistoryEntry>,

    // Explicit removals since the last save; the diff only treats a missing
    // field as deleted when it was removed through `remove`.
    #[serde(skip)]
    removed: BTreeSet<String>,
}

impl Record {
    /// Start a record with fixed identity and no content.
    #[must_use]
    pub fn new(
        id: RecordId,
        unique_identifier: impl Into<String>,
        short_id: ShortId,
        creator: &Actor,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id,
            short_id,
            unique_identifier: unique_identifier.into(),
            created_by: creator.user_name.clone(),
            created_by_organisation: creator.organisation.clone(),
            created_by_full_name: creator.full_name.clone(),
            created_at: created_at.into(),
            last_updated_at: None,
            last_updated_by: None,
            last_updated_by_full_name: None,
            revision: 0,
            fields: BTreeMap::new(),
            attachments: BTreeMap::new(),
            histories: Vec::new(),
            removed: BTreeSet::new(),
        }
    }

    /// The implicit empty record a creation is diffed against.
    #[must_use]
    pub fn creation_baseline(&self) -> Self {
        Self {
            last_updated_at: None,
            last_updated_by: None,
            last_updated_by_full_name: None,
            revision: 0,
            fields: BTreeMap::new(),
            attachments: BTreeMap::new(),
            histories: Vec::new(),
            removed: BTreeSet::new(),
            ..self.clone()
        }
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn id(&self) -> &RecordId {
        &self.id
    }

    #[must_use]
    pub const fn short_id(&self) -> &ShortId {
        &self.short_id
    }

    #[must_use]
    pub fn unique_identifier(&self) -> &str {
        &self.unique_identifier
    }

    #[must_use]
    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    #[must_use]
    pub fn created_by_organisation(&self) -> &str {
        &self.created_by_organisation
    }

    #[must_use]
    pub fn created_by_full_name(&self) -> Option<&str> {
        self.created_by_full_name.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    #[must_use]
    pub fn last_updated_at(&self) -> Option<&str> {
        self.last_updated_at.as_deref()
    }

    #[must_use]
    pub fn last_updated_by(&self) -> Option<&str> {
        self.last_updated_by.as_deref()
    }

    #[must_use]
    pub fn last_updated_by_full_name(&self) -> Option<&str> {
        self.last_updated_by_full_name.as_deref()
    }

    /// Storage revision this copy was read at; 0 before the first write.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    // ------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Set a form field. Envelope names are rejected.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), InternalError> {
        let name = name.into();
        if field::is_reserved(&name) {
            return Err(InternalError::record_unsupported(format!(
                "field '{name}' belongs to the record envelope"
            )));
        }

        self.removed.remove(&name);
        self.fields.insert(name, value.into());

        Ok(())
    }

    /// Remove a field and mark the removal for the next diff.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let previous = self.fields.remove(name)?;
        self.removed.insert(name.to_string());

        Some(previous)
    }

    #[must_use]
    pub const fn removed_fields(&self) -> &BTreeSet<String> {
        &self.removed
    }

    // ------------------------------------------------------------------
    // Attachments
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn attachments(&self) -> &BTreeMap<AttachmentKey, Attachment> {
        &self.attachments
    }

    #[must_use]
    pub fn attachment(&self, key: &AttachmentKey) -> Option<&Attachment> {
        self.attachments.get(key)
    }

    pub fn attach(&mut self, key: AttachmentKey, attachment: Attachment) {
        self.attachments.insert(key, attachment);
    }

    pub fn detach(&mut self, key: &AttachmentKey) -> Option<Attachment> {
        self.attachments.remove(key)
    }

    /// Swap the payload behind an existing key. The key, and therefore the
    /// attachment's identity, is unchanged.
    pub fn replace_attachment_data(
        &mut self,
        key: &AttachmentKey,
        data: Vec<u8>,
    ) -> Result<(), InternalError> {
        let attachment = self.attachments.get_mut(key).ok_or_else(|| {
            InternalError::record_unsupported(format!("no attachment under key '{key}'"))
        })?;
        attachment.data = data;

        Ok(())
    }

    /// Most recent key for `role`, by timestamp suffix then key.
    #[must_use]
    pub fn latest_attachment_for_role(&self, role: &str) -> Option<&AttachmentKey> {
        self.attachments
            .keys()
            .filter(|key| key.matches_role(role))
            .max_by(|a, b| {
                a.timestamp_suffix()
                    .cmp(&b.timestamp_suffix())
                    .then_with(|| a.cmp(b))
            })
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    #[must_use]
    pub fn histories(&self) -> &[HistoryEntry] {
        &self.histories
    }

    pub(crate) fn push_history(&mut self, entry: HistoryEntry) {
        self.histories.push(entry);
    }

    // ------------------------------------------------------------------
    // Store bookkeeping
    // ------------------------------------------------------------------

    pub(crate) fn stamp_update(&mut self, actor: &Actor, at: String) {
        self.last_updated_at = Some(at);
        self.last_updated_by = Some(actor.user_name.clone());
        self.last_updated_by_full_name.clone_from(&actor.full_name);
    }

    pub(crate) const fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    pub(crate) fn clear_removals(&mut self) {
        self.removed.clear();
    }
}
