//! Module: update
//! Responsibility: turn an incoming form or sync payload into field and
//! attachment mutations on a loaded record.
//! Does not own: persistence; callers save through `RecordStore`.

use casebook_core::{
    db::RecordStore,
    error::InternalError,
    record::{Attachment, AttachmentKey, Record, field},
    types::RecordId,
    value::Value,
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

/// Attachment role token for record photos.
pub const PHOTO_ROLE: &str = "photo";

///
/// UpdateError
///

#[derive(Debug, ThisError)]
pub enum UpdateError {
    #[error("record {0} not found")]
    NotFound(RecordId),

    #[error("no photo under key '{0}'")]
    UnknownPhoto(String),

    #[error(transparent)]
    Core(#[from] InternalError),
}

///
/// RecordUpdate
///
/// One incoming edit. Envelope names in the payload are dropped, since
/// mobile clients post whole documents back.
///

#[derive(Clone, Debug, Default)]
pub struct RecordUpdate {
    pub fields: BTreeMap<String, Value>,
    pub photo: Option<Attachment>,
}

impl RecordUpdate {
    #[must_use]
    pub const fn new(fields: BTreeMap<String, Value>) -> Self {
        Self {
            fields,
            photo: None,
        }
    }

    #[must_use]
    pub fn with_photo(mut self, photo: Attachment) -> Self {
        self.photo = Some(photo);
        self
    }

    /// Apply onto `record`. Returns the key minted for a new photo.
    ///
    /// A new photo never replaces the old one; it lands under a fresh key
    /// and becomes the current photo.
    pub fn apply<B>(
        self,
        store: &RecordStore<B>,
        record: &mut Record,
    ) -> Result<Option<AttachmentKey>, UpdateError> {
        for (name, value) in form_fields(self.fields) {
            record.set(name, value)?;
        }

        let Some(photo) = self.photo else {
            return Ok(None);
        };
        let key = store.new_attachment_key(PHOTO_ROLE)?;
        record.attach(key.clone(), photo);
        record.set(field::CURRENT_PHOTO_KEY, key.as_str())?;

        Ok(Some(key))
    }
}

/// Drop envelope names and cast the flag to a boolean.
pub(crate) fn form_fields(fields: BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    fields
        .into_iter()
        .filter(|(name, _)| {
            let reserved = field::is_reserved(name);
            if reserved {
                tracing::trace!(field = %name, "envelope field dropped from payload");
            }
            !reserved
        })
        .map(|(name, value)| {
            let value = if name == field::FLAG {
                Value::Bool(value.is_truthy())
            } else {
                value
            };
            (name, value)
        })
        .collect()
}

/// Replace a photo's bytes with a rotated rendition under the same key.
///
/// Only the orientation field changes, so the following save appends no
/// history entry.
pub fn rotate_photo(
    record: &mut Record,
    key: &AttachmentKey,
    orientation: impl Into<Value>,
    rotated: Vec<u8>,
) -> Result<(), UpdateError> {
    if record.attachment(key).is_none() {
        return Err(UpdateError::UnknownPhoto(key.to_string()));
    }

    record.replace_attachment_data(key, rotated)?;
    record.set(field::PHOTO_ORIENTATION, orientation)?;

    Ok(())
}

/// Make an existing photo the record's current photo.
pub fn select_primary_photo(record: &mut Record, key: &AttachmentKey) -> Result<(), UpdateError> {
    if !key.matches_role(PHOTO_ROLE) || record.attachment(key).is_none() {
        return Err(UpdateError::UnknownPhoto(key.to_string()));
    }

    record.set(field::CURRENT_PHOTO_KEY, key.as_str())?;

    Ok(())
}

/// Current photo key, falling back to the most recent photo attachment.
#[must_use]
pub fn current_photo_key(record: &Record) -> Option<AttachmentKey> {
    record
        .get_text(field::CURRENT_PHOTO_KEY)
        .map(AttachmentKey::from)
        .filter(|key| record.attachment(key).is_some())
        .or_else(|| record.latest_attachment_for_role(PHOTO_ROLE).cloned())
}

///
/// TESTS
///
