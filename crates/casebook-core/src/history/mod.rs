//! Module: history
//! Responsibility: change detection between record snapshots and the
//! append-only audit log built from it.
//! Does not own: persistence; the store decides when a save happens.
//! Boundary: `RecordStore` calls `HistoryRecorder` once per write.

mod diff;
mod recorder;


use crate::value::Value;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// re-exports
pub use diff::{DiffEngine, HistoryPolicy};
pub use recorder::HistoryRecorder;

///
/// ChangeSet
/// Field name → change, in field-name order.
///

pub type ChangeSet = BTreeMap<String, Change>;

///
/// HistoryEntry
///
/// One immutable audit-log element. `datetime` uses the persisted
/// `YYYY-MM-DD HH:MM:SSUTC` layout.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub datetime: String,
    pub user_name: String,
    pub user_organisation: String,
    pub changes: ChangeSet,
}

///
/// Change
///
/// `Value` for scalar and structured fields, `Set` for key-set fields such
/// as attachments. Untagged on the wire; `Value` is tried first because it
/// requires both of its keys.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Change {
    Value {
        from: Value,
        to: Value,
    },
    Set {
        #[serde(default, deserialize_with = "null_as_empty")]
        added: Vec<String>,
        #[serde(default, deserialize_with = "null_as_empty")]
        deleted: Vec<String>,
    },
}

impl Change {
    #[must_use]
    pub const fn value(from: Value, to: Value) -> Self {
        Self::Value { from, to }
    }

    #[must_use]
    pub const fn set(added: Vec<String>, deleted: Vec<String>) -> Self {
        Self::Set { added, deleted }
    }
}

// Older clients send `"deleted": null` for an empty side.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
