use crate::{
    history::{Change, ChangeSet},
    record::{Record, field},
    value::Value,
};
use std::collections::BTreeSet;

///
/// HistoryPolicy
///
/// Fields that never produce history. Kept as data: the observed list is a
/// single orientation field, and nothing is inferred beyond what is listed.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HistoryPolicy {
    suppressed: BTreeSet<String>,
}

impl HistoryPolicy {
    #[must_use]
    pub fn new<I, S>(suppressed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suppressed: suppressed.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_suppressed(&self, name: &str) -> bool {
        self.suppressed.contains(name)
    }

    #[must_use]
    pub const fn suppressed(&self) -> &BTreeSet<String> {
        &self.suppressed
    }
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self::new([field::PHOTO_ORIENTATION])
    }
}

///
/// DiffEngine
///
/// Field-level change detection between two snapshots of one record.
///

#[derive(Clone, Debug, Default)]
pub struct DiffEngine {
    policy: HistoryPolicy,
}

impl DiffEngine {
    #[must_use]
    pub const fn new(policy: HistoryPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &HistoryPolicy {
        &self.policy
    }

    /// Compute the change set from `previous` to `next`.
    ///
    /// A field missing from `next` is only a deletion when it was removed
    /// explicitly. Attachments diff by key set; payload bytes are ignored.
    #[must_use]
    pub fn diff(&self, previous: &Record, next: &Record) -> ChangeSet {
        let mut changes = ChangeSet::new();

        // Phase 1: present fields, including creation against an empty baseline.
        for (name, value) in next.fields() {
            if self.policy.is_suppressed(name) {
                continue;
            }

            let before = previous.get(name).unwrap_or(&Value::Null);
            if before != value {
                changes.insert(name.clone(), Change::value(before.clone(), value.clone()));
            }
        }

        // Phase 2: explicit removals.
        for name in next.removed_fields() {
            if self.policy.is_suppressed(name) || next.get(name).is_some() {
                continue;
            }

            if let Some(before) = previous.get(name)
                && !before.is_null()
            {
                changes.insert(name.clone(), Change::value(before.clone(), Value::Null));
            }
        }

        // Phase 3: attachment key sets.
        if !self.policy.is_suppressed(field::ATTACHMENTS)
            && let Some(change) = attachment_change(previous, next)
        {
            changes.insert(field::ATTACHMENTS.to_string(), change);
        }

        changes
    }
}

fn attachment_change(previous: &Record, next: &Record) -> Option<Change> {
    let before = previous.attachments();
    let after = next.attachments();

    let added: Vec<String> = after
        .keys()
        .filter(|key| !before.contains_key(*key))
        .map(ToString::to_string)
        .collect();
    let deleted: Vec<String> = before
        .keys()
        .filter(|key| !after.contains_key(*key))
        .map(ToString::to_string)
        .collect();

    if added.is_empty() && deleted.is_empty() {
        None
    } else {
        Some(Change::set(added, deleted))
    }
}
