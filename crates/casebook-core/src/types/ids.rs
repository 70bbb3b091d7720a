use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use ulid::Ulid;

///
/// RecordId
///
/// Globally unique record identity. Generated ids are lowercase ULIDs, but
/// offline clients may supply their own (typically a UUID).
///

#[derive(
    Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn generate(ids: &dyn IdSource) -> Self {
        Self(ids.next_ulid().to_string().to_ascii_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

///
/// ShortId
///
/// Human-usable alias: the trailing characters of the record's unique
/// identifier. Used to reconcile resyncs from devices that only know it.
///

#[derive(
    Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct ShortId(String);

impl ShortId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Take the last `len` characters of a unique identifier.
    #[must_use]
    pub fn from_unique_identifier(unique_identifier: &str, len: usize) -> Self {
        let count = unique_identifier.chars().count();
        let tail: String = unique_identifier
            .chars()
            .skip(count.saturating_sub(len))
            .collect();

        Self(tail)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShortId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

///
/// IdSource
///
/// Entropy for record ids and unique identifiers.
///

pub trait IdSource {
    fn next_ulid(&self) -> Ulid;
}

///
/// UlidIds
///

#[derive(Clone, Copy, Debug, Default)]
pub struct UlidIds;

impl IdSource for UlidIds {
    fn next_ulid(&self) -> Ulid {
        Ulid::new()
    }
}

///
/// SequenceIds
///
/// Deterministic monotonically increasing ids for tests and fixtures.
///

#[derive(Debug, Default)]
pub struct SequenceIds {
    next: AtomicU64,
}

impl SequenceIds {
    #[must_use]
    pub const fn starting_at(value: u64) -> Self {
        Self {
            next: AtomicU64::new(value),
        }
    }
}

impl IdSource for SequenceIds {
    fn next_ulid(&self) -> Ulid {
        let n = self.next.fetch_add(1, Ordering::Relaxed);

        Ulid::from_parts(n, u128::from(n))
    }
}
