use crate::{
    error::InternalError,
    types::{IdSource, attachment_suffix},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// `-YYYY-MM-DDTHHMMSS`
const SUFFIX_LEN: usize = 18;
const TOKEN_MODULUS: u128 = 1_000_000_000;

///
/// AttachmentKey
///
/// `<role>-<token>-<YYYY-MM-DDTHHMMSS>`. The role token leads so the most
/// recent key for a role can be found by lexical match; the suffix is local
/// time so several versions of one role coexist.
///

#[derive(
    Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct AttachmentKey(String);

impl AttachmentKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Mint a fresh key for `role` at local time `now`.
    pub fn generate(
        role: &str,
        ids: &dyn IdSource,
        now: OffsetDateTime,
    ) -> Result<Self, InternalError> {
        let token = ids.next_ulid().random() % TOKEN_MODULUS;
        let suffix = attachment_suffix(now)?;

        Ok(Self(format!("{role}-{token}-{suffix}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading role token, e.g. `photo`.
    #[must_use]
    pub fn role(&self) -> &str {
        self.0.split('-').next().unwrap_or_default()
    }

    #[must_use]
    pub fn matches_role(&self, role: &str) -> bool {
        self.0
            .strip_prefix(role)
            .is_some_and(|rest| rest.starts_with('-'))
    }

    /// Trailing `YYYY-MM-DDTHHMMSS`, when the key carries one.
    #[must_use]
    pub fn timestamp_suffix(&self) -> Option<&str> {
        let start = self.0.len().checked_sub(SUFFIX_LEN)?;
        let tail = self.0.get(start..)?;
        let stamp = tail.strip_prefix('-')?;

        (stamp.as_bytes().get(10) == Some(&b'T')).then_some(stamp)
    }
}

impl From<&str> for AttachmentKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

///
/// Attachment
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Attachment {
    pub content_type: String,
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
}

impl Attachment {
    #[must_use]
    pub fn new(content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            data,
        }
    }
}
