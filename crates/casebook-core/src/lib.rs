//! Core runtime for casebook: case records, their append-only history, the
//! sorted listing views, and the store facade tying them together.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod db;
pub mod error;
pub mod history;
pub mod obs;
pub mod record;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

use std::num::NonZeroU32;

///
/// CONSTANTS
///

/// Listing page size used when no caller-visible override is supplied.
pub const DEFAULT_PER_PAGE: NonZeroU32 = match NonZeroU32::new(20) {
    Some(n) => n,
    None => unreachable!(),
};

///
/// Prelude
///
/// Domain vocabulary only. No executors, backends, or error types.
///

pub mod prelude {
    pub use crate::{
        db::{AccessScope, SortField},
        history::{Change, HistoryEntry},
        record::{Attachment, AttachmentKey, Record},
        types::{Actor, RecordId, ShortId},
        value::Value,
    };
}
