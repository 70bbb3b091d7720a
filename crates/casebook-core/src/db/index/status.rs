//! Listing status classification.
//!
//! Every visible record lands under `all`, plus one of `active`/`reunited`,
//! plus `flagged` when flagged. Duplicates are hidden from every listing.

use crate::record::{Record, field};

pub const ALL: &str = "all";
pub const ACTIVE: &str = "active";
pub const REUNITED: &str = "reunited";
pub const FLAGGED: &str = "flagged";

/// Statuses a record is listed under, in emission order.
#[must_use]
pub fn statuses(record: &Record) -> Vec<&'static str> {
    if is_duplicate(record) {
        return Vec::new();
    }

    let mut statuses = vec![ALL];
    if truthy(record, field::REUNITED) {
        statuses.push(REUNITED);
    } else {
        statuses.push(ACTIVE);
    }
    if truthy(record, field::FLAG) {
        statuses.push(FLAGGED);
    }

    statuses
}

#[must_use]
pub fn is_duplicate(record: &Record) -> bool {
    truthy(record, field::DUPLICATE)
}

fn truthy(record: &Record, name: &str) -> bool {
    record.get(name).is_some_and(|value| value.is_truthy())
}
