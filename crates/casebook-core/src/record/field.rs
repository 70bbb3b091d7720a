//! Well-known record field names.
//!
//! Everything else in a record is free-form form data.

pub const NAME: &str = "name";
pub const FLAG: &str = "flag";
pub const FLAG_MESSAGE: &str = "flag_message";
pub const REUNITED: &str = "reunited";
pub const DUPLICATE: &str = "duplicate";
pub const DUPLICATE_OF: &str = "duplicate_of";
pub const VERIFIED: &str = "verified";
pub const CURRENT_PHOTO_KEY: &str = "current_photo_key";
pub const PHOTO_ORIENTATION: &str = "photo_orientation";

/// Change-set key used for the attachment key-set diff.
pub const ATTACHMENTS: &str = "attachments";

/// Names that belong to the record envelope rather than its form data.
/// Incoming payloads carrying these are stripped before they reach a record.
pub const RESERVED: &[&str] = &[
    "_id",
    "_rev",
    "_attachments",
    ATTACHMENTS,
    "created_at",
    "created_by",
    "created_by_full_name",
    "created_by_organisation",
    "created_organisation",
    "histories",
    "id",
    "last_updated_at",
    "last_updated_by",
    "last_updated_by_full_name",
    "short_id",
    "unique_identifier",
];

#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}
