use crate::error::InternalError;
use time::{
    OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

// Persisted layouts; readers on other platforms match these byte-for-byte.
const HISTORY_DATETIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]UTC");
const ATTACHMENT_SUFFIX: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour][minute][second]");

/// Format an instant as a history datetime, e.g. `2010-01-20 17:10:32UTC`.
pub fn history_datetime(now: OffsetDateTime) -> Result<String, InternalError> {
    now.to_offset(UtcOffset::UTC)
        .format(HISTORY_DATETIME)
        .map_err(|err| InternalError::clock_internal(format!("history datetime format: {err}")))
}

/// Format the local-time attachment key suffix, e.g. `2010-01-17T140532`.
///
/// The instant keeps its own offset; attachment keys use registry local time.
pub fn attachment_suffix(now: OffsetDateTime) -> Result<String, InternalError> {
    now.format(ATTACHMENT_SUFFIX)
        .map_err(|err| InternalError::clock_internal(format!("attachment suffix format: {err}")))
}
