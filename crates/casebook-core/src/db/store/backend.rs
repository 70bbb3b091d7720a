use crate::{
    error::InternalError,
    record::Record,
    types::{RecordId, ShortId},
};

///
/// RecordBackend
///
/// Document persistence consumed by `RecordStore`. Writes are
/// compare-and-swap on the record revision: `expected` is the revision the
/// writer read, `None` for an insert. A mismatch is a `Conflict`.
///

pub trait RecordBackend {
    fn load(&self, id: &RecordId) -> Result<Option<Record>, InternalError>;

    /// At most one record answers to a short id.
    fn load_by_short_id(&self, short_id: &ShortId) -> Result<Option<Record>, InternalError>;

    /// Persist `record`, returning the new revision.
    fn put(&self, record: &Record, expected: Option<u64>) -> Result<u64, InternalError>;
}
