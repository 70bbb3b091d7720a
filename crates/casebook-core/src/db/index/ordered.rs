use crate::{
    db::index::{KeyRange, ViewIndex},
    error::InternalError,
    record::Record,
};

///
/// ScanRequest
///
/// One bounded range scan: skip `skip` entries in traversal order, then
/// return at most `limit` records.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanRequest {
    pub index: ViewIndex,
    pub range: KeyRange,
    pub skip: usize,
    pub limit: usize,
}

///
/// OrderedIndex
///
/// Sorted key-range scan primitive provided by the storage layer.
/// Implementations must stream: only the requested window is materialised,
/// and `count` must not load records.
///

pub trait OrderedIndex {
    /// Whether the backend maintains `index` at all.
    fn declares(&self, index: ViewIndex) -> bool;

    fn scan(&self, request: &ScanRequest) -> Result<Vec<Record>, InternalError>;

    fn count(&self, index: ViewIndex, range: &KeyRange) -> Result<u64, InternalError>;
}
