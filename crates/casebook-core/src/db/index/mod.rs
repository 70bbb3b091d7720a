//! Module: index
//! Responsibility: declared sorted views, their key collation, and the
//! range-scan contract the storage layer provides.

mod key;
mod ordered;
mod range;
pub mod status;
mod view;

#[cfg(test)]
mod tests;

pub use key::{IndexKey, KeyPart};
pub use ordered::{OrderedIndex, ScanRequest};
pub use range::KeyRange;
pub use view::ViewIndex;
