//! Module: db
//! Responsibility: listing plans, their execution over sorted views, and the
//! record-store facade that persists writes.

mod direction;
pub mod executor;
pub mod index;
pub mod plan;
mod session;
pub mod store;

#[cfg(test)]
mod tests;

pub use direction::Direction;
pub use executor::{Page, Paginator};
pub use index::{IndexKey, KeyPart, KeyRange, OrderedIndex, ViewIndex};
pub use plan::{AccessScope, SortField, ViewQueryPlan, ViewQueryPlanner};
pub use session::{DEFAULT_SHORT_ID_LEN, RecordDraft, RecordStore, WriteOutcome};
pub use store::{MemoryStore, RecordBackend};
