//! Identity and time vocabulary shared by records, history and the store.

mod actor;
mod clock;
mod ids;
mod timestamp;


pub use actor::Actor;
pub use clock::{Clock, FixedClock, SystemClock};
pub use ids::{IdSource, RecordId, SequenceIds, ShortId, UlidIds};
pub use timestamp::{attachment_suffix, history_datetime};
