//! Module: store
//! Responsibility: persistence contract and the in-process reference backend.

mod backend;
mod memory;


pub use backend::RecordBackend;
pub use memory::MemoryStore;
