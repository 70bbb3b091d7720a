//! ## Crate layout
//! - `core`: records, history, listing plans, and the store facade.
//! - `config`: TOML registry configuration.
//! - `registry`: the configured entry point endpoints call.
//! - `listing`, `search`, `update`, `sync`, `export`: endpoint-side glue
//!   around the core.
//!
//! The `prelude` module mirrors the surface endpoint code uses.

pub use casebook_config as config;
pub use casebook_core as core;

pub mod error;
pub mod export;
pub mod listing;
pub mod registry;
pub mod search;
pub mod sync;
pub mod update;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, ErrorKind};
pub use registry::Registry;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, ErrorKind, Registry,
        config::RegistryConfig,
        core::{
            db::{AccessScope, MemoryStore, RecordStore, SortField},
            history::{Change, HistoryEntry},
            record::{Attachment, AttachmentKey, Record},
            types::{Actor, RecordId, ShortId},
            value::Value,
        },
        export::{ExportRegistry, Exporter},
        listing::{ListingPage, ListingRequest},
        search::{SearchOutcome, TextSearch},
        sync::SyncPayload,
        update::RecordUpdate,
    };
}
