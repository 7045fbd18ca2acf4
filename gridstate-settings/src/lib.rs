//! Durable per-table view settings.
//!
//! Every table in the console keeps a small persisted record (sort column,
//! page size, hidden columns, auto-refresh rate) keyed by a caller-supplied
//! storage key. This crate owns that record, the storage backends it is
//! written through, and the per-key [`SettingsStore`] that table engines
//! observe.
//!
//! Mutations are synchronous: the in-memory record is updated first, the
//! full record is written through to the backend, and every registered
//! observer is notified before the mutation returns. A failed backend write
//! is reported to the caller but never rolls back the in-memory record.

mod backend;
mod memory;
pub mod paths;
mod record;
mod registry;
mod sqlite;
mod store;

pub use backend::SettingsBackend;
pub use memory::MemoryBackend;
pub use record::{DEFAULT_PAGE_SIZE, SettingsRecord, SortSpec};
pub use registry::SettingsRegistry;
pub use sqlite::SqliteBackend;
pub use store::{SettingsStore, Subscription};

use thiserror::Error;

/// Settings error type.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(bincode::Error),
    #[error("deserialization error: {0}")]
    Deserialization(bincode::Error),
    #[error("page size must be positive")]
    InvalidPageSize,
}
