//! Tabular state engine for dataset-backed console views.
//!
//! Given an in-memory dataset and a column schema,
//! [`TableEngine`](table::TableEngine) derives a filtered, sorted,
//! paginated view, tracks id-keyed row selection and expansion, and keeps
//! the persistence-worthy slice of its state (sort, page size, hidden
//! columns) synchronized with a
//! [`SettingsStore`](gridstate_settings::SettingsStore).
//!
//! The engine is presentation-agnostic: a rendering shell reads
//! [`derived_view`](table::TableEngine::derived_view) and forwards user
//! intents back as engine operations. It owns no I/O and never awaits;
//! dataset fetching and durable storage live behind the interfaces in
//! [`gridstate_settings`].

pub mod column;
pub mod error;
pub mod expansion;
pub mod selection;
pub mod table;

pub use gridstate_settings as settings;

pub mod prelude {
    pub use crate::column::{CellValue, Column, TableRow};
    pub use crate::error::TableError;
    pub use crate::expansion::Expansion;
    pub use crate::selection::{Selection, SelectionMode};
    pub use crate::table::{DerivedView, EngineId, TableEngine};

    pub use gridstate_settings::{
        MemoryBackend, SettingsBackend, SettingsError, SettingsRecord, SettingsRegistry,
        SettingsStore, SortSpec, SqliteBackend, Subscription,
    };
}
