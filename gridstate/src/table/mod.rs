//! Table state engine - derived views over a dataset with persisted settings.
//!
//! The engine consumes a dataset, a column schema, and a bound
//! [`SettingsStore`](gridstate_settings::SettingsStore); it produces a
//! filtered, sorted, paginated [`DerivedView`] and exposes intent
//! operations for sort, filter text, paging, selection and expansion.
//! Persistence-worthy intents (sort, page size) are forwarded to the store;
//! transient state (page index, in-progress filter text) is not.
//!
//! # Example
//!
//! ```ignore
//! use gridstate::prelude::*;
//!
//! #[derive(Clone)]
//! struct Container {
//!     id: String,
//!     name: String,
//!     created: i64,
//! }
//!
//! impl TableRow for Container {
//!     fn row_id(&self) -> String {
//!         self.id.clone()
//!     }
//! }
//!
//! let registry = SettingsRegistry::new(MemoryBackend::new());
//! let store = registry.store("containers", Some("name"))?;
//!
//! let columns = vec![
//!     Column::new("name", "Name", |c: &Container| CellValue::Text(c.name.clone())).sortable(),
//!     Column::new("created", "Created", |c: &Container| CellValue::Integer(c.created)).sortable(),
//! ];
//!
//! let table = TableEngine::with_dataset(columns, &store, containers);
//! table.set_filter_text("web");
//! let view = table.derived_view();
//! ```

mod state;
mod view;

pub use state::{EngineId, TableEngine};
pub use view::DerivedView;
