//! The persisted settings record.

use serde::{Deserialize, Serialize};

/// Page size used when a table has no persisted record yet.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Chosen sort column and direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column id to sort by, or `None` for the dataset's natural order.
    pub column_id: Option<String>,
    /// Sort direction; `false` is ascending.
    pub descending: bool,
}

impl SortSpec {
    /// Ascending sort by the given column.
    pub fn by(column_id: impl Into<String>) -> Self {
        Self {
            column_id: Some(column_id.into()),
            descending: false,
        }
    }

    /// No sort; rows keep dataset order.
    pub fn unsorted() -> Self {
        Self::default()
    }
}

/// The durable subset of one table's view state.
///
/// Created lazily the first time a storage key is accessed, mutated only
/// through [`SettingsStore`](crate::SettingsStore) operations, and never
/// deleted during normal operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    /// Persisted sort column and direction.
    pub sort: SortSpec,
    /// Persisted rows-per-page choice.
    pub page_size: usize,
    /// Column ids the user chose to hide. `None` means visibility was never
    /// configured and the schema's default-hidden flags apply; `Some(vec![])`
    /// means the user explicitly hid nothing.
    pub hidden_columns: Option<Vec<String>>,
    /// Auto-refresh interval in seconds, 0 meaning disabled. Consumed by an
    /// external polling collaborator, not by the table engine.
    pub auto_refresh_rate: u64,
}

impl SettingsRecord {
    /// A fresh record with the documented defaults and the caller's
    /// preferred initial sort column.
    pub fn with_default_sort(column_id: Option<&str>) -> Self {
        Self {
            sort: SortSpec {
                column_id: column_id.map(str::to_string),
                descending: false,
            },
            page_size: DEFAULT_PAGE_SIZE,
            hidden_columns: None,
            auto_refresh_rate: 0,
        }
    }
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self::with_default_sort(None)
    }
}
