//! Engine error types.

use thiserror::Error;

use gridstate_settings::SettingsError;

/// Contract violations and settings failures surfaced by engine mutations.
///
/// Clamping (page index, shrunk datasets) is policy, not an error, and is
/// never surfaced through this type.
#[derive(Debug, Error)]
pub enum TableError {
    /// Sort was requested for a column id that is not in the schema.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}
