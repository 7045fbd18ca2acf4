//! Settings backend trait.

use super::SettingsError;

/// Backend trait for durable settings storage.
///
/// Implementations handle raw byte storage under namespaced string keys.
/// The [`SettingsStore`](crate::SettingsStore) wraps this with typed
/// serialization. Reads of a key must observe the most recent completed
/// write of that key within the same process.
pub trait SettingsBackend: Send + Sync {
    /// Get raw bytes for a key, or `None` if the key was never written.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, SettingsError>;

    /// Write raw bytes for a key, replacing any previous value.
    fn write(&self, key: &str, value: Vec<u8>) -> Result<(), SettingsError>;
}
