//! In-memory settings backend.

use dashmap::DashMap;

use super::{SettingsBackend, SettingsError};

/// DashMap-backed settings storage for tests and ephemeral sessions.
///
/// Nothing survives the process; the store semantics are otherwise
/// identical to [`SqliteBackend`](crate::SqliteBackend).
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, SettingsError> {
        Ok(self.entries.get(key).map(|value| value.clone()))
    }

    fn write(&self, key: &str, value: Vec<u8>) -> Result<(), SettingsError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
