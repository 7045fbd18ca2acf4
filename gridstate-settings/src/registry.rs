//! Key-addressed registry of settings stores.

use std::sync::Arc;

use dashmap::DashMap;

use super::{SettingsBackend, SettingsError, SettingsStore};

/// Namespace prepended to caller storage keys before they reach the backend.
const KEY_NAMESPACE: &str = "datatable";

/// Explicit key-to-store map: one [`SettingsStore`] per distinct table
/// identity, created on first access and reused for the registry's
/// lifetime. All stores share the registry's backend.
pub struct SettingsRegistry {
    backend: Arc<dyn SettingsBackend>,
    stores: DashMap<String, SettingsStore>,
}

impl SettingsRegistry {
    /// Create a registry over the given backend.
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        Self::with_backend(Arc::new(backend))
    }

    /// Create a registry over a shared backend handle.
    pub fn with_backend(backend: Arc<dyn SettingsBackend>) -> Self {
        Self {
            backend,
            stores: DashMap::new(),
        }
    }

    /// Get the store for a storage key, creating and loading it on first
    /// access. `default_sort` seeds the record's sort column when no record
    /// exists yet; it is ignored for keys that already have one.
    pub fn store(
        &self,
        storage_key: &str,
        default_sort: Option<&str>,
    ) -> Result<SettingsStore, SettingsError> {
        if let Some(existing) = self.stores.get(storage_key) {
            return Ok(existing.clone());
        }

        let namespaced = format!("{KEY_NAMESPACE}.{storage_key}");
        let store = SettingsStore::load(namespaced, Arc::clone(&self.backend), default_sort)?;

        Ok(self
            .stores
            .entry(storage_key.to_string())
            .or_insert(store)
            .clone())
    }
}
