//! Per-table settings store with synchronous observer notification.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use log::warn;

use super::{SettingsBackend, SettingsError, SettingsRecord, SortSpec};

type Observer = Arc<dyn Fn(&SettingsRecord) + Send + Sync>;

struct StoreInner {
    key: String,
    backend: Arc<dyn SettingsBackend>,
    record: RwLock<SettingsRecord>,
    observers: RwLock<Vec<(usize, Observer)>>,
}

/// Persisted view settings for one table identity.
///
/// One store exists per storage key for the lifetime of its registry; every
/// mounted table engine bound to the key observes the same instance. Each
/// mutation merges into the in-memory record, writes the full record
/// through the backend, then notifies observers synchronously, so a reader
/// queried immediately after a mutation sees the new values.
///
/// The in-memory record stays authoritative when the backend write fails:
/// the mutation returns the error, observers are still notified, and the
/// session keeps working with only the persisted copy at risk.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<StoreInner>,
}

impl SettingsStore {
    /// Load the record stored under `key`, falling back to defaults when the
    /// key was never written or its payload no longer deserializes.
    pub(crate) fn load(
        key: String,
        backend: Arc<dyn SettingsBackend>,
        default_sort: Option<&str>,
    ) -> Result<Self, SettingsError> {
        let record = match backend.read(&key)? {
            Some(bytes) => match bincode::deserialize(&bytes)
                .map_err(SettingsError::Deserialization)
            {
                Ok(record) => record,
                Err(err) => {
                    warn!("settings under {key} are unreadable, using defaults: {err}");
                    SettingsRecord::with_default_sort(default_sort)
                }
            },
            None => SettingsRecord::with_default_sort(default_sort),
        };

        Ok(Self {
            inner: Arc::new(StoreInner {
                key,
                backend,
                record: RwLock::new(record),
                observers: RwLock::new(Vec::new()),
            }),
        })
    }

    /// The namespaced key this store persists under.
    pub fn storage_key(&self) -> &str {
        &self.inner.key
    }

    /// Current record.
    pub fn get(&self) -> SettingsRecord {
        self.inner
            .record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Set the sort column and direction.
    pub fn set_sort(
        &self,
        column_id: Option<&str>,
        descending: bool,
    ) -> Result<(), SettingsError> {
        self.mutate(|record| {
            record.sort = SortSpec {
                column_id: column_id.map(str::to_string),
                descending,
            };
        })
    }

    /// Set the rows-per-page choice. Zero is a contract violation and leaves
    /// the record untouched.
    pub fn set_page_size(&self, page_size: usize) -> Result<(), SettingsError> {
        if page_size == 0 {
            return Err(SettingsError::InvalidPageSize);
        }
        self.mutate(|record| record.page_size = page_size)
    }

    /// Set the user's hidden-column choice. Passing an empty iterator means
    /// "hide nothing", which is distinct from never having configured
    /// visibility.
    pub fn set_hidden_columns(
        &self,
        ids: impl IntoIterator<Item = String>,
    ) -> Result<(), SettingsError> {
        let mut ids: Vec<String> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();
        self.mutate(|record| record.hidden_columns = Some(ids))
    }

    /// Set the auto-refresh interval in seconds, 0 disabling it.
    pub fn set_auto_refresh_rate(&self, seconds: u64) -> Result<(), SettingsError> {
        self.mutate(|record| record.auto_refresh_rate = seconds)
    }

    /// Register an observer invoked synchronously after every mutation.
    ///
    /// Dropping the returned [`Subscription`] deregisters the observer.
    pub fn subscribe(
        &self,
        observer: impl Fn(&SettingsRecord) + Send + Sync + 'static,
    ) -> Subscription {
        static NEXT_OBSERVER: AtomicUsize = AtomicUsize::new(0);
        let id = NEXT_OBSERVER.fetch_add(1, Ordering::SeqCst);

        self.inner
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));

        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    fn mutate(&self, apply: impl FnOnce(&mut SettingsRecord)) -> Result<(), SettingsError> {
        let updated = {
            let mut record = self
                .inner
                .record
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            apply(&mut record);
            record.clone()
        };

        let persisted = self.persist(&updated);
        if let Err(err) = &persisted {
            warn!("failed to persist settings under {}: {err}", self.inner.key);
        }

        self.notify(&updated);
        persisted
    }

    fn persist(&self, record: &SettingsRecord) -> Result<(), SettingsError> {
        let bytes = bincode::serialize(record).map_err(SettingsError::Serialization)?;
        self.inner.backend.write(&self.inner.key, bytes)
    }

    fn notify(&self, record: &SettingsRecord) {
        // Snapshot the observer list so callbacks run without the lock held
        // and may themselves call back into the store.
        let observers: Vec<Observer> = self
            .inner
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in observers {
            observer(record);
        }
    }
}

/// Observer registration handle; deregisters on drop.
pub struct Subscription {
    id: usize,
    store: Weak<StoreInner>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner
                .observers
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}
