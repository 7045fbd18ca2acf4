//! SQLite settings backend with in-memory cache.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;
use rusqlite::Connection;

use super::{SettingsBackend, SettingsError, paths};

/// SQLite-backed settings storage with DashMap cache.
///
/// The cache keeps reads on the UI thread cheap and guarantees
/// read-your-writes within the process even while a write is still being
/// flushed by SQLite.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
    cache: DashMap<String, Vec<u8>>,
}

impl SqliteBackend {
    /// Open (or create) a SQLite backend at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let conn = Connection::open(path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            cache: DashMap::new(),
        })
    }

    /// Open the backend at the platform's default settings database
    /// location ([`paths::settings_db`]), creating the data directory when
    /// needed.
    pub fn open_default() -> Result<Self, SettingsError> {
        let path = paths::settings_db().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no platform data directory")
        })?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        Self::open(path)
    }
}

impl SettingsBackend for SqliteBackend {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, SettingsError> {
        // Check cache first
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value.clone()));
        }

        // Cache miss - query DB
        let result = {
            let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
            let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
            let mut rows = stmt.query([key])?;
            match rows.next()? {
                Some(row) => Some(row.get::<_, Vec<u8>>(0)?),
                None => None,
            }
        };

        // Populate cache
        if let Some(ref value) = result {
            self.cache.insert(key.to_string(), value.clone());
        }

        Ok(result)
    }

    fn write(&self, key: &str, value: Vec<u8>) -> Result<(), SettingsError> {
        {
            let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                rusqlite::params![key, &value],
            )?;
        }

        // Update cache
        self.cache.insert(key.to_string(), value);

        Ok(())
    }
}
