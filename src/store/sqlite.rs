//! SQLite-backed settings store.
//!
//! A single `settings` table of name → value rows, WAL mode for
//! concurrent readers. Encrypted blobs and the encryption flag land
//! here as ordinary rows; nothing in this layer knows about
//! representations.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use super::SettingsStore;

pub struct SqliteStore {
    db: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the settings database at the given path.
    pub fn open(db_path: &Path) -> Result<Self> {
        let db = Connection::open(db_path).context("Failed to open settings database")?;

        db.pragma_update(None, "journal_mode", "WAL")?;
        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS settings (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;

        info!(path = %db_path.display(), "Settings database opened");
        Ok(Self { db: Mutex::new(db) })
    }

    /// Open the store at the default location (`~/.utm-manager/settings.db`).
    pub fn open_default() -> Result<Self> {
        let home = dirs::home_dir().context("Cannot determine home directory")?;
        let data_dir = home.join(".utm-manager");
        std::fs::create_dir_all(&data_dir)
            .context("Failed to create data directory")?;
        Self::open(&data_dir.join("settings.db"))
    }
}

impl SettingsStore for SqliteStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        let db = self.db.lock().unwrap();
        let result = db.query_row(
            "SELECT value FROM settings WHERE name = ?1",
            params![name],
            |row| row.get(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO settings (name, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![name, value, now],
        )?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute("DELETE FROM settings WHERE name = ?1", params![name])?;
        Ok(())
    }
}
