// src/store/sqlite.rs
//! SQLite-backed key-value store
//!
//! Change notifications are process-local: views opened by `view()` share one
//! connection and one channel. Separately opened stores on the same file do not
//! see each other's changes.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::broadcast;
use tracing::debug;

use super::{KeyValueStore, StoreChange, ViewId};
use crate::consts::STORE_CHANNEL_CAPACITY;
use crate::error::StoreError;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
"#;

struct Shared {
    conn: Mutex<Connection>,
    changes: broadcast::Sender<StoreChange>,
    path: Option<PathBuf>,
}

pub struct SqliteStore {
    shared: Arc<Shared>,
    view: ViewId,
}

impl SqliteStore {
    /// Open (or create) the store at `path`, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "store opened");
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open the store at the configured `paths.store_db`
    pub fn open_default() -> Result<Self, StoreError> {
        let config = crate::config::load();
        Self::open(&config.paths.store_db)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        let (changes, _) = broadcast::channel(STORE_CHANNEL_CAPACITY);
        Ok(Self {
            shared: Arc::new(Shared {
                conn: Mutex::new(conn),
                changes,
                path,
            }),
            view: ViewId::next(),
        })
    }

    /// Another view sharing this connection and change channel
    pub fn view(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            view: ViewId::next(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.shared.path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.shared.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn publish(&self, change: StoreChange) {
        // no subscribers is fine
        let _ = self.shared.changes.send(change);
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn()?
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        self.publish(StoreChange::written(key, value, self.view));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let removed = self.conn()?.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        if removed > 0 {
            self.publish(StoreChange::removed(key, self.view));
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.shared.changes.subscribe()
    }

    fn view_id(&self) -> ViewId {
        self.view
    }
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.shared.path)
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}
