//! Local persistence for the coach's durable state.
//!
//! Everything lives in one `SQLite` file:
//!
//! ```text
//! kv            # JSON values under logical keys: userProfile, workoutPlan, adjustmentPending
//! session_log   # Append-only session history (rowid order is chronological)
//! ```
//!
//! Values that no longer parse are reported as absent so a corrupted store
//! never locks the user out.

mod history;
mod state;

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use rusqlite::{Connection, OptionalExtension};
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Logical keys of the key-value table.
#[derive(Debug, Clone, Copy)]
enum Key {
    UserProfile,
    WorkoutPlan,
    AdjustmentPending,
}

impl Key {
    fn as_str(self) -> &'static str {
        match self {
            Self::UserProfile => "userProfile",
            Self::WorkoutPlan => "workoutPlan",
            Self::AdjustmentPending => "adjustmentPending",
        }
    }
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS session_log (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        body TEXT NOT NULL
    );
";

/// `SQLite`-backed durable store.
pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    /// Opens (or creates) the store at `path`.
    ///
    /// The parent directory is created if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    /// A throwaway store that lives only as long as this value.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Returns the default store location: `~/.coach/coach.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".coach").join("coach.sqlite"))
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // A panic mid-statement leaves nothing half-written in SQLite, so a
    // poisoned lock is still safe to use.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_json<T: DeserializeOwned>(&self, key: Key) -> Result<Option<T>> {
        let raw: Option<String> = self
            .conn()
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                [key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "discarding malformed stored value");
                Ok(None)
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: Key, value: &T) -> Result<()> {
        put_json(&self.conn(), key, value)
    }

    fn delete(&self, key: Key) -> Result<()> {
        self.conn()
            .execute("DELETE FROM kv WHERE key = ?1", [key.as_str()])?;
        Ok(())
    }
}

/// Upserts a JSON value. Takes a bare connection so it can run inside a transaction.
fn put_json<T: Serialize>(conn: &Connection, key: Key, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        rusqlite::params![key.as_str(), json],
    )?;
    Ok(())
}
