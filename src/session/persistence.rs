use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Key of the single record holding the saved session.
pub const SESSION_RECORD_KEY: &str = "admin";

/// The saved form of an authenticated session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

impl PersistedSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            saved_at: Utc::now(),
        }
    }
}

impl fmt::Debug for PersistedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedSession")
            .field("token", &"<redacted>")
            .field("saved_at", &self.saved_at)
            .finish()
    }
}

/// Storage for the one saved session record.
///
/// Implementations must support save-on-login, load-on-start and
/// clear-on-logout. Clearing a missing record is not an error.
pub trait SessionPersistence: Send + Sync {
    fn load(&self) -> Result<Option<PersistedSession>>;
    fn save(&self, record: &PersistedSession) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// In-memory persistence. Clones share the same record, so a test can keep a
/// handle and inspect what the store saved.
#[derive(Clone, Default)]
pub struct MemoryPersistence {
    record: Arc<Mutex<Option<PersistedSession>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a record already saved, as if from an earlier run.
    pub fn with_record(record: PersistedSession) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(record))),
        }
    }

    pub fn current(&self) -> Option<PersistedSession> {
        self.record.lock().expect("persistence lock poisoned").clone()
    }
}

impl SessionPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self.current())
    }

    fn save(&self, record: &PersistedSession) -> Result<()> {
        *self.record.lock().expect("persistence lock poisoned") = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.record.lock().expect("persistence lock poisoned") = None;
        Ok(())
    }
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Session record kept in a small SQLite key-value table.
#[derive(Clone)]
pub struct SqlitePersistence {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePersistence {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Session database path has no parent directory"))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open session database {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute_batch(SCHEMA)
            .context("Failed to create session schema")
    }
}

/// Where the session database lives when no path is configured.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "folio")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("session.db"))
}

impl SessionPersistence for SqlitePersistence {
    fn load(&self) -> Result<Option<PersistedSession>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?",
                [SESSION_RECORD_KEY],
                |row| row.get(0),
            )
            .optional()?;

        value
            .map(|json| serde_json::from_str(&json).context("Failed to parse saved session"))
            .transpose()
    }

    fn save(&self, record: &PersistedSession) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let json = serde_json::to_string(record)?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at",
            (SESSION_RECORD_KEY, json, record.saved_at.to_rfc3339()),
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute("DELETE FROM kv_store WHERE key = ?", [SESSION_RECORD_KEY])?;
        Ok(())
    }
}
