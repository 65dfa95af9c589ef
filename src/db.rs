use crate::adapter::SnapshotAdapter;
use crate::error::StorageError;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILENAME: &str = "schooladmin.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILENAME);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshots(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    Ok(conn)
}

/// Snapshot adapter backed by the workspace SQLite database.
pub struct SqliteAdapter {
    conn: Connection,
}

impl SqliteAdapter {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            conn: open_db(workspace)?,
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute(
            "CREATE TABLE snapshots(key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT)",
            [],
        )?;
        Ok(Self { conn })
    }
}

impl SnapshotAdapter for SqliteAdapter {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row("SELECT value FROM snapshots WHERE key = ?", [key], |r| {
                r.get::<_, String>(0)
            })
            .optional()
            .map_err(|e| StorageError::read(key, e))
    }

    fn write(&self, key: &str, snapshot: &str) -> Result<(), StorageError> {
        // Single statement, so the previous snapshot survives any failure.
        self.conn
            .execute(
                "INSERT INTO snapshots(key, value, updated_at)
                 VALUES(?, ?, strftime('%Y-%m-%dT%H:%M:%SZ','now'))
                 ON CONFLICT(key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = excluded.updated_at",
                (key, snapshot),
            )
            .map(|_| ())
            .map_err(|e| StorageError::write(key, e))
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM snapshots ORDER BY key")
            .map_err(|e| StorageError::read("*", e))?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())
            .map_err(|e| StorageError::read("*", e))?;
        Ok(keys)
    }

    fn kind(&self) -> &'static str {
        "sqlite"
    }
}
