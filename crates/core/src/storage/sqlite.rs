//! Durable tier backed by a SQLite file

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::instrument;

use super::migrations;
use super::traits::{StorageTier, TierKind};
use crate::error::Result;

/// Durable key/value tier
pub struct SqliteTier {
    conn: Mutex<Connection>,
}

impl SqliteTier {
    /// Open or create the database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get current schema version
    pub fn schema_version(&self) -> Result<u32> {
        migrations::get_current_version(&self.conn())
    }
}

impl StorageTier for SqliteTier {
    fn kind(&self) -> TierKind {
        TierKind::Durable
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.conn().execute("DELETE FROM kv_store", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_get_overwrite() {
        let tier = SqliteTier::open_in_memory().unwrap();
        assert_eq!(tier.get_item("events").unwrap(), None);

        tier.set_item("events", "[]").unwrap();
        tier.set_item("events", "[1]").unwrap();
        assert_eq!(tier.get_item("events").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let tier = SqliteTier::open(&path).unwrap();
            tier.set_item("announcements", "[]").unwrap();
        }

        let tier = SqliteTier::open(&path).unwrap();
        assert_eq!(
            tier.get_item("announcements").unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(tier.schema_version().unwrap(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let tier = SqliteTier::open_in_memory().unwrap();
        tier.set_item("a", "1").unwrap();
        tier.set_item("b", "2").unwrap();

        tier.remove_item("a").unwrap();
        tier.remove_item("missing").unwrap();
        assert_eq!(tier.get_item("a").unwrap(), None);

        tier.clear().unwrap();
        assert_eq!(tier.get_item("b").unwrap(), None);
        assert!(tier.probe().is_ok());
    }
}
