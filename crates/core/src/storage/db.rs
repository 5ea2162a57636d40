//! # Pokédex Database
//!
//! Single SQLite database for durable client state, stored at
//! `.pokedex/pokedex.db`. Holds the key-value slots (favorites) behind
//! [`SqliteKvStore`](super::kv::SqliteKvStore).

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::io::get_runtime_path;

/// Schema version for migrations
const SCHEMA_VERSION: i32 = 1;

/// Database manager for durable client state
pub struct CatalogDb {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogDb {
    /// Open or create the database at `.pokedex/pokedex.db`
    pub fn open() -> Result<Self> {
        Self::open_at(get_runtime_path().join("pokedex.db"))
    }

    /// Open database at a specific path
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let conn = Connection::open(path.as_ref()).context("Failed to open pokedex database")?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Get a shared connection for use by other modules
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// Current schema version recorded in the database
    pub fn schema_version(&self) -> Result<i32> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let version: Option<i32> = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .optional()?
            .flatten();
        Ok(version.unwrap_or(0))
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
            [],
        )?;

        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_version < 1 {
            Self::migrate_v1(&conn)?;
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![1],
            )?;
        }

        Ok(())
    }

    /// Migration to version 1 - key-value slots
    fn migrate_v1(conn: &Connection) -> Result<()> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        tracing::info!(
            "CatalogDb initialized with schema version {}",
            SCHEMA_VERSION
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_in_memory_db_is_migrated() {
        let db = CatalogDb::open_in_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_reopen_keeps_schema() {
        let path = ".pokedex/test_reopen.db";
        let _ = fs::remove_file(path);

        {
            let db = CatalogDb::open_at(path).unwrap();
            assert_eq!(db.schema_version().unwrap(), 1);
        }
        let db = CatalogDb::open_at(path).unwrap();
        assert_eq!(db.schema_version().unwrap(), 1);

        drop(db);
        let _ = fs::remove_file(path);
    }
}
