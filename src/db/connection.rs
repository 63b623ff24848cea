use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

/// Handle to the on-disk SQLite file. Only the path is stored: every
/// operation calls [`Database::connect`] and drops the connection when it
/// returns, so nothing stays open between statements.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open a fresh connection for a single operation.
    pub fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).context("failed to open SQLite database")?;
        debug!(path = %self.path.display(), "database connection established");
        Ok(conn)
    }

    /// Create the data directory and the `reservations` table when they are
    /// missing. Safe to call on every start-up.
    pub fn ensure_schema(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("failed to create data directory")?;
            }
        }

        let conn = self.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS reservations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                bus_no TEXT NOT NULL,
                route TEXT NOT NULL,
                passenger_name TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                start_location TEXT NOT NULL,
                end_location TEXT NOT NULL,
                purpose TEXT NOT NULL,
                passenger_count INTEGER NOT NULL,
                vehicle_type TEXT NOT NULL
            )",
            [],
        )
        .context("failed to create reservations table")?;

        Ok(())
    }
}
