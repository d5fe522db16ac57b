//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, io_error, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open a SQLite database at the given path, creating parent directories
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error("create_db_dir", e))?;
    }
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection with the settings the store relies on
pub fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(from_rusqlite)?;

    // WAL lets readers proceed while a write is in flight.
    // journal_mode returns a row, so it must go through query_row.
    let _mode: String = conn
        .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
        .map_err(from_rusqlite)?;

    Ok(())
}
