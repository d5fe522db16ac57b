//! SQLite repository implementation
//!
//! Append-only access to the `locations` table. There is deliberately no
//! update or delete.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use loctrack_core::model::{LocationSample, NewSample};
use rusqlite::{Connection, OptionalExtension, Row};

const SELECT_COLUMNS: &str = "SELECT id, latitude, longitude, precision, timestamp FROM locations";

/// SQLite repository for location samples
pub struct LocationRepo;

impl LocationRepo {
    /// Append a sample and return its assigned id
    pub fn insert(conn: &Connection, sample: &NewSample) -> Result<i64> {
        conn.execute(
            "INSERT INTO locations (latitude, longitude, precision, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                sample.latitude,
                sample.longitude,
                f64::from(sample.precision),
                sample.timestamp,
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(conn.last_insert_rowid())
    }

    /// All samples, newest first
    ///
    /// Ties on `timestamp` fall back to descending id, so the order is total.
    pub fn list_all(conn: &Connection) -> Result<Vec<LocationSample>> {
        let mut stmt = conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY timestamp DESC, id DESC"))
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([], map_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(rows)
    }

    /// The sample with the greatest timestamp, if any
    pub fn latest(conn: &Connection) -> Result<Option<LocationSample>> {
        conn.query_row(
            &format!("{SELECT_COLUMNS} ORDER BY timestamp DESC, id DESC LIMIT 1"),
            [],
            map_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    pub fn count(conn: &Connection) -> Result<u64> {
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
        Ok(count.max(0) as u64)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<LocationSample> {
    let precision: f64 = row.get(3)?;
    Ok(LocationSample {
        id: row.get(0)?,
        latitude: row.get(1)?,
        longitude: row.get(2)?,
        precision: precision as f32,
        timestamp: row.get(4)?,
    })
}
