//! Thread-safe location store with live queries
//!
//! `LocationStore` owns the SQLite connection and the two query subjects.
//! Every insert runs under the connection lock and folds the committed row
//! into both subjects before the lock is released, so a subject can never
//! move backwards and id assignment is atomic across concurrent callers.
//!
//! The all-samples subject is only materialised while someone subscribes to
//! it. Inserts with no subscriber touch the latest subject and nothing else;
//! the next `stream_all` reloads the table once.

#![allow(clippy::result_large_err)]

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use loctrack_core::model::{LocationSample, NewSample};
use loctrack_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::Connection;
use tokio::sync::watch;

use crate::db;
use crate::errors::{lock_poisoned, Result};
use crate::live::LiveQuery;
use crate::migrations::apply_migrations;
use crate::repo::LocationRepo;

struct Db {
    conn: Connection,
    /// `all_tx` holds the full table
    all_loaded: bool,
}

struct Inner {
    db: Mutex<Db>,
    all_tx: watch::Sender<Vec<LocationSample>>,
    latest_tx: watch::Sender<Option<LocationSample>>,
}

/// Durable, append-only store of location samples
///
/// Cheap to clone; clones share the connection and the query subjects.
#[derive(Clone)]
pub struct LocationStore {
    inner: Arc<Inner>,
}

/// Read order of the store: timestamp descending, then id descending
fn sort_key(sample: &LocationSample) -> (i64, i64) {
    (sample.timestamp, sample.id)
}

impl LocationStore {
    /// Open (or create) a store backed by a database file
    ///
    /// Configures the connection and applies pending migrations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut conn = db::open(path)?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Self::from_connection(conn)
    }

    /// Open a store backed by an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let latest = LocationRepo::latest(&conn)?;
        let (all_tx, _) = watch::channel(Vec::new());
        let (latest_tx, _) = watch::channel(latest);

        Ok(Self {
            inner: Arc::new(Inner {
                db: Mutex::new(Db {
                    conn,
                    all_loaded: false,
                }),
                all_tx,
                latest_tx,
            }),
        })
    }

    fn lock(&self, op: &str) -> Result<MutexGuard<'_, Db>> {
        self.inner.db.lock().map_err(|_| lock_poisoned(op))
    }

    /// Append a sample and return its assigned id
    ///
    /// Blocks on SQLite I/O; call from a blocking context when on an async
    /// runtime.
    ///
    /// # Errors
    ///
    /// `ERR_PERSISTENCE` when the database cannot be written,
    /// `ERR_CONSTRAINT_VIOLATION` when the row is rejected by the schema.
    pub fn insert(&self, sample: &NewSample) -> Result<i64> {
        let started = Instant::now();
        log_op_start!("insert_sample", timestamp = sample.timestamp);

        let mut db = self.lock("insert_sample")?;
        let id = match LocationRepo::insert(&db.conn, sample) {
            Ok(id) => id,
            Err(err) => {
                log_op_error!(
                    "insert_sample",
                    err.clone(),
                    duration_ms = started.elapsed().as_millis() as u64
                );
                return Err(err);
            }
        };

        self.publish(&mut db, sample.with_id(id));
        drop(db);

        log_op_end!(
            "insert_sample",
            duration_ms = started.elapsed().as_millis() as u64,
            sample_id = id
        );
        Ok(id)
    }

    /// Fold a committed row into both subjects without re-reading the table
    fn publish(&self, db: &mut Db, sample: LocationSample) {
        let all_tx = &self.inner.all_tx;
        if all_tx.receiver_count() == 0 {
            if db.all_loaded {
                all_tx.send_replace(Vec::new());
                db.all_loaded = false;
            }
        } else if db.all_loaded {
            all_tx.send_modify(|all| {
                let at = all.partition_point(|s| sort_key(s) > sort_key(&sample));
                all.insert(at, sample.clone());
            });
        }

        // Re-emitted on every write even when an older row leaves it as is.
        self.inner.latest_tx.send_modify(|latest| {
            let newer = latest
                .as_ref()
                .map_or(true, |current| sort_key(&sample) > sort_key(current));
            if newer {
                *latest = Some(sample);
            }
        });
    }

    /// Live query over all samples, newest first
    ///
    /// # Errors
    ///
    /// `ERR_PERSISTENCE` when the table has to be reloaded (first subscriber
    /// after a period with none) and the read fails.
    pub fn stream_all(&self) -> Result<LiveQuery<Vec<LocationSample>>> {
        let mut db = self.lock("stream_all")?;
        if !db.all_loaded {
            let all = LocationRepo::list_all(&db.conn)?;
            self.inner.all_tx.send_replace(all);
            db.all_loaded = true;
        }
        Ok(LiveQuery::new(self.inner.all_tx.subscribe()))
    }

    /// Live query over the most recent sample
    pub fn stream_latest(&self) -> LiveQuery<Option<LocationSample>> {
        LiveQuery::new(self.inner.latest_tx.subscribe())
    }

    /// One-shot read of all samples, newest first
    pub fn all(&self) -> Result<Vec<LocationSample>> {
        let db = self.lock("list_samples")?;
        LocationRepo::list_all(&db.conn)
    }

    /// One-shot read of the most recent sample
    pub fn latest(&self) -> Result<Option<LocationSample>> {
        let db = self.lock("latest_sample")?;
        LocationRepo::latest(&db.conn)
    }

    pub fn count(&self) -> Result<u64> {
        let db = self.lock("count_samples")?;
        LocationRepo::count(&db.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: i64) -> NewSample {
        NewSample {
            latitude: 1.0,
            longitude: 2.0,
            precision: 5.0,
            timestamp: ts,
        }
    }

    #[test]
    fn test_empty_store_publishes_empty_state() {
        let store = LocationStore::open_in_memory().unwrap();

        assert!(store.stream_all().unwrap().current().is_empty());
        assert!(store.stream_latest().current().is_none());
    }

    #[test]
    fn test_insert_publishes_before_returning() {
        let store = LocationStore::open_in_memory().unwrap();
        let latest = store.stream_latest();

        let id = store.insert(&sample(100)).unwrap();

        assert_eq!(latest.current().map(|s| s.id), Some(id));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_reopen_replays_persisted_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("locations.db");

        {
            let store = LocationStore::open(&path).unwrap();
            store.insert(&sample(100)).unwrap();
            store.insert(&sample(200)).unwrap();
        }

        let reopened = LocationStore::open(&path).unwrap();
        let timestamps: Vec<i64> = reopened
            .stream_all()
            .unwrap()
            .current()
            .iter()
            .map(|s| s.timestamp)
            .collect();
        assert_eq!(timestamps, vec![200, 100]);
    }

    #[test]
    fn test_unsubscribed_inserts_leave_all_subject_unloaded() {
        let store = LocationStore::open_in_memory().unwrap();
        for ts in [100, 300, 200] {
            store.insert(&sample(ts)).unwrap();
        }

        assert!(!store.inner.db.lock().unwrap().all_loaded);
        assert!(store.inner.all_tx.borrow().is_empty());
        assert_eq!(store.stream_latest().current().map(|s| s.timestamp), Some(300));
    }

    #[test]
    fn test_last_subscriber_gone_releases_rows() {
        let store = LocationStore::open_in_memory().unwrap();
        store.insert(&sample(100)).unwrap();

        let all = store.stream_all().unwrap();
        assert_eq!(all.current().len(), 1);
        drop(all);

        store.insert(&sample(200)).unwrap();
        assert!(!store.inner.db.lock().unwrap().all_loaded);
        assert!(store.inner.all_tx.borrow().is_empty());

        let timestamps: Vec<i64> = store
            .stream_all()
            .unwrap()
            .current()
            .iter()
            .map(|s| s.timestamp)
            .collect();
        assert_eq!(timestamps, vec![200, 100]);
    }
}
