//! LocTrack Store - SQLite persistence for location samples
//!
//! Provides:
//! - SQLite connection setup and embedded, checksummed migrations
//! - `LocationRepo`: append-only inserts and time-ordered reads
//! - `LocationStore`: thread-safe store that publishes live queries
//!   (`stream_all`, `stream_latest`) after every committed write

#![allow(clippy::result_large_err)]

pub mod db;
pub mod errors;
pub mod live;
pub mod migrations;
pub mod repo;
pub mod store;

pub use errors::Result;
pub use live::LiveQuery;
pub use repo::LocationRepo;
pub use store::LocationStore;
