//! Repository layer for location rows

pub mod sqlite_repo;

pub use sqlite_repo::LocationRepo;
