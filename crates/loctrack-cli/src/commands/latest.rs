//! Latest command
//!
//! Usage: loctrack latest [--db PATH]
//!
//! Prints `null` when the store is empty.

use clap::Args;
use std::path::PathBuf;

use loctrack_core::TrackerConfig;
use loctrack_store::LocationStore;

#[derive(Debug, Args)]
pub struct LatestArgs {
    /// SQLite database file (defaults to the configured path)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

pub fn execute(
    args: LatestArgs,
    config: &TrackerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::resolve_db(args.db, config);
    super::require_existing(&db)?;

    let store = LocationStore::open(&db)?;
    println!("{}", serde_json::to_string_pretty(&store.latest()?)?);
    Ok(())
}
