//! List command
//!
//! Usage: loctrack list [--db PATH] [--limit N]

use clap::Args;
use std::path::PathBuf;

use loctrack_core::TrackerConfig;
use loctrack_store::LocationStore;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// SQLite database file (defaults to the configured path)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Print at most this many samples
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn execute(args: ListArgs, config: &TrackerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::resolve_db(args.db, config);
    super::require_existing(&db)?;

    let store = LocationStore::open(&db)?;
    let mut samples = store.all()?;
    if let Some(limit) = args.limit {
        samples.truncate(limit);
    }

    println!("{}", serde_json::to_string_pretty(&samples)?);
    Ok(())
}
