//! Migrate command
//!
//! Usage: loctrack migrate [--db PATH]

use clap::Args;
use std::path::PathBuf;

use loctrack_core::TrackerConfig;
use loctrack_store::{db, migrations};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// SQLite database file (defaults to the configured path)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

pub fn execute(
    args: MigrateArgs,
    config: &TrackerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::resolve_db(args.db, config);

    let mut conn = db::open(&path)?;
    db::configure(&conn)?;
    migrations::apply_migrations(&mut conn)?;

    println!("Database ready: {}", path.display());
    for id in migrations::applied_migrations(&conn)? {
        println!("  applied: {}", id);
    }
    Ok(())
}
