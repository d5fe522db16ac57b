pub mod latest;
pub mod list;
pub mod migrate;
pub mod track;

use std::path::{Path, PathBuf};

use loctrack_core::TrackerConfig;

/// Database path from the flag, falling back to configuration
pub(crate) fn resolve_db(flag: Option<PathBuf>, config: &TrackerConfig) -> PathBuf {
    flag.unwrap_or_else(|| config.db_path.clone())
}

pub(crate) fn require_existing(db: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !db.exists() {
        return Err(format!("database not found: {}", db.display()).into());
    }
    Ok(())
}
