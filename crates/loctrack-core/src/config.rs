//! Tracker configuration
//!
//! Resolution order, lowest to highest precedence:
//! built-in defaults, TOML file, `LOCTRACK_*` environment variables.
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrackerError};
use crate::logging_facility::Profile;

/// Default sampling interval requested from the location source
pub const DEFAULT_INTERVAL_MS: u64 = 10_000;

/// Default database location, relative to the working directory
pub const DEFAULT_DB_PATH: &str = ".loctrack/locations.db";

pub const ENV_DB_PATH: &str = "LOCTRACK_DB";
pub const ENV_INTERVAL_MS: &str = "LOCTRACK_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Desired interval between fixes, in milliseconds
    pub interval_ms: u64,

    /// Logging profile used by the binary
    pub log_profile: Profile,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            interval_ms: DEFAULT_INTERVAL_MS,
            log_profile: Profile::Development,
        }
    }
}

impl TrackerConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns `ERR_CONFIG` for malformed TOML, unknown keys or a zero interval.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TrackerConfig = toml::from_str(text).map_err(|e| TrackerError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional TOML file, then apply environment overrides
    ///
    /// A missing file is not an error when `path` is `None`; an explicit path
    /// that cannot be read is.
    ///
    /// # Errors
    ///
    /// Returns `ERR_CONFIG` when the file cannot be read or parsed, or an
    /// environment override is not a valid value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with an explicit variable lookup instead of the
    /// process environment
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| TrackerError::Config {
                    message: format!("cannot read {}: {}", path.display(), e),
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };

        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Apply `LOCTRACK_*` overrides using the given variable lookup
    ///
    /// # Errors
    ///
    /// Returns `ERR_CONFIG` when an override cannot be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = lookup(ENV_DB_PATH) {
            self.db_path = PathBuf::from(db);
        }
        if let Some(raw) = lookup(ENV_INTERVAL_MS) {
            self.interval_ms = raw.trim().parse().map_err(|_| TrackerError::Config {
                message: format!("{} must be an integer, got '{}'", ENV_INTERVAL_MS, raw),
            })?;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(TrackerError::Config {
                message: "interval_ms must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.interval_ms, 10_000);
        assert_eq!(config.db_path, PathBuf::from(".loctrack/locations.db"));
        assert_eq!(config.log_profile, Profile::Development);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TrackerConfig::from_toml_str("interval_ms = 5000\n").unwrap();
        assert_eq!(config.interval_ms, 5000);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
    }

    #[test]
    fn test_full_toml() {
        let text = r#"
            db_path = "/var/lib/loctrack/samples.db"
            interval_ms = 2000
            log_profile = "production"
        "#;
        let config = TrackerConfig::from_toml_str(text).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/loctrack/samples.db"));
        assert_eq!(config.log_profile, Profile::Production);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = TrackerConfig::from_toml_str("interval = 5\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = TrackerConfig::from_toml_str("interval_ms = 0\n").unwrap_err();
        assert_eq!(err.code(), "ERR_CONFIG");
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_DB_PATH, "/tmp/x.db"), (ENV_INTERVAL_MS, " 750 ")]);
        let mut config = TrackerConfig::from_toml_str("interval_ms = 5000\n").unwrap();

        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.interval_ms, 750);
    }

    #[test]
    fn test_bad_env_interval_rejected() {
        let mut config = TrackerConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_INTERVAL_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.message().contains("LOCTRACK_INTERVAL_MS"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loctrack.toml");
        std::fs::write(&path, "interval_ms = 1234\n").unwrap();

        let config = TrackerConfig::load_with(Some(&path), |_| None).unwrap();
        assert_eq!(config.interval_ms, 1234);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
    }

    #[test]
    fn test_load_applies_lookup_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loctrack.toml");
        std::fs::write(&path, "interval_ms = 1234\ndb_path = \"file.db\"\n").unwrap();

        let config = TrackerConfig::load_with(Some(&path), |key| {
            (key == ENV_INTERVAL_MS).then(|| "99".to_string())
        })
        .unwrap();

        assert_eq!(config.interval_ms, 99);
        assert_eq!(config.db_path, PathBuf::from("file.db"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let err = TrackerConfig::load(Some(Path::new("/nonexistent/loctrack.toml"))).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }
}
