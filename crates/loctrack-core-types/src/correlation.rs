//! Correlation identifiers for tracking runs and ingestion cycles
//!
//! A [`SessionId`] spans one Running period of the ingestion service
//! (start to stop). A [`CycleId`] tags the handling of a single fix, so the
//! insert and status update it triggers can be correlated in logs even when
//! the insert completes on another thread.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one start..stop run of the ingestion service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new time-ordered SessionId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for the handling of a single delivered fix
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleId(String);

impl CycleId {
    /// Generate a new time-ordered CycleId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_generation() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_cycle_ids_sort_by_creation() {
        // UUIDv7 is time-ordered, so later cycles sort after earlier ones
        let first = CycleId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = CycleId::new();

        assert!(first.as_str() < second.as_str());
    }

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new();
        assert_eq!(format!("{}", id), id.as_str());
    }

    #[test]
    fn test_serialization() {
        let id = SessionId::from_string("session-1".to_string());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"session-1\"");
        let deserialized: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
