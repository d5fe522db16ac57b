use serde::{Deserialize, Serialize};

use super::fix::Fix;

/// A persisted location reading
///
/// Samples are immutable once written. The `id` is assigned by the store
/// and never reused; the `timestamp` is the wall-clock capture time chosen
/// by the ingestion service, not the time reported by the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Store-assigned row id (monotonic)
    pub id: i64,

    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Accuracy radius in metres, as reported by the source
    pub precision: f32,

    /// Capture time in milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// A sample that has not been inserted yet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewSample {
    pub latitude: f64,
    pub longitude: f64,
    pub precision: f32,
    pub timestamp: i64,
}

impl NewSample {
    /// Build a sample from a fix, stamped with the given capture time
    ///
    /// The fix's own `time_ms` is deliberately ignored.
    pub fn from_fix(fix: &Fix, captured_at_ms: i64) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            precision: fix.accuracy,
            timestamp: captured_at_ms,
        }
    }

    /// Attach the id assigned by the store
    pub fn with_id(self, id: i64) -> LocationSample {
        LocationSample {
            id,
            latitude: self.latitude,
            longitude: self.longitude,
            precision: self.precision,
            timestamp: self.timestamp,
        }
    }
}
