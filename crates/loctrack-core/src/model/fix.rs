//! Fixes and source events
//!
//! A [`Fix`] is what a location source hands to the ingestion service.
//! Sources report through [`SourceEvent`], which also covers results that
//! carry no usable location and fatal source failures.

use serde::{Deserialize, Serialize};

use crate::errors::TrackerError;

/// A single location reading delivered by a source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,

    /// Accuracy radius in metres
    pub accuracy: f32,

    /// Source's own reading time, if it reports one (informational only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_ms: Option<i64>,
}

impl Fix {
    pub fn new(latitude: f64, longitude: f64, accuracy: f32) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            time_ms: None,
        }
    }

    /// Check that the fix carries usable coordinates
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidFix`] when a coordinate is non-finite or
    /// out of range, or the accuracy is negative or non-finite.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(TrackerError::InvalidFix {
                reason: format!("latitude out of range: {}", self.latitude),
            });
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(TrackerError::InvalidFix {
                reason: format!("longitude out of range: {}", self.longitude),
            });
        }
        if !self.accuracy.is_finite() || self.accuracy < 0.0 {
            return Err(TrackerError::InvalidFix {
                reason: format!("accuracy must be a non-negative distance: {}", self.accuracy),
            });
        }
        Ok(())
    }

    pub fn is_usable(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Event delivered by a location source to its registered callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceEvent {
    /// A location reading
    Fix(Fix),

    /// The source produced a result without a location
    NoFix,

    /// The source failed and will deliver nothing further
    Failed { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_fix() {
        assert!(Fix::new(1.0, 2.0, 5.0).is_usable());
        assert!(Fix::new(-90.0, 180.0, 0.0).is_usable());
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        assert!(!Fix::new(90.5, 0.0, 5.0).is_usable());
        assert!(!Fix::new(0.0, -180.1, 5.0).is_usable());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        assert!(!Fix::new(f64::NAN, 0.0, 5.0).is_usable());
        assert!(!Fix::new(0.0, f64::INFINITY, 5.0).is_usable());
        assert!(!Fix::new(0.0, 0.0, f32::NAN).is_usable());
    }

    #[test]
    fn test_negative_accuracy_rejected() {
        let err = Fix::new(0.0, 0.0, -1.0).validate().unwrap_err();
        assert!(matches!(err, TrackerError::InvalidFix { .. }));
    }

    #[test]
    fn test_source_event_json_shape() {
        let event: SourceEvent =
            serde_json::from_str(r#"{"type":"fix","latitude":1.0,"longitude":2.0,"accuracy":5.0}"#)
                .unwrap();
        assert_eq!(event, SourceEvent::Fix(Fix::new(1.0, 2.0, 5.0)));

        let no_fix: SourceEvent = serde_json::from_str(r#"{"type":"no_fix"}"#).unwrap();
        assert_eq!(no_fix, SourceEvent::NoFix);
    }
}
