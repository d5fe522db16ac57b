//! User-visible status surface
//!
//! While tracking is active exactly one status message is shown. It is
//! posted with [`STATUS_STARTED`] on start, replaced with a summary of each
//! accepted fix, and cleared on stop.

use std::sync::{Mutex, PoisonError};

use chrono::{Local, TimeZone};
use loctrack_core::model::Fix;

/// Identifier of the single status message
pub const STATUS_ID: u32 = 1;

pub const STATUS_TITLE: &str = "Location Tracker Active";

pub const STATUS_STARTED: &str = "Tracking started...";

/// Render the status text for an accepted fix
///
/// Coordinates and accuracy are printed as delivered, without rounding.
/// `captured_at_ms` is shown as local wall-clock time.
pub fn format_fix_status(fix: &Fix, captured_at_ms: i64) -> String {
    let time = Local
        .timestamp_millis_opt(captured_at_ms)
        .single()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    format!(
        "Lat: {}, Lng: {}\nAcc: {}m | Time: {}",
        fix.latitude, fix.longitude, fix.accuracy, time
    )
}

/// Destination for the status message
pub trait StatusSink: Send + Sync {
    /// Show `text`, replacing whatever was shown before
    fn post(&self, text: &str);

    /// Remove the message
    fn clear(&self);
}

/// Status sink that writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn post(&self, text: &str) {
        tracing::info!(status_id = STATUS_ID, title = STATUS_TITLE, text, "status");
    }

    fn clear(&self) {
        tracing::info!(status_id = STATUS_ID, "status cleared");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Posted { id: u32, text: String },
    Cleared { id: u32 },
}

/// Status sink that remembers every update
#[derive(Debug, Default)]
pub struct RecordingStatusSink {
    updates: Mutex<Vec<StatusUpdate>>,
}

impl RecordingStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Text currently shown, if any
    pub fn current(&self) -> Option<String> {
        match self.updates().last() {
            Some(StatusUpdate::Posted { text, .. }) => Some(text.clone()),
            _ => None,
        }
    }

    fn push(&self, update: StatusUpdate) {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(update);
    }
}

impl StatusSink for RecordingStatusSink {
    fn post(&self, text: &str) {
        self.push(StatusUpdate::Posted {
            id: STATUS_ID,
            text: text.to_string(),
        });
    }

    fn clear(&self) {
        self.push(StatusUpdate::Cleared { id: STATUS_ID });
    }
}
