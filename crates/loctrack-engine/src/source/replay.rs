//! Source that replays a recorded track
//!
//! Events are delivered from a worker thread, one per pacing interval, the
//! first immediately after registration. The track is played once; after
//! the last event the source falls silent.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use loctrack_core::errors::{ExError, ExErrorKind, Result, TrackerError};
use loctrack_core::model::{Fix, SourceEvent};
use serde::Deserialize;

use super::{FixCallback, LocationSource, UpdateRequest};

/// One line of a recorded track: a tagged event or a bare fix
#[derive(Deserialize)]
#[serde(untagged)]
enum TrackLine {
    Event(SourceEvent),
    Fix(Fix),
}

impl From<TrackLine> for SourceEvent {
    fn from(line: TrackLine) -> Self {
        match line {
            TrackLine::Event(event) => event,
            TrackLine::Fix(fix) => SourceEvent::Fix(fix),
        }
    }
}

/// Location source replaying a fixed sequence of events
pub struct ReplaySource {
    events: Vec<SourceEvent>,
    pace: Option<Duration>,
    stop_tx: Mutex<Option<Sender<()>>>,
}

impl ReplaySource {
    pub fn new(events: Vec<SourceEvent>) -> Self {
        Self {
            events,
            pace: None,
            stop_tx: Mutex::new(None),
        }
    }

    /// Deliver at a fixed pace instead of the requested interval
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = Some(pace);
        self
    }

    /// Parse a newline-delimited JSON track
    ///
    /// Each non-blank line is either a tagged event
    /// (`{"type":"fix",...}`, `{"type":"no_fix"}`, `{"type":"failed","reason":..}`)
    /// or a bare fix object.
    ///
    /// # Errors
    ///
    /// `ERR_IO` when reading fails, `ERR_SERIALIZATION` naming the first
    /// line that does not parse.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut events = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let parsed: TrackLine = serde_json::from_str(trimmed).map_err(|e| {
                ExError::new(ExErrorKind::Serialization)
                    .with_op("load_track")
                    .with_message(format!("line {}: {}", index + 1, e))
            })?;
            events.push(parsed.into());
        }
        Ok(Self::new(events))
    }

    pub fn from_ndjson_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_track")
                .with_message(format!("{}: {}", path.display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl LocationSource for ReplaySource {
    fn request_updates(&self, request: UpdateRequest, callback: FixCallback) -> Result<()> {
        let pace = self.pace.unwrap_or(request.interval);
        let events = self.events.clone();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        std::thread::Builder::new()
            .name("loctrack-replay".to_string())
            .spawn(move || {
                for event in events {
                    callback(event);
                    match stop_rx.recv_timeout(pace) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        _ => return,
                    }
                }
                tracing::debug!("replay track exhausted");
            })
            .map_err(|e| {
                ExError::from(TrackerError::SourceUnavailable {
                    reason: format!("failed to spawn replay worker: {}", e),
                })
            })?;

        // Replacing the sender stops any previous worker.
        *self.stop_tx.lock().unwrap_or_else(PoisonError::into_inner) = Some(stop_tx);
        Ok(())
    }

    fn remove_updates(&self) {
        // Dropping the sender wakes the worker; it is never joined so this is
        // safe to call from inside the callback.
        self.stop_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.remove_updates();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parses_tagged_and_bare_lines() {
        let track = r#"
{"type":"fix","latitude":1.0,"longitude":2.0,"accuracy":5.0}
{"latitude":3.0,"longitude":4.0,"accuracy":6.0}

{"type":"no_fix"}
{"type":"failed","reason":"gps off"}
"#;
        let source = ReplaySource::from_reader(Cursor::new(track)).unwrap();

        assert_eq!(
            source.events,
            vec![
                SourceEvent::Fix(Fix::new(1.0, 2.0, 5.0)),
                SourceEvent::Fix(Fix::new(3.0, 4.0, 6.0)),
                SourceEvent::NoFix,
                SourceEvent::Failed {
                    reason: "gps off".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_bad_line_is_reported_by_number() {
        let track = "{\"type\":\"no_fix\"}\nnot json\n";
        let err = ReplaySource::from_reader(Cursor::new(track))
            .err()
            .expect("parse should fail");

        assert_eq!(err.kind(), ExErrorKind::Serialization);
        assert!(err.message().starts_with("line 2:"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReplaySource::from_ndjson_path(dir.path().join("absent.ndjson"))
            .err()
            .expect("open should fail");

        assert_eq!(err.kind(), ExErrorKind::Io);
    }
}
