//! Source driven by explicit calls
//!
//! Used by tests and by embedders that receive fixes from elsewhere and
//! want to feed them into the service.

use std::sync::{Mutex, MutexGuard, PoisonError};

use loctrack_core::errors::{Result, TrackerError};
use loctrack_core::model::{Fix, SourceEvent};

use super::{FixCallback, LocationSource, UpdateRequest};

#[derive(Default)]
struct State {
    callback: Option<FixCallback>,
    last_request: Option<UpdateRequest>,
    acquire_error: Option<TrackerError>,
    registrations: usize,
}

/// Location source whose events are pushed by the caller
#[derive(Default)]
pub struct ManualSource {
    state: Mutex<State>,
}

impl ManualSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source whose every acquisition fails with `err`
    pub fn failing(err: TrackerError) -> Self {
        let source = Self::default();
        source.set_acquire_error(Some(err));
        source
    }

    /// Make future `request_updates` calls fail (or succeed again with `None`)
    pub fn set_acquire_error(&self, err: Option<TrackerError>) {
        self.lock().acquire_error = err;
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver an event to the registered callback
    ///
    /// Returns `false` when nothing is registered. The callback runs on the
    /// caller's thread without the source lock held.
    pub fn deliver(&self, event: SourceEvent) -> bool {
        let callback = self.lock().callback.clone();
        match callback {
            Some(callback) => {
                callback(event);
                true
            }
            None => false,
        }
    }

    pub fn push_fix(&self, fix: Fix) -> bool {
        self.deliver(SourceEvent::Fix(fix))
    }

    /// Parameters of the most recent successful registration
    pub fn last_request(&self) -> Option<UpdateRequest> {
        self.lock().last_request
    }

    pub fn is_registered(&self) -> bool {
        self.lock().callback.is_some()
    }

    /// Number of successful `request_updates` calls so far
    pub fn registrations(&self) -> usize {
        self.lock().registrations
    }
}

impl LocationSource for ManualSource {
    fn request_updates(&self, request: UpdateRequest, callback: FixCallback) -> Result<()> {
        let mut state = self.lock();
        if let Some(err) = state.acquire_error.clone() {
            return Err(err.into());
        }
        state.callback = Some(callback);
        state.last_request = Some(request);
        state.registrations += 1;
        Ok(())
    }

    fn remove_updates(&self) {
        self.lock().callback = None;
    }
}
