//! Location source seam
//!
//! A [`LocationSource`] pushes [`SourceEvent`]s to a callback registered via
//! [`LocationSource::request_updates`]. Delivery may happen on any thread;
//! the ingestion service is responsible for discarding events that arrive
//! after it unregistered.

use std::sync::Arc;
use std::time::Duration;

use loctrack_core::errors::Result;
use loctrack_core::model::SourceEvent;

mod manual;
mod replay;

pub use manual::ManualSource;
pub use replay::ReplaySource;

/// Callback a source invokes for every event
pub type FixCallback = Arc<dyn Fn(SourceEvent) + Send + Sync>;

/// Parameters for a location update subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Desired interval between fixes
    pub interval: Duration,

    /// Fastest rate the consumer accepts
    pub min_interval: Duration,
}

impl UpdateRequest {
    /// Request for a sampling interval; the minimum is half of it
    pub fn from_interval_ms(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            min_interval: Duration::from_millis(interval_ms / 2),
        }
    }
}

/// Producer of location fixes
pub trait LocationSource: Send + Sync {
    /// Register `callback` for periodic updates
    ///
    /// A new registration replaces any previous one.
    ///
    /// # Errors
    ///
    /// `ERR_SOURCE_UNAVAILABLE` or `ERR_PERMISSION_DENIED` when the source
    /// cannot be acquired. No callback is retained in that case.
    fn request_updates(&self, request: UpdateRequest, callback: FixCallback) -> Result<()>;

    /// Drop the current registration, if any
    ///
    /// Must not block on in-flight deliveries; it may be called from inside
    /// the callback.
    fn remove_updates(&self);
}
