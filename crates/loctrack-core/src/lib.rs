//! LocTrack Core - domain model and shared facilities
//!
//! This crate provides the pieces every other LocTrack crate builds on:
//! - `LocationSample` / `Fix` domain model with fix validation
//! - Structured error facility (`ExError`, `ExErrorKind`, `TrackerError`)
//! - Logging facility with canonical operation macros and test capture
//! - `TrackerConfig` loading (TOML + environment overrides)
//! - Injectable wall clock for capture timestamps

pub mod clock;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;

/// Re-exported so the logging macros resolve schema constants through `$crate`
pub use loctrack_core_types as types;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TrackerConfig;
pub use errors::{ExError, ExErrorKind, Result, TrackerError};
pub use model::{Fix, LocationSample, NewSample, SourceEvent};
