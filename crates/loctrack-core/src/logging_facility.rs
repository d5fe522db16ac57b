//! Structured logging for LocTrack
//!
//! Binaries call [`init`] once with a [`Profile`]; libraries only emit
//! events. Operation boundaries go through the macros so that every
//! `start_tracking`, `ingest_fix` or `insert_sample` event carries the same
//! field names:
//!
//! - `log_op_start!(op, ...)` / `log_op_end!(op, duration_ms = .., ...)`
//! - `log_op_error!(op, err, duration_ms = .., ...)`
//! - `log_op_skipped!(op, reason, ...)` for dropped inputs
//!
//! Tests install [`init_test_capture`] instead of [`init`] and assert on the
//! recorded events.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
