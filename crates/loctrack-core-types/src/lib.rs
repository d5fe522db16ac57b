//! Core types shared across LocTrack facilities
//!
//! This crate provides foundational types used by both the error and
//! logging facilities:
//!
//! - **Correlation types**: SessionId, CycleId
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{CycleId, SessionId};
