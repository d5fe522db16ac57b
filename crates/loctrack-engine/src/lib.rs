//! LocTrack Engine - ingestion orchestration
//!
//! Wires an injected location source to the store:
//! - [`source`]: `LocationSource` seam plus manual and replay sources
//! - [`status`]: `StatusSink` seam for the single status message
//! - [`writer`]: `SampleWriter` seam over the store
//! - [`service`]: the Stopped/Running ingestion state machine
//! - [`query`]: pass-through live queries for consumers
//! - [`control`]: `START` / `STOP` command surface

pub mod control;
pub mod query;
pub mod service;
pub mod source;
pub mod status;
pub mod writer;

pub use control::{ControlCommand, Controller};
pub use query::LocationQueries;
pub use service::{IngestionService, IngestionServiceBuilder, ServiceState, ServiceStats};
pub use source::{FixCallback, LocationSource, ManualSource, ReplaySource, UpdateRequest};
pub use status::{RecordingStatusSink, StatusSink, StatusUpdate, TracingStatusSink};
pub use writer::SampleWriter;
