use loctrack_core_types::{CycleId, SessionId};
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// in LocTrack. Each kind maps to a stable error code that can be used for
/// programmatic error handling, testing, and log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    InvalidFix,
    ConstraintViolation,

    // Lifecycle
    /// Operation is not valid in the service's current state
    InvalidState,

    // Location source
    /// The location source could not be acquired
    SourceUnavailable,
    /// The location source refused access
    PermissionDenied,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidFix => "ERR_INVALID_FIX",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::InvalidState => "ERR_INVALID_STATE",
            ExErrorKind::SourceUnavailable => "ERR_SOURCE_UNAVAILABLE",
            ExErrorKind::PermissionDenied => "ERR_PERMISSION_DENIED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and enough
/// context (operation, sample, session, cycle) to locate the failure in logs.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    sample_id: Option<i64>,
    session_id: Option<SessionId>,
    cycle_id: Option<CycleId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            sample_id: None,
            session_id: None,
            cycle_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add sample ID context
    pub fn with_sample_id(mut self, id: i64) -> Self {
        self.sample_id = Some(id);
        self
    }

    /// Add session context
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Add ingestion cycle context
    pub fn with_cycle_id(mut self, cycle_id: CycleId) -> Self {
        self.cycle_id = Some(cycle_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn sample_id(&self) -> Option<i64> {
        self.sample_id
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn cycle_id(&self) -> Option<&CycleId> {
        self.cycle_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(sample_id) = self.sample_id {
            write!(f, " (sample_id: {})", sample_id)?;
        }
        if let Some(cycle_id) = &self.cycle_id {
            write!(f, " (cycle_id: {})", cycle_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for tracking operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    /// The location source could not be acquired at start
    #[error("Location source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// The location source denied access
    #[error("Location permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// `start` was issued while the service was already running
    #[error("Ingestion service is already running")]
    AlreadyRunning,

    /// Sampling interval must be a positive number of milliseconds
    #[error("Invalid sampling interval: {interval_ms}ms")]
    InvalidInterval { interval_ms: u64 },

    /// A delivered fix carried no usable coordinates
    #[error("Invalid fix: {reason}")]
    InvalidFix { reason: String },

    /// A control command could not be parsed
    #[error("Unknown control command: {input}")]
    UnknownCommand { input: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<TrackerError> for ExError {
    fn from(err: TrackerError) -> Self {
        let message = err.to_string();
        match err {
            TrackerError::SourceUnavailable { .. } => ExError::new(ExErrorKind::SourceUnavailable)
                .with_op("acquire_source")
                .with_message(message),

            TrackerError::PermissionDenied { .. } => ExError::new(ExErrorKind::PermissionDenied)
                .with_op("acquire_source")
                .with_message(message),

            TrackerError::AlreadyRunning => ExError::new(ExErrorKind::InvalidState)
                .with_op("start")
                .with_message(message),

            TrackerError::InvalidInterval { .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("start")
                .with_message(message),

            TrackerError::InvalidFix { .. } => {
                ExError::new(ExErrorKind::InvalidFix).with_message(message)
            }

            TrackerError::UnknownCommand { .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_command")
                .with_message(message),

            TrackerError::Config { .. } => ExError::new(ExErrorKind::Config)
                .with_op("load_config")
                .with_message(message),

            TrackerError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::from(err).into()
    }
}

impl From<std::io::Error> for ExError {
    fn from(err: std::io::Error) -> Self {
        ExError::new(ExErrorKind::Io).with_message(err.to_string())
    }
}
