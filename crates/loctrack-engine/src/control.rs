//! Control surface: `START` / `STOP` commands
//!
//! Commands are fire-and-forget. [`Controller::dispatch`] logs failures
//! instead of returning them; [`Controller::apply`] is the fallible form
//! for callers that want to react.

use std::fmt;
use std::str::FromStr;

use loctrack_core::config::DEFAULT_INTERVAL_MS;
use loctrack_core::errors::{ExError, Result, TrackerError};
use tokio::sync::mpsc;

use crate::service::IngestionService;

const ACTION_START: &str = "ACTION_START";
const ACTION_STOP: &str = "ACTION_STOP";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start { interval_ms: u64 },
    Stop,
}

impl ControlCommand {
    /// `START` with the default interval
    pub fn start() -> Self {
        ControlCommand::Start {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::Start { interval_ms } => write!(f, "START {}", interval_ms),
            ControlCommand::Stop => write!(f, "STOP"),
        }
    }
}

impl FromStr for ControlCommand {
    type Err = ExError;

    /// Accepts `START`, `START 5000`, `START interval=5000` and `STOP`,
    /// case-insensitively. `ACTION_START` / `ACTION_STOP` are aliases.
    fn from_str(s: &str) -> Result<Self> {
        let unknown = || -> ExError {
            TrackerError::UnknownCommand {
                input: s.to_string(),
            }
            .into()
        };

        let mut parts = s.split_whitespace();
        let action = parts.next().ok_or_else(unknown)?.to_ascii_uppercase();
        let argument = parts.next();
        if parts.next().is_some() {
            return Err(unknown());
        }

        match action.as_str() {
            "START" | ACTION_START => {
                let interval_ms = match argument {
                    None => DEFAULT_INTERVAL_MS,
                    Some(arg) => {
                        let value = match arg.split_once('=') {
                            Some((key, value)) if key.eq_ignore_ascii_case("interval") => value,
                            Some(_) => return Err(unknown()),
                            None => arg,
                        };
                        value.parse::<u64>().map_err(|_| unknown())?
                    }
                };
                Ok(ControlCommand::Start { interval_ms })
            }
            "STOP" | ACTION_STOP if argument.is_none() => Ok(ControlCommand::Stop),
            _ => Err(unknown()),
        }
    }
}

/// Routes control commands to an ingestion service
#[derive(Clone)]
pub struct Controller {
    service: IngestionService,
}

impl Controller {
    pub fn new(service: IngestionService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &IngestionService {
        &self.service
    }

    /// Execute a command and report the outcome
    ///
    /// # Errors
    ///
    /// Whatever [`IngestionService::start`] returns; `STOP` never fails.
    pub fn apply(&self, command: ControlCommand) -> Result<()> {
        match command {
            ControlCommand::Start { interval_ms } => self.service.start(interval_ms),
            ControlCommand::Stop => {
                self.service.stop();
                Ok(())
            }
        }
    }

    /// Execute a command, logging rather than returning failures
    pub fn dispatch(&self, command: ControlCommand) {
        if let Err(err) = self.apply(command) {
            tracing::warn!(
                command = %command,
                err_code = err.code(),
                "control command failed: {}",
                err
            );
        }
    }

    /// Dispatch commands until the channel closes, then stop and drain
    pub async fn run(self, mut commands: mpsc::Receiver<ControlCommand>) {
        while let Some(command) = commands.recv().await {
            self.dispatch(command);
        }
        self.service.stop();
        self.service.flush().await;
    }
}
