//! Track command
//!
//! Usage: loctrack track --source TRACK.ndjson [--db PATH] [--interval MS] [--pace-ms MS] [--start]
//!
//! Control commands are read from stdin, one per line: `START [ms]`,
//! `STOP`, `QUIT`. End of input behaves like `QUIT`. On exit the service is
//! stopped and pending inserts are flushed.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use loctrack_core::TrackerConfig;
use loctrack_engine::{
    ControlCommand, Controller, IngestionService, ReplaySource, TracingStatusSink,
};
use loctrack_store::LocationStore;
use tokio::sync::mpsc;

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Recorded track to replay (newline-delimited JSON fixes)
    #[arg(long)]
    pub source: PathBuf,

    /// SQLite database file (defaults to the configured path)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Interval used by a bare `START` (defaults to the configured interval)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Replay pace in milliseconds, overriding the requested interval
    #[arg(long)]
    pub pace_ms: Option<u64>,

    /// Issue `START` immediately instead of waiting for stdin
    #[arg(long)]
    pub start: bool,
}

pub fn execute(args: TrackArgs, config: &TrackerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::resolve_db(args.db, config);
    let interval_ms = args.interval.unwrap_or(config.interval_ms);
    if interval_ms == 0 {
        return Err("--interval must be greater than zero".into());
    }

    let mut source = ReplaySource::from_ndjson_path(&args.source)?;
    if let Some(pace) = args.pace_ms {
        source = source.with_pace(Duration::from_millis(pace));
    }
    tracing::info!(
        track = %args.source.display(),
        events = source.len(),
        "loaded track"
    );

    let store = LocationStore::open(&db)?;
    let runtime = tokio::runtime::Runtime::new()?;

    let service = IngestionService::builder(Arc::new(source), Arc::new(store.clone()))
        .status(Arc::new(TracingStatusSink))
        .runtime(runtime.handle().clone())
        .build()?;
    let controller = Controller::new(service.clone());

    let (tx, rx) = mpsc::channel(16);
    if args.start {
        tx.blocking_send(ControlCommand::Start { interval_ms })?;
    }
    std::thread::Builder::new()
        .name("loctrack-stdin".to_string())
        .spawn(move || read_commands(tx, interval_ms))?;

    runtime.block_on(controller.run(rx));

    let stats = service.stats();
    println!(
        "Tracking finished: {} written, {} skipped, {} failed writes ({} samples in store)",
        stats.samples_written,
        stats.fixes_skipped,
        stats.write_failures,
        store.count()?
    );
    Ok(())
}

/// Forward stdin lines as control commands until `QUIT` or end of input
fn read_commands(tx: mpsc::Sender<ControlCommand>, default_interval_ms: u64) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") {
            break;
        }

        let command = match line.parse::<ControlCommand>() {
            Ok(ControlCommand::Start { .. }) if line.split_whitespace().count() == 1 => {
                ControlCommand::Start {
                    interval_ms: default_interval_ms,
                }
            }
            Ok(command) => command,
            Err(err) => {
                tracing::warn!(input = line, "ignoring control line: {}", err);
                continue;
            }
        };

        if tx.blocking_send(command).is_err() {
            break;
        }
    }
}
