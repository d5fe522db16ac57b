//! Ingestion service
//!
//! Owns the Stopped/Running lifecycle. While Running, every fix delivered by
//! the source is stamped with the wall clock, handed to the writer on the
//! blocking pool, and summarised in the status sink.
//!
//! Each start bumps a generation counter that is captured by the callback
//! registered with the source. Events carrying an older generation are
//! dropped, so deliveries racing with `stop()` never reach the store.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

use loctrack_core::errors::{ExError, ExErrorKind, Result, TrackerError};
use loctrack_core::model::{Fix, NewSample, SourceEvent};
use loctrack_core::types::{CycleId, SessionId};
use loctrack_core::{
    log_op_end, log_op_error, log_op_skipped, log_op_start, Clock, SystemClock,
};
use tokio::runtime::Handle;
use tokio::sync::Notify;

use crate::source::{FixCallback, LocationSource, UpdateRequest};
use crate::status::{format_fix_status, StatusSink, TracingStatusSink, STATUS_STARTED};
use crate::writer::SampleWriter;

/// Externally visible lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Stopped,
    Running,
}

/// Counters since the service was built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Fixes delivered while Running (usable or not)
    pub fixes_received: u64,
    /// `NoFix` events plus fixes that failed validation
    pub fixes_skipped: u64,
    pub samples_written: u64,
    pub write_failures: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Stopped,
    Starting,
    Running,
}

struct Lifecycle {
    phase: Phase,
    generation: u64,
    session: Option<SessionId>,
    interval_ms: Option<u64>,
}

impl Lifecycle {
    fn accepts(&self, generation: u64) -> bool {
        self.generation == generation && self.phase != Phase::Stopped
    }

    fn reset(&mut self) {
        self.phase = Phase::Stopped;
        self.generation += 1;
        self.session = None;
        self.interval_ms = None;
    }
}

#[derive(Default)]
struct Counters {
    received: AtomicU64,
    skipped: AtomicU64,
    written: AtomicU64,
    write_failures: AtomicU64,
}

struct Inner {
    source: Arc<dyn LocationSource>,
    writer: Arc<dyn SampleWriter>,
    status: Arc<dyn StatusSink>,
    clock: Arc<dyn Clock>,
    runtime: Handle,
    // Serializes start/stop so registration and removal never interleave.
    // Callbacks only take `lifecycle`.
    control: Mutex<()>,
    lifecycle: Mutex<Lifecycle>,
    counters: Counters,
    in_flight: AtomicUsize,
    drained: Notify,
}

/// Background ingestion of location fixes into the store
///
/// Cheap to clone; clones control the same service.
#[derive(Clone)]
pub struct IngestionService {
    inner: Arc<Inner>,
}

/// Builder for [`IngestionService`]
pub struct IngestionServiceBuilder {
    source: Arc<dyn LocationSource>,
    writer: Arc<dyn SampleWriter>,
    status: Option<Arc<dyn StatusSink>>,
    clock: Option<Arc<dyn Clock>>,
    runtime: Option<Handle>,
}

impl IngestionServiceBuilder {
    /// Status sink (defaults to [`TracingStatusSink`])
    pub fn status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = Some(status);
        self
    }

    /// Wall clock used for capture timestamps (defaults to [`SystemClock`])
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Runtime whose blocking pool runs inserts
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// # Errors
    ///
    /// `ERR_INTERNAL` when no runtime was given and none is current.
    pub fn build(self) -> Result<IngestionService> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|e| {
                ExError::new(ExErrorKind::Internal)
                    .with_op("build_service")
                    .with_message(format!("no tokio runtime available: {}", e))
            })?,
        };

        Ok(IngestionService {
            inner: Arc::new(Inner {
                source: self.source,
                writer: self.writer,
                status: self.status.unwrap_or_else(|| Arc::new(TracingStatusSink)),
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                runtime,
                control: Mutex::new(()),
                lifecycle: Mutex::new(Lifecycle {
                    phase: Phase::Stopped,
                    generation: 0,
                    session: None,
                    interval_ms: None,
                }),
                counters: Counters::default(),
                in_flight: AtomicUsize::new(0),
                drained: Notify::new(),
            }),
        })
    }
}

impl IngestionService {
    pub fn builder(
        source: Arc<dyn LocationSource>,
        writer: Arc<dyn SampleWriter>,
    ) -> IngestionServiceBuilder {
        IngestionServiceBuilder {
            source,
            writer,
            status: None,
            clock: None,
            runtime: None,
        }
    }

    /// Start tracking at `interval_ms`
    ///
    /// Posts the initial status, then registers with the source asking for
    /// `interval_ms` with a minimum of half that. Calls to `start` and
    /// `stop` on any clone wait for each other.
    ///
    /// # Errors
    ///
    /// - `ERR_INVALID_INPUT` for a zero interval
    /// - `ERR_INVALID_STATE` when already running; the current subscription
    ///   is left untouched. Also when the source reports a failure before
    ///   `request_updates` returns
    /// - `ERR_SOURCE_UNAVAILABLE` / `ERR_PERMISSION_DENIED` from the source;
    ///   the service stays Stopped and the status is cleared
    pub fn start(&self, interval_ms: u64) -> Result<()> {
        let _control = self.inner.lock_control();
        let started = Instant::now();
        log_op_start!("start_tracking", interval_ms = interval_ms);

        match self.try_start(interval_ms) {
            Ok(session) => {
                log_op_end!(
                    "start_tracking",
                    duration_ms = started.elapsed().as_millis() as u64,
                    session_id = %session,
                    interval_ms = interval_ms,
                    min_interval_ms = interval_ms / 2
                );
                Ok(())
            }
            Err(err) => {
                log_op_error!(
                    "start_tracking",
                    err.clone(),
                    duration_ms = started.elapsed().as_millis() as u64
                );
                Err(err)
            }
        }
    }

    fn try_start(&self, interval_ms: u64) -> Result<SessionId> {
        if interval_ms == 0 {
            return Err(TrackerError::InvalidInterval { interval_ms }.into());
        }

        let (generation, session) = {
            let mut lifecycle = self.inner.lock_lifecycle();
            if lifecycle.phase != Phase::Stopped {
                return Err(TrackerError::AlreadyRunning.into());
            }
            lifecycle.generation += 1;
            lifecycle.phase = Phase::Starting;
            let session = SessionId::new();
            lifecycle.session = Some(session.clone());
            lifecycle.interval_ms = Some(interval_ms);
            self.inner.status.post(STATUS_STARTED);
            (lifecycle.generation, session)
        };

        let callback = Inner::callback(Arc::downgrade(&self.inner), generation);
        let request = UpdateRequest::from_interval_ms(interval_ms);

        if let Err(err) = self.inner.source.request_updates(request, callback) {
            let mut lifecycle = self.inner.lock_lifecycle();
            if lifecycle.generation == generation {
                lifecycle.reset();
                self.inner.status.clear();
            }
            return Err(err.with_session_id(session));
        }

        let mut lifecycle = self.inner.lock_lifecycle();
        if lifecycle.generation == generation {
            lifecycle.phase = Phase::Running;
            return Ok(session);
        }

        // The source reported a failure before registration returned.
        let stopped = lifecycle.phase == Phase::Stopped;
        drop(lifecycle);
        if stopped {
            self.inner.source.remove_updates();
        }
        Err(ExError::new(ExErrorKind::InvalidState)
            .with_op("start")
            .with_session_id(session)
            .with_message("source failed while starting"))
    }

    /// Stop tracking
    ///
    /// Unregisters from the source and clears the status. No-op when
    /// already stopped. Inserts already dispatched still complete; use
    /// [`flush`](Self::flush) to wait for them.
    pub fn stop(&self) {
        let _control = self.inner.lock_control();
        let session = {
            let mut lifecycle = self.inner.lock_lifecycle();
            if lifecycle.phase == Phase::Stopped {
                return;
            }
            let session = lifecycle.session.clone();
            lifecycle.reset();
            self.inner.status.clear();
            session
        };

        let started = Instant::now();
        log_op_start!("stop_tracking");
        self.inner.source.remove_updates();
        let session = session.map(|s| s.to_string()).unwrap_or_default();
        log_op_end!(
            "stop_tracking",
            duration_ms = started.elapsed().as_millis() as u64,
            session_id = %session
        );
    }

    pub fn state(&self) -> ServiceState {
        match self.inner.lock_lifecycle().phase {
            Phase::Running => ServiceState::Running,
            Phase::Stopped | Phase::Starting => ServiceState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == ServiceState::Running
    }

    /// Interval of the current session, if running
    pub fn interval_ms(&self) -> Option<u64> {
        self.inner.lock_lifecycle().interval_ms
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.inner.lock_lifecycle().session.clone()
    }

    pub fn stats(&self) -> ServiceStats {
        let counters = &self.inner.counters;
        ServiceStats {
            fixes_received: counters.received.load(Ordering::SeqCst),
            fixes_skipped: counters.skipped.load(Ordering::SeqCst),
            samples_written: counters.written.load(Ordering::SeqCst),
            write_failures: counters.write_failures.load(Ordering::SeqCst),
        }
    }

    /// Wait until every dispatched insert has completed
    pub async fn flush(&self) {
        loop {
            let notified = self.inner.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.inner.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Inner {
    fn lock_control(&self) -> MutexGuard<'_, ()> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn callback(inner: Weak<Inner>, generation: u64) -> FixCallback {
        Arc::new(move |event| {
            if let Some(inner) = inner.upgrade() {
                inner.on_event(generation, event);
            }
        })
    }

    fn on_event(self: &Arc<Self>, generation: u64, event: SourceEvent) {
        match event {
            SourceEvent::Fix(fix) => self.on_fix(generation, fix),
            SourceEvent::NoFix => {
                if self.lock_lifecycle().accepts(generation) {
                    self.counters.skipped.fetch_add(1, Ordering::SeqCst);
                    log_op_skipped!("ingest_fix", "no location in result");
                }
            }
            SourceEvent::Failed { reason } => self.on_failed(generation, reason),
        }
    }

    fn on_fix(self: &Arc<Self>, generation: u64, fix: Fix) {
        let lifecycle = self.lock_lifecycle();
        if !lifecycle.accepts(generation) {
            return;
        }
        self.counters.received.fetch_add(1, Ordering::SeqCst);

        if let Err(err) = fix.validate() {
            self.counters.skipped.fetch_add(1, Ordering::SeqCst);
            log_op_skipped!("ingest_fix", err);
            return;
        }

        let captured_at = self.clock.now_millis();
        let sample = NewSample::from_fix(&fix, captured_at);
        let cycle = CycleId::new();
        let session = lifecycle.session.clone();

        // Counted before the lock is released so flush() after stop() sees it.
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.status.post(&format_fix_status(&fix, captured_at));
        drop(lifecycle);

        log_op_start!("ingest_fix", cycle_id = %cycle, timestamp = captured_at);
        let inner = Arc::clone(self);
        self.runtime.spawn_blocking(move || {
            inner.write_sample(sample, cycle, session);
        });
    }

    fn write_sample(&self, sample: NewSample, cycle: CycleId, session: Option<SessionId>) {
        let started = Instant::now();
        match self.writer.insert(&sample) {
            Ok(id) => {
                self.counters.written.fetch_add(1, Ordering::SeqCst);
                log_op_end!(
                    "ingest_fix",
                    duration_ms = started.elapsed().as_millis() as u64,
                    cycle_id = %cycle,
                    sample_id = id
                );
            }
            Err(err) => {
                // Not retried; the service keeps running.
                self.counters.write_failures.fetch_add(1, Ordering::SeqCst);
                let mut err = err.with_cycle_id(cycle.clone());
                if let Some(session) = session {
                    err = err.with_session_id(session);
                }
                log_op_error!(
                    "ingest_fix",
                    err,
                    duration_ms = started.elapsed().as_millis() as u64,
                    cycle_id = %cycle
                );
            }
        }

        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }

    fn on_failed(&self, generation: u64, reason: String) {
        let session = {
            let mut lifecycle = self.lock_lifecycle();
            if !lifecycle.accepts(generation) {
                return;
            }
            let session = lifecycle.session.clone();
            lifecycle.reset();
            self.status.clear();
            session
        };

        self.source.remove_updates();

        let err: ExError = TrackerError::SourceUnavailable { reason }.into();
        let session = session.map(|s| s.to_string()).unwrap_or_default();
        log_op_error!(
            "source_failed",
            err,
            duration_ms = 0u64,
            session_id = %session
        );
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let active = self.lock_lifecycle().phase != Phase::Stopped;
        if active {
            self.source.remove_updates();
        }
    }
}
