//! Operation logging macros
//!
//! Every operation boundary in LocTrack is logged with the same shape:
//! `component`, `op` and `event` first, then `duration_ms` on completion,
//! then any caller fields (`session_id`, `cycle_id`, `sample_id`, ...).
//! The capture layer in [`super::test_capture`] matches on `op` + `event`.

/// Log the start of an operation at INFO
///
/// ```
/// # use loctrack_core::log_op_start;
/// log_op_start!("stop_tracking");
/// log_op_start!("start_tracking", interval_ms = 5000u64);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_START
            $(, $($field)+)?
        )
    };
}

/// Log successful completion of an operation at INFO
///
/// `duration_ms` is mandatory so every end event can be timed.
///
/// ```
/// # use loctrack_core::log_op_end;
/// log_op_end!("insert_sample", duration_ms = 3u64);
/// log_op_end!("insert_sample", duration_ms = 3u64, sample_id = 17i64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)+)?
        )
    };
}

/// Log a failed operation at ERROR
///
/// `$err` may be anything convertible into `ExError`; its kind, stable code
/// and message are attached as `err_kind`, `err_code` and `err_message`.
///
/// ```
/// # use loctrack_core::log_op_error;
/// # use loctrack_core::errors::TrackerError;
/// log_op_error!("start_tracking", TrackerError::AlreadyRunning, duration_ms = 0u64);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_message = ex_err.message()
            $(, $($field)+)?
        );
    }};
}

/// Log an input that an operation dropped without failing, at DEBUG
///
/// ```
/// # use loctrack_core::log_op_skipped;
/// log_op_skipped!("ingest_fix", "no location in result");
/// ```
#[macro_export]
macro_rules! log_op_skipped {
    ($op:expr, $reason:expr $(, $($field:tt)+)?) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_SKIPPED,
            reason = %$reason
            $(, $($field)+)?
        )
    };
}
