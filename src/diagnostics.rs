//! Diagnostic records emitted when a submission is rejected for timing.
//!
//! The sink is an observer only: it never influences whether validation passes, and
//! implementations must not block or panic.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Context captured when a replay's submit delay falls outside the accepted window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDelayRejection {
    pub session_id: u64,
    pub user_id: u32,
    pub session_start: DateTime<Utc>,
    pub now: DateTime<Utc>,
    /// Run time from the replay header, in seconds
    pub header_run_time: f64,
    /// Replay write time from the header, in Unix seconds
    pub header_timestamp: i64,
    pub submit_delay_ms: i64,
    pub acceptable_submit_delay_ms: f64,
}

/// Receiver for rejection diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn submit_delay_rejected(&self, record: &SubmitDelayRejection);
}

/// Default sink: one structured `tracing` event per rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn submit_delay_rejected(&self, record: &SubmitDelayRejection) {
        info!(
            target: "runcheck::diagnostics",
            session_id = record.session_id,
            user_id = record.user_id,
            session_start = %record.session_start.to_rfc3339(),
            now = %record.now.to_rfc3339(),
            header_run_time = record.header_run_time,
            header_timestamp = record.header_timestamp,
            acceptable_submit_delay_ms = record.acceptable_submit_delay_ms,
            "Rejecting run with submit delay of {}s",
            record.submit_delay_ms as f64 / 1000.0
        );
    }
}
