//! Run-submission integrity checks for timed-movement game runs.
//!
//! When a player finishes a run the game uploads a replay. Before the run is ranked the
//! server must be satisfied that the replay matches what it watched live: the same map,
//! player and track, a legal path through the map's zones, splits that line up with the
//! checkpoint reports received during the run, and an upload that arrived promptly.
//!
//! # Features
//!
//! - **Replay codec**: bounds-checked decoding of the fixed header and the splits block
//! - **Sequence validation**: checkpoint reports checked against the zone topology
//! - **Timing validation**: submit delay and per-split desync against an injectable clock
//! - **Opaque errors**: four rejection kinds, nothing more, cross the public boundary
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use runcheck::{RunProcessor, RunValidationError};
//! use runcheck::types::{CompletedRunSession, User};
//!
//! fn submit(
//!     buffer: &[u8],
//!     session: CompletedRunSession,
//!     user: User,
//! ) -> Result<(), RunValidationError> {
//!     let processor = RunProcessor::parse(buffer, session, user)?;
//!     processor.validate_session_timestamps()?;
//!     processor.validate_replay_header()?;
//!     processor.validate_run_splits()?;
//!
//!     let run = processor.processed();
//!     println!("map {} run of {}s accepted", run.map_id, run.time);
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `test-utils` feature exposes `test_utils`, the fixtures shared by unit tests,
//! `tests/submission.rs` and the benches. The crate enables it for its own dev builds, so
//! a plain `cargo test` runs the end-to-end suite too.

// Core types and error handling
mod error;
pub mod types;

// Data formats
pub mod replay;
pub mod zones;

// Validation
pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod processor;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Core exports
pub use error::*;
pub use types::*;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ValidationConfig;
pub use diagnostics::{DiagnosticSink, SubmitDelayRejection, TracingDiagnostics};
pub use processor::RunProcessor;
pub use replay::{ReplayFormatError, ReplayHeader, RunSplits};
pub use zones::{MapZones, ZoneError};
