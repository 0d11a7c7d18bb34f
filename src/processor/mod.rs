//! Run submission processing
//!
//! [`RunProcessor`] owns one decoded submission and runs the integrity checks over it.
//! Construction decodes the replay and the map's zones; each `validate_*` method is
//! independent and side-effect free apart from diagnostics, so callers may run them in
//! any order. [`RunProcessor::validate_all`] runs them in the canonical order and
//! stops at the first failure.
//!
//! ```rust,no_run
//! use runcheck::{RunProcessor, RunValidationError};
//! # use runcheck::types::{CompletedRunSession, User};
//! # fn load() -> (Vec<u8>, CompletedRunSession, User) { unimplemented!() }
//!
//! let (buffer, session, user) = load();
//! let processor = RunProcessor::parse(&buffer, session, user)?;
//! let run = processor.validate_all()?;
//! println!("{} finished in {}s", run.user_id, run.time);
//! # Ok::<(), RunValidationError>(())
//! ```

mod header;
mod splits;
mod timestamps;

pub use header::validate_header;
pub use splits::validate_splits;
pub use timestamps::validate_timestamps;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::ValidationConfig;
use crate::diagnostics::{DiagnosticSink, TracingDiagnostics};
use crate::replay::{self, ReplayHeader, RunSplits};
use crate::types::{CompletedRunSession, ProcessedRun, User};
use crate::zones::MapZones;
use crate::{Result, RunValidationError};

/// A decoded submission ready for validation.
pub struct RunProcessor {
    header: ReplayHeader,
    splits: RunSplits,
    zones: MapZones,
    session: CompletedRunSession,
    user: User,
    config: ValidationConfig,
    clock: Arc<dyn Clock>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for RunProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunProcessor")
            .field("session_id", &self.session.id)
            .field("user_id", &self.user.id)
            .field("header", &self.header)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RunProcessor {
    /// Decode `buffer` and the session's zone payload.
    ///
    /// # Errors
    ///
    /// [`RunValidationError::BadReplayFile`] if either fails to decode. The detailed
    /// cause is logged at debug level and not returned.
    pub fn parse(buffer: &[u8], session: CompletedRunSession, user: User) -> Result<Self> {
        let (header, splits) = replay::decode(buffer).map_err(|e| {
            debug!("Replay from session {} failed to decode: {}", session.id, e);
            RunValidationError::BadReplayFile
        })?;

        let zones = MapZones::from_json(&session.map.current_version.zones).map_err(|e| {
            debug!("Zones for map {} failed to parse: {}", session.map_id, e);
            RunValidationError::BadReplayFile
        })?;

        debug!(
            "Parsed replay for session {}: {} bytes, {} segments",
            session.id,
            buffer.len(),
            splits.segments.len()
        );

        Ok(Self {
            header,
            splits,
            zones,
            session,
            user,
            config: ValidationConfig::default(),
            clock: Arc::new(SystemClock),
            diagnostics: Arc::new(TracingDiagnostics),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn header(&self) -> &ReplayHeader {
        &self.header
    }

    pub fn splits(&self) -> &RunSplits {
        &self.splits
    }

    pub fn zones(&self) -> &MapZones {
        &self.zones
    }

    pub fn session(&self) -> &CompletedRunSession {
        &self.session
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Check the live checkpoint sequence against the map's zones.
    pub fn validate_session_timestamps(&self) -> Result<()> {
        validate_timestamps(
            &self.session.timestamps,
            self.session.track_type,
            self.session.track_num,
            &self.zones,
        )
    }

    /// Check replay identity against the session and user, then the submit timing.
    pub fn validate_replay_header(&self) -> Result<()> {
        validate_header(
            &self.header,
            &self.session,
            &self.user,
            &self.config,
            self.clock.now(),
            self.diagnostics.as_ref(),
        )
    }

    /// Check recorded splits against the live checkpoint reports.
    pub fn validate_run_splits(&self) -> Result<()> {
        validate_splits(&self.splits, &self.session, &self.config)
    }

    /// Normalized run record. Only meaningful once every check has passed.
    pub fn processed(&self) -> ProcessedRun {
        ProcessedRun {
            user_id: self.user.id,
            map_id: self.session.map_id,
            gamemode: self.session.gamemode,
            track_type: self.session.track_type,
            track_num: self.session.track_num,
            time: self.header.run_time,
            splits: self.splits.clone(),
            flags: Vec::new(),
        }
    }

    /// Run every check, timestamps first, and build the processed run.
    pub fn validate_all(&self) -> Result<ProcessedRun> {
        self.validate_session_timestamps()?;
        self.validate_replay_header()?;
        self.validate_run_splits()?;
        debug!("Session {} passed validation", self.session.id);
        Ok(self.processed())
    }
}
