//! Error types for run-submission validation.
//!
//! The public boundary of this crate is [`RunValidationError`]. It carries exactly four
//! kinds and no detail about which element of a submission failed, so that a client
//! probing the validator learns nothing beyond the category of rejection.
//!
//! ## Error Categories
//!
//! - **Bad Replay File**: the uploaded buffer or the stored zone payload failed to decode
//! - **Bad Timestamps**: the live checkpoint sequence is not a legal traversal of the map
//! - **Bad Meta**: replay identity fields disagree with the session, user or map
//! - **Out Of Sync**: a timing tolerance was exceeded
//!
//! Lower layers report richer errors ([`ReplayFormatError`](crate::replay::ReplayFormatError),
//! [`ZoneError`](crate::zones::ZoneError)); the processor collapses them before returning.
//!
//! ```rust
//! use runcheck::RunValidationError;
//!
//! let error = RunValidationError::OutOfSync;
//! assert_eq!(error.code(), "OUT_OF_SYNC");
//! assert!(!error.is_retryable());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for validation operations.
pub type Result<T, E = RunValidationError> = std::result::Result<T, E>;

/// Terminal rejection of a run submission.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunValidationError {
    #[error("replay file could not be decoded")]
    BadReplayFile,

    #[error("run session timestamps are invalid")]
    BadTimestamps,

    #[error("replay metadata does not match the run session")]
    BadMeta,

    #[error("replay timing is out of sync with the run session")]
    OutOfSync,
}

impl RunValidationError {
    /// Stable wire code for this rejection, as reported to clients.
    pub const fn code(&self) -> &'static str {
        match self {
            RunValidationError::BadReplayFile => "BAD_REPLAY_FILE",
            RunValidationError::BadTimestamps => "BAD_TIMESTAMPS",
            RunValidationError::BadMeta => "BAD_META",
            RunValidationError::OutOfSync => "OUT_OF_SYNC",
        }
    }

    /// Returns whether resubmitting the same artifact could succeed.
    ///
    /// Always false: every rejection is terminal for the submission.
    pub const fn is_retryable(&self) -> bool {
        match self {
            RunValidationError::BadReplayFile
            | RunValidationError::BadTimestamps
            | RunValidationError::BadMeta
            | RunValidationError::OutOfSync => false,
        }
    }

    /// Returns user-facing guidance for this rejection.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            RunValidationError::BadReplayFile => vec![
                "Make sure the game client is up to date",
                "Report the map if its zones appear broken",
            ],
            RunValidationError::BadTimestamps => vec![
                "Check your connection was stable for the whole run",
                "Restart the run from the start zone",
            ],
            RunValidationError::BadMeta => vec![
                "Make sure the latest version of the map is installed",
                "Submit runs from the account that started them",
            ],
            RunValidationError::OutOfSync => vec![
                "Check your system clock is synchronised",
                "Submit the run as soon as it finishes",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(RunValidationError::BadReplayFile.code(), "BAD_REPLAY_FILE");
        assert_eq!(RunValidationError::BadTimestamps.code(), "BAD_TIMESTAMPS");
        assert_eq!(RunValidationError::BadMeta.code(), "BAD_META");
        assert_eq!(RunValidationError::OutOfSync.code(), "OUT_OF_SYNC");
    }

    #[test]
    fn serde_uses_wire_codes() {
        for error in [
            RunValidationError::BadReplayFile,
            RunValidationError::BadTimestamps,
            RunValidationError::BadMeta,
            RunValidationError::OutOfSync,
        ] {
            let json = serde_json::to_string(&error).expect("serialize");
            assert_eq!(json, format!("\"{}\"", error.code()));
        }
    }

    #[test]
    fn nothing_is_retryable() {
        for error in [
            RunValidationError::BadReplayFile,
            RunValidationError::BadTimestamps,
            RunValidationError::BadMeta,
            RunValidationError::OutOfSync,
        ] {
            assert!(!error.is_retryable());
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            for suggestion in suggestions {
                assert!(suggestion.len() > 5);
            }
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<RunValidationError>();

        let error = RunValidationError::BadMeta;
        let _: &dyn std::error::Error = &error;
        assert!(!error.to_string().is_empty());
    }
}
