//! Replay file decoding and encoding
//!
//! A replay upload starts with a fixed 193-byte [`ReplayHeader`] followed by the
//! variable-length [`RunSplits`] block. Everything after the splits (frame data) is
//! ignored here.
//!
//! This module is the only place that knows the byte layout. Decoding is a pure
//! transform over a borrowed buffer and never reads past its end.
//!
//! ```rust
//! use runcheck::replay::{self, RunSplits};
//! # use runcheck::replay::{ReplayHeader, REPLAY_MAGIC};
//! # use runcheck::types::{Gamemode, TrackType};
//! # let header = ReplayHeader {
//! #     magic: REPLAY_MAGIC, format_version: 1, timestamp: 1_732_297_480,
//! #     map_name: "bhop_map".into(), map_hash: "A".repeat(40), gamemode: Gamemode::Bhop,
//! #     tick_interval: 0.01, player_steam_id: 1, player_name: "Bono".into(),
//! #     track_type: TrackType::Main, track_num: 1, run_time: 40.0,
//! # };
//!
//! let bytes = replay::encode(&header, &RunSplits::default())?;
//! let (decoded, splits) = replay::decode(&bytes)?;
//! assert_eq!(decoded, header);
//! assert!(splits.segments.is_empty());
//! # Ok::<(), runcheck::replay::ReplayFormatError>(())
//! ```

mod format;
mod header;
mod splits;

pub use header::{REPLAY_HEADER_SIZE, REPLAY_MAGIC, ReplayHeader};
pub use splits::{RunSegment, RunSplits, RunStats, RunSubsegment, Vector3};

use crate::types::InvalidOrdinal;
use thiserror::Error;

/// Result type alias for replay codec operations.
pub type Result<T, E = ReplayFormatError> = std::result::Result<T, E>;

/// Detailed decoding or encoding failure.
///
/// Only for server-side diagnostics; the run processor reports every variant as
/// [`RunValidationError::BadReplayFile`](crate::RunValidationError::BadReplayFile).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReplayFormatError {
    #[error("Truncated {context} at offset {offset}: need {needed} bytes, have {available}")]
    Truncated { context: &'static str, offset: usize, needed: usize, available: usize },

    #[error("Invalid enum value at offset {offset}")]
    InvalidEnum {
        offset: usize,
        #[source]
        source: InvalidOrdinal,
    },

    #[error("Invalid boolean {value} for {context} at offset {offset}")]
    InvalidBool { context: &'static str, offset: usize, value: u8 },

    #[error("{context} of {count} at offset {offset} exceeds the remaining buffer")]
    CountTooLarge { context: &'static str, offset: usize, count: u32 },

    #[error("{context} value {value} does not fit its encoded width")]
    FieldOverflow { context: &'static str, value: u64 },
}

/// Decode the header and splits of a replay buffer.
pub fn decode(data: &[u8]) -> Result<(ReplayHeader, RunSplits)> {
    let header = ReplayHeader::decode(data)?;
    let splits = RunSplits::decode(data, REPLAY_HEADER_SIZE)?;
    Ok((header, splits))
}

/// Encode a header followed by its splits block.
pub fn encode(header: &ReplayHeader, splits: &RunSplits) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(REPLAY_HEADER_SIZE + 64);
    header.encode_into(&mut out);
    splits.encode_into(&mut out)?;
    Ok(out)
}
