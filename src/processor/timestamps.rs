//! Structural validation of the live checkpoint sequence against the map's zones
//!
//! The walk over the main track enforces topology (every segment, once, in order) and
//! hands each segment's slice to [`validate_segment`], which enforces that segment's
//! own start, ordering and completeness rules.

use std::collections::HashSet;

use tracing::debug;

use crate::types::{RunSessionTimestamp, TrackType};
use crate::zones::{MapZones, Segment};
use crate::{Result, RunValidationError};

fn reject<T>(reason: &str) -> Result<T> {
    debug!("Rejecting session timestamps: {}", reason);
    Err(RunValidationError::BadTimestamps)
}

/// Check that `timestamps` is a legal traversal of the given track.
///
/// `track_num` is 1-based and must be 1 for the main track.
pub fn validate_timestamps(
    timestamps: &[RunSessionTimestamp],
    track_type: TrackType,
    track_num: u8,
    zones: &MapZones,
) -> Result<()> {
    let Some(first) = timestamps.first() else {
        return reject("no timestamps");
    };

    if first.checkpoint != 0 || first.time != 0 {
        return reject("run does not begin at the start zone");
    }

    if timestamps
        .windows(2)
        .any(|pair| pair[1].time < pair[0].time || pair[1].created_at < pair[0].created_at)
    {
        return reject("timestamps go backwards");
    }

    let mut seen = HashSet::with_capacity(timestamps.len());
    if !timestamps.iter().all(|ts| seen.insert((ts.segment, ts.checkpoint))) {
        return reject("duplicate checkpoint");
    }

    let stages_end_at_stage_starts = zones.tracks.main.stages_end_at_stage_starts;

    if track_type != TrackType::Main {
        let Some(expected_segment) = track_num.checked_sub(1) else {
            return reject("track number 0");
        };
        if timestamps.iter().any(|ts| ts.segment != expected_segment) {
            return reject("timestamp outside the run's segment");
        }
        let Some(segment) = zones.segment_for(track_type, track_num) else {
            return reject("track does not exist on map");
        };
        return validate_segment(segment, timestamps, track_type, stages_end_at_stage_starts);
    }

    if track_num != 1 {
        return reject("main track number is not 1");
    }

    let segments = zones.main_segments();
    let last_segment = timestamps.last().map_or(0, |ts| usize::from(ts.segment));
    if first.segment != 0 || Some(last_segment) != segments.len().checked_sub(1) {
        return reject("run does not span first to last segment");
    }

    let mut current = 0u8;
    let mut window_start = 0;
    for (index, ts) in timestamps.iter().enumerate() {
        if ts.segment == current {
            continue;
        }
        if Some(ts.segment) != current.checked_add(1) {
            return reject("segment skipped or revisited");
        }
        let Some(segment) = segments.get(usize::from(current)) else {
            return reject("segment does not exist on map");
        };
        validate_segment(
            segment,
            &timestamps[window_start..index],
            track_type,
            stages_end_at_stage_starts,
        )?;
        current = ts.segment;
        window_start = index;
    }

    let Some(segment) = segments.get(usize::from(current)) else {
        return reject("segment does not exist on map");
    };
    validate_segment(segment, &timestamps[window_start..], track_type, stages_end_at_stage_starts)?;

    let visited: HashSet<u8> = timestamps.iter().map(|ts| ts.segment).collect();
    if visited.len() != segments.len() {
        return reject("not every segment visited");
    }

    Ok(())
}

/// Check one segment's slice of the sequence.
///
/// The start zone (checkpoint 0) is mandatory regardless of flags.
fn validate_segment(
    segment: &Segment,
    timestamps: &[RunSessionTimestamp],
    track_type: TrackType,
    stages_end_at_stage_starts: bool,
) -> Result<()> {
    let Some(first) = timestamps.first() else {
        return reject("segment has no timestamps");
    };

    if first.checkpoint != 0 {
        return reject("segment start zone missing");
    }

    if segment.checkpoints_ordered
        && timestamps.windows(2).any(|pair| pair[1].checkpoint <= pair[0].checkpoint)
    {
        return reject("checkpoints out of order");
    }

    let mut expected = segment.checkpoints.len();
    // The end zone of a self-contained stage arrives with the finish request, not as a
    // mid-run timestamp. Bonuses never take this adjustment.
    if track_type == TrackType::Stage && !stages_end_at_stage_starts {
        expected = expected.saturating_sub(1);
    }

    if segment.checkpoints_required && timestamps.len() != expected {
        return reject("required checkpoints missing");
    }

    Ok(())
}
