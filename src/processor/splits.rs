//! Cross-check of live checkpoint reports against the splits recorded in the replay

use tracing::debug;

use crate::config::ValidationConfig;
use crate::replay::RunSplits;
use crate::types::CompletedRunSession;
use crate::{Result, RunValidationError};

fn out_of_sync<T>(reason: std::fmt::Arguments<'_>) -> Result<T> {
    debug!("Rejecting run splits: {}", reason);
    Err(RunValidationError::OutOfSync)
}

/// Check that every session timestamp has a matching split reached at roughly the same
/// moment.
///
/// Desync is the server-observed elapsed time minus the replay's `time_reached`; a
/// report may land up to `split_early_margin_ms` before its split and up to
/// `split_max_lag_ms` after it.
pub fn validate_splits(
    splits: &RunSplits,
    session: &CompletedRunSession,
    config: &ValidationConfig,
) -> Result<()> {
    let subsegments = splits.subsegment_count();
    if subsegments != session.timestamps.len() {
        return out_of_sync(format_args!(
            "{} subsegments for {} timestamps",
            subsegments,
            session.timestamps.len()
        ));
    }

    let early = -(config.split_early_margin_ms as f64);
    let late = config.split_max_lag_ms as f64;

    for ts in &session.timestamps {
        let subsegment = splits.subsegment(usize::from(ts.segment), usize::from(ts.checkpoint));
        let Some(subsegment) = subsegment else {
            return out_of_sync(format_args!(
                "no split for segment {} checkpoint {}",
                ts.segment, ts.checkpoint
            ));
        };

        if Some(subsegment.minor_num) != ts.checkpoint.checked_add(1) {
            return out_of_sync(format_args!(
                "split minor number {} for checkpoint {}",
                subsegment.minor_num, ts.checkpoint
            ));
        }

        let elapsed_ms = (ts.created_at - session.created_at).num_milliseconds() as f64;
        let desync = elapsed_ms - subsegment.time_reached * 1000.0;
        if desync.is_nan() || desync < early || desync > late {
            return out_of_sync(format_args!(
                "segment {} checkpoint {} desynced by {}ms",
                ts.segment, ts.checkpoint, desync
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Submission, ZonesBuilder, init_test_tracing};
    use crate::types::TrackType;
    use chrono::Duration;
    use proptest::prelude::*;

    fn run(submission: &Submission) -> Result<()> {
        init_test_tracing();
        validate_splits(&submission.splits, &submission.session, &submission.config)
    }

    fn shift_report(submission: &mut Submission, index: usize, millis: i64) {
        submission.session.timestamps[index].created_at += Duration::milliseconds(millis);
    }

    #[test]
    fn synchronized_splits_pass() {
        assert_eq!(run(&Submission::new()), Ok(()));
    }

    #[test]
    fn count_mismatch_fails() {
        let mut submission = Submission::new();
        submission.session.timestamps.pop();
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));

        let mut submission = Submission::new();
        submission.splits.segments[1].subsegments.pop();
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));
    }

    #[test]
    fn missing_split_fails() {
        let mut submission = Submission::new();
        // Same total, wrong shape
        let moved = submission.splits.segments[1].subsegments.pop().unwrap();
        submission.splits.segments[0].subsegments.push(moved);
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));
    }

    #[test]
    fn minor_number_must_follow_checkpoint() {
        let mut submission = Submission::new();
        submission.splits.segments[0].subsegments[1].minor_num = 1;
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));

        let mut submission = Submission::new();
        submission.splits.segments[1].subsegments[0].minor_num = 0;
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));
    }

    #[test]
    fn desync_boundaries() {
        for (shift, expected) in [
            (5_000, Ok(())),
            (5_001, Err(RunValidationError::OutOfSync)),
            (-999, Ok(())),
            (-1_000, Ok(())),
            (-1_001, Err(RunValidationError::OutOfSync)),
        ] {
            let mut submission = Submission::new();
            shift_report(&mut submission, 2, shift);
            assert_eq!(run(&submission), expected, "shift {shift}ms");
        }
    }

    #[test]
    fn late_split_time_is_early_desync() {
        let mut submission = Submission::new();
        submission.splits.segments[0].subsegments[1].time_reached += 1.5;
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));
    }

    #[test]
    fn non_finite_split_time_fails() {
        let mut submission = Submission::new();
        submission.splits.segments[0].subsegments[1].time_reached = f64::NAN;
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));
    }

    #[test]
    fn tolerances_follow_config() {
        let mut submission = Submission::new();
        shift_report(&mut submission, 3, 6_000);
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));

        submission.config.split_max_lag_ms = 6_000;
        assert_eq!(run(&submission), Ok(()));
    }

    #[test]
    fn stage_splits_index_by_segment() {
        let zones = ZonesBuilder::new().segment(2, true, true).segment(3, true, true).build();
        let submission = Submission::traversal(&zones, TrackType::Stage, 2, &[4_000]);
        assert!(submission.splits.segments[0].subsegments.is_empty());
        assert_eq!(run(&submission), Ok(()));
    }

    proptest! {
        #[test]
        fn prop_lag_within_window_passes(
            lag in -1_000i64..=5_000,
            index in 0usize..4,
        ) {
            let mut submission = Submission::new();
            shift_report(&mut submission, index, lag);
            prop_assert_eq!(run(&submission), Ok(()));
        }

        #[test]
        fn prop_lag_outside_window_fails(
            lag in prop_oneof![-100_000i64..-1_000, 5_001i64..100_000],
            index in 0usize..4,
        ) {
            let mut submission = Submission::new();
            shift_report(&mut submission, index, lag);
            prop_assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));
        }
    }
}
