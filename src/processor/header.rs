//! Replay header checks: identity against the session, then timing against the clock

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::ValidationConfig;
use crate::diagnostics::{DiagnosticSink, SubmitDelayRejection};
use crate::replay::ReplayHeader;
use crate::types::{CompletedRunSession, User};
use crate::{Result, RunValidationError};

/// Check the header's identity fields, tick interval and write time.
///
/// Identity mismatches are [`RunValidationError::BadMeta`]; tick and timing failures
/// are [`RunValidationError::OutOfSync`]. Timing failures are reported to `diagnostics`
/// before returning.
pub fn validate_header(
    header: &ReplayHeader,
    session: &CompletedRunSession,
    user: &User,
    config: &ValidationConfig,
    now: DateTime<Utc>,
    diagnostics: &dyn DiagnosticSink,
) -> Result<()> {
    validate_identity(header, session, user)?;

    let canonical = session.gamemode.tick_interval();
    let tick_diff = (f64::from(header.tick_interval) - canonical).abs();
    if tick_diff.is_nan() || tick_diff > config.tick_interval_epsilon {
        debug!(
            "Replay tick interval {} does not match {:?} ({})",
            header.tick_interval, session.gamemode, canonical
        );
        return Err(RunValidationError::OutOfSync);
    }

    validate_submit_delay(header, session, user, config, now, diagnostics)
}

fn validate_identity(
    header: &ReplayHeader,
    session: &CompletedRunSession,
    user: &User,
) -> Result<()> {
    let mismatch = if header.track_type != session.track_type {
        Some("track type")
    } else if header.track_num != session.track_num {
        Some("track number")
    } else if !header.has_valid_magic() {
        Some("magic")
    } else if !header.map_hash.eq_ignore_ascii_case(&session.map.current_version.bsp_hash) {
        Some("map hash")
    } else if header.map_name != session.map.name {
        Some("map name")
    } else if header.player_steam_id != user.steam_id {
        Some("player SteamID")
    } else if header.gamemode != session.gamemode {
        Some("gamemode")
    } else {
        None
    };

    match mismatch {
        Some(field) => {
            debug!("Replay header {} does not match session {}", field, session.id);
            Err(RunValidationError::BadMeta)
        }
        None => Ok(()),
    }
}

fn validate_submit_delay(
    header: &ReplayHeader,
    session: &CompletedRunSession,
    user: &User,
    config: &ValidationConfig,
    now: DateTime<Utc>,
    diagnostics: &dyn DiagnosticSink,
) -> Result<()> {
    let now_ms = now.timestamp_millis();
    let header_ts_ms = header.timestamp.saturating_mul(1000);
    let submit_delay_ms = now_ms.saturating_sub(header_ts_ms);
    let acceptable_submit_delay_ms = config.acceptable_submit_delay_ms(header.run_time * 1000.0);

    // The acceptable window is derived from the run time, so a run time that is not a
    // positive number leaves nothing to measure against.
    let bad_run_time = !header.run_time.is_finite() || header.run_time <= 0.0;
    let delay = submit_delay_ms as f64;
    let too_early = delay < -(config.future_grace_ms as f64);
    let too_late = delay > acceptable_submit_delay_ms;
    if !bad_run_time && !too_early && !too_late && header_ts_ms <= now_ms {
        return Ok(());
    }

    diagnostics.submit_delay_rejected(&SubmitDelayRejection {
        session_id: session.id,
        user_id: user.id,
        session_start: session.created_at,
        now,
        header_run_time: header.run_time,
        header_timestamp: header.timestamp,
        submit_delay_ms,
        acceptable_submit_delay_ms,
    });
    Err(RunValidationError::OutOfSync)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::TracingDiagnostics;
    use crate::test_utils::{Submission, init_test_tracing};
    use crate::types::{Gamemode, TrackType};
    use proptest::prelude::*;

    fn run(submission: &Submission) -> Result<()> {
        init_test_tracing();
        validate_header(
            &submission.header,
            &submission.session,
            &submission.user,
            &submission.config,
            crate::clock::Clock::now(submission.clock.as_ref()),
            submission.diagnostics.as_ref(),
        )
    }

    #[test]
    fn consistent_header_passes() {
        assert_eq!(run(&Submission::new()), Ok(()));
    }

    #[test]
    fn map_hash_comparison_ignores_case() {
        let mut submission = Submission::new();
        submission.header.map_hash = submission.header.map_hash.to_lowercase();
        submission.session.map.current_version.bsp_hash = "A".repeat(40);
        assert_eq!(run(&submission), Ok(()));
    }

    #[test]
    fn identity_mismatches_are_bad_meta() {
        let cases: [(&str, fn(&mut Submission)); 8] = [
            ("track type", |s| s.header.track_type = TrackType::Stage),
            ("track num", |s| s.header.track_num = 2),
            ("magic", |s| s.header.magic = u32::from_le_bytes(*b"MMTW")),
            ("map hash", |s| s.header.map_hash = "B".repeat(40)),
            ("map name", |s| s.header.map_name = "surf_map".to_string()),
            ("map name case", |s| s.header.map_name = "BHOP_MAP".to_string()),
            ("steam id", |s| s.header.player_steam_id = 2),
            ("gamemode", |s| s.header.gamemode = Gamemode::Surf),
        ];

        for (name, mutate) in cases {
            let mut submission = Submission::new();
            mutate(&mut submission);
            assert_eq!(run(&submission), Err(RunValidationError::BadMeta), "{name}");
        }
    }

    #[test]
    fn identity_is_checked_before_timing() {
        let mut submission = Submission::new();
        submission.header.map_name = "other".to_string();
        submission.submit_after_ms(1_000_000);
        assert_eq!(run(&submission), Err(RunValidationError::BadMeta));
        assert!(submission.diagnostics.records().is_empty());
    }

    #[test]
    fn tick_interval_must_match_gamemode() {
        let mut submission = Submission::new();
        submission.header.tick_interval = 0.015;
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));

        submission.header.tick_interval = f32::NAN;
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));
    }

    #[test]
    fn every_gamemode_accepts_its_own_tick_interval() {
        for gamemode in Gamemode::ALL {
            let submission = Submission::new().with_gamemode(gamemode);
            assert_eq!(run(&submission), Ok(()), "{gamemode:?}");
        }
    }

    #[test]
    fn submit_delay_boundary() {
        // 40 s run: 10 000 + 40 000 / 60 = 10 666.67 ms acceptable
        let submission = Submission::new();

        submission.submit_after_ms(10_666);
        assert_eq!(run(&submission), Ok(()));

        submission.submit_after_ms(10_667);
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));
    }

    #[test]
    fn per_minute_allowance_is_capped() {
        let mut submission = Submission::new();
        submission.header.run_time = 4.0 * 3600.0;

        submission.submit_after_ms(30_000);
        assert_eq!(run(&submission), Ok(()));

        submission.submit_after_ms(30_001);
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));
    }

    #[test]
    fn run_time_must_be_a_positive_number() {
        for run_time in [f64::NAN, f64::INFINITY, -5.0, 0.0] {
            let mut submission = Submission::new();
            submission.header.run_time = run_time;
            assert_eq!(run(&submission), Err(RunValidationError::OutOfSync), "{run_time}");

            let records = submission.diagnostics.records();
            assert_eq!(records.len(), 1, "{run_time}");
            assert_eq!(records[0].header_run_time.to_bits(), run_time.to_bits());
        }
    }

    #[test]
    fn replay_written_in_the_future_is_rejected() {
        let submission = Submission::new();
        submission.submit_after_ms(-1);
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));

        submission.submit_after_ms(-5_000);
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));
    }

    #[test]
    fn timing_rejection_is_reported() {
        let submission = Submission::new();
        submission.submit_after_ms(60_000);
        assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));

        let records = submission.diagnostics.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.session_id, submission.session.id);
        assert_eq!(record.user_id, submission.user.id);
        assert_eq!(record.session_start, submission.session.created_at);
        assert_eq!(record.header_timestamp, submission.header.timestamp);
        assert_eq!(record.header_run_time, 40.0);
        assert_eq!(record.submit_delay_ms, 60_000);
        assert!((record.acceptable_submit_delay_ms - 10_666.666).abs() < 1e-2);
    }

    #[test]
    fn passing_submission_reports_nothing() {
        let submission = Submission::new();
        assert_eq!(run(&submission), Ok(()));
        assert!(submission.diagnostics.records().is_empty());
    }

    #[test]
    fn tracing_sink_accepts_records() {
        let submission = Submission::new();
        submission.submit_after_ms(60_000);
        let result = validate_header(
            &submission.header,
            &submission.session,
            &submission.user,
            &submission.config,
            crate::clock::Clock::now(submission.clock.as_ref()),
            &TracingDiagnostics,
        );
        assert_eq!(result, Err(RunValidationError::OutOfSync));
    }

    proptest! {
        #[test]
        fn prop_delay_within_window_passes(
            run_time_s in 1.0f64..7200.0,
            fraction in 0.0f64..=1.0,
        ) {
            let mut submission = Submission::new();
            submission.header.run_time = run_time_s;
            let acceptable = submission.config.acceptable_submit_delay_ms(run_time_s * 1000.0);
            submission.submit_after_ms((acceptable * fraction).floor() as i64);
            prop_assert_eq!(run(&submission), Ok(()));
        }

        #[test]
        fn prop_delay_past_window_fails(
            run_time_s in 1.0f64..7200.0,
            excess in 1i64..1_000_000,
        ) {
            let mut submission = Submission::new();
            submission.header.run_time = run_time_s;
            let acceptable = submission.config.acceptable_submit_delay_ms(run_time_s * 1000.0);
            submission.submit_after_ms(acceptable.floor() as i64 + excess);
            prop_assert_eq!(run(&submission), Err(RunValidationError::OutOfSync));
        }

        #[test]
        fn prop_steam_id_mismatch_is_bad_meta(steam_id in any::<u64>()) {
            let mut submission = Submission::new();
            prop_assume!(steam_id != submission.user.steam_id);
            submission.header.player_steam_id = steam_id;
            prop_assert_eq!(run(&submission), Err(RunValidationError::BadMeta));
        }
    }
}
