//! Test utilities for building consistent submissions
//!
//! Every stub here agrees with every other stub: a [`Submission::new`] run passes all
//! checks unmodified, so a test only has to change the one field it cares about.

#![cfg(any(test, feature = "test-utils"))]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::clock::FixedClock;
use crate::config::ValidationConfig;
use crate::diagnostics::{DiagnosticSink, SubmitDelayRejection};
use crate::processor::RunProcessor;
use crate::replay::{
    self, REPLAY_MAGIC, ReplayHeader, RunSegment, RunSplits, RunStats, RunSubsegment, Vector3,
};
use crate::types::{
    CompletedRunSession, Gamemode, MapRecord, MapVersion, RunSessionTimestamp, TrackType, User,
};
use crate::zones::{BonusTrack, MainTrack, MapTracks, MapZones, Segment, Zone, ZoneSet};

/// Wall-clock time, in Unix milliseconds, at which every stub session opens.
pub const BASE_TIME_MS: i64 = 1_732_297_480_000;

/// Run time of the stub run, in milliseconds.
pub const STUB_RUN_TIME_MS: u64 = 40_000;

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything. Set `RUST_LOG`
/// to see rejection reasons.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `BASE_TIME_MS` plus `offset_ms`.
pub fn at_offset(offset_ms: u64) -> DateTime<Utc> {
    let base = DateTime::from_timestamp_millis(BASE_TIME_MS).unwrap_or_default();
    base + Duration::milliseconds(offset_ms as i64)
}

/// A checkpoint report `time` ms into a run, received exactly `time` ms after the
/// session opened.
pub fn timestamp(time: u64, segment: u8, checkpoint: u8) -> RunSessionTimestamp {
    RunSessionTimestamp { time, segment, checkpoint, created_at: at_offset(time) }
}

/// Reports from `(time, segment, checkpoint)` triples.
pub fn timestamps(entries: &[(u64, u8, u8)]) -> Vec<RunSessionTimestamp> {
    entries
        .iter()
        .map(|&(time, segment, checkpoint)| timestamp(time, segment, checkpoint))
        .collect()
}

/// Header of a 40 second main-track Bhop run written the moment the run ended.
pub fn stub_header() -> ReplayHeader {
    ReplayHeader {
        magic: REPLAY_MAGIC,
        format_version: 1,
        timestamp: (BASE_TIME_MS + STUB_RUN_TIME_MS as i64) / 1000,
        map_name: "bhop_map".to_string(),
        map_hash: "A".repeat(40),
        gamemode: Gamemode::Bhop,
        tick_interval: 0.01,
        player_steam_id: 1,
        player_name: "Bono".to_string(),
        track_type: TrackType::Main,
        track_num: 1,
        run_time: STUB_RUN_TIME_MS as f64 / 1000.0,
    }
}

/// Splits matching [`stub_session`]: two segments with two checkpoints each, reached
/// at 0, 10, 20 and 30 seconds.
pub fn stub_splits() -> RunSplits {
    splits_for(&timestamps(&[(0, 0, 0), (10_000, 0, 1), (20_000, 1, 0), (30_000, 1, 1)]))
}

/// Two main segments of two required, ordered checkpoints each, plus one single
/// checkpoint bonus.
pub fn stub_zones() -> MapZones {
    ZonesBuilder::new()
        .segment(2, true, true)
        .segment(2, true, true)
        .bonus(1, true, true)
        .build()
}

pub fn stub_user() -> User {
    User { id: 1, steam_id: 1 }
}

/// Session for the stub run on [`stub_zones`].
///
/// The stored BSP hash is lowercase while the replay's is uppercase, matching what the
/// two sides produce in practice.
pub fn stub_session() -> CompletedRunSession {
    CompletedRunSession {
        id: 1,
        gamemode: Gamemode::Bhop,
        track_type: TrackType::Main,
        track_num: 1,
        created_at: at_offset(0),
        timestamps: timestamps(&[(0, 0, 0), (10_000, 0, 1), (20_000, 1, 0), (30_000, 1, 1)]),
        map_id: 1,
        user_id: 1,
        map: MapRecord {
            name: "bhop_map".to_string(),
            current_version: MapVersion {
                zones: zones_json(&stub_zones()),
                bsp_hash: "a".repeat(40),
            },
        },
    }
}

fn zones_json(zones: &MapZones) -> String {
    serde_json::to_string(zones).expect("zones serialize")
}

/// Splits with one subsegment per report, each reached exactly at the report's time.
///
/// Segments below the highest reported index are emitted empty so indices line up.
pub fn splits_for(reports: &[RunSessionTimestamp]) -> RunSplits {
    let segment_count = reports.iter().map(|ts| usize::from(ts.segment) + 1).max().unwrap_or(0);
    let empty = RunSegment { checkpoints_ordered: true, ..RunSegment::default() };
    let mut segments = vec![empty; segment_count];
    for ts in reports {
        segments[usize::from(ts.segment)].subsegments.push(RunSubsegment {
            minor_num: ts.checkpoint + 1,
            time_reached: ts.time as f64 / 1000.0,
            velocity_when_reached: Vector3 { x: 250.0, y: 0.0, z: 0.0 },
        });
    }
    RunSplits {
        track_stats: RunStats { jumps: 12, strafes: 30, ..RunStats::default() },
        segments,
    }
}

/// Fluent builder for zone trees.
///
/// `segment` and `bonus` take the checkpoint count (including the start zone) and the
/// segment's required and ordered flags.
#[derive(Debug, Clone)]
pub struct ZonesBuilder {
    segments: Vec<Segment>,
    bonuses: Vec<BonusTrack>,
    stages_end_at_stage_starts: bool,
}

impl Default for ZonesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ZonesBuilder {
    pub fn new() -> Self {
        Self { segments: Vec::new(), bonuses: Vec::new(), stages_end_at_stage_starts: true }
    }

    pub fn segment(mut self, checkpoints: usize, required: bool, ordered: bool) -> Self {
        self.segments.push(build_segment(checkpoints, required, ordered));
        self
    }

    pub fn bonus(mut self, checkpoints: usize, required: bool, ordered: bool) -> Self {
        self.bonuses.push(BonusTrack {
            zones: ZoneSet {
                segments: vec![build_segment(checkpoints, required, ordered)],
                end: Some(Zone::default()),
            },
        });
        self
    }

    pub fn stages_end_at_stage_starts(mut self, value: bool) -> Self {
        self.stages_end_at_stage_starts = value;
        self
    }

    pub fn build(self) -> MapZones {
        MapZones {
            format_version: 1,
            data_timestamp: BASE_TIME_MS,
            tracks: MapTracks {
                main: MainTrack {
                    zones: ZoneSet { segments: self.segments, end: Some(Zone::default()) },
                    stages_end_at_stage_starts: self.stages_end_at_stage_starts,
                },
                bonuses: self.bonuses,
            },
        }
    }
}

fn build_segment(checkpoints: usize, required: bool, ordered: bool) -> Segment {
    Segment {
        checkpoints: vec![Zone::default(); checkpoints],
        checkpoints_required: required,
        checkpoints_ordered: ordered,
        limit_start_ground_speed: false,
        cancel: Vec::new(),
        name: None,
    }
}

/// Sink that keeps every record for later inspection.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    records: Mutex<Vec<SubmitDelayRejection>>,
}

impl RecordingDiagnostics {
    pub fn records(&self) -> Vec<SubmitDelayRejection> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn submit_delay_rejected(&self, record: &SubmitDelayRejection) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

/// Every input to a submission, mutable before the processor is built.
#[derive(Debug, Clone)]
pub struct Submission {
    pub header: ReplayHeader,
    pub splits: RunSplits,
    pub session: CompletedRunSession,
    pub user: User,
    pub config: ValidationConfig,
    pub clock: Arc<FixedClock>,
    pub diagnostics: Arc<RecordingDiagnostics>,
}

impl Default for Submission {
    fn default() -> Self {
        Self::new()
    }
}

impl Submission {
    /// The stub run, submitted the instant its replay was written.
    pub fn new() -> Self {
        let header = stub_header();
        let clock = Arc::new(FixedClock::from_millis(header.timestamp * 1000));
        Self {
            header,
            splits: stub_splits(),
            session: stub_session(),
            user: stub_user(),
            config: ValidationConfig::default(),
            clock,
            diagnostics: Arc::new(RecordingDiagnostics::default()),
        }
    }

    /// A complete, legal traversal of the given track.
    ///
    /// Every checkpoint is hit in order with gaps taken cyclically from `gaps_ms`, and
    /// the replay is submitted the moment the run ends.
    ///
    /// # Panics
    ///
    /// If the track does not exist on `zones` or `gaps_ms` is empty.
    pub fn traversal(
        zones: &MapZones,
        track_type: TrackType,
        track_num: u8,
        gaps_ms: &[u64],
    ) -> Self {
        assert!(!gaps_ms.is_empty(), "need at least one gap");

        let plan: Vec<(u8, usize)> = match track_type {
            TrackType::Main => zones
                .main_segments()
                .iter()
                .enumerate()
                .map(|(index, segment)| (index as u8, segment.checkpoints.len()))
                .collect(),
            TrackType::Stage | TrackType::Bonus => {
                let segment = zones.segment_for(track_type, track_num).expect("track exists");
                let mut count = segment.checkpoints.len();
                if track_type == TrackType::Stage && !zones.tracks.main.stages_end_at_stage_starts {
                    count -= 1;
                }
                vec![(track_num - 1, count)]
            }
        };

        let mut gaps = gaps_ms.iter().copied().cycle();
        let mut time = 0u64;
        let mut reports = Vec::new();
        for (segment, count) in plan {
            for checkpoint in 0..count {
                reports.push(timestamp(time, segment, checkpoint as u8));
                time += gaps.next().unwrap_or(1);
            }
        }
        let run_time_ms = time;

        let mut submission = Self::new().with_zones(zones);
        submission.session.track_type = track_type;
        submission.session.track_num = track_num;
        submission.splits = splits_for(&reports);
        submission.session.timestamps = reports;
        submission.header.track_type = track_type;
        submission.header.track_num = track_num;
        submission.header.run_time = run_time_ms as f64 / 1000.0;
        submission.header.timestamp = (BASE_TIME_MS + run_time_ms as i64) / 1000;
        submission.clock = Arc::new(FixedClock::new(at_offset(run_time_ms)));
        submission
    }

    /// Store `zones` on the session's map version.
    pub fn with_zones(mut self, zones: &MapZones) -> Self {
        self.session.map.current_version.zones = zones_json(zones);
        self
    }

    /// Switch the run to `gamemode`, keeping the header tick interval consistent.
    pub fn with_gamemode(mut self, gamemode: Gamemode) -> Self {
        self.session.gamemode = gamemode;
        self.header.gamemode = gamemode;
        self.header.tick_interval = gamemode.tick_interval() as f32;
        self
    }

    /// Move the server clock to `offset_ms` after the header's write time.
    pub fn submit_after_ms(&self, offset_ms: i64) {
        let written = DateTime::from_timestamp(self.header.timestamp, 0).unwrap_or_default();
        self.clock.set(written + Duration::milliseconds(offset_ms));
    }

    pub fn replay_bytes(&self) -> Vec<u8> {
        replay::encode(&self.header, &self.splits).expect("stub replay encodes")
    }

    /// Parse the submission with this fixture's clock, sink and config.
    pub fn processor(&self) -> crate::Result<RunProcessor> {
        Ok(RunProcessor::parse(&self.replay_bytes(), self.session.clone(), self.user)?
            .with_clock(self.clock.clone())
            .with_diagnostics(self.diagnostics.clone())
            .with_config(self.config))
    }
}
