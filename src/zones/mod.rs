//! Map zone definitions
//!
//! A map's zones form a small owned tree:
//!
//! ```text
//! MapZones
//! └── tracks
//!     ├── main: MainTrack
//!     │   ├── zones: ZoneSet ── segments[0..n] ── checkpoints[0..m]
//!     │   └── stages_end_at_stage_starts
//!     └── bonuses[0..k]: BonusTrack
//!         └── zones: ZoneSet ── segments[0] ── checkpoints[0..m]
//! ```
//!
//! Checkpoint 0 of every segment is its start zone. The tree is parsed once from the
//! JSON stored on the map version and only borrowed afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::types::TrackType;

/// Result type alias for zone parsing.
pub type Result<T, E = ZoneError> = std::result::Result<T, E>;

/// Failure to turn a stored zone payload into a [`MapZones`] tree.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ZoneError {
    #[error("Zone JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zone structure is invalid: {reason}")]
    Structure { reason: String },
}

impl ZoneError {
    fn structure(reason: impl Into<String>) -> Self {
        ZoneError::Structure { reason: reason.into() }
    }
}

/// Complete zone definition for one map version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapZones {
    #[serde(default)]
    pub format_version: u32,
    /// Unix time in milliseconds the zones were last edited
    #[serde(default)]
    pub data_timestamp: i64,
    pub tracks: MapTracks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapTracks {
    pub main: MainTrack,
    #[serde(default)]
    pub bonuses: Vec<BonusTrack>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainTrack {
    pub zones: ZoneSet,
    /// When true a stage ends where the next one starts (or at the course end), so the
    /// stage's last checkpoint is reported mid-run. When false the stage's own last
    /// checkpoint is its end zone and only arrives with the finish request.
    pub stages_end_at_stage_starts: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusTrack {
    pub zones: ZoneSet,
}

/// Ordered segments of a track plus its end zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSet {
    pub segments: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Zone>,
}

/// Run of checkpoints between two major gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Index 0 is the start zone
    pub checkpoints: Vec<Zone>,
    pub checkpoints_required: bool,
    pub checkpoints_ordered: bool,
    #[serde(default)]
    pub limit_start_ground_speed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cancel: Vec<Zone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A trigger volume made of one or more regions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtername: Option<String>,
}

/// Extruded polygon in map space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub points: Vec<[f64; 2]>,
    pub bottom: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tele_dest_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tele_dest_pos: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tele_dest_yaw: Option<f64>,
}

impl MapZones {
    /// Parse and structurally validate a stored zone payload.
    pub fn from_json(json: &str) -> Result<Self> {
        let zones: MapZones = serde_json::from_str(json)?;
        zones.validate()?;
        debug!(
            "Parsed map zones: {} main segments, {} bonuses",
            zones.tracks.main.zones.segments.len(),
            zones.tracks.bonuses.len()
        );
        Ok(zones)
    }

    /// Check the invariants validation relies on.
    ///
    /// Every zone set has at least one segment, every segment at least one checkpoint,
    /// and every bonus exactly one segment.
    pub fn validate(&self) -> Result<()> {
        self.tracks.main.zones.validate("main track")?;
        for (index, bonus) in self.tracks.bonuses.iter().enumerate() {
            bonus.zones.validate("bonus")?;
            if bonus.zones.segments.len() != 1 {
                return Err(ZoneError::structure(format!(
                    "bonus {} has {} segments, expected exactly 1",
                    index + 1,
                    bonus.zones.segments.len()
                )));
            }
        }
        Ok(())
    }

    /// Resolve the single segment a stage or bonus run covers.
    ///
    /// `track_num` is 1-based. Returns `None` for the main track and for track numbers
    /// that do not exist on this map.
    pub fn segment_for(&self, track_type: TrackType, track_num: u8) -> Option<&Segment> {
        let index = usize::from(track_num.checked_sub(1)?);
        match track_type {
            TrackType::Main => None,
            TrackType::Stage => self.tracks.main.zones.segments.get(index),
            TrackType::Bonus => self.tracks.bonuses.get(index)?.zones.segments.first(),
        }
    }

    /// Main track segments in order.
    pub fn main_segments(&self) -> &[Segment] {
        &self.tracks.main.zones.segments
    }
}

impl ZoneSet {
    fn validate(&self, track: &str) -> Result<()> {
        if self.segments.is_empty() {
            return Err(ZoneError::structure(format!("{track} has no segments")));
        }
        if let Some(index) = self.segments.iter().position(|s| s.checkpoints.is_empty()) {
            return Err(ZoneError::structure(format!(
                "{track} segment {index} has no checkpoints"
            )));
        }
        Ok(())
    }
}
