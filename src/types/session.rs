//! Records handed over by the session layer when a run finishes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Gamemode, TrackType};

/// One checkpoint hit reported by the client while the run was in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSessionTimestamp {
    /// Milliseconds elapsed since the run started, as reported by the client
    pub time: u64,
    /// Segment index within the track
    pub segment: u8,
    /// Checkpoint index within the segment (0 is the segment's start zone)
    pub checkpoint: u8,
    /// Server wall-clock time the report was received
    pub created_at: DateTime<Utc>,
}

/// Run session after the client has reported the end of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedRunSession {
    pub id: u64,
    pub gamemode: Gamemode,
    pub track_type: TrackType,
    pub track_num: u8,
    /// Server wall-clock time the run session was opened
    pub created_at: DateTime<Utc>,
    /// Checkpoint reports in arrival order
    pub timestamps: Vec<RunSessionTimestamp>,
    #[serde(rename = "mapID")]
    pub map_id: u32,
    #[serde(rename = "userID")]
    pub user_id: u32,
    #[serde(rename = "mmap")]
    pub map: MapRecord,
}

/// The map a session was opened on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRecord {
    pub name: String,
    pub current_version: MapVersion,
}

/// The map version that was current when the session was opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapVersion {
    /// JSON-encoded [`MapZones`](crate::zones::MapZones)
    pub zones: String,
    /// SHA-1 of the map's BSP, hex encoded
    pub bsp_hash: String,
}

/// The submitting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u32,
    #[serde(rename = "steamID")]
    pub steam_id: u64,
}
