//! Normalized output of a fully validated submission

use serde::{Deserialize, Serialize};

use super::{Gamemode, TrackType};
use crate::replay::RunSplits;

/// A run that passed every check, ready for persistence and ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedRun {
    #[serde(rename = "userID")]
    pub user_id: u32,
    #[serde(rename = "mapID")]
    pub map_id: u32,
    pub gamemode: Gamemode,
    pub track_type: TrackType,
    pub track_num: u8,
    /// Run time in seconds, taken from the replay header
    pub time: f64,
    pub splits: RunSplits,
    pub flags: Vec<RunFlag>,
}

/// Markers attached to a processed run by post-validation heuristics.
///
/// No heuristics exist yet, so every processed run carries an empty flag list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RunFlag {}
