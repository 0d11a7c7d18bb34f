//! Gamemode and track identifiers shared by the replay header and the run session

use serde::{Deserialize, Serialize};

/// Gamemodes supported by the game, stored as a single byte ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Gamemode {
    Surf = 1,
    Bhop = 2,
    BhopHl1 = 3,
    ClimbMom = 4,
    ClimbKzt = 5,
    Climb16 = 6,
    Rj = 7,
    Sj = 8,
    Ahop = 9,
    Conc = 10,
    DefragCpm = 11,
    DefragVq3 = 12,
    DefragVtg = 13,
}

impl Gamemode {
    /// Every gamemode, in ordinal order.
    pub const ALL: [Gamemode; 13] = [
        Gamemode::Surf,
        Gamemode::Bhop,
        Gamemode::BhopHl1,
        Gamemode::ClimbMom,
        Gamemode::ClimbKzt,
        Gamemode::Climb16,
        Gamemode::Rj,
        Gamemode::Sj,
        Gamemode::Ahop,
        Gamemode::Conc,
        Gamemode::DefragCpm,
        Gamemode::DefragVq3,
        Gamemode::DefragVtg,
    ];

    /// Canonical server tick interval for this gamemode, in seconds.
    pub const fn tick_interval(self) -> f64 {
        match self {
            Gamemode::Surf | Gamemode::Rj | Gamemode::Ahop => 0.015,
            Gamemode::Bhop
            | Gamemode::BhopHl1
            | Gamemode::ClimbMom
            | Gamemode::Climb16
            | Gamemode::Sj
            | Gamemode::Conc => 0.01,
            Gamemode::ClimbKzt => 0.0078125,
            Gamemode::DefragCpm | Gamemode::DefragVq3 | Gamemode::DefragVtg => 0.008,
        }
    }

    /// Byte ordinal as written in replay headers.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Gamemode {
    type Error = InvalidOrdinal;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Gamemode::ALL
            .iter()
            .copied()
            .find(|mode| mode.ordinal() == value)
            .ok_or(InvalidOrdinal { kind: "gamemode", value })
    }
}

impl From<Gamemode> for u8 {
    fn from(mode: Gamemode) -> Self {
        mode.ordinal()
    }
}

/// Which part of a map a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum TrackType {
    /// The full course, every segment in order.
    Main = 0,
    /// A single segment of the main track.
    Stage = 1,
    /// A side track made of one segment.
    Bonus = 2,
}

impl TrackType {
    /// Byte ordinal as written in replay headers.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TrackType {
    type Error = InvalidOrdinal;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TrackType::Main),
            1 => Ok(TrackType::Stage),
            2 => Ok(TrackType::Bonus),
            _ => Err(InvalidOrdinal { kind: "track type", value }),
        }
    }
}

impl From<TrackType> for u8 {
    fn from(track_type: TrackType) -> Self {
        track_type.ordinal()
    }
}

/// A byte that does not map to any variant of a replay enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} ordinal {value}")]
pub struct InvalidOrdinal {
    pub kind: &'static str,
    pub value: u8,
}
