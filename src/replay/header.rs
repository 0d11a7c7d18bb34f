//! Fixed 193-byte replay header
//!
//! Layout (little-endian, packed on byte boundaries, no padding):
//!
//! ```text
//! field              size  offset
//! magic                 4       0
//! format_version        4       4
//! timestamp             8       8   unix seconds
//! map_name             64      16
//! map_hash             41      80   hex SHA-1 + terminator
//! gamemode              1     121
//! tick_interval         4     122   f32 seconds
//! player_steam_id       8     126
//! player_name          32     134
//! track_type            1     166
//! track_num             1     167
//! run_time              8     168   f64 seconds
//! reserved             17     176
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::format::{ByteReader, ByteWriter};
use super::{ReplayFormatError, Result};
use crate::types::{Gamemode, TrackType};

/// Tag at the start of every replay: the ASCII code `MMTV` read as a little-endian `u32`.
pub const REPLAY_MAGIC: u32 = u32::from_le_bytes(*b"MMTV");

/// Total encoded size of [`ReplayHeader`] in bytes.
pub const REPLAY_HEADER_SIZE: usize = 193;

const MAP_NAME_SIZE: usize = 64;
const MAP_HASH_SIZE: usize = 41;
const PLAYER_NAME_SIZE: usize = 32;
const RESERVED_SIZE: usize = 17;

/// Decoded replay header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayHeader {
    pub magic: u32,
    pub format_version: i32,
    /// Unix time in seconds at which the game wrote the replay
    pub timestamp: i64,
    pub map_name: String,
    pub map_hash: String,
    pub gamemode: Gamemode,
    /// Tick interval the run was simulated at, in seconds
    pub tick_interval: f32,
    #[serde(rename = "playerSteamID")]
    pub player_steam_id: u64,
    pub player_name: String,
    pub track_type: TrackType,
    pub track_num: u8,
    /// Final run time in seconds
    pub run_time: f64,
}

impl ReplayHeader {
    /// Size of the encoded header in bytes
    pub const SIZE: usize = REPLAY_HEADER_SIZE;

    /// Decode the header from the start of `data`.
    ///
    /// The magic tag is returned as read; comparing it against [`REPLAY_MAGIC`] is a
    /// metadata check, not a decoding one.
    pub fn decode(data: &[u8]) -> Result<Self> {
        trace!("Reading replay header ({} bytes)", REPLAY_HEADER_SIZE);
        if data.len() < REPLAY_HEADER_SIZE {
            return Err(ReplayFormatError::Truncated {
                context: "replay header",
                offset: 0,
                needed: REPLAY_HEADER_SIZE,
                available: data.len(),
            });
        }

        let mut reader = ByteReader::new(data);
        let magic = reader.read_u32_le("magic")?;
        let format_version = reader.read_i32_le("format version")?;
        let timestamp = reader.read_i64_le("timestamp")?;
        let map_name = reader.read_fixed_str(MAP_NAME_SIZE, "map name")?;
        let map_hash = reader.read_fixed_str(MAP_HASH_SIZE, "map hash")?;

        let gamemode_offset = reader.offset();
        let gamemode = Gamemode::try_from(reader.read_u8("gamemode")?)
            .map_err(|source| ReplayFormatError::InvalidEnum { offset: gamemode_offset, source })?;

        let tick_interval = reader.read_f32_le("tick interval")?;
        let player_steam_id = reader.read_u64_le("player SteamID")?;
        let player_name = reader.read_fixed_str(PLAYER_NAME_SIZE, "player name")?;

        let track_type_offset = reader.offset();
        let track_type = TrackType::try_from(reader.read_u8("track type")?).map_err(|source| {
            ReplayFormatError::InvalidEnum { offset: track_type_offset, source }
        })?;

        let track_num = reader.read_u8("track number")?;
        let run_time = reader.read_f64_le("run time")?;
        debug_assert_eq!(reader.offset() + RESERVED_SIZE, REPLAY_HEADER_SIZE);

        debug!(
            "Parsed replay header: version={}, map={}, gamemode={:?}, track={:?}/{}, run_time={}",
            format_version, map_name, gamemode, track_type, track_num, run_time
        );

        Ok(Self {
            magic,
            format_version,
            timestamp,
            map_name,
            map_hash,
            gamemode,
            tick_interval,
            player_steam_id,
            player_name,
            track_type,
            track_num,
            run_time,
        })
    }

    /// Append the encoded header (exactly [`REPLAY_HEADER_SIZE`] bytes) to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let start = out.len();
        let mut writer = ByteWriter::new(out);
        writer.write_u32_le(self.magic);
        writer.write_i32_le(self.format_version);
        writer.write_i64_le(self.timestamp);
        writer.write_fixed_str(&self.map_name, MAP_NAME_SIZE);
        writer.write_fixed_str(&self.map_hash, MAP_HASH_SIZE);
        writer.write_u8(self.gamemode.ordinal());
        writer.write_f32_le(self.tick_interval);
        writer.write_u64_le(self.player_steam_id);
        writer.write_fixed_str(&self.player_name, PLAYER_NAME_SIZE);
        writer.write_u8(self.track_type.ordinal());
        writer.write_u8(self.track_num);
        writer.write_f64_le(self.run_time);
        writer.write_zeroes(RESERVED_SIZE);
        debug_assert_eq!(out.len() - start, REPLAY_HEADER_SIZE);
    }

    /// Encode the header into a standalone buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(REPLAY_HEADER_SIZE);
        self.encode_into(&mut out);
        out
    }

    /// Whether the magic tag matches [`REPLAY_MAGIC`].
    pub fn has_valid_magic(&self) -> bool {
        self.magic == REPLAY_MAGIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::stub_header;

    #[test]
    fn magic_is_mmtv_tag() {
        assert_eq!(&REPLAY_MAGIC.to_le_bytes(), b"MMTV");
        assert_eq!(REPLAY_MAGIC, 0x5654_4D4D);
    }

    #[test]
    fn encoded_header_has_fixed_offsets() {
        let header = stub_header();
        let bytes = header.encode();

        assert_eq!(bytes.len(), REPLAY_HEADER_SIZE);
        assert_eq!(&bytes[0..4], b"MMTV");
        assert_eq!(&bytes[4..8], &header.format_version.to_le_bytes());
        assert_eq!(&bytes[8..16], &header.timestamp.to_le_bytes());
        assert_eq!(&bytes[16..16 + header.map_name.len()], header.map_name.as_bytes());
        assert_eq!(bytes[16 + header.map_name.len()], 0);
        assert_eq!(&bytes[80..120], header.map_hash.as_bytes());
        assert_eq!(bytes[120], 0);
        assert_eq!(bytes[121], header.gamemode.ordinal());
        assert_eq!(&bytes[122..126], &header.tick_interval.to_le_bytes());
        assert_eq!(&bytes[126..134], &header.player_steam_id.to_le_bytes());
        assert_eq!(&bytes[134..134 + header.player_name.len()], header.player_name.as_bytes());
        assert_eq!(bytes[166], header.track_type.ordinal());
        assert_eq!(bytes[167], header.track_num);
        assert_eq!(&bytes[168..176], &header.run_time.to_le_bytes());
        assert!(bytes[176..].iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_inverts_encode() {
        let header = stub_header();
        let decoded = ReplayHeader::decode(&header.encode()).unwrap();
        assert_eq!(decoded, header);
        assert!(decoded.has_valid_magic());
    }

    #[test]
    fn truncated_header_is_rejected() {
        let bytes = stub_header().encode();
        let result = ReplayHeader::decode(&bytes[..REPLAY_HEADER_SIZE - 1]);
        assert!(matches!(
            result,
            Err(ReplayFormatError::Truncated { context: "replay header", needed: 193, .. })
        ));
    }

    #[test]
    fn unknown_gamemode_is_rejected() {
        let mut bytes = stub_header().encode();
        bytes[121] = 200;
        let err = ReplayHeader::decode(&bytes).unwrap_err();
        assert!(matches!(err, ReplayFormatError::InvalidEnum { offset: 121, .. }));
    }

    #[test]
    fn unknown_track_type_is_rejected() {
        let mut bytes = stub_header().encode();
        bytes[166] = 3;
        let err = ReplayHeader::decode(&bytes).unwrap_err();
        assert!(matches!(err, ReplayFormatError::InvalidEnum { offset: 166, .. }));
    }

    #[test]
    fn bad_magic_still_decodes() {
        let mut header = stub_header();
        header.magic = 0;
        let decoded = ReplayHeader::decode(&header.encode()).unwrap();
        assert!(!decoded.has_valid_magic());
    }

    #[test]
    fn long_strings_are_truncated_to_field_width() {
        let mut header = stub_header();
        header.map_name = "m".repeat(100);
        header.player_name = "p".repeat(40);
        let decoded = ReplayHeader::decode(&header.encode()).unwrap();
        assert_eq!(decoded.map_name, "m".repeat(MAP_NAME_SIZE));
        assert_eq!(decoded.player_name, "p".repeat(PLAYER_NAME_SIZE));
    }

    #[test]
    fn full_width_strings_round_trip() {
        let mut header = stub_header();
        header.map_name = "m".repeat(MAP_NAME_SIZE);
        header.player_name = "p".repeat(PLAYER_NAME_SIZE);
        let bytes = header.encode();
        assert_eq!(bytes[16 + MAP_NAME_SIZE - 1], b'm');
        assert_eq!(ReplayHeader::decode(&bytes).unwrap(), header);
    }
}
