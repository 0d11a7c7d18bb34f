//! Run splits block, stored directly after the replay header
//!
//! ```text
//! RunStats (24 bytes)      jumps u32, strafes u32, then four f32:
//!                          horizontal distance, overall distance,
//!                          max overall speed, max horizontal speed
//!
//! splits := RunStats track_stats
//!           u32 segment_count
//!           segment[segment_count]
//!
//! segment := Vector3 effective_start_velocity   (3 x f32)
//!            u8 checkpoints_ordered             (0 or 1)
//!            RunStats stats
//!            u32 subsegment_count
//!            subsegment[subsegment_count]
//!
//! subsegment := u8 minor_num                    (1-based)
//!               f64 time_reached                (seconds since run start)
//!               Vector3 velocity_when_reached
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::Result;
use super::format::{ByteReader, ByteWriter};

const RUN_STATS_SIZE: usize = 24;
const VECTOR3_SIZE: usize = 12;
const SUBSEGMENT_SIZE: usize = 1 + 8 + VECTOR3_SIZE;
/// Smallest possible encoded segment (one with no subsegments).
const MIN_SEGMENT_SIZE: usize = VECTOR3_SIZE + 1 + RUN_STATS_SIZE + 4;

/// Three-component float vector as recorded by the game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Aggregate movement statistics for a track or a segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub jumps: u32,
    pub strafes: u32,
    pub horizontal_distance_travelled: f32,
    pub overall_distance_travelled: f32,
    pub max_overall_speed: f32,
    pub max_horizontal_speed: f32,
}

/// Time and velocity at which a checkpoint was reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSubsegment {
    /// 1-based checkpoint number within the segment
    pub minor_num: u8,
    /// Seconds since the run started
    pub time_reached: f64,
    pub velocity_when_reached: Vector3,
}

/// Split record for one segment of the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSegment {
    pub effective_start_velocity: Vector3,
    pub checkpoints_ordered: bool,
    pub stats: RunStats,
    pub subsegments: Vec<RunSubsegment>,
}

/// Every split recorded by the game for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSplits {
    pub track_stats: RunStats,
    pub segments: Vec<RunSegment>,
}

impl RunSplits {
    /// Decode the splits block starting at `offset` in `data`.
    ///
    /// Trailing bytes after the block are left untouched; they belong to the replay's
    /// frame data.
    pub fn decode(data: &[u8], offset: usize) -> Result<Self> {
        trace!("Reading run splits at offset {}", offset);
        let mut reader = ByteReader::at(data, offset, "run splits")?;

        let track_stats = read_stats(&mut reader, "track stats")?;
        let segment_count = reader.read_count(MIN_SEGMENT_SIZE, "segment count")?;
        let mut segments = Vec::with_capacity(segment_count);

        for _ in 0..segment_count {
            let effective_start_velocity = reader.read_vector3("effective start velocity")?;
            let checkpoints_ordered = reader.read_bool("checkpoints ordered")?;
            let stats = read_stats(&mut reader, "segment stats")?;

            let subsegment_count = reader.read_count(SUBSEGMENT_SIZE, "subsegment count")?;
            let mut subsegments = Vec::with_capacity(subsegment_count);
            for _ in 0..subsegment_count {
                subsegments.push(RunSubsegment {
                    minor_num: reader.read_u8("minor number")?,
                    time_reached: reader.read_f64_le("time reached")?,
                    velocity_when_reached: reader.read_vector3("velocity when reached")?,
                });
            }

            segments.push(RunSegment {
                effective_start_velocity,
                checkpoints_ordered,
                stats,
                subsegments,
            });
        }

        debug!(
            "Parsed run splits: {} segments, {} subsegments, ended at offset {}",
            segments.len(),
            segments.iter().map(|s| s.subsegments.len()).sum::<usize>(),
            reader.offset()
        );

        Ok(Self { track_stats, segments })
    }

    /// Append the encoded splits block to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        let mut writer = ByteWriter::new(out);
        write_stats(&mut writer, &self.track_stats);
        writer.write_count(self.segments.len(), "segment count")?;

        for segment in &self.segments {
            writer.write_vector3(&segment.effective_start_velocity);
            writer.write_bool(segment.checkpoints_ordered);
            write_stats(&mut writer, &segment.stats);
            writer.write_count(segment.subsegments.len(), "subsegment count")?;
            for subsegment in &segment.subsegments {
                writer.write_u8(subsegment.minor_num);
                writer.write_f64_le(subsegment.time_reached);
                writer.write_vector3(&subsegment.velocity_when_reached);
            }
        }
        Ok(())
    }

    /// Total number of subsegments across all segments.
    pub fn subsegment_count(&self) -> usize {
        self.segments.iter().map(|segment| segment.subsegments.len()).sum()
    }

    /// Look up the split for a 0-based segment and checkpoint index.
    pub fn subsegment(&self, segment: usize, checkpoint: usize) -> Option<&RunSubsegment> {
        self.segments.get(segment)?.subsegments.get(checkpoint)
    }
}

fn read_stats(reader: &mut ByteReader<'_>, context: &'static str) -> Result<RunStats> {
    Ok(RunStats {
        jumps: reader.read_u32_le(context)?,
        strafes: reader.read_u32_le(context)?,
        horizontal_distance_travelled: reader.read_f32_le(context)?,
        overall_distance_travelled: reader.read_f32_le(context)?,
        max_overall_speed: reader.read_f32_le(context)?,
        max_horizontal_speed: reader.read_f32_le(context)?,
    })
}

fn write_stats(writer: &mut ByteWriter<'_>, stats: &RunStats) {
    writer.write_u32_le(stats.jumps);
    writer.write_u32_le(stats.strafes);
    writer.write_f32_le(stats.horizontal_distance_travelled);
    writer.write_f32_le(stats.overall_distance_travelled);
    writer.write_f32_le(stats.max_overall_speed);
    writer.write_f32_le(stats.max_horizontal_speed);
}
