//! Core types exchanged with the session layer and downstream collaborators.
//!
//! ## Overview
//!
//! - [`Gamemode`] and [`TrackType`] identify what kind of run was performed and map to
//!   single-byte ordinals in the replay header
//! - [`CompletedRunSession`], [`RunSessionTimestamp`] and [`User`] are read-only inputs
//!   produced by the session layer
//! - [`ProcessedRun`] is the value handed on once every check has passed
//!
//! All records (de)serialize in the camelCase shape used by the session layer.
//!
//! ```rust
//! use runcheck::types::{Gamemode, TrackType};
//!
//! assert_eq!(Gamemode::try_from(2), Ok(Gamemode::Bhop));
//! assert!(TrackType::try_from(7).is_err());
//! assert!((Gamemode::Surf.tick_interval() - 0.015).abs() < f64::EPSILON);
//! ```

mod gamemode;
mod processed;
mod session;

pub use gamemode::{Gamemode, InvalidOrdinal, TrackType};
pub use processed::{ProcessedRun, RunFlag};
pub use session::{CompletedRunSession, MapRecord, MapVersion, RunSessionTimestamp, User};
