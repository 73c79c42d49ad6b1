//! Canonical ensemble model, byte primitives, and shared error/settings types for the ADCP
//! RTI/PD0 codecs. This is the foundation crate both `adcp-rti` and `adcp-pd0` build on, in the
//! same role `giga-segy-core` plays for `giga-segy-in`/`giga-segy-out`.
#![allow(clippy::derive_partial_eq_without_eq)]

pub mod bitconverter;
pub mod datasets;
pub mod enums;
pub mod errors;
pub mod model;
pub mod nmea;
pub mod scan;
pub mod settings;
pub mod status;

pub use datasets::{Ancillary, BottomTrack, EnsembleMeta, NmeaBlock, SystemSetup, WaterMass};
pub use enums::{CoordXform, DatasetKind, ValueKind};
pub use errors::CoreError;
pub use model::{Dataset, Ensemble, Grid};
pub use nmea::{NmeaFields, NmeaKind};
pub use settings::CodecSettings;
pub use status::Status;

/// Canonical "bad value" sentinel for velocity fields, used everywhere in the in-memory model
/// regardless of which wire format it came from.
pub const BAD_VELOCITY: f32 = 88.888;

/// Canonical "bad value" sentinel for range fields.
pub const BAD_RANGE: f32 = 0.0;

/// Length in bytes of the RTI ensemble header (16×0x80 sentinel + 4 little-endian u32 fields).
pub const RTI_HEADER_LEN: usize = 32;

/// Length in bytes of the RTI payload checksum trailer.
pub const RTI_CHECKSUM_LEN: usize = 4;

/// Length in bytes of the PD0 checksum trailer.
pub const PD0_CHECKSUM_LEN: usize = 2;

pub const PD0_FIXED_LEADER_LEN: usize = 59;
pub const PD0_VARIABLE_LEADER_LEN: usize = 65;
pub const PD0_BOTTOM_TRACK_LEN: usize = 81;
