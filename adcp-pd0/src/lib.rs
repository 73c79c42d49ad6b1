//! Decoder/encoder for the Teledyne RD Instruments PD0 legacy ADCP ensemble wire format (C4).
pub mod beam;
mod bottom_track;
pub mod cell;
pub mod decode;
pub mod encode;
mod leader;
pub mod scan;

pub use decode::decode;
pub use encode::encode;
pub use scan::scan;

pub const PD0_FIXED_LEADER_ID: [u8; 2] = [0x00, 0x00];
pub const PD0_VARIABLE_LEADER_ID: [u8; 2] = [0x80, 0x00];
pub const PD0_VELOCITY_ID: [u8; 2] = [0x00, 0x01];
pub const PD0_CORRELATION_ID: [u8; 2] = [0x00, 0x02];
pub const PD0_ECHO_INTENSITY_ID: [u8; 2] = [0x00, 0x03];
pub const PD0_PERCENT_GOOD_ID: [u8; 2] = [0x00, 0x04];
pub use bottom_track::BOTTOM_TRACK_ID as PD0_BOTTOM_TRACK_ID;
