//! Decoder/encoder for the Rowe Technology Inc. (RTI) native ADCP ensemble wire format (C3).
pub mod decode;
pub mod encode;
mod payload;
pub mod scan;

pub use decode::decode;
pub use encode::encode;
pub use scan::scan;
