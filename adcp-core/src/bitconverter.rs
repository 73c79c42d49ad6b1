//! Little-endian byte primitives and the fixed-point scaling helpers shared by both wire
//! codecs. Every multi-byte integer and float on the wire is little-endian; nothing here
//! branches on endianness the way a format-agnostic converter would, because both RTI and PD0
//! are little-endian-only formats.

/// Reads a little-endian `u16` from the first two bytes of `bytes`.
///
/// # Panics
/// Panics if `bytes` has fewer than 2 elements; callers are expected to have already checked
/// the frame length (see [`crate::errors::CoreError::Truncated`]).
pub fn u16_le(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

pub fn i16_le(bytes: &[u8]) -> i16 {
    i16::from_le_bytes([bytes[0], bytes[1]])
}

pub fn u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

pub fn i32_le(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

pub fn f32_le(bytes: &[u8]) -> f32 {
    f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

pub fn u16_to_le(v: u16) -> [u8; 2] {
    v.to_le_bytes()
}

pub fn i16_to_le(v: i16) -> [u8; 2] {
    v.to_le_bytes()
}

pub fn u32_to_le(v: u32) -> [u8; 4] {
    v.to_le_bytes()
}

pub fn i32_to_le(v: i32) -> [u8; 4] {
    v.to_le_bytes()
}

pub fn f32_to_le(v: f32) -> [u8; 4] {
    v.to_le_bytes()
}

/// Additive checksum over every byte of `bytes`, reduced modulo 2^16. No seed, no complement.
/// Used by the PD0 frame checksum.
pub fn checksum16(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0u32, |acc, &b| acc + b as u32) as u16
}

/// Additive checksum over every byte of `bytes`, reduced modulo 2^32. Used by the RTI payload
/// checksum.
pub fn checksum32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u64, |acc, &b| acc + b as u64) as u32
}

/// Centimeters (as a raw integer quantity) to meters.
pub fn q_cm_to_m(raw: i32) -> f32 {
    raw as f32 / 100.0
}

pub fn m_to_q_cm(v: f32) -> i32 {
    (v * 100.0).round() as i32
}

/// Millimeters/second to meters/second.
pub fn q_mmps_to_mps(raw: i16) -> f32 {
    raw as f32 / 1000.0
}

pub fn mps_to_q_mmps(v: f32) -> i16 {
    (v * 1000.0).round() as i16
}

/// Hundredths of a degree to degrees.
pub fn q_cdeg_to_deg(raw: i32) -> f32 {
    raw as f32 / 100.0
}

pub fn deg_to_q_cdeg(v: f32) -> i32 {
    (v * 100.0).round() as i32
}

/// Tenths of a unit to a float.
pub fn q_tenth_to_f32(raw: i16) -> f32 {
    raw as f32 / 10.0
}

pub fn f32_to_q_tenth(v: f32) -> i16 {
    (v * 10.0).round() as i16
}
