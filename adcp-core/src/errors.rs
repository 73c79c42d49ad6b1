//! Hand-written error type shared by both wire codecs, in the style of `giga-segy-core`'s
//! `RsgError`: a plain enum with manual `Display`/`std::error::Error` impls rather than a
//! derive-macro crate, since the error set here is small and closed.
use std::fmt;

/// Every way a decode can fail, plus the byte offset (relative to the start of the frame being
/// decoded) at which the failure was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Insufficient bytes to satisfy a declared length.
    Truncated {
        needed: usize,
        available: usize,
        offset: usize,
    },
    /// Computed checksum did not match the stored checksum.
    BadChecksum { expected: u32, computed: u32 },
    /// Recognized RTI framing but an unrecognized dataset name-tag.
    UnknownDataset { tag: String, offset: usize },
    /// Recognized PD0 framing but an unrecognized data-type ID.
    UnknownDataType { id: u16, offset: usize },
    /// PD0 offset table is non-monotonic or points out of range, or an RTI header's
    /// bitwise-complement self-check failed.
    InconsistentOffsetTable { offset: usize },
    /// A dataset's declared element-count × multiplier does not match the space available,
    /// or does not match the N/B recorded in `EnsembleMeta`.
    DimensionMismatch { expected: usize, actual: usize },
    /// A dataset's value-kind field was outside {10, 20}.
    BadValueKind { code: i32 },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Truncated {
                needed,
                available,
                offset,
            } => write!(
                f,
                "truncated frame at offset {offset}: needed {needed} bytes, {available} available"
            ),
            CoreError::BadChecksum { expected, computed } => write!(
                f,
                "checksum mismatch: stored {expected:#010x}, computed {computed:#010x}"
            ),
            CoreError::UnknownDataset { tag, offset } => {
                write!(f, "unknown dataset tag {tag:?} at offset {offset}")
            }
            CoreError::UnknownDataType { id, offset } => {
                write!(f, "unknown PD0 data type {id:#06x} at offset {offset}")
            }
            CoreError::InconsistentOffsetTable { offset } => {
                write!(f, "inconsistent offset table or header self-check at offset {offset}")
            }
            CoreError::DimensionMismatch { expected, actual } => write!(
                f,
                "dimension mismatch: expected {expected} elements, found {actual}"
            ),
            CoreError::BadValueKind { code } => {
                write!(f, "value-kind {code} is neither 10 (f32) nor 20 (i32)")
            }
        }
    }
}

impl std::error::Error for CoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offset_context() {
        let err = CoreError::Truncated {
            needed: 32,
            available: 10,
            offset: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("offset 4"));
        assert!(msg.contains("32"));
    }
}
