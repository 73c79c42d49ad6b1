//! Bottom-track status bitmask. The teacher has no bitmask precedent anywhere in its three
//! crates; `bitflags` is pulled in from the wider example pack instead (see DESIGN.md).
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u32 {
        const BT_WT_3BEAM = 0x0001;
        const BT_BT_3BEAM = 0x0002;
        const BT_HOLD = 0x0004;
        const BT_SEARCHING = 0x0008;
        const BT_HDWR_TIMEOUT = 0x8000;
    }
}
