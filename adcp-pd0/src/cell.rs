//! Per-cell scalar encodings for the four N_cells-indexed PD0 data types (SPEC_FULL.md §4.4.3).

pub const VELOCITY_BAD: i16 = -32768;
pub const CORRELATION_BAD_BYTE: u8 = 0;
pub const PERCENT_GOOD_BAD_BYTE: u8 = 0xFF;

pub fn velocity_from_mmps(raw: i16) -> f32 {
    if raw == VELOCITY_BAD {
        adcp_core::BAD_VELOCITY
    } else {
        adcp_core::bitconverter::q_mmps_to_mps(raw)
    }
}

pub fn velocity_to_mmps(v: f32) -> i16 {
    if v == adcp_core::BAD_VELOCITY {
        VELOCITY_BAD
    } else {
        adcp_core::bitconverter::mps_to_q_mmps(v)
    }
}

/// Correlation byte `c` -> canonical `[0, 1]`. Sentinel byte 0 decodes to canonical 0.0, which is
/// also what a real zero-correlation reading would produce; correlation has no distinct sentinel
/// value in the canonical model (see DESIGN.md, Open Question 3).
pub fn correlation_from_byte(c: u8) -> f32 {
    c as f32 / 255.0
}

pub fn correlation_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Echo intensity byte -> dB. Read scale (0.45 dB/count) and write scale (0.5 dB/count) are
/// deliberately different, per the vendor convention documented in SPEC_FULL.md §4.4.3 / §9.
pub fn echo_intensity_from_byte(e: u8) -> f32 {
    e as f32 * 0.45
}

pub fn echo_intensity_to_byte(db: f32) -> u8 {
    (db * 2.0).round().clamp(0.0, 255.0) as u8
}

/// Percent-good byte -> a ping count, given the ensemble's `pings_per_ensemble`.
pub fn percent_good_from_byte(p: u8, pings_per_ensemble: u32) -> u32 {
    ((p as f32 / 100.0) * pings_per_ensemble as f32).round() as u32
}

pub fn percent_good_to_byte(count: u32, pings_per_ensemble: u32) -> u8 {
    if pings_per_ensemble == 0 {
        return 0;
    }
    ((count as f32 / pings_per_ensemble as f32) * 100.0)
        .round()
        .clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_sentinel_round_trips() {
        assert_eq!(velocity_from_mmps(VELOCITY_BAD), adcp_core::BAD_VELOCITY);
        assert_eq!(velocity_to_mmps(adcp_core::BAD_VELOCITY), VELOCITY_BAD);
    }

    #[test]
    fn velocity_value_round_trips() {
        assert_eq!(velocity_from_mmps(1500), 1.5);
        assert_eq!(velocity_to_mmps(1.5), 1500);
    }

    #[test]
    fn correlation_matches_s3() {
        assert_eq!(correlation_to_byte(0.5), 128);
    }

    #[test]
    fn percent_good_round_trips_at_whole_percentages() {
        assert_eq!(percent_good_from_byte(50, 20), 10);
        assert_eq!(percent_good_to_byte(10, 20), 50);
    }
}
