//! PD0 ensemble decode (C4 decode side, SPEC_FULL.md §4.4).
use adcp_core::bitconverter::{checksum16, u16_le};
use adcp_core::{CodecSettings, CoreError, Ensemble, Grid, PD0_CHECKSUM_LEN};

use crate::beam::{permute_decode, DECODE_PERM};
use crate::bottom_track::parse_bottom_track;
use crate::cell::{correlation_from_byte, echo_intensity_from_byte, percent_good_from_byte};
use crate::leader::{parse_fixed_leader, parse_variable_leader, to_ancillary, to_ensemble_meta, to_system_setup};
use crate::{
    PD0_BOTTOM_TRACK_ID, PD0_CORRELATION_ID, PD0_ECHO_INTENSITY_ID, PD0_FIXED_LEADER_ID,
    PD0_PERCENT_GOOD_ID, PD0_VARIABLE_LEADER_ID, PD0_VELOCITY_ID,
};

const HEADER_ID: u8 = 0x7F;
const DATA_SOURCE_ID: u8 = 0x7F;

fn truncated(needed: usize, available: usize, offset: usize) -> CoreError {
    CoreError::Truncated {
        needed,
        available,
        offset,
    }
}

/// Decodes one PD0 ensemble frame starting at byte 0 of `bytes` (i.e. `bytes` must already be
/// sliced to start at a sync candidate from [`crate::scan::scan`]).
pub fn decode(bytes: &[u8], settings: &CodecSettings) -> Result<Ensemble, CoreError> {
    if bytes.len() < 6 {
        return Err(truncated(6, bytes.len(), 0));
    }
    if bytes[0] != HEADER_ID || bytes[1] != DATA_SOURCE_ID {
        return Err(CoreError::InconsistentOffsetTable { offset: 0 });
    }

    let byte_count = u16_le(&bytes[2..4]) as usize;
    let num_data_types = bytes[5] as usize;
    if byte_count > settings.max_frame_len() {
        return Err(truncated(byte_count, settings.max_frame_len(), 2));
    }

    let offset_table_start = 6;
    let offset_table_len = 2 * num_data_types;
    if bytes.len() < offset_table_start + offset_table_len {
        return Err(truncated(
            offset_table_start + offset_table_len,
            bytes.len(),
            offset_table_start,
        ));
    }

    let total_needed = byte_count + PD0_CHECKSUM_LEN;
    if bytes.len() < total_needed {
        return Err(truncated(total_needed, bytes.len(), 0));
    }

    let stored_checksum = u16_le(&bytes[byte_count..byte_count + PD0_CHECKSUM_LEN]);
    let computed_checksum = checksum16(&bytes[0..byte_count]);
    if stored_checksum != computed_checksum {
        return Err(CoreError::BadChecksum {
            expected: stored_checksum as u32,
            computed: computed_checksum as u32,
        });
    }

    let mut offsets = Vec::with_capacity(num_data_types);
    for i in 0..num_data_types {
        let o = offset_table_start + i * 2;
        offsets.push(u16_le(&bytes[o..o + 2]) as usize);
    }
    for w in offsets.windows(2) {
        if w[0] >= w[1] {
            return Err(CoreError::InconsistentOffsetTable {
                offset: offset_table_start,
            });
        }
    }
    if let Some(&last) = offsets.last() {
        if last >= byte_count {
            return Err(CoreError::InconsistentOffsetTable {
                offset: offset_table_start,
            });
        }
    }

    let mut fixed = None;
    let mut variable = None;
    let mut velocity_bytes = None;
    let mut correlation_bytes = None;
    let mut echo_bytes = None;
    let mut percent_good_bytes = None;
    let mut bottom_track_bytes = None;

    for (i, &start) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(byte_count);
        if end > bytes.len() || start + 2 > end {
            return Err(truncated(2, bytes.len().saturating_sub(start), start));
        }
        let id = [bytes[start], bytes[start + 1]];
        let body = &bytes[start..end];
        if id == PD0_FIXED_LEADER_ID {
            fixed = Some(parse_fixed_leader(body, start)?);
        } else if id == PD0_VARIABLE_LEADER_ID {
            variable = Some(parse_variable_leader(body, start)?);
        } else if id == PD0_VELOCITY_ID {
            velocity_bytes = Some((body, start));
        } else if id == PD0_CORRELATION_ID {
            correlation_bytes = Some((body, start));
        } else if id == PD0_ECHO_INTENSITY_ID {
            echo_bytes = Some((body, start));
        } else if id == PD0_PERCENT_GOOD_ID {
            percent_good_bytes = Some((body, start));
        } else if id == PD0_BOTTOM_TRACK_ID {
            bottom_track_bytes = Some((body, start));
        } else if !settings.skip_unknown() {
            return Err(CoreError::UnknownDataType {
                id: u16_le(&id),
                offset: start,
            });
        }
    }

    let fixed = match fixed {
        Some(f) => f,
        None => return Err(CoreError::InconsistentOffsetTable { offset: 0 }),
    };
    let variable = match variable {
        Some(v) => v,
        None => return Err(CoreError::InconsistentOffsetTable { offset: 0 }),
    };

    let n = fixed.num_cells as usize;
    let b = fixed.num_beams as usize;
    let xform = fixed.coord_xform;

    let mut ensemble = Ensemble {
        meta: Some(to_ensemble_meta(&fixed, &variable)),
        ancillary: Some(to_ancillary(&fixed, &variable)),
        system_setup: Some(to_system_setup(&fixed)),
        ..Default::default()
    };

    if let Some((body, start)) = velocity_bytes {
        let grid = decode_velocity_cells(body, start, n, xform)?;
        match xform {
            adcp_core::CoordXform::Beam => ensemble.beam_velocity = Some(grid),
            adcp_core::CoordXform::Instrument => ensemble.instrument_velocity = Some(grid),
            adcp_core::CoordXform::Earth => ensemble.earth_velocity = Some(grid),
            adcp_core::CoordXform::Ship => ensemble.ship_velocity = Some(grid),
        }
    }
    if let Some((body, start)) = correlation_bytes {
        ensemble.correlation = Some(decode_scalar_cells(body, start, n, correlation_from_byte)?);
    }
    if let Some((body, start)) = echo_bytes {
        ensemble.amplitude = Some(decode_scalar_cells(body, start, n, echo_intensity_from_byte)?);
    }
    if let Some((body, start)) = percent_good_bytes {
        let pings = ensemble
            .system_setup
            .map(|s| s.wp_ping_count)
            .unwrap_or(0);
        let grid = decode_percent_good_cells(body, start, n, pings)?;
        match xform {
            adcp_core::CoordXform::Beam => ensemble.good_beam = Some(grid),
            adcp_core::CoordXform::Instrument => ensemble.good_instrument = Some(grid),
            adcp_core::CoordXform::Earth | adcp_core::CoordXform::Ship => {
                ensemble.good_earth = Some(grid)
            }
        }
    }
    if let Some((body, start)) = bottom_track_bytes {
        let ancillary = ensemble.ancillary.unwrap_or_default();
        ensemble.bottom_track = Some(parse_bottom_track(body, start, xform, &ancillary)?);
    }

    Ok(ensemble)
}

fn decode_velocity_cells(
    body: &[u8],
    start: usize,
    n_cells: usize,
    xform: adcp_core::CoordXform,
) -> Result<Grid<f32>, CoreError> {
    let needed = 2 + 8 * n_cells;
    if body.len() < needed {
        return Err(truncated(needed, body.len(), start));
    }
    let mut data = Vec::with_capacity(n_cells * 4);
    for cell in 0..n_cells {
        let base = 2 + cell * 8;
        let mmps: [i16; 4] = std::array::from_fn(|i| {
            adcp_core::bitconverter::i16_le(&body[base + i * 2..base + i * 2 + 2])
        });
        let canonical = crate::bottom_track::canonical_velocity_from_pd0(mmps, xform);
        data.extend(canonical);
    }
    Grid::from_flat(n_cells, 4, data)
}

fn decode_scalar_cells(
    body: &[u8],
    start: usize,
    n_cells: usize,
    from_byte: fn(u8) -> f32,
) -> Result<Grid<f32>, CoreError> {
    let needed = 2 + 4 * n_cells;
    if body.len() < needed {
        return Err(truncated(needed, body.len(), start));
    }
    let mut data = Vec::with_capacity(n_cells * 4);
    for cell in 0..n_cells {
        let base = 2 + cell * 4;
        let bytes: [u8; 4] = std::array::from_fn(|i| body[base + i]);
        let canonical = permute_decode(bytes, DECODE_PERM).map(from_byte);
        data.extend(canonical);
    }
    Grid::from_flat(n_cells, 4, data)
}

fn decode_percent_good_cells(
    body: &[u8],
    start: usize,
    n_cells: usize,
    pings_per_ensemble: u32,
) -> Result<Grid<u32>, CoreError> {
    let needed = 2 + 4 * n_cells;
    if body.len() < needed {
        return Err(truncated(needed, body.len(), start));
    }
    let mut data = Vec::with_capacity(n_cells * 4);
    for cell in 0..n_cells {
        let base = 2 + cell * 4;
        let bytes: [u8; 4] = std::array::from_fn(|i| body[base + i]);
        let permuted = permute_decode(bytes, DECODE_PERM);
        data.extend(permuted.map(|p| percent_good_from_byte(p, pings_per_ensemble)));
    }
    Grid::from_flat(n_cells, 4, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;
    use adcp_core::{CoordXform, Ensemble, Grid};

    fn sample_ensemble() -> Ensemble {
        let mut e = Ensemble::empty(2, 4);
        e.meta.as_mut().unwrap().ensemble_number = 7;
        e.earth_velocity = Some(
            Grid::from_flat(2, 4, vec![0.1, 0.2, -0.05, 0.0, 0.0, 0.1, 0.2, -0.05])
                .expect("8 elements for 2x4 grid"),
        );
        e.correlation = Some(Grid::new_filled(2, 4, 0.5));
        e.amplitude = Some(Grid::new_filled(2, 4, 45.0));
        e
    }

    #[test]
    fn decode_rejects_truncated_header() {
        let settings = CodecSettings::default();
        assert!(matches!(
            decode(&[0x7F, 0x7F, 0x00], &settings),
            Err(CoreError::Truncated { .. })
        ));
    }

    #[test]
    fn decode_rejects_bad_sync_byte() {
        let settings = CodecSettings::default();
        let bytes = vec![0x7F, 0x00, 0, 0, 0, 0];
        assert!(matches!(
            decode(&bytes, &settings),
            Err(CoreError::InconsistentOffsetTable { offset: 0 })
        ));
    }

    #[test]
    fn decode_of_encode_round_trips_earth_velocity() {
        let settings = CodecSettings::default();
        let e = sample_ensemble();
        let bytes = encode(&e, CoordXform::Earth);
        let decoded = decode(&bytes, &settings).expect("decode");
        let orig = e.earth_velocity.unwrap();
        let got = decoded.earth_velocity.expect("earth velocity present");
        for c in 0..orig.n_cells() {
            for b in 0..orig.n_beams() {
                assert!((got.get(c, b) - orig.get(c, b)).abs() < 0.001);
            }
        }
    }

    #[test]
    fn decode_detects_bit_flip_as_bad_checksum() {
        let settings = CodecSettings::default();
        let e = sample_ensemble();
        let mut bytes = encode(&e, CoordXform::Earth);
        bytes[10] ^= 0x01;
        assert!(matches!(
            decode(&bytes, &settings),
            Err(CoreError::BadChecksum { .. })
        ));
    }
}
