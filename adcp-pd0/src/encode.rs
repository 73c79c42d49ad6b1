//! PD0 ensemble encode (C4 encode side, SPEC_FULL.md §4.4).
use adcp_core::bitconverter::{checksum16, u16_to_le};
use adcp_core::{CoordXform, Ensemble, Grid, PD0_CHECKSUM_LEN};

use crate::beam::{permute_encode, ENCODE_PERM};
use crate::bottom_track::{build_bottom_track, pd0_velocity_from_canonical};
use crate::cell::{correlation_to_byte, echo_intensity_to_byte, percent_good_to_byte};
use crate::leader::{build_fixed_leader, build_variable_leader, FixedLeaderInfo, VariableLeaderInfo};
use crate::{PD0_CORRELATION_ID, PD0_ECHO_INTENSITY_ID, PD0_PERCENT_GOOD_ID, PD0_VELOCITY_ID};

const HEADER_ID: u8 = 0x7F;
const DATA_SOURCE_ID: u8 = 0x7F;

/// Encodes a canonical ensemble to a PD0 frame, storing velocity (and the matching good-counts/
/// Fixed Leader `CoordinateTransform` field) in `xform`'s coordinate frame (SPEC_FULL.md §4.4.5).
pub fn encode(ensemble: &Ensemble, xform: CoordXform) -> Vec<u8> {
    debug_assert!(
        ensemble.validate().is_ok(),
        "encode_pd0 called on an ensemble that violates the data-model invariants"
    );

    let meta = ensemble.meta.unwrap_or_default();
    let ancillary = ensemble.ancillary.unwrap_or_default();
    let system_setup = ensemble.system_setup.unwrap_or_default();

    let fixed_info = FixedLeaderInfo {
        num_beams: meta.num_beams,
        num_cells: meta.num_cells,
        pings_per_ensemble: system_setup.wp_ping_count as u16,
        depth_cell_length_cm: (ancillary.bin_size_m * 100.0).round() as u16,
        blank_cm: (system_setup.blank_m * 100.0).round() as u16,
        code_repeats: system_setup.code_repeats as u8,
        time_between_pings_s: system_setup.ping_interval_s,
        coord_xform: xform,
        heading_alignment_deg: system_setup.heading_alignment_deg,
        heading_bias_deg: system_setup.heading_bias_deg,
        bin1_distance_cm: (ancillary.first_bin_range_m * 100.0).round() as u16,
    };
    let variable_info = VariableLeaderInfo {
        ensemble_number: meta.ensemble_number,
        year: meta.year,
        month: meta.month,
        day: meta.day,
        hour: meta.hour,
        minute: meta.minute,
        second: meta.second,
        hundredths: meta.hundredths,
        speed_of_sound_mps: ancillary.speed_of_sound_mps,
        transducer_depth_m: ancillary.transducer_depth_m,
        heading_deg: ancillary.heading_deg,
        pitch_deg: ancillary.pitch_deg,
        roll_deg: ancillary.roll_deg,
        salinity_ppt: ancillary.salinity_ppt,
        water_temp_c: ancillary.water_temp_c,
        pressure_pa: ancillary.pressure_pa,
    };

    let mut data_types: Vec<Vec<u8>> = Vec::new();
    data_types.push(build_fixed_leader(&fixed_info));
    data_types.push(build_variable_leader(&variable_info));

    let velocity = velocity_for_xform(ensemble, xform);
    if let Some(grid) = velocity {
        data_types.push(build_velocity(grid, xform));
    }
    if let Some(grid) = &ensemble.correlation {
        data_types.push(build_scalar_cells(PD0_CORRELATION_ID, grid, correlation_to_byte));
    }
    if let Some(grid) = &ensemble.amplitude {
        data_types.push(build_scalar_cells(PD0_ECHO_INTENSITY_ID, grid, echo_intensity_to_byte));
    }
    let good_counts = good_counts_for_xform(ensemble, xform);
    if let Some(grid) = good_counts {
        data_types.push(build_percent_good(grid, fixed_info.pings_per_ensemble as u32));
    }
    if let Some(bt) = &ensemble.bottom_track {
        data_types.push(build_bottom_track(bt, xform, fixed_info.pings_per_ensemble as u32));
    }

    let num_data_types = data_types.len();
    let header_len = 6 + 2 * num_data_types;
    let mut offsets = Vec::with_capacity(num_data_types);
    let mut running = header_len;
    for dt in &data_types {
        offsets.push(running);
        running += dt.len();
    }
    let byte_count = running;

    let mut frame = Vec::with_capacity(byte_count + PD0_CHECKSUM_LEN);
    frame.push(HEADER_ID);
    frame.push(DATA_SOURCE_ID);
    frame.extend(u16_to_le(byte_count as u16));
    frame.push(0); // spare
    frame.push(num_data_types as u8);
    for o in &offsets {
        frame.extend(u16_to_le(*o as u16));
    }
    for dt in &data_types {
        frame.extend(dt);
    }
    frame.extend(u16_to_le(checksum16(&frame)));
    frame
}

fn velocity_for_xform(ensemble: &Ensemble, xform: CoordXform) -> Option<&Grid<f32>> {
    match xform {
        CoordXform::Beam => ensemble.beam_velocity.as_ref(),
        CoordXform::Instrument => ensemble.instrument_velocity.as_ref(),
        CoordXform::Earth => ensemble.earth_velocity.as_ref(),
        CoordXform::Ship => ensemble.ship_velocity.as_ref(),
    }
}

fn good_counts_for_xform(ensemble: &Ensemble, xform: CoordXform) -> Option<&Grid<u32>> {
    match xform {
        CoordXform::Beam => ensemble.good_beam.as_ref(),
        CoordXform::Instrument => ensemble.good_instrument.as_ref(),
        CoordXform::Earth | CoordXform::Ship => ensemble.good_earth.as_ref(),
    }
}

fn build_velocity(grid: &Grid<f32>, xform: CoordXform) -> Vec<u8> {
    let n = grid.n_cells();
    let mut out = Vec::with_capacity(2 + 8 * n);
    out.extend(PD0_VELOCITY_ID);
    for cell in 0..n {
        let canonical = [
            grid.get(cell, 0),
            grid.get(cell, 1),
            grid.get(cell, 2),
            grid.get(cell, 3),
        ];
        let mmps = pd0_velocity_from_canonical(canonical, xform);
        for v in mmps {
            out.extend(adcp_core::bitconverter::i16_to_le(v));
        }
    }
    out
}

fn build_scalar_cells(id: [u8; 2], grid: &Grid<f32>, to_byte: fn(f32) -> u8) -> Vec<u8> {
    let n = grid.n_cells();
    let mut out = Vec::with_capacity(2 + 4 * n);
    out.extend(id);
    for cell in 0..n {
        let canonical = [
            grid.get(cell, 0),
            grid.get(cell, 1),
            grid.get(cell, 2),
            grid.get(cell, 3),
        ];
        let bytes = permute_encode(canonical, ENCODE_PERM).map(to_byte);
        out.extend(bytes);
    }
    out
}

fn build_percent_good(grid: &Grid<u32>, pings_per_ensemble: u32) -> Vec<u8> {
    let n = grid.n_cells();
    let mut out = Vec::with_capacity(2 + 4 * n);
    out.extend(PD0_PERCENT_GOOD_ID);
    for cell in 0..n {
        let canonical = [
            grid.get(cell, 0),
            grid.get(cell, 1),
            grid.get(cell, 2),
            grid.get(cell, 3),
        ];
        let bytes = permute_encode(canonical, ENCODE_PERM).map(|c| percent_good_to_byte(c, pings_per_ensemble));
        out.extend(bytes);
    }
    out
}
