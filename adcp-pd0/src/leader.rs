//! Fixed Leader and Variable Leader field layouts (SPEC_FULL.md §4.4.2), and their mapping onto
//! the canonical `EnsembleMeta`/`Ancillary`/`SystemSetup` datasets.
use adcp_core::bitconverter::{i16_le, i16_to_le, u16_le, u16_to_le, u32_le, u32_to_le};
use adcp_core::{Ancillary, CoordXform, CoreError, EnsembleMeta, SystemSetup};

use crate::PD0_FIXED_LEADER_ID;
use crate::PD0_VARIABLE_LEADER_ID;

fn truncated(needed: usize, available: usize, offset: usize) -> CoreError {
    CoreError::Truncated {
        needed,
        available,
        offset,
    }
}

/// The Fixed Leader fields this workspace models. Fields SPEC_FULL.md lists but the canonical
/// data model has no slot for (CPU version, system config, sensor source, serial numbers, beam
/// angle, ...) are read far enough to validate frame length but not retained.
pub struct FixedLeaderInfo {
    pub num_beams: u8,
    pub num_cells: u16,
    pub pings_per_ensemble: u16,
    pub depth_cell_length_cm: u16,
    pub blank_cm: u16,
    pub code_repeats: u8,
    pub time_between_pings_s: f32,
    pub coord_xform: CoordXform,
    pub heading_alignment_deg: f32,
    pub heading_bias_deg: f32,
    pub bin1_distance_cm: u16,
}

pub fn parse_fixed_leader(bytes: &[u8], base_offset: usize) -> Result<FixedLeaderInfo, CoreError> {
    if bytes.len() < adcp_core::PD0_FIXED_LEADER_LEN {
        return Err(truncated(adcp_core::PD0_FIXED_LEADER_LEN, bytes.len(), base_offset));
    }
    let num_beams = bytes[8];
    let num_cells = bytes[9] as u16;
    let pings_per_ensemble = u16_le(&bytes[10..12]);
    let depth_cell_length_cm = u16_le(&bytes[12..14]);
    let blank_cm = u16_le(&bytes[14..16]);
    let code_repeats = bytes[18];
    let tbp_minutes = bytes[22] as f32;
    let tbp_seconds = bytes[23] as f32;
    let tbp_hundredths = bytes[24] as f32;
    let coord_xform = CoordXform::from_fixed_leader_byte(bytes[25]);
    let heading_alignment_deg = i16_le(&bytes[26..28]) as f32 / 100.0;
    let heading_bias_deg = i16_le(&bytes[28..30]) as f32 / 100.0;
    let bin1_distance_cm = u16_le(&bytes[32..34]);

    Ok(FixedLeaderInfo {
        num_beams,
        num_cells,
        pings_per_ensemble,
        depth_cell_length_cm,
        blank_cm,
        code_repeats,
        time_between_pings_s: tbp_minutes * 60.0 + tbp_seconds + tbp_hundredths / 100.0,
        coord_xform,
        heading_alignment_deg,
        heading_bias_deg,
        bin1_distance_cm,
    })
}

pub fn build_fixed_leader(info: &FixedLeaderInfo) -> Vec<u8> {
    let mut out = vec![0u8; adcp_core::PD0_FIXED_LEADER_LEN];
    out[0..2].copy_from_slice(&PD0_FIXED_LEADER_ID);
    out[8] = info.num_beams;
    out[9] = info.num_cells as u8;
    out[10..12].copy_from_slice(&u16_to_le(info.pings_per_ensemble));
    out[12..14].copy_from_slice(&u16_to_le(info.depth_cell_length_cm));
    out[14..16].copy_from_slice(&u16_to_le(info.blank_cm));
    out[18] = info.code_repeats;
    let total_hundredths = (info.time_between_pings_s * 100.0).round() as i64;
    out[22] = ((total_hundredths / 100 / 60) % 60) as u8;
    out[23] = ((total_hundredths / 100) % 60) as u8;
    out[24] = (total_hundredths % 100) as u8;
    out[25] = info.coord_xform.to_fixed_leader_byte();
    out[26..28].copy_from_slice(&i16_to_le((info.heading_alignment_deg * 100.0).round() as i16));
    out[28..30].copy_from_slice(&i16_to_le((info.heading_bias_deg * 100.0).round() as i16));
    out[32..34].copy_from_slice(&u16_to_le(info.bin1_distance_cm));
    out
}

pub struct VariableLeaderInfo {
    pub ensemble_number: u32,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub hundredths: u8,
    pub speed_of_sound_mps: f32,
    pub transducer_depth_m: f32,
    pub heading_deg: f32,
    pub pitch_deg: f32,
    pub roll_deg: f32,
    pub salinity_ppt: f32,
    pub water_temp_c: f32,
    pub pressure_pa: f32,
}

pub fn parse_variable_leader(bytes: &[u8], base_offset: usize) -> Result<VariableLeaderInfo, CoreError> {
    if bytes.len() < adcp_core::PD0_VARIABLE_LEADER_LEN {
        return Err(truncated(adcp_core::PD0_VARIABLE_LEADER_LEN, bytes.len(), base_offset));
    }
    let ensemble_low = u16_le(&bytes[2..4]) as u32;
    let ensemble_msb = bytes[11] as u32;
    Ok(VariableLeaderInfo {
        ensemble_number: ensemble_low | (ensemble_msb << 16),
        year: 2000 + bytes[4] as u16,
        month: bytes[5],
        day: bytes[6],
        hour: bytes[7],
        minute: bytes[8],
        second: bytes[9],
        hundredths: bytes[10],
        speed_of_sound_mps: u16_le(&bytes[14..16]) as f32,
        transducer_depth_m: u16_le(&bytes[16..18]) as f32 / 10.0,
        heading_deg: u16_le(&bytes[18..20]) as f32 / 100.0,
        pitch_deg: i16_le(&bytes[20..22]) as f32 / 100.0,
        roll_deg: i16_le(&bytes[22..24]) as f32 / 100.0,
        salinity_ppt: u16_le(&bytes[24..26]) as f32,
        water_temp_c: i16_le(&bytes[26..28]) as f32 / 100.0,
        pressure_pa: u32_le(&bytes[48..52]) as f32 * 10000.0,
    })
}

pub fn build_variable_leader(info: &VariableLeaderInfo) -> Vec<u8> {
    let mut out = vec![0u8; adcp_core::PD0_VARIABLE_LEADER_LEN];
    out[0..2].copy_from_slice(&PD0_VARIABLE_LEADER_ID);
    out[2..4].copy_from_slice(&u16_to_le((info.ensemble_number & 0xFFFF) as u16));
    out[4] = (info.year.saturating_sub(2000)) as u8;
    out[5] = info.month;
    out[6] = info.day;
    out[7] = info.hour;
    out[8] = info.minute;
    out[9] = info.second;
    out[10] = info.hundredths;
    out[11] = ((info.ensemble_number >> 16) & 0xFF) as u8;
    out[14..16].copy_from_slice(&u16_to_le(info.speed_of_sound_mps.round() as u16));
    out[16..18].copy_from_slice(&u16_to_le((info.transducer_depth_m * 10.0).round() as u16));
    out[18..20].copy_from_slice(&u16_to_le((info.heading_deg * 100.0).round() as u16));
    out[20..22].copy_from_slice(&i16_to_le((info.pitch_deg * 100.0).round() as i16));
    out[22..24].copy_from_slice(&i16_to_le((info.roll_deg * 100.0).round() as i16));
    out[24..26].copy_from_slice(&u16_to_le(info.salinity_ppt.round() as u16));
    out[26..28].copy_from_slice(&i16_to_le((info.water_temp_c * 100.0).round() as i16));
    out[48..52].copy_from_slice(&u32_to_le((info.pressure_pa / 10000.0).round() as u32));
    out
}

/// Merges Fixed and Variable Leader fields into the canonical ensemble meta and ancillary
/// datasets. `num_cells`/`num_beams` on `EnsembleMeta` come from the Fixed Leader; everything
/// else environmental comes from the Variable Leader.
pub fn to_ensemble_meta(fixed: &FixedLeaderInfo, variable: &VariableLeaderInfo) -> EnsembleMeta {
    EnsembleMeta {
        ensemble_number: variable.ensemble_number,
        year: variable.year,
        month: variable.month,
        day: variable.day,
        hour: variable.hour,
        minute: variable.minute,
        second: variable.second,
        hundredths: variable.hundredths,
        num_beams: fixed.num_beams,
        num_cells: fixed.num_cells,
    }
}

/// `heading_deg` is the raw Variable Leader heading only; Fixed Leader alignment/bias stay on
/// `SystemSetup` (`to_system_setup`) instead of being folded in here, so a PD0 round-trip can
/// restore the original Fixed Leader bytes rather than baking them irreversibly into one field
/// (see DESIGN.md). `last_ping_time_s` is left at 0.0: PD0 carries no "time since boot" field,
/// only the bounded Fixed Leader ping-interval duration, which is carried separately on
/// `SystemSetup.ping_interval_s` instead of overloading this field (see DESIGN.md).
pub fn to_ancillary(fixed: &FixedLeaderInfo, variable: &VariableLeaderInfo) -> Ancillary {
    let bin_size_m = fixed.depth_cell_length_cm as f32 / 100.0;
    let first_bin_range_m = fixed.bin1_distance_cm as f32 / 100.0;
    let last_bin_range_m = first_bin_range_m + bin_size_m * (fixed.num_cells.saturating_sub(1)) as f32;
    Ancillary {
        first_bin_range_m,
        last_bin_range_m,
        bin_size_m,
        first_ping_time_s: 0.0,
        last_ping_time_s: 0.0,
        heading_deg: variable.heading_deg,
        pitch_deg: variable.pitch_deg,
        roll_deg: variable.roll_deg,
        water_temp_c: variable.water_temp_c,
        system_temp_c: 0.0,
        salinity_ppt: variable.salinity_ppt,
        pressure_pa: variable.pressure_pa,
        transducer_depth_m: variable.transducer_depth_m,
        speed_of_sound_mps: variable.speed_of_sound_mps,
        raw_mag_field: [0.0; 3],
        raw_accel: [0.0; 3],
        raw_tilt: [0.0; 3],
    }
}

pub fn to_system_setup(fixed: &FixedLeaderInfo) -> SystemSetup {
    SystemSetup {
        bin_size_m: fixed.depth_cell_length_cm as f32 / 100.0,
        blank_m: fixed.blank_cm as f32 / 100.0,
        wp_ping_count: fixed.pings_per_ensemble as u32,
        bt_ping_count: 0,
        lag_samples: 0,
        code_repeats: fixed.code_repeats as u32,
        transmit_cycles: 0,
        heading_alignment_deg: fixed.heading_alignment_deg,
        heading_bias_deg: fixed.heading_bias_deg,
        ping_interval_s: fixed.time_between_pings_s,
    }
}
