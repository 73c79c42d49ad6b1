//! Bottom Track data type (81 bytes, SPEC_FULL.md §4.4.2 lists only the total length). The
//! byte-level field layout below is this workspace's own concrete assignment of that length,
//! modeled on the vendor Bottom Track record's usual shape (ping counts, per-beam range/velocity/
//! correlation/amplitude/percent-good, a reference-layer block, max depth, RSSI); see DESIGN.md
//! for which sub-fields are retained in the canonical model versus parsed-and-discarded as
//! reserved padding kept only for length accuracy.
use adcp_core::bitconverter::{u16_le, u16_to_le};
use adcp_core::{Ancillary, BottomTrack, CoordXform, CoreError, Status};

use crate::beam::{permute_decode, permute_encode, RANGE_DECODE_PERM, RANGE_ENCODE_PERM};
use crate::cell::{
    correlation_from_byte, correlation_to_byte, echo_intensity_from_byte, echo_intensity_to_byte,
    percent_good_from_byte, percent_good_to_byte, velocity_from_mmps, velocity_to_mmps,
};

pub const BOTTOM_TRACK_ID: [u8; 2] = [0x00, 0x06];

const PINGS_OFFSET: usize = 2;
const RANGE_OFFSET: usize = 20;
const VELOCITY_OFFSET: usize = 28;
const CORRELATION_OFFSET: usize = 36;
const AMPLITUDE_OFFSET: usize = 40;
const PERCENT_GOOD_OFFSET: usize = 44;
const RSSI_OFFSET: usize = 64;

fn truncated(needed: usize, available: usize, offset: usize) -> CoreError {
    CoreError::Truncated {
        needed,
        available,
        offset,
    }
}

/// Parses the Bottom Track data type into the canonical `BottomTrack` dataset, folding in the
/// environmental scalars already derived from the Variable Leader (PD0's bottom-track record in
/// this workspace does not duplicate its own copies of heading/pitch/roll/temperature/etc., so
/// the same-ensemble snapshot is reused, per DESIGN.md).
pub fn parse_bottom_track(
    bytes: &[u8],
    base_offset: usize,
    xform: CoordXform,
    ancillary: &Ancillary,
) -> Result<BottomTrack, CoreError> {
    if bytes.len() < adcp_core::PD0_BOTTOM_TRACK_LEN {
        return Err(truncated(adcp_core::PD0_BOTTOM_TRACK_LEN, bytes.len(), base_offset));
    }
    let pings_per_ensemble = u16_le(&bytes[PINGS_OFFSET..PINGS_OFFSET + 2]) as u32;

    let range_cm: [u16; 4] = std::array::from_fn(|i| u16_le(&bytes[RANGE_OFFSET + i * 2..RANGE_OFFSET + i * 2 + 2]));
    let range_m = permute_decode(range_cm, RANGE_DECODE_PERM).map(|cm| cm as f32 / 100.0);

    let velocity_mmps: [i16; 4] = std::array::from_fn(|i| {
        adcp_core::bitconverter::i16_le(&bytes[VELOCITY_OFFSET + i * 2..VELOCITY_OFFSET + i * 2 + 2])
    });

    let correlation: [u8; 4] = std::array::from_fn(|i| bytes[CORRELATION_OFFSET + i]);
    let correlation = permute_decode(correlation, crate::beam::DECODE_PERM).map(correlation_from_byte);

    let amplitude: [u8; 4] = std::array::from_fn(|i| bytes[AMPLITUDE_OFFSET + i]);
    let amplitude = permute_decode(amplitude, crate::beam::DECODE_PERM).map(echo_intensity_from_byte);

    let percent_good: [u8; 4] = std::array::from_fn(|i| bytes[PERCENT_GOOD_OFFSET + i]);
    let percent_good_permuted = permute_decode(percent_good, crate::beam::DECODE_PERM);
    let good_counts = percent_good_permuted.map(|p| percent_good_from_byte(p, pings_per_ensemble));

    let rssi: [u8; 4] = std::array::from_fn(|i| bytes[RSSI_OFFSET + i]);
    let snr = permute_decode(rssi, crate::beam::DECODE_PERM).map(echo_intensity_from_byte);

    let mut bt = BottomTrack {
        range_m,
        snr,
        amplitude,
        correlation,
        status: Status::empty(),
        actual_ping_count: pings_per_ensemble,
        heading_deg: ancillary.heading_deg,
        pitch_deg: ancillary.pitch_deg,
        roll_deg: ancillary.roll_deg,
        water_temp_c: ancillary.water_temp_c,
        system_temp_c: ancillary.system_temp_c,
        salinity_ppt: ancillary.salinity_ppt,
        pressure_pa: ancillary.pressure_pa,
        transducer_depth_m: ancillary.transducer_depth_m,
        speed_of_sound_mps: ancillary.speed_of_sound_mps,
        first_ping_time_s: ancillary.first_ping_time_s,
        last_ping_time_s: ancillary.last_ping_time_s,
        ..Default::default()
    };

    assign_velocity_and_good_counts(&mut bt, xform, velocity_mmps, good_counts);
    Ok(bt)
}

pub fn build_bottom_track(bt: &BottomTrack, xform: CoordXform, pings_per_ensemble: u32) -> Vec<u8> {
    let mut out = vec![0u8; adcp_core::PD0_BOTTOM_TRACK_LEN];
    out[0..2].copy_from_slice(&BOTTOM_TRACK_ID);
    out[PINGS_OFFSET..PINGS_OFFSET + 2].copy_from_slice(&u16_to_le(pings_per_ensemble as u16));

    let range_cm = permute_encode(bt.range_m, RANGE_ENCODE_PERM).map(|m| (m * 100.0).round() as u16);
    for (i, v) in range_cm.iter().enumerate() {
        out[RANGE_OFFSET + i * 2..RANGE_OFFSET + i * 2 + 2].copy_from_slice(&u16_to_le(*v));
    }

    let velocity_canonical = velocity_for_xform(bt, xform);
    let velocity_mmps = pd0_velocity_from_canonical(velocity_canonical, xform);
    for (i, v) in velocity_mmps.iter().enumerate() {
        out[VELOCITY_OFFSET + i * 2..VELOCITY_OFFSET + i * 2 + 2]
            .copy_from_slice(&adcp_core::bitconverter::i16_to_le(*v));
    }

    let correlation = permute_encode(bt.correlation, crate::beam::ENCODE_PERM).map(correlation_to_byte);
    out[CORRELATION_OFFSET..CORRELATION_OFFSET + 4].copy_from_slice(&correlation);

    let amplitude = permute_encode(bt.amplitude, crate::beam::ENCODE_PERM).map(echo_intensity_to_byte);
    out[AMPLITUDE_OFFSET..AMPLITUDE_OFFSET + 4].copy_from_slice(&amplitude);

    let good_counts = good_counts_for_xform(bt, xform);
    let percent_good = permute_encode(good_counts, crate::beam::ENCODE_PERM)
        .map(|c| percent_good_to_byte(c, pings_per_ensemble));
    out[PERCENT_GOOD_OFFSET..PERCENT_GOOD_OFFSET + 4].copy_from_slice(&percent_good);

    let rssi = permute_encode(bt.snr, crate::beam::ENCODE_PERM).map(echo_intensity_to_byte);
    out[RSSI_OFFSET..RSSI_OFFSET + 4].copy_from_slice(&rssi);

    out
}

fn velocity_for_xform(bt: &BottomTrack, xform: CoordXform) -> [f32; 4] {
    match xform {
        CoordXform::Beam => bt.beam_velocity,
        CoordXform::Instrument => bt.instrument_velocity,
        CoordXform::Earth => bt.earth_velocity,
        CoordXform::Ship => bt.ship_velocity,
    }
}

fn good_counts_for_xform(bt: &BottomTrack, xform: CoordXform) -> [u32; 4] {
    match xform {
        CoordXform::Beam => bt.good_beam,
        CoordXform::Instrument => bt.good_instrument,
        CoordXform::Earth | CoordXform::Ship => bt.good_earth,
    }
}

fn assign_velocity_and_good_counts(
    bt: &mut BottomTrack,
    xform: CoordXform,
    velocity_mmps: [i16; 4],
    good_counts: [u32; 4],
) {
    let canonical_velocity = canonical_velocity_from_pd0(velocity_mmps, xform);
    let good_counts = permute_decode(good_counts, crate::beam::DECODE_PERM);
    match xform {
        CoordXform::Beam => {
            bt.beam_velocity = canonical_velocity;
            bt.good_beam = good_counts;
        }
        CoordXform::Instrument => {
            bt.instrument_velocity = canonical_velocity;
            bt.good_instrument = good_counts;
        }
        CoordXform::Earth => {
            bt.earth_velocity = canonical_velocity;
            bt.good_earth = good_counts;
        }
        CoordXform::Ship => {
            bt.ship_velocity = canonical_velocity;
            bt.good_earth = good_counts;
        }
    }
}

/// Instrument frame keeps PD0's beam-slot ordering (X/Y/Z/Q are body axes, not physical beams)
/// and only negates the Z component; every other transform goes through the full beam
/// permutation (see DESIGN.md, Open Question 7).
pub fn canonical_velocity_from_pd0(mmps: [i16; 4], xform: CoordXform) -> [f32; 4] {
    let mps = mmps.map(velocity_from_mmps);
    match xform {
        CoordXform::Instrument => [mps[0], mps[1], -mps[2], mps[3]],
        _ => permute_decode(mps, crate::beam::DECODE_PERM),
    }
}

pub fn pd0_velocity_from_canonical(canonical: [f32; 4], xform: CoordXform) -> [i16; 4] {
    let mps = match xform {
        CoordXform::Instrument => [canonical[0], canonical[1], -canonical[2], canonical[3]],
        _ => permute_encode(canonical, crate::beam::ENCODE_PERM),
    };
    mps.map(velocity_to_mmps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_track_round_trips_earth_frame() {
        let mut bt = BottomTrack::default();
        bt.earth_velocity = [0.1, 0.2, -0.05, 0.0];
        bt.range_m = [10.0, 10.5, 11.0, 9.5];
        bt.correlation = [0.5; 4];
        bt.amplitude = [45.0; 4];
        bt.good_earth = [40; 4];

        let bytes = build_bottom_track(&bt, CoordXform::Earth, 45);
        assert_eq!(bytes.len(), adcp_core::PD0_BOTTOM_TRACK_LEN);
        let parsed =
            parse_bottom_track(&bytes, 0, CoordXform::Earth, &Ancillary::default()).expect("parse");
        for i in 0..4 {
            assert!((parsed.earth_velocity[i] - bt.earth_velocity[i]).abs() < 0.001);
            assert!((parsed.range_m[i] - bt.range_m[i]).abs() < 0.01);
        }
    }

    #[test]
    fn s2_sentinel_velocity_maps_to_pd0_beam_index_0() {
        let mut bt = BottomTrack::default();
        bt.earth_velocity[2] = adcp_core::BAD_VELOCITY;
        let bytes = build_bottom_track(&bt, CoordXform::Earth, 1);
        let v0 = adcp_core::bitconverter::i16_le(&bytes[VELOCITY_OFFSET..VELOCITY_OFFSET + 2]);
        assert_eq!(v0, -32768);
    }
}
