//! RTI ensemble encode (C3 encode side, SPEC_FULL.md §4.3).
use adcp_core::bitconverter::{checksum32, f32_to_le, i32_to_le, u32_to_le};
use adcp_core::{Dataset, DatasetKind, Ensemble, RTI_HEADER_LEN};

use crate::payload::{
    ancillary_to_raw, bottom_track_to_raw, meta_to_raw, system_setup_to_raw, water_mass_to_raw,
};

const NAME_LEN: usize = 8;

fn write_name_tag(out: &mut Vec<u8>, kind: DatasetKind) {
    out.extend(kind.name_tag().as_bytes());
    debug_assert_eq!(kind.name_tag().len(), NAME_LEN);
}

fn write_descriptor(out: &mut Vec<u8>, value_kind_code: i32, element_count: i32, element_multiplier: i32, kind: DatasetKind) {
    out.extend(i32_to_le(value_kind_code));
    out.extend(i32_to_le(element_count));
    out.extend(i32_to_le(element_multiplier));
    out.extend(i32_to_le(0)); // imag, reserved
    out.extend(i32_to_le(NAME_LEN as i32));
    write_name_tag(out, kind);
}

fn write_f32_dataset(out: &mut Vec<u8>, kind: DatasetKind, elements: &[f32], element_multiplier: i32) {
    let element_count = elements.len() as i32 / element_multiplier.max(1);
    write_descriptor(out, 10, element_count, element_multiplier, kind);
    for v in elements {
        out.extend(f32_to_le(*v));
    }
}

fn write_i32_dataset(out: &mut Vec<u8>, kind: DatasetKind, elements: &[i32], element_multiplier: i32) {
    let element_count = elements.len() as i32 / element_multiplier.max(1);
    write_descriptor(out, 20, element_count, element_multiplier, kind);
    for v in elements {
        out.extend(i32_to_le(*v));
    }
}

fn write_nmea_dataset(out: &mut Vec<u8>, raw: &[u8]) {
    write_descriptor(out, 20, raw.len() as i32, 1, DatasetKind::Nmea);
    out.extend_from_slice(raw);
}

/// Encodes a canonical ensemble to an RTI frame. Datasets are emitted in deterministic
/// lexicographic-by-name-tag order (SPEC_FULL.md §4.3.3).
pub fn encode(ensemble: &Ensemble) -> Vec<u8> {
    debug_assert!(
        ensemble.validate().is_ok(),
        "encode_rti called on an ensemble that violates the data-model invariants"
    );

    let mut datasets = ensemble.datasets();
    datasets.sort_by_key(|d| d.kind().name_tag());

    let mut payload = Vec::new();
    for dataset in &datasets {
        match dataset {
            Dataset::Meta(m) => write_i32_dataset(&mut payload, DatasetKind::EnsembleMeta, &meta_to_raw(m), 1),
            Dataset::Ancillary(a) => write_f32_dataset(&mut payload, DatasetKind::Ancillary, &ancillary_to_raw(a), 1),
            Dataset::Grid(kind, g) => {
                write_f32_dataset(&mut payload, *kind, g.as_flat(), g.n_beams() as i32)
            }
            Dataset::GoodCounts(kind, g) => {
                let flat: Vec<i32> = g.as_flat().iter().map(|&x| x as i32).collect();
                write_i32_dataset(&mut payload, *kind, &flat, g.n_beams() as i32)
            }
            Dataset::BottomTrack(b) => write_f32_dataset(&mut payload, DatasetKind::BottomTrack, &bottom_track_to_raw(b), 1),
            Dataset::SystemSetup(s) => write_f32_dataset(&mut payload, DatasetKind::SystemSetup, &system_setup_to_raw(s), 1),
            Dataset::Nmea(n) => write_nmea_dataset(&mut payload, &n.raw),
            Dataset::WaterMass(kind, w) => write_f32_dataset(&mut payload, *kind, &water_mass_to_raw(w), 1),
        }
    }

    let ensemble_number = ensemble.meta.map(|m| m.ensemble_number).unwrap_or(0);
    let payload_size = payload.len() as u32;

    let mut frame = Vec::with_capacity(RTI_HEADER_LEN + payload.len() + 4);
    frame.extend(std::iter::repeat(0x80u8).take(16));
    frame.extend(u32_to_le(ensemble_number));
    frame.extend(u32_to_le(payload_size));
    frame.extend(u32_to_le(!ensemble_number));
    frame.extend(u32_to_le(!payload_size));
    frame.extend(&payload);
    frame.extend(u32_to_le(checksum32(&payload)));
    frame
}
