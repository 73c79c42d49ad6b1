//! RTI ensemble decode (C3 decode side, SPEC_FULL.md §4.3).
use adcp_core::bitconverter::{checksum32, i32_le, u32_le};
use adcp_core::{CodecSettings, CoreError, DatasetKind, Ensemble, ValueKind, RTI_CHECKSUM_LEN, RTI_HEADER_LEN};

use crate::payload::{DecodedParts, RawPayload};

const NAME_LEN: usize = 8;
/// value-kind(4) + element-count(4) + element-multiplier(4) + imag(4) + name-length(4) + name(8)
const DATASET_DESCRIPTOR_LEN: usize = 4 * 5 + NAME_LEN;

fn truncated(needed: usize, available: usize, offset: usize) -> CoreError {
    CoreError::Truncated {
        needed,
        available,
        offset,
    }
}

/// Decodes one RTI ensemble frame starting at byte 0 of `bytes` (i.e. `bytes` must already be
/// sliced to start at a sync candidate from [`crate::scan::scan`]).
pub fn decode(bytes: &[u8], settings: &CodecSettings) -> Result<Ensemble, CoreError> {
    if bytes.len() < RTI_HEADER_LEN {
        return Err(truncated(RTI_HEADER_LEN, bytes.len(), 0));
    }
    if !bytes[0..16].iter().all(|&b| b == 0x80) {
        return Err(CoreError::InconsistentOffsetTable { offset: 0 });
    }

    let ensemble_number = u32_le(&bytes[16..20]);
    let payload_size = u32_le(&bytes[20..24]);
    let ensemble_number_inv = u32_le(&bytes[24..28]);
    let payload_size_inv = u32_le(&bytes[28..32]);
    if ensemble_number_inv != !ensemble_number || payload_size_inv != !payload_size {
        return Err(CoreError::InconsistentOffsetTable { offset: 16 });
    }

    let payload_size = payload_size as usize;
    if payload_size > settings.max_frame_len() {
        return Err(truncated(payload_size, settings.max_frame_len(), RTI_HEADER_LEN));
    }
    let total_needed = RTI_HEADER_LEN + payload_size + RTI_CHECKSUM_LEN;
    if bytes.len() < total_needed {
        return Err(truncated(total_needed, bytes.len(), 0));
    }

    let payload = &bytes[RTI_HEADER_LEN..RTI_HEADER_LEN + payload_size];
    let checksum_offset = RTI_HEADER_LEN + payload_size;
    let stored_checksum = u32_le(&bytes[checksum_offset..checksum_offset + RTI_CHECKSUM_LEN]);
    let computed_checksum = checksum32(payload);
    if stored_checksum != computed_checksum {
        return Err(CoreError::BadChecksum {
            expected: stored_checksum,
            computed: computed_checksum,
        });
    }

    let mut parts = parse_datasets(payload, settings)?;
    // The frame header's ensemble number is authoritative over EnsembleMeta's own copy.
    if let Some(meta) = &mut parts.meta {
        meta.ensemble_number = ensemble_number;
    }

    parts.into_ensemble()
}

fn parse_datasets(payload: &[u8], settings: &CodecSettings) -> Result<DecodedParts, CoreError> {
    let mut parts = DecodedParts::default();
    let mut offset = 0usize;
    while offset < payload.len() {
        if offset + DATASET_DESCRIPTOR_LEN > payload.len() {
            return Err(truncated(
                DATASET_DESCRIPTOR_LEN,
                payload.len() - offset,
                RTI_HEADER_LEN + offset,
            ));
        }
        let value_kind_code = i32_le(&payload[offset..offset + 4]);
        let element_count = i32_le(&payload[offset + 4..offset + 8]);
        let element_multiplier = i32_le(&payload[offset + 8..offset + 12]);
        // byte 12..16 is `imag`, reserved and ignored.
        let name_length = i32_le(&payload[offset + 16..offset + 20]) as usize;
        if offset + 20 + name_length > payload.len() {
            return Err(truncated(name_length, payload.len() - offset - 20, RTI_HEADER_LEN + offset));
        }
        let name_bytes = &payload[offset + 20..offset + 20 + name_length];
        let name = String::from_utf8_lossy(name_bytes).to_string();
        offset += 20 + name_length;

        let kind = DatasetKind::from_name_tag(&name);
        let value_kind = ValueKind::new(value_kind_code)?;

        let is_nmea = kind == Some(DatasetKind::Nmea);
        let byte_len = if is_nmea {
            element_count.max(0) as usize
        } else {
            element_count.max(0) as usize * element_multiplier.max(0) as usize * value_kind.size_bytes()
        };
        if offset + byte_len > payload.len() {
            return Err(truncated(byte_len, payload.len() - offset, RTI_HEADER_LEN + offset));
        }
        let body = &payload[offset..offset + byte_len];

        let kind = match kind {
            Some(k) => k,
            None => {
                if settings.skip_unknown() {
                    offset += byte_len;
                    continue;
                }
                return Err(CoreError::UnknownDataset {
                    tag: name,
                    offset: RTI_HEADER_LEN + offset,
                });
            }
        };

        let raw = if is_nmea {
            RawPayload::Bytes(body.to_vec())
        } else {
            match value_kind {
                ValueKind::F32 => RawPayload::F32(
                    body.chunks_exact(4)
                        .map(adcp_core::bitconverter::f32_le)
                        .collect(),
                ),
                ValueKind::I32 => RawPayload::I32(
                    body.chunks_exact(4)
                        .map(adcp_core::bitconverter::i32_le)
                        .collect(),
                ),
            }
        };

        match kind {
            DatasetKind::EnsembleMeta => {
                parts.meta = Some(crate::payload::meta_from_raw(raw)?)
            }
            DatasetKind::Ancillary => parts.ancillary = Some(raw),
            DatasetKind::Amplitude => parts.amplitude = Some(raw),
            DatasetKind::Correlation => parts.correlation = Some(raw),
            DatasetKind::BeamVelocity => parts.beam_velocity = Some(raw),
            DatasetKind::InstrumentVelocity => parts.instrument_velocity = Some(raw),
            DatasetKind::EarthVelocity => parts.earth_velocity = Some(raw),
            DatasetKind::ShipVelocity => parts.ship_velocity = Some(raw),
            DatasetKind::GoodBeam => parts.good_beam = Some(raw),
            DatasetKind::GoodInstrument => parts.good_instrument = Some(raw),
            DatasetKind::GoodEarth => parts.good_earth = Some(raw),
            DatasetKind::BottomTrack => parts.bottom_track = Some(raw),
            DatasetKind::SystemSetup => parts.system_setup = Some(raw),
            DatasetKind::Nmea => parts.nmea = Some(raw),
            DatasetKind::EarthWaterMass => parts.earth_water_mass = Some(raw),
            DatasetKind::InstrumentWaterMass => parts.instrument_water_mass = Some(raw),
        }

        offset += byte_len;
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;
    use adcp_core::{Ensemble, Grid};

    fn sample_ensemble() -> Ensemble {
        let mut e = Ensemble::empty(2, 4);
        e.meta.as_mut().unwrap().ensemble_number = 42;
        e.amplitude = Some(Grid::new_filled(2, 4, 75.0));
        e.correlation = Some(Grid::new_flat_from(2, 4, |_, _| 0.5));
        e
    }

    // Small helper not on `Grid` itself (kept test-local, not part of the public API).
    trait GridTestExt {
        fn new_flat_from(n: usize, b: usize, f: impl Fn(usize, usize) -> f32) -> Grid<f32>;
    }
    impl GridTestExt for Grid<f32> {
        fn new_flat_from(n: usize, b: usize, f: impl Fn(usize, usize) -> f32) -> Grid<f32> {
            let mut g = Grid::new_filled(n, b, 0.0);
            for c in 0..n {
                for beam in 0..b {
                    g.set(c, beam, f(c, beam));
                }
            }
            g
        }
    }

    #[test]
    fn decode_rejects_truncated_header() {
        let settings = CodecSettings::default();
        assert!(matches!(
            decode(&[0x80; 10], &settings),
            Err(CoreError::Truncated { .. })
        ));
    }

    #[test]
    fn decode_rejects_bad_sync() {
        let mut bytes = vec![0x80; 32];
        bytes[5] = 0x00;
        let settings = CodecSettings::default();
        assert!(matches!(
            decode(&bytes, &settings),
            Err(CoreError::InconsistentOffsetTable { offset: 0 })
        ));
    }

    #[test]
    fn decode_detects_bit_flip_as_bad_checksum() {
        let settings = CodecSettings::default();
        let e = sample_ensemble();
        let mut bytes = encode(&e);
        let payload_byte = adcp_core::RTI_HEADER_LEN;
        bytes[payload_byte] ^= 0x01;
        assert!(matches!(
            decode(&bytes, &settings),
            Err(CoreError::BadChecksum { .. })
        ));
    }

    #[test]
    fn decode_of_encode_round_trips() {
        let settings = CodecSettings::default();
        let e = sample_ensemble();
        let bytes = encode(&e);
        let decoded = decode(&bytes, &settings).expect("decode");
        assert_eq!(decoded, e);
    }

    #[test]
    fn decode_reports_truncated_when_payload_size_exceeds_file() {
        let e = sample_ensemble();
        let mut bytes = encode(&e);
        bytes.truncate(adcp_core::RTI_HEADER_LEN + 2);
        let settings = CodecSettings::default();
        assert!(matches!(
            decode(&bytes, &settings),
            Err(CoreError::Truncated { .. })
        ));
    }
}
