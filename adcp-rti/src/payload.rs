//! Per-dataset-kind (de)serialization into/out of the flat element arrays the RTI wire format
//! stores. Kept paired so that a decode/encode mismatch in field order is caught the moment
//! either side changes (SPEC_FULL.md §9, "encoder/decoder symmetry").
use adcp_core::{
    Ancillary, BottomTrack, CoreError, DatasetKind, Ensemble, EnsembleMeta, Grid, NmeaBlock,
    Status, SystemSetup, WaterMass,
};

/// The raw, not-yet-reshaped elements of one decoded dataset.
pub enum RawPayload {
    F32(Vec<f32>),
    I32(Vec<i32>),
    Bytes(Vec<u8>),
}

fn expect_f32(kind: DatasetKind, raw: RawPayload, expected_len: usize) -> Result<Vec<f32>, CoreError> {
    match raw {
        RawPayload::F32(v) if v.len() == expected_len => Ok(v),
        RawPayload::F32(v) => Err(CoreError::DimensionMismatch {
            expected: expected_len,
            actual: v.len(),
        }),
        _ => Err(CoreError::BadValueKind {
            code: kind.rti_value_kind() as i32,
        }),
    }
}

fn expect_i32(kind: DatasetKind, raw: RawPayload, expected_len: usize) -> Result<Vec<i32>, CoreError> {
    match raw {
        RawPayload::I32(v) if v.len() == expected_len => Ok(v),
        RawPayload::I32(v) => Err(CoreError::DimensionMismatch {
            expected: expected_len,
            actual: v.len(),
        }),
        _ => Err(CoreError::BadValueKind {
            code: kind.rti_value_kind() as i32,
        }),
    }
}

pub fn meta_from_raw(raw: RawPayload) -> Result<EnsembleMeta, CoreError> {
    let v = expect_i32(DatasetKind::EnsembleMeta, raw, 10)?;
    Ok(EnsembleMeta {
        ensemble_number: v[0] as u32,
        year: v[1] as u16,
        month: v[2] as u8,
        day: v[3] as u8,
        hour: v[4] as u8,
        minute: v[5] as u8,
        second: v[6] as u8,
        hundredths: v[7] as u8,
        num_beams: v[8] as u8,
        num_cells: v[9] as u16,
    })
}

pub fn meta_to_raw(m: &EnsembleMeta) -> Vec<i32> {
    vec![
        m.ensemble_number as i32,
        m.year as i32,
        m.month as i32,
        m.day as i32,
        m.hour as i32,
        m.minute as i32,
        m.second as i32,
        m.hundredths as i32,
        m.num_beams as i32,
        m.num_cells as i32,
    ]
}

pub fn ancillary_from_raw(raw: RawPayload) -> Result<Ancillary, CoreError> {
    let v = expect_f32(DatasetKind::Ancillary, raw, 23)?;
    Ok(Ancillary {
        first_bin_range_m: v[0],
        last_bin_range_m: v[1],
        bin_size_m: v[2],
        first_ping_time_s: v[3],
        last_ping_time_s: v[4],
        heading_deg: v[5],
        pitch_deg: v[6],
        roll_deg: v[7],
        water_temp_c: v[8],
        system_temp_c: v[9],
        salinity_ppt: v[10],
        pressure_pa: v[11],
        transducer_depth_m: v[12],
        speed_of_sound_mps: v[13],
        raw_mag_field: [v[14], v[15], v[16]],
        raw_accel: [v[17], v[18], v[19]],
        raw_tilt: [v[20], v[21], v[22]],
    })
}

pub fn ancillary_to_raw(a: &Ancillary) -> Vec<f32> {
    vec![
        a.first_bin_range_m,
        a.last_bin_range_m,
        a.bin_size_m,
        a.first_ping_time_s,
        a.last_ping_time_s,
        a.heading_deg,
        a.pitch_deg,
        a.roll_deg,
        a.water_temp_c,
        a.system_temp_c,
        a.salinity_ppt,
        a.pressure_pa,
        a.transducer_depth_m,
        a.speed_of_sound_mps,
        a.raw_mag_field[0],
        a.raw_mag_field[1],
        a.raw_mag_field[2],
        a.raw_accel[0],
        a.raw_accel[1],
        a.raw_accel[2],
        a.raw_tilt[0],
        a.raw_tilt[1],
        a.raw_tilt[2],
    ]
}

pub fn system_setup_from_raw(raw: RawPayload) -> Result<SystemSetup, CoreError> {
    let v = expect_f32(DatasetKind::SystemSetup, raw, 10)?;
    Ok(SystemSetup {
        bin_size_m: v[0],
        blank_m: v[1],
        wp_ping_count: v[2] as u32,
        bt_ping_count: v[3] as u32,
        lag_samples: v[4] as u32,
        code_repeats: v[5] as u32,
        transmit_cycles: v[6] as u32,
        heading_alignment_deg: v[7],
        heading_bias_deg: v[8],
        ping_interval_s: v[9],
    })
}

pub fn system_setup_to_raw(s: &SystemSetup) -> Vec<f32> {
    vec![
        s.bin_size_m,
        s.blank_m,
        s.wp_ping_count as f32,
        s.bt_ping_count as f32,
        s.lag_samples as f32,
        s.code_repeats as f32,
        s.transmit_cycles as f32,
        s.heading_alignment_deg,
        s.heading_bias_deg,
        s.ping_interval_s,
    ]
}

pub fn bottom_track_from_raw(raw: RawPayload) -> Result<BottomTrack, CoreError> {
    let v = expect_f32(DatasetKind::BottomTrack, raw, 57)?;
    let arr4 = |base: usize| [v[base], v[base + 1], v[base + 2], v[base + 3]];
    Ok(BottomTrack {
        range_m: arr4(0),
        snr: arr4(4),
        amplitude: arr4(8),
        correlation: arr4(12),
        beam_velocity: arr4(16),
        instrument_velocity: arr4(20),
        earth_velocity: arr4(24),
        ship_velocity: arr4(28),
        good_beam: arr4(32).map(|x| x as u32),
        good_instrument: arr4(36).map(|x| x as u32),
        good_earth: arr4(40).map(|x| x as u32),
        heading_deg: v[44],
        pitch_deg: v[45],
        roll_deg: v[46],
        water_temp_c: v[47],
        system_temp_c: v[48],
        salinity_ppt: v[49],
        pressure_pa: v[50],
        transducer_depth_m: v[51],
        speed_of_sound_mps: v[52],
        status: Status::from_bits_truncate(v[53] as u32),
        first_ping_time_s: v[54],
        last_ping_time_s: v[55],
        actual_ping_count: v[56] as u32,
    })
}

pub fn bottom_track_to_raw(b: &BottomTrack) -> Vec<f32> {
    let mut out = Vec::with_capacity(57);
    out.extend(b.range_m);
    out.extend(b.snr);
    out.extend(b.amplitude);
    out.extend(b.correlation);
    out.extend(b.beam_velocity);
    out.extend(b.instrument_velocity);
    out.extend(b.earth_velocity);
    out.extend(b.ship_velocity);
    out.extend(b.good_beam.map(|x| x as f32));
    out.extend(b.good_instrument.map(|x| x as f32));
    out.extend(b.good_earth.map(|x| x as f32));
    out.push(b.heading_deg);
    out.push(b.pitch_deg);
    out.push(b.roll_deg);
    out.push(b.water_temp_c);
    out.push(b.system_temp_c);
    out.push(b.salinity_ppt);
    out.push(b.pressure_pa);
    out.push(b.transducer_depth_m);
    out.push(b.speed_of_sound_mps);
    out.push(b.status.bits() as f32);
    out.push(b.first_ping_time_s);
    out.push(b.last_ping_time_s);
    out.push(b.actual_ping_count as f32);
    out
}

pub fn water_mass_from_raw(raw: RawPayload) -> Result<WaterMass, CoreError> {
    let v = expect_f32(DatasetKind::EarthWaterMass, raw, 6)?;
    Ok(WaterMass {
        velocity: [v[0], v[1], v[2], v[3]],
        depth_layer_start_m: v[4],
        depth_layer_end_m: v[5],
    })
}

pub fn water_mass_to_raw(w: &WaterMass) -> Vec<f32> {
    vec![
        w.velocity[0],
        w.velocity[1],
        w.velocity[2],
        w.velocity[3],
        w.depth_layer_start_m,
        w.depth_layer_end_m,
    ]
}

pub fn grid_from_raw(
    kind: DatasetKind,
    raw: RawPayload,
    n_cells: usize,
    n_beams: usize,
) -> Result<Grid<f32>, CoreError> {
    let v = expect_f32(kind, raw, n_cells * n_beams)?;
    Grid::from_flat(n_cells, n_beams, v)
}

pub fn good_counts_from_raw(
    kind: DatasetKind,
    raw: RawPayload,
    n_cells: usize,
    n_beams: usize,
) -> Result<Grid<u32>, CoreError> {
    let v = expect_i32(kind, raw, n_cells * n_beams)?;
    Grid::from_flat(n_cells, n_beams, v.into_iter().map(|x| x as u32).collect())
}

pub fn nmea_from_raw(raw: RawPayload) -> NmeaBlock {
    match raw {
        RawPayload::Bytes(b) => NmeaBlock { raw: b },
        _ => NmeaBlock::default(),
    }
}

/// Convenience used by the decoder to materialize every populated dataset's raw form back onto
/// an otherwise-empty `Ensemble`, after all grids' dimensions are known.
pub struct DecodedParts {
    pub meta: Option<EnsembleMeta>,
    pub ancillary: Option<Ancillary>,
    pub amplitude: Option<RawPayload>,
    pub correlation: Option<RawPayload>,
    pub beam_velocity: Option<RawPayload>,
    pub instrument_velocity: Option<RawPayload>,
    pub earth_velocity: Option<RawPayload>,
    pub ship_velocity: Option<RawPayload>,
    pub good_beam: Option<RawPayload>,
    pub good_instrument: Option<RawPayload>,
    pub good_earth: Option<RawPayload>,
    pub bottom_track: Option<RawPayload>,
    pub system_setup: Option<RawPayload>,
    pub nmea: Option<RawPayload>,
    pub earth_water_mass: Option<RawPayload>,
    pub instrument_water_mass: Option<RawPayload>,
}

impl DecodedParts {
    pub fn into_ensemble(self) -> Result<Ensemble, CoreError> {
        let meta = match self.meta {
            Some(m) => m,
            None => {
                return Ok(Ensemble {
                    nmea: self.nmea.map(nmea_from_raw),
                    ..Default::default()
                })
            }
        };
        let n = meta.num_cells as usize;
        let b = meta.num_beams as usize;

        let mut ensemble = Ensemble {
            meta: Some(meta),
            ..Default::default()
        };
        if let Some(raw) = self.ancillary {
            ensemble.ancillary = Some(ancillary_from_raw(raw)?);
        }
        if let Some(raw) = self.amplitude {
            ensemble.amplitude = Some(grid_from_raw(DatasetKind::Amplitude, raw, n, b)?);
        }
        if let Some(raw) = self.correlation {
            ensemble.correlation = Some(grid_from_raw(DatasetKind::Correlation, raw, n, b)?);
        }
        if let Some(raw) = self.beam_velocity {
            ensemble.beam_velocity = Some(grid_from_raw(DatasetKind::BeamVelocity, raw, n, b)?);
        }
        if let Some(raw) = self.instrument_velocity {
            ensemble.instrument_velocity =
                Some(grid_from_raw(DatasetKind::InstrumentVelocity, raw, n, b)?);
        }
        if let Some(raw) = self.earth_velocity {
            ensemble.earth_velocity = Some(grid_from_raw(DatasetKind::EarthVelocity, raw, n, b)?);
        }
        if let Some(raw) = self.ship_velocity {
            ensemble.ship_velocity = Some(grid_from_raw(DatasetKind::ShipVelocity, raw, n, b)?);
        }
        if let Some(raw) = self.good_beam {
            ensemble.good_beam = Some(good_counts_from_raw(DatasetKind::GoodBeam, raw, n, b)?);
        }
        if let Some(raw) = self.good_instrument {
            ensemble.good_instrument =
                Some(good_counts_from_raw(DatasetKind::GoodInstrument, raw, n, b)?);
        }
        if let Some(raw) = self.good_earth {
            ensemble.good_earth = Some(good_counts_from_raw(DatasetKind::GoodEarth, raw, n, b)?);
        }
        if let Some(raw) = self.bottom_track {
            ensemble.bottom_track = Some(bottom_track_from_raw(raw)?);
        }
        if let Some(raw) = self.system_setup {
            ensemble.system_setup = Some(system_setup_from_raw(raw)?);
        }
        if let Some(raw) = self.nmea {
            ensemble.nmea = Some(nmea_from_raw(raw));
        }
        if let Some(raw) = self.earth_water_mass {
            ensemble.earth_water_mass = Some(water_mass_from_raw(raw)?);
        }
        if let Some(raw) = self.instrument_water_mass {
            ensemble.instrument_water_mass = Some(water_mass_from_raw(raw)?);
        }
        Ok(ensemble)
    }
}

impl Default for DecodedParts {
    fn default() -> Self {
        DecodedParts {
            meta: None,
            ancillary: None,
            amplitude: None,
            correlation: None,
            beam_velocity: None,
            instrument_velocity: None,
            earth_velocity: None,
            ship_velocity: None,
            good_beam: None,
            good_instrument: None,
            good_earth: None,
            bottom_track: None,
            system_setup: None,
            nmea: None,
            earth_water_mass: None,
            instrument_water_mass: None,
        }
    }
}
