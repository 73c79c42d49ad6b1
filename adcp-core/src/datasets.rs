//! Per-kind dataset structs that make up a canonical [`crate::model::Ensemble`] (data model
//! §3 of SPEC_FULL.md). Field order within each struct is the order in which the RTI codec
//! serializes the equivalent dataset (SPEC_FULL.md §3, "Dataset field ordering").
use crate::status::Status;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnsembleMeta {
    pub ensemble_number: u32,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub hundredths: u8,
    pub num_beams: u8,
    pub num_cells: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ancillary {
    pub first_bin_range_m: f32,
    pub last_bin_range_m: f32,
    pub bin_size_m: f32,
    pub first_ping_time_s: f32,
    pub last_ping_time_s: f32,
    pub heading_deg: f32,
    pub pitch_deg: f32,
    pub roll_deg: f32,
    pub water_temp_c: f32,
    pub system_temp_c: f32,
    pub salinity_ppt: f32,
    pub pressure_pa: f32,
    pub transducer_depth_m: f32,
    pub speed_of_sound_mps: f32,
    pub raw_mag_field: [f32; 3],
    pub raw_accel: [f32; 3],
    pub raw_tilt: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemSetup {
    pub bin_size_m: f32,
    pub blank_m: f32,
    pub wp_ping_count: u32,
    pub bt_ping_count: u32,
    pub lag_samples: u32,
    pub code_repeats: u32,
    pub transmit_cycles: u32,
    /// PD0 Fixed Leader `Heading Alignment`, degrees. Kept distinct from `Ancillary.heading_deg`
    /// so a PD0 round-trip can restore the original Fixed Leader byte rather than folding it
    /// irreversibly into the Variable Leader's heading field (see DESIGN.md).
    pub heading_alignment_deg: f32,
    /// PD0 Fixed Leader `Heading Bias`, degrees. Same rationale as `heading_alignment_deg`.
    pub heading_bias_deg: f32,
    /// PD0 Fixed Leader `Time Between Pings`, seconds. A bounded intra-ensemble ping interval,
    /// distinct from `Ancillary.last_ping_time_s`'s "since boot" timestamp (see DESIGN.md).
    pub ping_interval_s: f32,
}

/// Per-beam bottom-track scalars. All per-beam arrays are fixed at length 4; for B=1
/// instruments only index 0 (the vertical beam) is meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BottomTrack {
    pub range_m: [f32; 4],
    pub snr: [f32; 4],
    pub amplitude: [f32; 4],
    pub correlation: [f32; 4],
    pub beam_velocity: [f32; 4],
    pub instrument_velocity: [f32; 4],
    pub earth_velocity: [f32; 4],
    pub ship_velocity: [f32; 4],
    pub good_beam: [u32; 4],
    pub good_instrument: [u32; 4],
    pub good_earth: [u32; 4],
    pub heading_deg: f32,
    pub pitch_deg: f32,
    pub roll_deg: f32,
    pub water_temp_c: f32,
    pub system_temp_c: f32,
    pub salinity_ppt: f32,
    pub pressure_pa: f32,
    pub transducer_depth_m: f32,
    pub speed_of_sound_mps: f32,
    pub status: Status,
    pub first_ping_time_s: f32,
    pub last_ping_time_s: f32,
    pub actual_ping_count: u32,
}

impl Default for BottomTrack {
    fn default() -> Self {
        BottomTrack {
            range_m: [crate::BAD_RANGE; 4],
            snr: [0.0; 4],
            amplitude: [0.0; 4],
            correlation: [0.0; 4],
            beam_velocity: [crate::BAD_VELOCITY; 4],
            instrument_velocity: [crate::BAD_VELOCITY; 4],
            earth_velocity: [crate::BAD_VELOCITY; 4],
            ship_velocity: [crate::BAD_VELOCITY; 4],
            good_beam: [0; 4],
            good_instrument: [0; 4],
            good_earth: [0; 4],
            heading_deg: 0.0,
            pitch_deg: 0.0,
            roll_deg: 0.0,
            water_temp_c: 0.0,
            system_temp_c: 0.0,
            salinity_ppt: 0.0,
            pressure_pa: 0.0,
            transducer_depth_m: 0.0,
            speed_of_sound_mps: 0.0,
            status: Status::empty(),
            first_ping_time_s: 0.0,
            last_ping_time_s: 0.0,
            actual_ping_count: 0,
        }
    }
}

/// Opaque NMEA payload. The codec never parses the text itself (out of scope, SPEC_FULL.md §1);
/// it only preserves the raw bytes across a round-trip.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NmeaBlock {
    pub raw: Vec<u8>,
}

/// Earth or Instrument water-mass ping: a B-element velocity vector plus the depth layer it was
/// measured over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterMass {
    pub velocity: [f32; 4],
    pub depth_layer_start_m: f32,
    pub depth_layer_end_m: f32,
}

impl Default for WaterMass {
    fn default() -> Self {
        WaterMass {
            velocity: [crate::BAD_VELOCITY; 4],
            depth_layer_start_m: 0.0,
            depth_layer_end_m: 0.0,
        }
    }
}
