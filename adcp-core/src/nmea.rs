//! `Ensemble::from_nmea`: the single-factory replacement for the source's proliferation of
//! per-sentence NMEA constructors (SPEC_FULL.md §9). NMEA text itself is parsed externally
//! (out of scope, SPEC_FULL.md §1) — this module only assembles a canonical, partial
//! `Ensemble` from already-extracted scalar fields.
use crate::datasets::BottomTrack;
use crate::model::Ensemble;
use crate::status::Status;
use crate::BAD_VELOCITY;

/// Sentinel for a bad DVL (Doppler velocity log) component in an RTI `$PRTI0n`/`$PRTI3n`
/// sentence, distinct from the PD0 wire sentinel but remapped to [`BAD_VELOCITY`] on
/// construction.
pub const BAD_DVL: f32 = -32768.0;

/// Which RTI NMEA sentence supplied `NmeaFields`. Only the fields that sentence actually
/// carries are meaningful; the others are ignored by [`Ensemble::from_nmea`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NmeaKind {
    Prti01,
    Prti02,
    Prti03,
    Prti30,
    Prti31,
}

/// Scalar fields extracted from an RTI NMEA sentence by an external parser.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NmeaFields {
    pub x_velocity: f32,
    pub y_velocity: f32,
    pub z_velocity: f32,
    pub q_velocity: f32,
    pub depth_m: f32,
    pub system_status: u32,
    pub water_temp_centidegrees: i32,
    pub first_ping_time_centiseconds: u32,
}

fn remap_dvl(v: f32) -> f32 {
    if v == BAD_DVL {
        BAD_VELOCITY
    } else {
        v
    }
}

impl Ensemble {
    /// Builds a partial, bottom-track-only `Ensemble` from the scalar fields of a single NMEA
    /// sentence. `kind` is currently only used to select which fields are trusted; all five
    /// sentence kinds populate the same subset of `BottomTrack` (SPEC_FULL.md §4.5).
    pub fn from_nmea(_kind: NmeaKind, fields: NmeaFields) -> Ensemble {
        let mut bt = BottomTrack {
            instrument_velocity: [
                remap_dvl(fields.x_velocity),
                remap_dvl(fields.y_velocity),
                remap_dvl(fields.z_velocity),
                remap_dvl(fields.q_velocity),
            ],
            range_m: [fields.depth_m; 4],
            status: Status::from_bits_truncate(fields.system_status),
            water_temp_c: fields.water_temp_centidegrees as f32 / 100.0,
            first_ping_time_s: fields.first_ping_time_centiseconds as f32 / 100.0,
            ..Default::default()
        };
        bt.earth_velocity = [BAD_VELOCITY; 4];
        bt.beam_velocity = [BAD_VELOCITY; 4];
        bt.ship_velocity = [BAD_VELOCITY; 4];

        Ensemble {
            bottom_track: Some(bt),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_nmea_populates_bottom_track_only() {
        let fields = NmeaFields {
            x_velocity: 0.1,
            y_velocity: 0.2,
            z_velocity: BAD_DVL,
            q_velocity: 0.0,
            depth_m: 12.5,
            system_status: 0x0004,
            water_temp_centidegrees: 1850,
            first_ping_time_centiseconds: 250,
        };
        let e = Ensemble::from_nmea(NmeaKind::Prti01, fields);
        let bt = e.bottom_track.expect("bottom track populated");
        assert_eq!(bt.instrument_velocity[0], 0.1);
        assert_eq!(bt.instrument_velocity[2], BAD_VELOCITY);
        assert_eq!(bt.range_m, [12.5; 4]);
        assert!(bt.status.contains(Status::BT_HOLD));
        assert_eq!(bt.water_temp_c, 18.5);
        assert_eq!(bt.first_ping_time_s, 2.5);
        assert!(e.meta.is_none());
        assert!(e.ancillary.is_none());
    }
}
