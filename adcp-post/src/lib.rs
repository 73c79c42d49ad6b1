//! In-place post-processing transforms on canonical ensembles (C7, SPEC_FULL.md §4.7): heading
//! offset, ship-speed removal, and the magnitude/direction/average-range derived quantities.
//! None of these depend on wire format, only on the canonical model in `adcp-core`.
use adcp_core::{Ensemble, Grid, BAD_RANGE, BAD_VELOCITY};

/// Adds a magnetic offset and an alignment offset to the heading field of both the Ancillary
/// and Bottom-track datasets, if present. No wrap/modulo to `[0, 360)` is applied; downstream
/// consumers normalize (SPEC_FULL.md §4.7.1).
pub fn apply_heading_offset(ensemble: &mut Ensemble, magnetic_offset_deg: f32, alignment_offset_deg: f32) {
    let total = magnetic_offset_deg + alignment_offset_deg;
    if let Some(a) = ensemble.ancillary.as_mut() {
        a.heading_deg += total;
    }
    if let Some(b) = ensemble.bottom_track.as_mut() {
        b.heading_deg += total;
    }
}

/// A single GPS fix's worth of scalar fields, already parsed from NMEA text by an external
/// collaborator (SPEC_FULL.md §1, §6).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsFix {
    /// Speed-over-ground in m/s from a `$GPVTG` sentence.
    pub vtg_speed_mps: Option<f32>,
    /// Course-over-ground (bearing) in degrees from `$GPVTG`.
    pub vtg_bearing_deg: Option<f32>,
    /// True heading in degrees from `$GPHDT`, preferred over the VTG bearing when present.
    pub hdt_heading_deg: Option<f32>,
}

/// Policy knobs for [`remove_ship_speed`], in the get/set settings-struct idiom shared with
/// [`adcp_core::CodecSettings`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipSpeedSettings {
    use_bt: bool,
    use_gps: bool,
    gps_heading_offset_deg: f32,
    allow_3beam_solution: bool,
}

impl Default for ShipSpeedSettings {
    fn default() -> Self {
        ShipSpeedSettings {
            use_bt: true,
            use_gps: false,
            gps_heading_offset_deg: 0.0,
            allow_3beam_solution: true,
        }
    }
}

impl ShipSpeedSettings {
    pub fn use_bt(&self) -> bool {
        self.use_bt
    }

    pub fn set_use_bt(&mut self, value: bool) -> &mut Self {
        self.use_bt = value;
        self
    }

    pub fn use_gps(&self) -> bool {
        self.use_gps
    }

    pub fn set_use_gps(&mut self, value: bool) -> &mut Self {
        self.use_gps = value;
        self
    }

    pub fn gps_heading_offset_deg(&self) -> f32 {
        self.gps_heading_offset_deg
    }

    pub fn set_gps_heading_offset_deg(&mut self, value: f32) -> &mut Self {
        self.gps_heading_offset_deg = value;
        self
    }

    /// When false, a bottom-track earth-velocity triple whose Q (error velocity) component is
    /// `BAD_VELOCITY` is rejected even if E/N/V are all good (SPEC_FULL.md §4.7.2, "optionally
    /// requiring Q also good").
    pub fn allow_3beam_solution(&self) -> bool {
        self.allow_3beam_solution
    }

    pub fn set_allow_3beam_solution(&mut self, value: bool) -> &mut Self {
        self.allow_3beam_solution = value;
        self
    }
}

/// Which arithmetic operation [`apply_velocity_delta`] performs against each non-sentinel
/// earth-velocity cell. The bottom-track and previous-good sources are additive because
/// bottom-track earth velocity is stored with inverted sign relative to water velocity
/// (SPEC_FULL.md §4.7.2); the GPS source computes the platform's actual velocity and is
/// subtractive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalMode {
    Add,
    Subtract,
}

/// Applies `(e, n, v)` to every cell's East/North/Vertical earth-velocity component, per
/// `mode`, skipping any component that is currently `BAD_VELOCITY` (SPEC_FULL.md §4.7.2, "For
/// each bin, each component is only modified if the stored value is not `BAD_VELOCITY`"). A
/// no-op if the ensemble carries no earth-velocity dataset, or fewer than 3 beams.
pub fn apply_velocity_delta(ensemble: &mut Ensemble, delta: (f32, f32, f32), mode: RemovalMode) {
    let Some(grid) = ensemble.earth_velocity.as_mut() else {
        return;
    };
    apply_delta_to_grid(grid, delta, mode);
}

fn apply_delta_to_grid(grid: &mut Grid<f32>, delta: (f32, f32, f32), mode: RemovalMode) {
    if grid.n_beams() < 3 {
        return;
    }
    let sign = match mode {
        RemovalMode::Add => 1.0,
        RemovalMode::Subtract => -1.0,
    };
    let components = [delta.0, delta.1, delta.2];
    for cell in 0..grid.n_cells() {
        for (comp, &d) in components.iter().enumerate() {
            let cur = grid.get(cell, comp);
            if cur != BAD_VELOCITY {
                grid.set(cell, comp, cur + sign * d);
            }
        }
    }
}

fn bottom_track_earth_good(ensemble: &Ensemble, settings: &ShipSpeedSettings) -> Option<(f32, f32, f32)> {
    let bt = ensemble.bottom_track.as_ref()?;
    let [e, n, v, q] = bt.earth_velocity;
    let horizontal_good = e != BAD_VELOCITY && n != BAD_VELOCITY && v != BAD_VELOCITY;
    let q_good = settings.allow_3beam_solution() || q != BAD_VELOCITY;
    if horizontal_good && q_good {
        Some((e, n, v))
    } else {
        None
    }
}

/// Removes the platform's own velocity from every cell's East/North/Vertical earth-velocity
/// component, per the source-selection priority in SPEC_FULL.md §4.7.2. Returns `Some((e, n,
/// v))` — the triple actually applied, in whichever source's native sign convention produced it
/// — so the caller can thread it through as `prev` for the next ensemble when no better source
/// is available; returns `None` (ensemble unmodified) when no source qualifies.
pub fn remove_ship_speed(
    ensemble: &mut Ensemble,
    prev: Option<(f32, f32, f32)>,
    settings: &ShipSpeedSettings,
    gps: Option<GpsFix>,
) -> Option<(f32, f32, f32)> {
    if settings.use_bt() {
        if let Some(bt_earth) = bottom_track_earth_good(ensemble, settings) {
            apply_velocity_delta(ensemble, bt_earth, RemovalMode::Add);
            return Some(bt_earth);
        }
    }

    if settings.use_gps() {
        if let Some(fix) = gps {
            if let Some(speed) = fix.vtg_speed_mps {
                let heading = fix
                    .hdt_heading_deg
                    .or(fix.vtg_bearing_deg)
                    .or_else(|| ensemble.ancillary.map(|a| a.heading_deg))
                    .unwrap_or(0.0);
                let heading_rad = (heading + settings.gps_heading_offset_deg()).to_radians();
                let east = speed * heading_rad.sin();
                let north = speed * heading_rad.cos();
                let vertical = ensemble
                    .bottom_track
                    .as_ref()
                    .map(|bt| bt.earth_velocity[2])
                    .filter(|&v| v != BAD_VELOCITY)
                    .unwrap_or(0.0);
                apply_velocity_delta(ensemble, (east, north, vertical), RemovalMode::Subtract);
                return Some((east, north, vertical));
            }
        }
    }

    if let Some(prev_triple) = prev {
        apply_velocity_delta(ensemble, prev_triple, RemovalMode::Add);
        return Some(prev_triple);
    }

    None
}

/// √(E² + N² + V²) over a good earth-velocity triple; 0.0 if any component is `BAD_VELOCITY`
/// (SPEC_FULL.md §4.7.3).
pub fn magnitude(e: f32, n: f32, v: f32) -> f32 {
    if e == BAD_VELOCITY || n == BAD_VELOCITY || v == BAD_VELOCITY {
        0.0
    } else {
        (e * e + n * n + v * v).sqrt()
    }
}

/// Whether direction is computed as `atan2(N, E)` or `atan2(E, N)`, per caller preference
/// (SPEC_FULL.md §4.7.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionConvention {
    NorthEast,
    EastNorth,
}

/// Direction in degrees via `atan2`, in whichever argument order `convention` selects. Returns
/// 0.0 if either component is `BAD_VELOCITY`.
pub fn direction_deg(e: f32, n: f32, convention: DirectionConvention) -> f32 {
    if e == BAD_VELOCITY || n == BAD_VELOCITY {
        return 0.0;
    }
    let rad = match convention {
        DirectionConvention::NorthEast => n.atan2(e),
        DirectionConvention::EastNorth => e.atan2(n),
    };
    rad.to_degrees()
}

/// Mean of the bottom-track ranges that are `> BAD_RANGE`, requiring at least 2 good beams;
/// otherwise `BAD_RANGE` (SPEC_FULL.md §4.7.3).
pub fn average_range(range_m: [f32; 4]) -> f32 {
    let good: Vec<f32> = range_m.into_iter().filter(|&r| r > BAD_RANGE).collect();
    if good.len() < 2 {
        return BAD_RANGE;
    }
    good.iter().sum::<f32>() / good.len() as f32
}

/// `round(avg_range / bin_size)`, or -1 if `avg_range` is `BAD_RANGE` (SPEC_FULL.md §4.7.3).
pub fn range_bin(avg_range_m: f32, bin_size_m: f32) -> i32 {
    if avg_range_m <= BAD_RANGE || bin_size_m <= 0.0 {
        return -1;
    }
    (avg_range_m / bin_size_m).round() as i32
}
