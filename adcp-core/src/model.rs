//! The canonical ensemble aggregate (C5) and the `Grid<T>` matrix type backing every
//! per-cell/per-beam dataset.
use crate::datasets::{Ancillary, BottomTrack, EnsembleMeta, NmeaBlock, SystemSetup, WaterMass};
use crate::enums::DatasetKind;
use crate::errors::CoreError;

/// A row-major N (cells) × B (beams) matrix, `data[cell * n_beams + beam]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    n_cells: usize,
    n_beams: usize,
    data: Vec<T>,
}

impl<T: Copy> Grid<T> {
    pub fn new_filled(n_cells: usize, n_beams: usize, fill: T) -> Self {
        Grid {
            n_cells,
            n_beams,
            data: vec![fill; n_cells * n_beams],
        }
    }

    /// Builds a grid from already-flattened row-major data; fails if the length doesn't match
    /// `n_cells * n_beams`.
    pub fn from_flat(n_cells: usize, n_beams: usize, data: Vec<T>) -> Result<Self, CoreError> {
        let expected = n_cells * n_beams;
        if data.len() != expected {
            return Err(CoreError::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Grid {
            n_cells,
            n_beams,
            data,
        })
    }

    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    pub fn n_beams(&self) -> usize {
        self.n_beams
    }

    pub fn get(&self, cell: usize, beam: usize) -> T {
        self.data[cell * self.n_beams + beam]
    }

    pub fn set(&mut self, cell: usize, beam: usize, value: T) {
        self.data[cell * self.n_beams + beam] = value;
    }

    pub fn as_flat(&self) -> &[T] {
        &self.data
    }

    pub fn into_flat(self) -> Vec<T> {
        self.data
    }
}

/// The full set of datasets a canonical ensemble may carry. At most one of each kind is ever
/// present (data model invariant, SPEC_FULL.md §3); storing each as a named `Option` field is
/// the ergonomic counterpart to the source's inheritance-based dataset dispatch (redesign note,
/// SPEC_FULL.md §9) — generic dispatch across kinds is done via [`Ensemble::datasets`]'s tagged
/// view rather than by storing datasets in a homogeneous collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ensemble {
    pub meta: Option<EnsembleMeta>,
    pub ancillary: Option<Ancillary>,
    pub amplitude: Option<Grid<f32>>,
    pub correlation: Option<Grid<f32>>,
    pub beam_velocity: Option<Grid<f32>>,
    pub instrument_velocity: Option<Grid<f32>>,
    pub earth_velocity: Option<Grid<f32>>,
    pub ship_velocity: Option<Grid<f32>>,
    pub good_beam: Option<Grid<u32>>,
    pub good_instrument: Option<Grid<u32>>,
    pub good_earth: Option<Grid<u32>>,
    pub bottom_track: Option<BottomTrack>,
    pub system_setup: Option<SystemSetup>,
    pub nmea: Option<NmeaBlock>,
    pub earth_water_mass: Option<WaterMass>,
    pub instrument_water_mass: Option<WaterMass>,
}

/// A tagged, read-only view over whichever datasets are present, used by the codecs for
/// generic operations (deterministic emission order, checksum-relevant size computation)
/// without needing a match over every named field at each call site.
pub enum Dataset<'a> {
    Meta(&'a EnsembleMeta),
    Ancillary(&'a Ancillary),
    Grid(DatasetKind, &'a Grid<f32>),
    GoodCounts(DatasetKind, &'a Grid<u32>),
    BottomTrack(&'a BottomTrack),
    SystemSetup(&'a SystemSetup),
    Nmea(&'a NmeaBlock),
    WaterMass(DatasetKind, &'a WaterMass),
}

impl<'a> Dataset<'a> {
    pub fn kind(&self) -> DatasetKind {
        match self {
            Dataset::Meta(_) => DatasetKind::EnsembleMeta,
            Dataset::Ancillary(_) => DatasetKind::Ancillary,
            Dataset::Grid(k, _) => *k,
            Dataset::GoodCounts(k, _) => *k,
            Dataset::BottomTrack(_) => DatasetKind::BottomTrack,
            Dataset::SystemSetup(_) => DatasetKind::SystemSetup,
            Dataset::Nmea(_) => DatasetKind::Nmea,
            Dataset::WaterMass(k, _) => *k,
        }
    }
}

impl Ensemble {
    /// An ensemble with no datasets populated, sized for N cells and B beams. Beam-indexed
    /// grids and the bottom-track/water-mass sentinels are *not* pre-allocated here; callers
    /// populate whichever datasets they need via [`Ensemble::meta`] and friends.
    pub fn empty(num_cells: u16, num_beams: u8) -> Self {
        Ensemble {
            meta: Some(EnsembleMeta {
                num_cells,
                num_beams,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Returns `(n_cells, n_beams)` from the ensemble meta dataset, if present.
    pub fn dims(&self) -> Option<(usize, usize)> {
        self.meta
            .map(|m| (m.num_cells as usize, m.num_beams as usize))
    }

    /// A tagged view over every dataset currently populated, in no particular order (callers
    /// needing the deterministic lexicographic-by-name-tag order should sort by
    /// `Dataset::kind().name_tag()`, which is exactly what the RTI encoder does).
    pub fn datasets(&self) -> Vec<Dataset<'_>> {
        let mut out = Vec::new();
        if let Some(m) = &self.meta {
            out.push(Dataset::Meta(m));
        }
        if let Some(a) = &self.ancillary {
            out.push(Dataset::Ancillary(a));
        }
        if let Some(g) = &self.amplitude {
            out.push(Dataset::Grid(DatasetKind::Amplitude, g));
        }
        if let Some(g) = &self.correlation {
            out.push(Dataset::Grid(DatasetKind::Correlation, g));
        }
        if let Some(g) = &self.beam_velocity {
            out.push(Dataset::Grid(DatasetKind::BeamVelocity, g));
        }
        if let Some(g) = &self.instrument_velocity {
            out.push(Dataset::Grid(DatasetKind::InstrumentVelocity, g));
        }
        if let Some(g) = &self.earth_velocity {
            out.push(Dataset::Grid(DatasetKind::EarthVelocity, g));
        }
        if let Some(g) = &self.ship_velocity {
            out.push(Dataset::Grid(DatasetKind::ShipVelocity, g));
        }
        if let Some(g) = &self.good_beam {
            out.push(Dataset::GoodCounts(DatasetKind::GoodBeam, g));
        }
        if let Some(g) = &self.good_instrument {
            out.push(Dataset::GoodCounts(DatasetKind::GoodInstrument, g));
        }
        if let Some(g) = &self.good_earth {
            out.push(Dataset::GoodCounts(DatasetKind::GoodEarth, g));
        }
        if let Some(b) = &self.bottom_track {
            out.push(Dataset::BottomTrack(b));
        }
        if let Some(s) = &self.system_setup {
            out.push(Dataset::SystemSetup(s));
        }
        if let Some(n) = &self.nmea {
            out.push(Dataset::Nmea(n));
        }
        if let Some(w) = &self.earth_water_mass {
            out.push(Dataset::WaterMass(DatasetKind::EarthWaterMass, w));
        }
        if let Some(w) = &self.instrument_water_mass {
            out.push(Dataset::WaterMass(DatasetKind::InstrumentWaterMass, w));
        }
        out
    }

    /// Checks the data-model invariants from SPEC_FULL.md §3: B ∈ {1,4}, and every grid's
    /// dimensions match the N/B recorded in `EnsembleMeta`.
    pub fn validate(&self) -> Result<(), CoreError> {
        let (n, b) = match self.dims() {
            Some(dims) => dims,
            None => return Ok(()),
        };
        if b != 1 && b != 4 {
            return Err(CoreError::DimensionMismatch {
                expected: 4,
                actual: b,
            });
        }
        for ds in self.datasets() {
            if let Dataset::Grid(_, g) = &ds {
                if g.n_cells() != n || g.n_beams() != b {
                    return Err(CoreError::DimensionMismatch {
                        expected: n * b,
                        actual: g.n_cells() * g.n_beams(),
                    });
                }
            }
            if let Dataset::GoodCounts(_, g) = &ds {
                if g.n_cells() != n || g.n_beams() != b {
                    return Err(CoreError::DimensionMismatch {
                        expected: n * b,
                        actual: g.n_cells() * g.n_beams(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_get_set_round_trip() {
        let mut g = Grid::new_filled(2, 4, 0.0f32);
        g.set(1, 2, 3.5);
        assert_eq!(g.get(1, 2), 3.5);
        assert_eq!(g.get(0, 0), 0.0);
    }

    #[test]
    fn from_flat_rejects_wrong_length() {
        assert!(Grid::from_flat(2, 4, vec![0.0f32; 7]).is_err());
        assert!(Grid::from_flat(2, 4, vec![0.0f32; 8]).is_ok());
    }

    #[test]
    fn validate_rejects_mismatched_beam_count() {
        let mut e = Ensemble::empty(10, 4);
        e.amplitude = Some(Grid::new_filled(10, 1, 0.0));
        assert!(matches!(
            e.validate(),
            Err(CoreError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn validate_accepts_consistent_dims() {
        let mut e = Ensemble::empty(10, 4);
        e.amplitude = Some(Grid::new_filled(10, 4, 0.0));
        e.correlation = Some(Grid::new_filled(10, 4, 0.0));
        assert!(e.validate().is_ok());
    }

    #[test]
    fn datasets_view_lists_only_populated_fields() {
        let e = Ensemble::empty(5, 4);
        let kinds: Vec<_> = e.datasets().iter().map(Dataset::kind).collect();
        assert_eq!(kinds, vec![DatasetKind::EnsembleMeta]);
    }
}
