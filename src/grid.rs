//! Gridded application of the potential intensity solver.
//!
//! The grid evaluator maps [`solve_pi`](crate::solver::solve_pi) independently over
//! every (time, latitude, longitude) cell. No cell depends on another, and cells whose
//! inputs are missing keep a "no data" sentinel rather than being submitted to the
//! solver.

use crate::{
    error::{AnalysisError, Result},
    profile::VerticalProfile,
    solver::{solve_pi, PiConfig, SurfaceState},
};
use chrono::NaiveDateTime;
use metfor::{Celsius, HectoPascal, Kelvin, MetersPSec};
use optional::{none, some, Optioned};
use strum_macros::{Display, EnumIter};

/// Outcome of one grid cell's analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum CellFlag {
    /// The solver converged to a consistent solution.
    Solved,
    /// The solver ran but found no consistent solution within its iteration caps.
    NoConvergence,
    /// Input validation rejected the cell.
    InvalidInput,
    /// One or more required inputs were missing or masked.
    MissingData,
}

/// Aggregate counts of cell outcomes across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvaluationSummary {
    /// Cells with a converged solution.
    pub solved: usize,
    /// Cells where the iteration found no consistent solution.
    pub no_convergence: usize,
    /// Cells rejected by input validation.
    pub invalid: usize,
    /// Cells skipped for missing inputs.
    pub missing: usize,
}

/// Gridded surface and profile inputs with their coordinate vectors.
///
/// Surface fields are flattened (time, lat, lon) arrays; level fields are flattened
/// (time, level, lat, lon) arrays. Missing or masked values are `Optioned::none()`.
#[derive(Debug, Clone)]
pub struct GridInputs {
    times: Vec<NaiveDateTime>,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    levels: Vec<HectoPascal>,
    sst: Vec<Optioned<Celsius>>,
    slp: Vec<Optioned<HectoPascal>>,
    temperature: Vec<Optioned<Kelvin>>,
    mixing_ratio: Vec<Optioned<f64>>,
}

pub(crate) enum CellData {
    Missing,
    Invalid(AnalysisError),
    Ready(SurfaceState, VerticalProfile),
}

impl GridInputs {
    /// Build a grid from coordinate vectors and flattened field arrays.
    ///
    /// Surface arrays must hold `times · latitudes · longitudes` values; level arrays
    /// must hold `times · levels · latitudes · longitudes` values, with longitude the
    /// fastest varying dimension.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        times: Vec<NaiveDateTime>,
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
        levels: Vec<HectoPascal>,
        sst: Vec<Optioned<Celsius>>,
        slp: Vec<Optioned<HectoPascal>>,
        temperature: Vec<Optioned<Kelvin>>,
        mixing_ratio: Vec<Optioned<f64>>,
    ) -> Result<Self> {
        let surface_len = times.len() * latitudes.len() * longitudes.len();
        let level_len = surface_len * levels.len();

        if sst.len() != surface_len
            || slp.len() != surface_len
            || temperature.len() != level_len
            || mixing_ratio.len() != level_len
        {
            return Err(AnalysisError::MismatchedLengths);
        }

        Ok(GridInputs {
            times,
            latitudes,
            longitudes,
            levels,
            sst,
            slp,
            temperature,
            mixing_ratio,
        })
    }

    /// The time coordinate vector.
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// The latitude coordinate vector.
    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    /// The longitude coordinate vector.
    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    /// The vertical pressure levels.
    pub fn levels(&self) -> &[HectoPascal] {
        &self.levels
    }

    pub(crate) fn cells_per_slice(&self) -> usize {
        self.latitudes.len() * self.longitudes.len()
    }

    fn surface_index(&self, t: usize, iy: usize, ix: usize) -> usize {
        (t * self.latitudes.len() + iy) * self.longitudes.len() + ix
    }

    fn level_index(&self, t: usize, k: usize, iy: usize, ix: usize) -> usize {
        ((t * self.levels.len() + k) * self.latitudes.len() + iy) * self.longitudes.len() + ix
    }

    /// Gather one cell's surface state and vertical profile, reporting missing or
    /// structurally invalid inputs.
    pub(crate) fn cell(&self, t: usize, iy: usize, ix: usize) -> CellData {
        let i = self.surface_index(t, iy, ix);
        let (sst, slp) = match (self.sst[i].into_option(), self.slp[i].into_option()) {
            (Some(sst), Some(slp)) => (sst, slp),
            _ => return CellData::Missing,
        };

        let nz = self.levels.len();
        let mut temperature = Vec::with_capacity(nz);
        let mut mixing_ratio = Vec::with_capacity(nz);
        for k in 0..nz {
            let j = self.level_index(t, k, iy, ix);
            match (
                self.temperature[j].into_option(),
                self.mixing_ratio[j].into_option(),
            ) {
                (Some(tk), Some(rk)) => {
                    temperature.push(tk);
                    mixing_ratio.push(rk);
                }
                _ => return CellData::Missing,
            }
        }

        match VerticalProfile::new(self.levels.clone(), temperature, mixing_ratio) {
            Ok(profile) => CellData::Ready(SurfaceState { sst, slp }, profile),
            Err(err) => CellData::Invalid(err),
        }
    }
}

/// One computed spatial slice for a single time index.
pub(crate) struct TimeSlice {
    pub(crate) pmin: Vec<Optioned<HectoPascal>>,
    pub(crate) vmax: Vec<Optioned<MetersPSec>>,
    pub(crate) outflow_temperature: Vec<Optioned<Kelvin>>,
    pub(crate) flags: Vec<CellFlag>,
}

/// Evaluate every cell of one time slice sequentially.
pub(crate) fn evaluate_time_slice(
    inputs: &GridInputs,
    t: usize,
    config: &PiConfig,
) -> TimeSlice {
    let ncells = inputs.cells_per_slice();
    let mut slice = TimeSlice {
        pmin: vec![none(); ncells],
        vmax: vec![none(); ncells],
        outflow_temperature: vec![none(); ncells],
        flags: vec![CellFlag::MissingData; ncells],
    };

    for iy in 0..inputs.latitudes.len() {
        for ix in 0..inputs.longitudes.len() {
            let i = iy * inputs.longitudes.len() + ix;

            let (surface, profile) = match inputs.cell(t, iy, ix) {
                CellData::Missing => continue,
                CellData::Invalid(err) => {
                    log::debug!("cell (t={}, y={}, x={}) rejected: {}", t, iy, ix, err);
                    slice.flags[i] = CellFlag::InvalidInput;
                    continue;
                }
                CellData::Ready(surface, profile) => (surface, profile),
            };

            match solve_pi(surface, &profile, config) {
                Ok(result) => {
                    slice.pmin[i] = some(result.pmin);
                    slice.vmax[i] = some(result.vmax);
                    slice.outflow_temperature[i] = some(result.outflow_temperature);
                    slice.flags[i] = if result.converged {
                        CellFlag::Solved
                    } else {
                        CellFlag::NoConvergence
                    };
                }
                Err(err) => {
                    log::debug!("cell (t={}, y={}, x={}) invalid: {}", t, iy, ix, err);
                    slice.flags[i] = CellFlag::InvalidInput;
                }
            }
        }
    }

    if slice.flags.iter().all(|&f| f == CellFlag::MissingData) {
        log::warn!("time step {} has no usable inputs, skipping", t);
    }

    slice
}

/// Gridded potential intensity output.
///
/// Owned exclusively by the evaluation that allocates it; slices are written once, keyed
/// by time index, and never overwritten. Cells that could not be evaluated keep the
/// `Optioned::none()` sentinel.
#[derive(Debug, Clone)]
pub struct PiGrid {
    times: Vec<NaiveDateTime>,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    pmin: Vec<Optioned<HectoPascal>>,
    vmax: Vec<Optioned<MetersPSec>>,
    outflow_temperature: Vec<Optioned<Kelvin>>,
    flags: Vec<CellFlag>,
}

impl PiGrid {
    /// An output grid sized to match `inputs`, filled with the missing sentinel.
    pub(crate) fn sized_for(inputs: &GridInputs) -> PiGrid {
        let n = inputs.times.len() * inputs.cells_per_slice();
        PiGrid {
            times: inputs.times.clone(),
            latitudes: inputs.latitudes.clone(),
            longitudes: inputs.longitudes.clone(),
            pmin: vec![none(); n],
            vmax: vec![none(); n],
            outflow_temperature: vec![none(); n],
            flags: vec![CellFlag::MissingData; n],
        }
    }

    /// Write one time slice into its region of the output arrays.
    pub(crate) fn insert_slice(&mut self, t: usize, slice: TimeSlice) {
        let ncells = self.latitudes.len() * self.longitudes.len();
        let start = t * ncells;
        let end = start + ncells;

        self.pmin[start..end].copy_from_slice(&slice.pmin);
        self.vmax[start..end].copy_from_slice(&slice.vmax);
        self.outflow_temperature[start..end].copy_from_slice(&slice.outflow_temperature);
        self.flags[start..end].copy_from_slice(&slice.flags);
    }

    fn index(&self, t: usize, iy: usize, ix: usize) -> usize {
        (t * self.latitudes.len() + iy) * self.longitudes.len() + ix
    }

    /// The time coordinate vector.
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Minimum central pressure at one cell.
    pub fn pmin(&self, t: usize, iy: usize, ix: usize) -> Optioned<HectoPascal> {
        self.pmin[self.index(t, iy, ix)]
    }

    /// Maximum sustained wind at one cell.
    pub fn vmax(&self, t: usize, iy: usize, ix: usize) -> Optioned<MetersPSec> {
        self.vmax[self.index(t, iy, ix)]
    }

    /// Outflow temperature at one cell.
    pub fn outflow_temperature(&self, t: usize, iy: usize, ix: usize) -> Optioned<Kelvin> {
        self.outflow_temperature[self.index(t, iy, ix)]
    }

    /// Outcome flag at one cell.
    pub fn flag(&self, t: usize, iy: usize, ix: usize) -> CellFlag {
        self.flags[self.index(t, iy, ix)]
    }

    /// The full flattened minimum central pressure field.
    pub fn pmin_field(&self) -> &[Optioned<HectoPascal>] {
        &self.pmin
    }

    /// The full flattened maximum wind field.
    pub fn vmax_field(&self) -> &[Optioned<MetersPSec>] {
        &self.vmax
    }

    /// The full flattened flag field.
    pub fn flags(&self) -> &[CellFlag] {
        &self.flags
    }

    /// Aggregate counts of cell outcomes.
    pub fn summary(&self) -> EvaluationSummary {
        let mut summary = EvaluationSummary::default();
        for flag in &self.flags {
            match flag {
                CellFlag::Solved => summary.solved += 1,
                CellFlag::NoConvergence => summary.no_convergence += 1,
                CellFlag::InvalidInput => summary.invalid += 1,
                CellFlag::MissingData => summary.missing += 1,
            }
        }
        summary
    }
}
