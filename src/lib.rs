#![warn(missing_docs)]
//! Tropical cyclone potential intensity from gridded ocean and atmosphere fields.
//!
//! The analysis treats the storm as a heat engine between the sea surface and its
//! outflow. For each grid cell it iterates a candidate central pressure, lifting three
//! parcels through the environmental sounding on every iterate, until the pressure
//! implied by the available energy matches the candidate. The result is the minimum
//! central pressure, the maximum sustained surface wind, and the outflow temperature.
//!
//! Single cells go through [`solve_pi`]; full grids go through [`evaluate_grid`], which
//! spreads time slices over worker threads.

pub mod thermo;

mod cape;
mod distributor;
mod error;
mod grid;
mod parcel;
mod profile;
mod solver;

#[cfg(test)]
mod test_data;

pub use crate::{
    cape::{evaluate_cape, AscentOptions, CapeResult},
    distributor::evaluate_grid,
    error::{AnalysisError, Result},
    grid::{CellFlag, EvaluationSummary, GridInputs, PiGrid},
    parcel::Parcel,
    profile::VerticalProfile,
    solver::{solve_pi, PiConfig, PiResult, SurfaceState},
};
