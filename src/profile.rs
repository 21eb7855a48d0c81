//! Data type for the environmental vertical profile.

use crate::error::{AnalysisError, Result};
use metfor::{HectoPascal, Kelvin};

/// An environmental sounding stored as parallel vectors of pressure, temperature, and
/// mixing ratio.
///
/// Invariant: pressures are strictly decreasing with level index, so index 0 is the level
/// nearest the surface. The constructor reverses a bottom-up ordered input and rejects
/// anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalProfile {
    pressure: Vec<HectoPascal>,
    temperature: Vec<Kelvin>,
    mixing_ratio: Vec<f64>,
}

impl VerticalProfile {
    /// Build a profile from parallel vectors; mixing ratio in kg/kg.
    ///
    /// Requires at least two levels and equal vector lengths. Pressures sorted in
    /// ascending order are reversed; pressures that are not strictly monotonic are
    /// rejected with [`AnalysisError::DisorderedProfile`].
    pub fn new(
        mut pressure: Vec<HectoPascal>,
        mut temperature: Vec<Kelvin>,
        mut mixing_ratio: Vec<f64>,
    ) -> Result<Self> {
        if pressure.len() != temperature.len() || pressure.len() != mixing_ratio.len() {
            return Err(AnalysisError::MismatchedLengths);
        }

        if pressure.len() < 2 {
            return Err(AnalysisError::NotEnoughData);
        }

        if pressure.windows(2).all(|w| w[0] < w[1]) {
            pressure.reverse();
            temperature.reverse();
            mixing_ratio.reverse();
        } else if !pressure.windows(2).all(|w| w[0] > w[1]) {
            return Err(AnalysisError::DisorderedProfile);
        }

        Ok(VerticalProfile {
            pressure,
            temperature,
            mixing_ratio,
        })
    }

    /// Number of levels in the profile.
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// Whether the profile holds no levels. Cannot be true for a constructed profile.
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// The pressure profile, highest pressure first.
    pub fn pressure_profile(&self) -> &[HectoPascal] {
        &self.pressure
    }

    /// The temperature profile.
    pub fn temperature_profile(&self) -> &[Kelvin] {
        &self.temperature
    }

    /// The mixing ratio profile in kg/kg.
    pub fn mixing_ratio_profile(&self) -> &[f64] {
        &self.mixing_ratio
    }

    /// Number of levels retained below the analysis pressure ceiling.
    ///
    /// Levels with pressure at or above the ceiling value are dropped from the buoyancy
    /// integral entirely, they are truncated rather than zeroed.
    pub(crate) fn levels_below(&self, ceiling: HectoPascal) -> usize {
        self.pressure.iter().take_while(|p| **p > ceiling).count()
    }
}
