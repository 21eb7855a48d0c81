//! Error types for the potential-intensity crate.
use metfor::{Celsius, Kelvin};
use thiserror::Error;

/// Error type for the crate.
///
/// Every variant describes a condition that is fatal for a single analysis (one grid cell),
/// never for a whole gridded run.
#[derive(Clone, Copy, PartialEq, Debug, Error)]
pub enum AnalysisError {
    /// The sea surface is too cold for a potential intensity analysis to be defined.
    #[error("sea surface temperature {0:?} is at or below the 5 C analysis floor")]
    SstTooCold(Celsius),
    /// A profile temperature at or below absolute zero.
    #[error("non-physical temperature {temperature:?} at profile level {level}")]
    NonPhysicalTemperature {
        /// Index of the offending level, surface first.
        level: usize,
        /// The offending temperature.
        temperature: Kelvin,
    },
    /// Parcel state outside the domain of the entropy closure.
    #[error(
        "invalid parcel: temperature {temperature:?}, mixing ratio {mixing_ratio} \
         (requires T >= 200 K and r >= 1e-6 kg/kg)"
    )]
    InvalidParcel {
        /// Parcel temperature.
        temperature: Kelvin,
        /// Parcel mixing ratio in kg/kg.
        mixing_ratio: f64,
    },
    /// The parcel's vapor pressure meets or exceeds the ambient pressure.
    #[error("vapor pressure exceeds ambient pressure, cannot form a parcel")]
    VaporPressureExceedsPressure,
    /// Not enough profile levels below the analysis ceiling.
    #[error("not enough profile levels available for analysis")]
    NotEnoughData,
    /// Profile pressures are not strictly monotonic.
    #[error("profile pressures are not strictly ordered")]
    DisorderedProfile,
    /// Parallel arrays disagree on their dimensions.
    #[error("input arrays do not agree on their dimensions")]
    MismatchedLengths,
    /// A value required for the analysis is not available.
    #[error("missing value required for analysis")]
    MissingValue,
}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, AnalysisError>;
