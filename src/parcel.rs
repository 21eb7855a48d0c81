//! Variables defining a parcel as used in the parcel ascent.

use crate::{
    error::{AnalysisError, Result},
    profile::VerticalProfile,
    thermo,
};
use metfor::{Celsius, HectoPascal, Kelvin, Quantity};

/// The state of a rising air mass at a given level.
///
/// Transient: parcels are recomputed for each ascent evaluation and never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parcel {
    /// Temperature in K.
    pub temperature: Kelvin,
    /// Mixing ratio in kg/kg.
    pub mixing_ratio: f64,
    /// Pressure in hPa.
    pub pressure: HectoPascal,
}

impl Parcel {
    /// A parcel with the environmental properties of the given profile level.
    pub fn from_profile_level(profile: &VerticalProfile, level: usize) -> Result<Parcel> {
        if level >= profile.len() {
            return Err(AnalysisError::MissingValue);
        }

        Ok(Parcel {
            temperature: profile.temperature_profile()[level],
            mixing_ratio: profile.mixing_ratio_profile()[level],
            pressure: profile.pressure_profile()[level],
        })
    }

    /// A parcel saturated at the sea surface temperature, placed at `pressure`.
    ///
    /// This is the parcel whose ascent sets the outflow temperature of the whole
    /// analysis.
    pub fn saturated(sst: Kelvin, pressure: HectoPascal) -> Result<Parcel> {
        let es0 = thermo::saturation_vapor_pressure(Celsius::from(sst));
        let mixing_ratio = thermo::mixing_ratio_from_vapor_pressure(es0, pressure)
            .ok_or(AnalysisError::VaporPressureExceedsPressure)?;

        Ok(Parcel {
            temperature: sst,
            mixing_ratio,
            pressure,
        })
    }

    /// The ambient parcel displaced to a reduced central pressure.
    ///
    /// The vapor pressure is held at its sea level value while the total pressure drops,
    /// which raises the mixing ratio: rp = ε·r·psl / (pp·(ε + r) − r·psl).
    pub fn eye_adjusted(ambient: Parcel, slp: HectoPascal, pressure: HectoPascal) -> Parcel {
        let r = ambient.mixing_ratio;
        let psl = slp.unpack();
        let pp = pressure.unpack();
        let mixing_ratio = thermo::EPS * r * psl / (pp * (thermo::EPS + r) - r * psl);

        Parcel {
            temperature: ambient.temperature,
            mixing_ratio,
            pressure,
        }
    }

    /// Virtual temperature of the parcel.
    pub fn virtual_temperature(&self) -> Kelvin {
        thermo::virtual_temperature(self.temperature, self.mixing_ratio)
    }
}
