//! Thermodynamic primitives shared by the parcel ascent and the intensity solver.
//!
//! These are pure numeric functions. The public seams take and return dimensioned
//! quantities; the solver's hot loops unpack to `f64` and use the constants below
//! directly.

use metfor::{Celsius, HectoPascal, Kelvin, Quantity};

/// Specific heat of dry air at constant pressure (J K⁻¹ kg⁻¹).
pub const CPD: f64 = 1005.7;
/// Specific heat of water vapor at constant pressure (J K⁻¹ kg⁻¹).
pub const CPV: f64 = 1870.0;
/// Heat capacity of condensed water used by the entropy closure (J K⁻¹ kg⁻¹).
pub const CL: f64 = 2500.0;
/// Gas constant for water vapor (J K⁻¹ kg⁻¹).
pub const RV: f64 = 461.5;
/// Gas constant for dry air (J K⁻¹ kg⁻¹).
pub const RD: f64 = 287.04;
/// Ratio of the dry air and water vapor gas constants, Rd/Rv.
pub const EPS: f64 = RD / RV;
/// Latent heat of vaporization at 0 C (J kg⁻¹).
pub const ALV0: f64 = 2.5e6;

/// Saturation vapor pressure over water from a Bolton-type exponential fit.
///
/// The fit is evaluated in kPa and converted. Valid for physically plausible
/// tropical temperatures; `saturation_vapor_pressure(Celsius(25.0))` is about
/// 31.697 hPa.
pub fn saturation_vapor_pressure(temperature: Celsius) -> HectoPascal {
    let t = temperature.unpack();
    HectoPascal(10.0 * f64::exp((16.78 * t - 116.9) / (t + 237.3)))
}

/// Mixing ratio (kg/kg) of air with the given vapor pressure at the given total pressure.
///
/// Returns `None` when the vapor pressure meets or exceeds the air pressure, where the
/// expression ε·e/(p − e) is undefined. Callers must guard.
pub fn mixing_ratio_from_vapor_pressure(
    vapor_pressure: HectoPascal,
    pressure: HectoPascal,
) -> Option<f64> {
    let e = vapor_pressure.unpack();
    let p = pressure.unpack();

    if p <= e {
        None
    } else {
        Some(EPS * e / (p - e))
    }
}

/// Vapor pressure of air with the given mixing ratio (kg/kg) at the given total pressure.
///
/// Inverse of [`mixing_ratio_from_vapor_pressure`].
pub fn vapor_pressure_from_mixing_ratio(mixing_ratio: f64, pressure: HectoPascal) -> HectoPascal {
    HectoPascal(mixing_ratio * pressure.unpack() / (EPS + mixing_ratio))
}

/// Virtual temperature of air at `temperature` carrying `mixing_ratio` kg/kg of vapor.
pub fn virtual_temperature(temperature: Kelvin, mixing_ratio: f64) -> Kelvin {
    Kelvin(temperature.unpack() * (1.0 + mixing_ratio / EPS) / (1.0 + mixing_ratio))
}

/// Temperature dependent latent heat of vaporization, argument in degrees C.
pub(crate) fn latent_heat(tc: f64) -> f64 {
    ALV0 + (CPV - CL) * tc
}
