//! Reference profiles shared by the unit tests.

use crate::profile::VerticalProfile;
use metfor::{HectoPascal, Kelvin, Quantity};

/// Pressure levels from 1000 hPa to 100 hPa every 50 hPa, surface first.
pub fn standard_levels() -> Vec<HectoPascal> {
    (0..19).map(|i| HectoPascal(1000.0 - 50.0 * i as f64)).collect()
}

/// A smooth moist tropical sounding: 300 K and 18 g/kg at 1000 hPa falling linearly in
/// pressure to 200 K and 0 g/kg at 100 hPa. Convectively unstable for a warm sea
/// surface.
pub fn moist_tropical_profile() -> VerticalProfile {
    let pressure = standard_levels();
    let temperature = pressure
        .iter()
        .map(|p| Kelvin(200.0 + (p.unpack() - 100.0) * (100.0 / 900.0)))
        .collect();
    let mixing_ratio = pressure
        .iter()
        .map(|p| (0.018 * (p.unpack() - 100.0) / 900.0).max(0.0))
        .collect();

    VerticalProfile::new(pressure, temperature, mixing_ratio).expect("valid test profile")
}

/// A deeply stable sounding, isothermal and warm through the whole column. No parcel
/// lifted from the surface ever becomes buoyant in it.
pub fn stable_warm_profile() -> VerticalProfile {
    let pressure = standard_levels();
    let temperature = pressure.iter().map(|_| Kelvin(302.0)).collect();
    let mixing_ratio = pressure
        .iter()
        .map(|p| 0.005 * (p.unpack() - 100.0) / 900.0)
        .collect();

    VerticalProfile::new(pressure, temperature, mixing_ratio).expect("valid test profile")
}

/// The moist tropical profile with one temperature overwritten, for validation tests.
pub fn profile_with_temperature(level: usize, temperature: Kelvin) -> VerticalProfile {
    let base = moist_tropical_profile();
    let mut temps: Vec<Kelvin> = base.temperature_profile().to_vec();
    temps[level] = temperature;

    VerticalProfile::new(
        base.pressure_profile().to_vec(),
        temps,
        base.mixing_ratio_profile().to_vec(),
    )
    .expect("valid test profile")
}
