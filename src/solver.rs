//! The potential intensity solver.
//!
//! Successive substitution on the storm's central pressure: each iterate evaluates CAPE
//! for the ambient parcel, for the ambient parcel displaced to the candidate central
//! pressure, and for a saturated parcel at the sea surface temperature, then updates
//! the central pressure from the combined energy until the estimate stops moving.

use crate::{
    cape::{evaluate_cape, AscentOptions},
    error::{AnalysisError, Result},
    parcel::Parcel,
    profile::VerticalProfile,
    thermo::{EPS, RD},
};
use metfor::{Celsius, HectoPascal, JpKg, Kelvin, MetersPSec, Quantity};

/// Below this central pressure the iteration is considered divergent.
const PRESSURE_FLOOR: f64 = 400.0;

/// Tunable physical and numerical parameters of the analysis.
///
/// `Default` gives the standard configuration; the `with_*` builders override single
/// values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiConfig {
    /// Ratio of the enthalpy and momentum surface exchange coefficients, Ck/Cd.
    pub ck_cd: f64,
    /// Account for dissipative heating by scaling with SST over outflow temperature.
    pub dissipative_heating: bool,
    /// Analysis pressure ceiling; levels above it are excluded from the ascent.
    pub ceiling: HectoPascal,
    /// Reduction factor applied to the gradient level wind to estimate a surface wind.
    pub wind_reduction: f64,
    /// Convergence tolerance for the central pressure iteration, in hPa.
    pub pressure_tolerance: f64,
    /// Cap on central pressure iterations before the cell is declared divergent.
    pub max_iterations: usize,
    /// Cap on the entropy balance iterations inside each ascent.
    pub max_ascent_iterations: usize,
    /// Convergence tolerance for the lifted parcel temperature, in K.
    pub ascent_tolerance: f64,
    /// First guess for the central pressure.
    pub initial_pressure: HectoPascal,
    /// Index of the profile level the parcel is lifted from, surface first.
    pub lift_level: usize,
    /// Weight between reversible (0.0) and pseudo-adiabatic (1.0) ascent.
    pub reversibility: f64,
    /// Exponent of the assumed azimuthal velocity profile inside the eye,
    /// V = Vm·(r/rm)^b. Sets the finalize shape factor 0.5·(1 + 1/b).
    pub eye_exponent: f64,
}

impl Default for PiConfig {
    fn default() -> Self {
        PiConfig {
            ck_cd: 0.9,
            dissipative_heating: true,
            ceiling: HectoPascal(59.0),
            wind_reduction: 0.8,
            pressure_tolerance: 0.2,
            max_iterations: 200,
            max_ascent_iterations: 500,
            ascent_tolerance: 1.0e-3,
            initial_pressure: HectoPascal(970.0),
            lift_level: 0,
            reversibility: 1.0,
            eye_exponent: 2.0,
        }
    }
}

impl PiConfig {
    /// Override the Ck/Cd exchange coefficient ratio.
    pub fn with_ck_cd(self, ck_cd: f64) -> Self {
        PiConfig { ck_cd, ..self }
    }

    /// Enable or disable dissipative heating.
    pub fn with_dissipative_heating(self, dissipative_heating: bool) -> Self {
        PiConfig {
            dissipative_heating,
            ..self
        }
    }

    /// Override the analysis pressure ceiling.
    pub fn with_ceiling(self, ceiling: HectoPascal) -> Self {
        PiConfig { ceiling, ..self }
    }

    /// Override the surface wind reduction factor.
    pub fn with_wind_reduction(self, wind_reduction: f64) -> Self {
        PiConfig {
            wind_reduction,
            ..self
        }
    }

    /// Override the level the parcel is lifted from.
    pub fn with_lift_level(self, lift_level: usize) -> Self {
        PiConfig { lift_level, ..self }
    }

    /// Override the reversible/pseudo-adiabatic weighting.
    pub fn with_reversibility(self, reversibility: f64) -> Self {
        PiConfig {
            reversibility,
            ..self
        }
    }

    pub(crate) fn ascent_options(&self) -> AscentOptions {
        AscentOptions {
            ceiling: self.ceiling,
            reversibility: self.reversibility,
            max_iterations: self.max_ascent_iterations,
            tolerance: self.ascent_tolerance,
        }
    }
}

/// Sea surface conditions for one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceState {
    /// Sea surface temperature.
    pub sst: Celsius,
    /// Sea level pressure.
    pub slp: HectoPascal,
}

/// Potential intensity of one grid cell. Written once, never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiResult {
    /// Minimum central pressure in hPa.
    pub pmin: HectoPascal,
    /// Maximum sustained surface wind speed in m/s.
    pub vmax: MetersPSec,
    /// Outflow temperature of the saturated ascent, in K.
    pub outflow_temperature: Kelvin,
    /// Whether the solver converged to a consistent solution. When `false`, `pmin`
    /// equals the ambient sea level pressure and `vmax` is zero.
    pub converged: bool,
}

impl PiResult {
    /// Thermodynamic efficiency of the cyclone heat engine, (SST − T0)/T0.
    pub fn thermodynamic_efficiency(&self, sst: Celsius) -> f64 {
        let sst_k = Kelvin::from(sst).unpack();
        let t0 = self.outflow_temperature.unpack();
        (sst_k - t0) / t0
    }

    /// Air-sea thermodynamic disequilibrium implied by the wind speed, in J/kg.
    pub fn disequilibrium(&self, sst: Celsius, ck_cd: f64) -> JpKg {
        let v = self.vmax.unpack();
        JpKg(v * v / (ck_cd * self.thermodynamic_efficiency(sst)))
    }
}

/// Compute the potential intensity for one set of surface conditions and one profile.
///
/// A pure function of its inputs: identical inputs give bit-identical results. Input
/// validation failures return `Err`; divergence or non-convergence of the iteration is
/// an expected outcome reported with `converged = false`, `pmin` at the ambient sea
/// level pressure, and zero `vmax`.
pub fn solve_pi(
    surface: SurfaceState,
    profile: &VerticalProfile,
    config: &PiConfig,
) -> Result<PiResult> {
    if !(surface.sst.unpack() > 5.0) {
        return Err(AnalysisError::SstTooCold(surface.sst));
    }

    for (level, tk) in profile.temperature_profile().iter().enumerate() {
        if !(tk.unpack() > 0.0) {
            return Err(AnalysisError::NonPhysicalTemperature {
                level,
                temperature: *tk,
            });
        }
    }

    let sst_k = Kelvin::from(surface.sst);
    let sst = sst_k.unpack();
    let psl = surface.slp.unpack();
    let options = config.ascent_options();

    // The ambient CAPE is evaluated once and held fixed for the whole iteration.
    let ambient = Parcel::from_profile_level(profile, config.lift_level)?;
    let ambient_result = evaluate_cape(ambient, profile, &options)?;
    let mut all_converged = ambient_result.converged;
    let capea = ambient_result.cape.unpack();

    let t0 = profile.temperature_profile()[0].unpack();
    let r0 = profile.mixing_ratio_profile()[0];
    let tv1 = t0 * (1.0 + r0 / EPS) / (1.0 + r0);

    let mut pm = config.initial_pressure.unpack();
    let mut iterations = 0usize;

    // Carried out of the loop for the finalize step.
    let mut capem: f64;
    let mut capems: f64;
    let mut toms: f64;
    let mut rat: f64;
    let mut tvav: f64;

    loop {
        let pp = HectoPascal(pm.min(1000.0));

        // Ambient parcel displaced to the candidate central pressure.
        let eye = Parcel::eye_adjusted(ambient, surface.slp, pp);
        let eye_result = evaluate_cape(eye, profile, &options)?;
        all_converged &= eye_result.converged;
        capem = eye_result.cape.unpack();

        // Saturated parcel at the sea surface temperature; its outflow temperature is
        // the outflow temperature of the whole result.
        let sat = Parcel::saturated(sst_k, pp)?;
        let sat_result = evaluate_cape(sat, profile, &options)?;
        all_converged &= sat_result.converged;
        capems = sat_result.cape.unpack();
        toms = sat_result.outflow_temperature.unpack();

        rat = if config.dissipative_heating {
            sst / toms
        } else {
            1.0
        };

        let rs0 = sat.mixing_ratio;
        tvav = 0.5 * (tv1 + sst * (1.0 + rs0 / EPS) / (1.0 + rs0));

        // Half of the dissipative heating weight inside the loop; the full weight is
        // only applied at finalize.
        let cat = (capem - capea + 0.5 * config.ck_cd * rat * (capems - capem)).max(0.0);
        let pnew = psl * f64::exp(-cat / (RD * tvav));

        let previous = pm;
        pm = pnew;
        iterations += 1;

        if iterations > config.max_iterations || pm < PRESSURE_FLOOR {
            log::debug!(
                "central pressure iteration diverged after {} steps (pm = {:.1} hPa)",
                iterations,
                pm
            );
            return Ok(PiResult {
                pmin: surface.slp,
                vmax: MetersPSec(0.0),
                outflow_temperature: Kelvin(toms),
                converged: false,
            });
        }

        if (pnew - previous).abs() <= config.pressure_tolerance {
            break;
        }
    }

    let catfac = 0.5 * (1.0 + 1.0 / config.eye_exponent);
    let cat = (capem - capea + config.ck_cd * rat * catfac * (capems - capem)).max(0.0);
    let pmin = psl * f64::exp(-cat / (RD * tvav));
    let vmax =
        config.wind_reduction * f64::sqrt(config.ck_cd * rat * (capems - capem).max(0.0));

    Ok(PiResult {
        pmin: HectoPascal(pmin),
        vmax: MetersPSec(vmax),
        outflow_temperature: Kelvin(toms),
        converged: all_converged,
    })
}
