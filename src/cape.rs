//! Parcel ascent and convective available potential energy.
//!
//! This is the inner half of the potential intensity calculation: lift one parcel
//! through the environmental profile, iterating the moist entropy balance above the
//! lifted condensation level, and integrate the virtual temperature excess in pressure
//! to get CAPE and the outflow temperature.

use crate::{
    error::{AnalysisError, Result},
    parcel::Parcel,
    profile::VerticalProfile,
    thermo::{self, CL, CPD, EPS, RD, RV},
};
use itertools::izip;
use metfor::{HectoPascal, JpKg, Kelvin, Quantity};

/// Options controlling a single parcel ascent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AscentOptions {
    /// Analysis pressure ceiling; levels at or above it are dropped from the buoyancy
    /// integral.
    pub ceiling: HectoPascal,
    /// Weight between reversible (0.0) and pseudo-adiabatic (1.0) buoyancy.
    pub reversibility: f64,
    /// Iteration cap for the moist entropy balance.
    pub max_iterations: usize,
    /// Convergence tolerance for the lifted parcel temperature, in K.
    pub tolerance: f64,
}

impl Default for AscentOptions {
    fn default() -> Self {
        AscentOptions {
            ceiling: HectoPascal(59.0),
            reversibility: 1.0,
            max_iterations: 500,
            tolerance: 1.0e-3,
        }
    }
}

/// The result of lifting one parcel through the environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapeResult {
    /// Integrated buoyant energy in J/kg, clamped to be non-negative.
    pub cape: JpKg,
    /// Temperature at the level of neutral buoyancy, in K.
    pub outflow_temperature: Kelvin,
    /// Whether the ascent converged. A `false` value means the CAPE is not usable, not
    /// that it is zero.
    pub converged: bool,
}

/// Lift `parcel` through `profile` and integrate its buoyancy.
///
/// Returns `Err` only for precondition violations (parcel temperature below 200 K,
/// mixing ratio below 1e-6 kg/kg, too few levels). Failure of the ascent itself, the
/// entropy iteration hitting its cap or the parcel never becoming buoyant, is reported
/// in-band with `converged = false` so the caller can mark the whole cell unsuccessful.
pub fn evaluate_cape(
    parcel: Parcel,
    profile: &VerticalProfile,
    options: &AscentOptions,
) -> Result<CapeResult> {
    let tp = parcel.temperature.unpack();
    let rp = parcel.mixing_ratio;
    let pp = parcel.pressure.unpack();

    if rp < 1.0e-6 || tp < 200.0 {
        return Err(AnalysisError::InvalidParcel {
            temperature: parcel.temperature,
            mixing_ratio: rp,
        });
    }

    let n = profile.levels_below(options.ceiling);
    if n < 2 {
        return Err(AnalysisError::NotEnoughData);
    }

    let p = &profile.pressure_profile()[..n];
    let t = &profile.temperature_profile()[..n];
    let r = &profile.mixing_ratio_profile()[..n];

    let failed = CapeResult {
        cape: JpKg(0.0),
        outflow_temperature: t[0],
        converged: false,
    };

    // First level above the starting parcel. A parcel already above the whole column
    // has nowhere to go.
    let jmin = match p.iter().position(|lvl| lvl.unpack() < pp) {
        Some(j) => j,
        None => return Ok(failed),
    };

    // Moist entropy of the starting parcel, conserved along the ascent.
    let tpc = tp - 273.15;
    let esp = thermo::saturation_vapor_pressure(metfor::Celsius(tpc)).unpack();
    let evp = thermo::vapor_pressure_from_mixing_ratio(rp, parcel.pressure).unpack();
    if evp >= pp - 1.0 {
        return Ok(failed);
    }
    let rh = (evp / esp).min(1.0);
    let alv = thermo::latent_heat(tpc);
    let s = (CPD + rp * CL) * tp.ln() - RD * (pp - evp).ln() + alv * rp / tp
        - rp * RV * rh.ln();

    // Lifted condensation level pressure.
    let chi = tp / (1669.0 - 1220.0 * rh - tp);
    let plcl = pp * rh.powf(chi);

    // Virtual temperature excess of the lifted parcel over the environment, per level.
    let mut tvrdif = vec![0.0f64; n];

    for (j, (lvl_p, lvl_t, lvl_r)) in izip!(p, t, r).enumerate().skip(jmin) {
        let pj = lvl_p.unpack();
        let tj = lvl_t.unpack();
        let rj = *lvl_r;
        let env_tv = tj * (1.0 + rj / EPS) / (1.0 + rj);

        if pj >= plcl {
            // Below the LCL the parcel follows a dry adiabat at constant mixing ratio.
            let tg = tp * (pj / pp).powf(RD / CPD);
            let tlvr = tg * (1.0 + rp / EPS) / (1.0 + rp);
            tvrdif[j] = tlvr - env_tv;
        } else {
            // Above the LCL, iterate the entropy balance s(tg, rg) = s for the lifted
            // parcel temperature. Damped for the first two steps, then a full Newton
            // update.
            let mut tgnew = tj;
            let mut tg: f64;
            let mut rg: f64;
            let mut nc = 0usize;

            loop {
                tg = tgnew;
                let tc = tg - 273.15;
                let enew = thermo::saturation_vapor_pressure(metfor::Celsius(tc)).unpack();
                if enew > pj - 1.0 {
                    log::debug!(
                        "saturation vapor pressure {:.2} hPa crowds ambient {:.2} hPa",
                        enew,
                        pj
                    );
                    return Ok(failed);
                }
                rg = EPS * enew / (pj - enew);
                nc += 1;

                // Rate of change of entropy with temperature at constant pressure.
                let alv = thermo::latent_heat(tc);
                let sl = (CPD + rp * CL + alv * alv * rg / (RV * tg * tg)) / tg;
                let em = rg * pj / (EPS + rg);
                let sg = (CPD + rp * CL) * tg.ln() - RD * (pj - em).ln() + alv * rg / tg;

                let ap = if nc < 3 { 0.3 } else { 1.0 };
                tgnew = tg + ap * (s - sg) / sl;

                if nc > options.max_iterations {
                    log::debug!("entropy balance did not converge at {:.1} hPa", pj);
                    return Ok(failed);
                }
                if (tgnew - tg).abs() <= options.tolerance {
                    break;
                }
            }

            // Buoyancy with the reversible/pseudo-adiabatic weighting of the condensate
            // load.
            let sig = options.reversibility;
            let rmean = sig * rg + (1.0 - sig) * rp;
            let tlvr = tg * (1.0 + rg / EPS) / (1.0 + rmean);
            tvrdif[j] = tlvr - env_tv;
        }
    }

    // Level of neutral buoyancy: the highest level still buoyant. A parcel that is
    // never buoyant above its first level has no CAPE worth reporting.
    let inb = match (jmin..n).rev().find(|&j| tvrdif[j] > 0.0) {
        Some(j) if j > jmin => j,
        _ => return Ok(failed),
    };

    // Trapezoidal integration in pressure up to the neutral level.
    let mut pa = 0.0f64;
    let mut na = 0.0f64;
    for j in (jmin + 1)..=inb {
        let p0 = p[j - 1].unpack();
        let p1 = p[j].unpack();
        let pfac = RD * (tvrdif[j] + tvrdif[j - 1]) * (p0 - p1) / (p0 + p1);
        pa += pfac.max(0.0);
        na -= pfac.min(0.0);
    }

    // The sliver between the parcel's own pressure and the first level above it.
    let pjmin = p[jmin].unpack();
    let pfac = RD * (pp - pjmin) / (pp + pjmin);
    pa += pfac * tvrdif[jmin].max(0.0);
    na -= pfac * tvrdif[jmin].min(0.0);

    // Residual fractional layer straddling the outflow level: interpolate the pressure
    // where the buoyancy crosses zero and the temperature there.
    let mut pat = 0.0f64;
    let mut tob = t[inb].unpack();
    if inb < n - 1 {
        let pi0 = p[inb].unpack();
        let pi1 = p[inb + 1].unpack();
        let d0 = tvrdif[inb];
        let d1 = tvrdif[inb + 1];
        let pinb = (pi1 * d0 - pi0 * d1) / (d0 - d1);
        pat = RD * d0 * (pi0 - pinb) / (pi0 + pinb);
        tob = (t[inb].unpack() * (pinb - pi1) + t[inb + 1].unpack() * (pi0 - pinb))
            / (pi0 - pi1);
    }

    let caped = (pa + pat - na).max(0.0);

    Ok(CapeResult {
        cape: JpKg(caped),
        outflow_temperature: Kelvin(tob),
        converged: true,
    })
}
