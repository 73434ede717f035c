//! Mode-order bookkeeping.
//!
//! The fitter relies on two primitive operations:
//! - the phase-corrected order of a measured mode (`mode_order`)
//! - the model's continuous mode number at a normalized coordinate
//!   (`mode_number`)

use std::f64::consts::PI;

use crate::domain::{Dielectric, FitCoefficients, Polarization};
use crate::math::f_basis;

/// Constant part of the WKB phase condition.
const PHASE_OFFSET: f64 = 0.75;

/// Polarization-dependent coupling factor at the cover interface.
///
/// `1` for TE, `e2 / e0` for TM. Depends on the candidate surface
/// permittivity, so it is recomputed for every candidate.
pub fn coupling_factor(e0: f64, e2: f64, polarization: Polarization) -> f64 {
    match polarization {
        Polarization::Te => 1.0,
        Polarization::Tm => e2 / e0,
    }
}

/// Phase-corrected order of mode `index` with permittivity `em`:
///
/// `mi = index - atan(xa·(e0 - em)/(em - e2))/π + 0.75`
///
/// Falls back to `index + 0.75` when `em > e0` or `em <= e2`, where the
/// arctangent argument has no physical meaning.
pub fn mode_order(index: usize, em: f64, dielectric: &Dielectric, polarization: Polarization) -> f64 {
    let num = dielectric.e0 - em;
    let denom = em - dielectric.e2;
    if num < 0.0 || denom <= 0.0 {
        return index as f64 + PHASE_OFFSET;
    }
    let xa = coupling_factor(dielectric.e0, dielectric.e2, polarization);
    index as f64 - (xa * (num / denom)).atan() / PI + PHASE_OFFSET
}

/// Phase-corrected orders of all modes.
pub fn mode_orders(mode_dielectric: &[f64], dielectric: &Dielectric, polarization: Polarization) -> Vec<f64> {
    mode_dielectric
        .iter()
        .enumerate()
        .map(|(i, &em)| mode_order(i, em, dielectric, polarization))
        .collect()
}

/// Model mode number `A·b1^α + B·F(b, b1)` at normalized coordinate `b`.
pub fn mode_number(b: f64, alpha: f64, coeffs: FitCoefficients) -> f64 {
    let b1 = 1.0 - b;
    coeffs.a * b1.powf(alpha) + coeffs.b * f_basis(b, b1)
}
