//! Synthetic mode sets from a known profile.
//!
//! The forward model solves, for each mode number `i`, the normalized
//! coordinate `b` at which the model's continuous mode number meets the
//! phase-corrected order of that mode:
//!
//! ```text
//! A·b1^α + B·F(b, b1) = mi(b)
//! ```
//!
//! and converts `b` back to an effective index. This is the exact inverse of
//! what the fitter does, which makes it the reference for self-consistency
//! checks and a convenient source of demo data (`prism simulate`).

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Dielectric, SyntheticProfile};
use crate::error::AppError;
use crate::math::bisect;
use crate::models::{mode_number, mode_order};

/// Search interval for `b`, kept off the endpoints where `F` degenerates.
const B_LO: f64 = 1e-12;
const B_HI: f64 = 1.0 - 1e-12;

const B_TOLERANCE: f64 = 1e-15;

/// Effective indices of the first `count` modes of a synthetic profile.
///
/// Fails when the profile guides fewer than `count` modes.
pub fn synthesize_modes(profile: &SyntheticProfile, count: usize) -> Result<Vec<f64>, AppError> {
    validate_profile(profile)?;

    let dielectric = Dielectric::new(profile.surface_index * profile.surface_index, profile.substrate_index);
    let contrast = dielectric.contrast();

    let mut modes = Vec::with_capacity(count);
    for i in 0..count {
        let mismatch = |b: f64| {
            let em = dielectric.e1 + b * contrast;
            mode_number(b, profile.alpha, profile.coefficients)
                - mode_order(i, em, &dielectric, profile.polarization)
        };
        let Some(b) = bisect(mismatch, B_LO, B_HI, B_TOLERANCE) else {
            return Err(AppError::new(
                2,
                format!("The synthetic profile guides only {i} mode(s); {count} requested."),
            ));
        };
        modes.push(dielectric.index_at(b));
    }

    Ok(modes)
}

/// Add zero-mean Gaussian noise with standard deviation `sigma` to each index.
///
/// Deterministic for a given `seed`.
pub fn add_index_noise(modes: &[f64], sigma: f64, seed: u64) -> Result<Vec<f64>, AppError> {
    if !(sigma.is_finite() && sigma >= 0.0) {
        return Err(AppError::new(2, format!("Invalid noise level: {sigma}.")));
    }
    if sigma == 0.0 {
        return Ok(modes.to_vec());
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, sigma).map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;

    Ok(modes.iter().map(|&n| n + normal.sample(&mut rng)).collect())
}

fn validate_profile(profile: &SyntheticProfile) -> Result<(), AppError> {
    if !(profile.surface_index.is_finite()
        && profile.substrate_index.is_finite()
        && profile.surface_index > profile.substrate_index
        && profile.substrate_index > 1.0)
    {
        return Err(AppError::new(
            2,
            format!(
                "Invalid synthetic indices: surface={}, substrate={} (need surface > substrate > 1).",
                profile.surface_index, profile.substrate_index
            ),
        ));
    }
    if !(profile.alpha.is_finite() && profile.alpha > 0.0) {
        return Err(AppError::new(2, format!("Invalid synthetic exponent: {}.", profile.alpha)));
    }
    let c = profile.coefficients;
    if !(c.a.is_finite() && c.b.is_finite() && c.a > 0.0 && c.b >= 0.0) {
        return Err(AppError::new(
            2,
            format!("Invalid synthetic coefficients: A={}, B={} (need A > 0, B >= 0).", c.a, c.b),
        ));
    }
    Ok(())
}
