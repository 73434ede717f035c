//! Depth reconstruction from fitted coefficients.
//!
//! Inverting the mode-number model gives the depth at which the profile
//! reaches normalized coordinate `b`:
//!
//! ```text
//! s1 = A · α · Γ(α) / (Γ(α + 1/2) · √π)
//! z(b) = (s1 · (1 - b)^(α - 1/2) - B · ln(b) / 4) / √(e0 - e1)
//! ```
//!
//! `z` is undefined (NaN) outside `0 < b <= 1` or when `e0 <= e1`. Negative
//! depths come from fit noise near the surface and are floored to 0.

use crate::domain::{Dielectric, FitCoefficients};
use crate::math::{SAFETY_FLOOR, gamma};

/// Exponents closer than this to 1/2 are moved to `0.5 + ALPHA_EPS`.
const ALPHA_EPS: f64 = 1e-4;

pub const ALPHA_MIN: f64 = 0.2;
pub const ALPHA_MAX: f64 = 20.0;

/// Clamp a shape exponent to `[ALPHA_MIN, ALPHA_MAX]`.
pub fn clamp_alpha(alpha: f64) -> f64 {
    alpha.clamp(ALPHA_MIN, ALPHA_MAX)
}

/// Exponent actually used by the depth formula.
fn guard_alpha(alpha: f64) -> f64 {
    let alpha = if (alpha - 0.5).abs() < ALPHA_EPS {
        0.5 + ALPHA_EPS
    } else {
        alpha
    };
    clamp_alpha(alpha)
}

/// A fitted profile ready for depth evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ProfileShape {
    alpha: f64,
    s1: f64,
    coeffs: FitCoefficients,
    contrast: f64,
}

impl ProfileShape {
    pub fn new(alpha: f64, coeffs: FitCoefficients, dielectric: &Dielectric) -> Self {
        let alpha = guard_alpha(alpha);
        let s1 = coeffs.a * alpha * gamma(alpha) / (gamma(alpha + 0.5) * std::f64::consts::PI.sqrt());
        Self {
            alpha,
            s1,
            coeffs,
            contrast: dielectric.contrast(),
        }
    }

    /// Exponent after the near-1/2 guard and clamping.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Depth (µm) at normalized coordinate `b`.
    pub fn depth(&self, b: f64) -> f64 {
        if b <= 0.0 || b > 1.0 {
            return f64::NAN;
        }
        if self.contrast <= 0.0 {
            return f64::NAN;
        }

        let b = b.max(SAFETY_FLOOR);
        let power_term = self.s1 * (1.0 - b).powf(self.alpha - 0.5);
        let log_term = self.coeffs.b * b.ln() / 4.0;
        let value = (power_term - log_term) / self.contrast.sqrt();

        if value < 0.0 { 0.0 } else { value }
    }
}

/// Depth at a single normalized coordinate.
pub fn profile_depth(b: f64, alpha: f64, coeffs: FitCoefficients, dielectric: &Dielectric) -> f64 {
    ProfileShape::new(alpha, coeffs, dielectric).depth(b)
}

/// Depths at many normalized coordinates (the `Γ` prefactor is computed once).
pub fn profile_depths(bs: &[f64], alpha: f64, coeffs: FitCoefficients, dielectric: &Dielectric) -> Vec<f64> {
    let shape = ProfileShape::new(alpha, coeffs, dielectric);
    bs.iter().map(|&b| shape.depth(b)).collect()
}
