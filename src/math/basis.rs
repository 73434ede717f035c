//! Basis functions of the mode-number model.
//!
//! The fitted dispersion relation is
//!
//! ```text
//! m(b) = A · b1^α + B · F(b, b1),    b1 = 1 - b
//! F(b, b1) = √b1 - √b · atan(√(b1 / b))
//! ```
//!
//! where `b` is the normalized coordinate of a mode between the substrate
//! (`b = 0`) and the surface (`b = 1`).
//!
//! Numerical notes:
//! - `F(1, 0) = 0` and `F(0, 1) = 1`; `F` is increasing in `b1`.
//! - `dF/db1 = atan(√(b1/b)) / (2√b)`, used for the residual weights.
//! - Callers floor `b` and `b1` at [`SAFETY_FLOOR`] before taking logs,
//!   roots or negative powers.

/// Lower bound applied to `b`/`b1` inside logs, roots and powers.
pub const SAFETY_FLOOR: f64 = 1e-12;

/// `F(b, b1) = √b1 - √b · atan(√(b1/b))`.
pub fn f_basis(b: f64, b1: f64) -> f64 {
    let sqrt_b = b.sqrt();
    b1.sqrt() - sqrt_b * (b1 / b).sqrt().atan()
}

/// `dF/db1 = atan(√(b1/b)) / (2√b)`.
pub fn f_basis_slope(b: f64, b1: f64) -> f64 {
    (b1 / b).sqrt().atan() / (2.0 * b.sqrt())
}

/// Floor a normalized coordinate at [`SAFETY_FLOOR`].
pub fn floored(v: f64) -> f64 {
    v.max(SAFETY_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn f_basis_endpoints() {
        assert!(f_basis(1.0, 0.0).abs() < 1e-15);
        let deep = f_basis(floored(0.0), 1.0);
        assert!((deep - 1.0).abs() < 1e-5, "F near the substrate should be ~1, got {deep}");
    }

    #[test]
    fn f_basis_known_value() {
        // √0.75 - 0.5 · atan(√3) = √3/2 - π/6
        let expected = 3.0_f64.sqrt() / 2.0 - PI / 6.0;
        assert!((f_basis(0.25, 0.75) - expected).abs() < 1e-14);
    }

    #[test]
    fn slope_matches_finite_difference() {
        let b1 = 0.4;
        let h = 1e-6;
        let numeric = (f_basis(1.0 - (b1 + h), b1 + h) - f_basis(1.0 - (b1 - h), b1 - h)) / (2.0 * h);
        let analytic = f_basis_slope(1.0 - b1, b1);
        assert!((numeric - analytic).abs() < 1e-7, "{numeric} vs {analytic}");
    }
}
