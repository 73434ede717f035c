//! Fit inputs resolved for the engine, and the state of one candidate.
//!
//! A `FitSetup` is derived once per fit from the caller's `FitInput`. Every
//! candidate surface permittivity `e0` then produces a fresh `FitState`; no
//! state is shared between candidates or between fits.

use crate::domain::{Dielectric, FitCoefficients, FitInput, Polarization};
use crate::error::AppError;
use crate::models::clamp_alpha;

/// `|e0 - e1|` below this makes the normalized coordinate undefined.
pub const SINGULAR_CONTRAST: f64 = 1e-10;

/// Starting exponent when the shape exponent is auto-estimated.
const ALPHA_SEED: f64 = 0.4;

/// How far above the top mode the surface permittivity seed is placed,
/// as a fraction of `Em[0] - e1`.
const SEED_MARGIN: f64 = 0.25;

/// How the shape exponent is obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlphaMode {
    /// Root-find from `seed` at every candidate.
    Auto { seed: f64 },
    Fixed(f64),
}

/// How the ratio `B/A` is obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GammaMode {
    /// `A` and `B` both come from the 2×2 normal equations.
    Auto,
    /// `B = A·γ`.
    Fixed(f64),
}

/// Engine view of a `FitInput`.
#[derive(Debug, Clone)]
pub struct FitSetup {
    pub mode_dielectric: Vec<f64>,
    pub substrate_index: f64,
    pub polarization: Polarization,
    pub alpha: AlphaMode,
    pub gamma: GammaMode,
}

impl FitSetup {
    pub fn from_input(input: &FitInput) -> Result<Self, AppError> {
        if input.mode_indices.len() < 2 {
            return Err(AppError::new(
                2,
                format!(
                    "At least 2 mode indices are required, got {}.",
                    input.mode_indices.len()
                ),
            ));
        }
        if let Some((i, v)) = input.mode_indices.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(AppError::new(2, format!("Mode index #{i} is not a finite number: {v}.")));
        }
        for (name, v) in [
            ("Substrate index", input.substrate_index),
            ("Prism index", input.prism_index),
            ("Alpha hint", input.alpha_hint),
            ("Gamma hint", input.gamma_hint),
        ] {
            if !v.is_finite() {
                return Err(AppError::new(2, format!("{name} is not a finite number: {v}.")));
            }
        }

        let alpha = if input.alpha_is_auto() {
            AlphaMode::Auto { seed: ALPHA_SEED }
        } else {
            AlphaMode::Fixed(clamp_alpha(input.alpha_hint))
        };
        let gamma = if input.gamma_is_auto() {
            GammaMode::Auto
        } else {
            GammaMode::Fixed(input.gamma_hint)
        };

        Ok(Self {
            mode_dielectric: input.mode_indices.iter().map(|n| n * n).collect(),
            substrate_index: input.substrate_index,
            polarization: input.polarization,
            alpha,
            gamma,
        })
    }

    /// Substrate permittivity `e1`.
    pub fn substrate_dielectric(&self) -> f64 {
        self.substrate_index * self.substrate_index
    }

    /// Starting surface permittivity: `e0 = (Em[0] - e1)·0.25 + Em[0]`.
    pub fn seed_e0(&self) -> f64 {
        let top = self.mode_dielectric[0];
        (top - self.substrate_dielectric()) * SEED_MARGIN + top
    }

    /// Both hints fixed: no outer minimization.
    pub fn is_fully_fixed(&self) -> bool {
        matches!(self.alpha, AlphaMode::Fixed(_)) && matches!(self.gamma, GammaMode::Fixed(_))
    }
}

/// Fit state of one candidate surface permittivity.
#[derive(Debug, Clone)]
pub struct FitState {
    pub dielectric: Dielectric,
    pub mode_dielectric: Vec<f64>,
    /// Normalized coordinate of each mode.
    pub b: Vec<f64>,
    /// `1 - b`.
    pub b1: Vec<f64>,
    /// Phase-corrected mode orders `mi`.
    pub mode_orders: Vec<f64>,
    pub alpha: f64,
    pub coefficients: FitCoefficients,
    pub residual: f64,
}

/// Normalized coordinates `b = (Em - e1)/(e0 - e1)` and their complements.
///
/// All `b` are 0 when the contrast is singular.
pub fn normalized_coords(mode_dielectric: &[f64], dielectric: &Dielectric) -> (Vec<f64>, Vec<f64>) {
    let contrast = dielectric.contrast();
    let b: Vec<f64> = mode_dielectric
        .iter()
        .map(|&em| {
            if contrast.abs() < SINGULAR_CONTRAST {
                0.0
            } else {
                (em - dielectric.e1) / contrast
            }
        })
        .collect();
    let b1 = b.iter().map(|&v| 1.0 - v).collect();
    (b, b1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AUTO_ALPHA, AUTO_GAMMA};

    fn input(alpha_hint: f64, gamma_hint: f64) -> FitInput {
        FitInput {
            prism_index: 2.5,
            mode_indices: vec![1.72, 1.70, 1.68],
            substrate_index: 1.65,
            alpha_hint,
            gamma_hint,
            polarization: Polarization::Te,
        }
    }

    #[test]
    fn resolves_hint_modes() {
        let setup = FitSetup::from_input(&input(AUTO_ALPHA, AUTO_GAMMA)).unwrap();
        assert_eq!(setup.alpha, AlphaMode::Auto { seed: 0.4 });
        assert_eq!(setup.gamma, GammaMode::Auto);
        assert!(!setup.is_fully_fixed());

        let setup = FitSetup::from_input(&input(45.0, 0.5)).unwrap();
        assert_eq!(setup.alpha, AlphaMode::Fixed(20.0));
        assert_eq!(setup.gamma, GammaMode::Fixed(0.5));
        assert!(setup.is_fully_fixed());
    }

    #[test]
    fn seed_sits_above_top_mode() {
        let setup = FitSetup::from_input(&input(AUTO_ALPHA, AUTO_GAMMA)).unwrap();
        let em0 = 1.72 * 1.72;
        let e1 = 1.65 * 1.65;
        assert!((setup.seed_e0() - (em0 + 0.25 * (em0 - e1))).abs() < 1e-15);
    }

    #[test]
    fn rejects_too_few_modes() {
        let mut bad = input(AUTO_ALPHA, AUTO_GAMMA);
        bad.mode_indices = vec![1.7];
        let err = FitSetup::from_input(&bad).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut bad = input(AUTO_ALPHA, AUTO_GAMMA);
        bad.mode_indices[1] = f64::NAN;
        assert_eq!(FitSetup::from_input(&bad).unwrap_err().exit_code(), 2);

        let mut bad = input(AUTO_ALPHA, AUTO_GAMMA);
        bad.substrate_index = f64::INFINITY;
        assert_eq!(FitSetup::from_input(&bad).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn normalized_coords_span_unit_interval() {
        let d = Dielectric::new(1.75 * 1.75, 1.65);
        let (b, b1) = normalized_coords(&[1.75 * 1.75, 1.70 * 1.70, 1.65 * 1.65], &d);
        assert!((b[0] - 1.0).abs() < 1e-12);
        assert!(b[1] > 0.0 && b[1] < 1.0);
        assert!(b[2].abs() < 1e-12);
        for (x, y) in b.iter().zip(b1.iter()) {
            assert!((x + y - 1.0).abs() < 1e-15);
        }
    }

    #[test]
    fn normalized_coords_zero_when_singular() {
        let d = Dielectric::new(1.65 * 1.65, 1.65);
        let (b, b1) = normalized_coords(&[1.7 * 1.7, 1.68 * 1.68], &d);
        assert!(b.iter().all(|&v| v == 0.0));
        assert!(b1.iter().all(|&v| v == 1.0));
    }
}
