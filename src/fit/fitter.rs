//! Profile fitting for a single set of mode indices.
//!
//! Given:
//! - mode permittivities `Em[i]`
//! - the substrate permittivity `e1`
//! - the polarization and the shape hints
//!
//! we search the near-surface permittivity `e0`. Each candidate `e0` is
//! evaluated as a straight pipeline (`evaluate_candidate`):
//! - normalized coordinates `b`, `b1` and phase-corrected mode orders `mi`
//! - the shape exponent `α` (root of the α objective, or the fixed hint)
//! - the linear coefficients `A`, `B` (normal equations, or the fixed ratio)
//! - a slope-weighted residual
//!
//! The outer search over `e0` is a three-point parabolic Newton iteration on
//! that residual. The converged state is then expanded into a dense depth
//! profile.

use nalgebra::{DMatrix, DVector, Matrix3};
use tracing::{debug, info, warn};

use crate::domain::{Dielectric, FitCoefficients, FitInput, FitResult};
use crate::error::AppError;
use crate::fit::state::{AlphaMode, FitSetup, FitState, GammaMode, SINGULAR_CONTRAST, normalized_coords};
use crate::math::{RootOptions, f_basis, f_basis_slope, floored, fzero, solve_linear};
use crate::models::{clamp_alpha, mode_number, mode_orders, profile_depths};

/// Offset between the three residual samples of one minimizer step.
const E0_STEP: f64 = 2e-4;

/// Minimizer steps before giving up on `|dx| <= E0_STEP / 10`.
const MAX_E0_ITERATIONS: usize = 100;

/// Points of the dense profile grid (`b = 1.0, 0.9999, …, 0.0001`).
pub const PROFILE_GRID_POINTS: usize = 10_000;

/// Basis vectors of one candidate, with `b`/`b1` floored.
#[derive(Debug, Clone)]
struct Basis {
    b: Vec<f64>,
    b1: Vec<f64>,
    f: Vec<f64>,
    ln_b1: Vec<f64>,
}

impl Basis {
    fn new(b: &[f64], b1: &[f64]) -> Self {
        let b: Vec<f64> = b.iter().map(|&v| floored(v)).collect();
        let b1: Vec<f64> = b1.iter().map(|&v| floored(v)).collect();
        let f = b.iter().zip(b1.iter()).map(|(&x, &y)| f_basis(x, y)).collect();
        let ln_b1 = b1.iter().map(|v| v.ln()).collect();
        Self { b, b1, f, ln_b1 }
    }

    /// `b1^α` per mode.
    fn power(&self, alpha: f64) -> Vec<f64> {
        self.b1.iter().map(|v| v.powf(alpha)).collect()
    }
}

/// Fit the profile model to a set of mode indices.
///
/// Fails only on invalid input (exit code 2) or when the surface permittivity
/// coincides with the substrate permittivity (exit code 4). All other
/// numerical trouble degrades to NaN/clamped values; check
/// [`FitResult::is_degenerate`].
pub fn fit_profile(input: &FitInput) -> Result<FitResult, AppError> {
    let setup = FitSetup::from_input(input)?;
    let e1 = setup.substrate_dielectric();

    let seed = setup.seed_e0();
    ensure_contrast(seed, e1)?;

    let (e0, iterations, converged) = if setup.is_fully_fixed() {
        (seed, 0, true)
    } else {
        minimize_surface_permittivity(&setup, seed)
    };
    ensure_contrast(e0, e1)?;

    let state = evaluate_candidate(&setup, e0);
    let result = reconstruct(&setup, &state, iterations, converged);

    info!(
        modes = input.mode_indices.len(),
        polarization = input.polarization.display_name(),
        n0 = result.n0,
        alpha = result.calculated_alpha,
        gamma = result.calculated_gamma,
        residual = result.residual,
        iterations,
        converged,
        "profile fit finished"
    );

    Ok(result)
}

/// Evaluate one candidate surface permittivity.
pub fn evaluate_candidate(setup: &FitSetup, e0: f64) -> FitState {
    let dielectric = Dielectric::new(e0, setup.substrate_index);
    let (b, b1) = normalized_coords(&setup.mode_dielectric, &dielectric);
    let mi = mode_orders(&setup.mode_dielectric, &dielectric, setup.polarization);
    let basis = Basis::new(&b, &b1);

    let alpha = match setup.alpha {
        AlphaMode::Fixed(alpha) => alpha,
        AlphaMode::Auto { seed } => {
            let root = fzero(
                |alpha| alpha_objective(alpha, &basis, &mi, setup.gamma),
                seed,
                &RootOptions::default(),
            );
            clamp_alpha(root)
        }
    };

    let ba = basis.power(alpha);
    let coefficients = solve_coefficients(setup.gamma, &ba, &basis.f, &mi);
    let residual = weighted_residual(alpha, coefficients, &basis, &ba, &mi);

    FitState {
        dielectric,
        mode_dielectric: setup.mode_dielectric.clone(),
        b,
        b1,
        mode_orders: mi,
        alpha,
        coefficients,
        residual,
    }
}

/// Objective whose root is the shape exponent.
///
/// With `γ` free this is the determinant of the bordered normal-equations
/// matrix
///
/// ```text
/// | Σ ba·ba   Σ ba·F   Σ ba·mi |
/// | Σ F·ba    Σ F·F    Σ F·mi  |
/// | Σ g·ba    Σ g·F    Σ g·mi  |      g = ba · ln(b1)
/// ```
///
/// which equals `det(Q) · Σ g·r` for the least-squares residual `r` of the
/// 2×2 fit. It vanishes where the residual is stationary in `α`.
///
/// With `γ` fixed the same condition reads `Σ g·(mi - A·(ba + γF)) = 0`.
fn alpha_objective(alpha: f64, basis: &Basis, mi: &[f64], gamma: GammaMode) -> f64 {
    let alpha = clamp_alpha(alpha);
    let ba = basis.power(alpha);
    let g: Vec<f64> = ba.iter().zip(basis.ln_b1.iter()).map(|(p, l)| p * l).collect();

    match gamma {
        GammaMode::Auto => {
            let f = &basis.f;
            Matrix3::new(
                dot(&ba, &ba),
                dot(&ba, f),
                dot(&ba, mi),
                dot(f, &ba),
                dot(f, f),
                dot(f, mi),
                dot(&g, &ba),
                dot(&g, f),
                dot(&g, mi),
            )
            .determinant()
        }
        GammaMode::Fixed(gamma) => {
            let a = fixed_ratio_scale(&ba, &basis.f, mi, gamma);
            let mut score = 0.0;
            for i in 0..mi.len() {
                let model = a * (ba[i] + gamma * basis.f[i]);
                score += (mi[i] - model) * g[i];
            }
            score
        }
    }
}

/// `A` and `B` for the current exponent.
fn solve_coefficients(gamma: GammaMode, ba: &[f64], f: &[f64], mi: &[f64]) -> FitCoefficients {
    match gamma {
        GammaMode::Auto => {
            let cross = dot(ba, f);
            let q = DMatrix::from_row_slice(2, 2, &[dot(ba, ba), cross, cross, dot(f, f)]);
            let c = DVector::from_row_slice(&[dot(mi, ba), dot(mi, f)]);
            let ab = solve_linear(&q, &c);
            FitCoefficients { a: ab[0], b: ab[1] }
        }
        GammaMode::Fixed(gamma) => {
            let a = fixed_ratio_scale(ba, f, mi, gamma);
            FitCoefficients { a, b: a * gamma }
        }
    }
}

/// `A = Σ mi·ba / Σ ba·(ba + γF)`.
fn fixed_ratio_scale(ba: &[f64], f: &[f64], mi: &[f64], gamma: f64) -> f64 {
    let mut num = 0.0;
    let mut den = 0.0;
    for i in 0..mi.len() {
        num += mi[i] * ba[i];
        den += ba[i] * (ba[i] + gamma * f[i]);
    }
    num / den
}

/// `Σ (A·ba + B·F - mi)² / w`, `w = 1 + (dm/db1)²`.
///
/// Dividing by the squared slope of the model turns the mode-order error into
/// an approximate error along the normalized coordinate.
fn weighted_residual(alpha: f64, coeffs: FitCoefficients, basis: &Basis, ba: &[f64], mi: &[f64]) -> f64 {
    let mut sum = 0.0;
    for i in 0..mi.len() {
        let b = basis.b[i];
        let b1 = basis.b1[i];
        let slope = alpha * coeffs.a * b1.powf(alpha - 1.0) + coeffs.b * f_basis_slope(b, b1);
        let weight = 1.0 + slope * slope;
        let r = coeffs.a * ba[i] + coeffs.b * basis.f[i] - mi[i];
        sum += r * r / weight;
    }
    sum
}

/// Parabolic Newton search of the residual over `e0`.
///
/// Returns `(e0, iterations, converged)`.
fn minimize_surface_permittivity(setup: &FitSetup, seed: f64) -> (f64, usize, bool) {
    let h = E0_STEP;
    let mut ex = seed;
    let mut dx = 1.0_f64;
    let mut iterations = 0;

    while dx.abs() > h / 10.0 {
        if iterations == MAX_E0_ITERATIONS {
            warn!(e0 = ex, last_step = dx, "surface permittivity search did not converge");
            return (ex, iterations, false);
        }

        let ee = ex - h;
        let f0 = evaluate_candidate(setup, ee).residual;
        let f1 = evaluate_candidate(setup, ee + h).residual;
        let f2 = evaluate_candidate(setup, ee + 2.0 * h).residual;

        dx = (f2 - f0) / (f2 - 2.0 * f1 + f0) * h / 2.0;
        if !dx.is_finite() {
            warn!(e0 = ex, f0, f1, f2, "flat or non-finite residual, stopping surface permittivity search");
            return (ex, iterations, false);
        }

        ex -= dx;
        iterations += 1;
        debug!(iteration = iterations, e0 = ex, step = dx, residual = f1, "surface permittivity step");
    }

    (ex, iterations, true)
}

fn ensure_contrast(e0: f64, e1: f64) -> Result<(), AppError> {
    if (e0 - e1).abs() < SINGULAR_CONTRAST {
        return Err(AppError::new(
            4,
            format!(
                "Near-surface permittivity e0={e0:.10} is indistinguishable from the substrate \
                 permittivity e1={e1:.10}; the profile is undefined. Check the mode and substrate indices."
            ),
        ));
    }
    Ok(())
}

/// Expand a converged state into the dense profile and per-mode results.
fn reconstruct(setup: &FitSetup, state: &FitState, iterations: usize, converged: bool) -> FitResult {
    let dielectric = state.dielectric;
    let alpha = state.alpha;
    let coeffs = state.coefficients;

    let grid = profile_grid();
    let z = sanitize_depths(profile_depths(&grid, alpha, coeffs, &dielectric));
    let n = grid.iter().map(|&b| dielectric.index_at(b)).collect();
    let m = grid.iter().map(|&b| mode_number(b, alpha, coeffs)).collect();

    let zm = sanitize_depths(profile_depths(&state.b, alpha, coeffs, &dielectric));
    let nm = state.b.iter().map(|&b| dielectric.index_at(b)).collect();

    let calculated_gamma = match setup.gamma {
        GammaMode::Fixed(gamma) => gamma,
        GammaMode::Auto => coeffs.b / coeffs.a,
    };

    FitResult {
        z,
        n,
        b: grid,
        zm,
        nm,
        bm: state.b.clone(),
        m,
        mi: state.mode_orders.clone(),
        calculated_alpha: alpha,
        calculated_gamma,
        ab: coeffs.as_array(),
        n0: dielectric.e0.sqrt(),
        residual: state.residual,
        iterations,
        converged,
    }
}

/// `b = 1.0, 0.9999, …, 0.0001`.
pub fn profile_grid() -> Vec<f64> {
    (0..PROFILE_GRID_POINTS)
        .map(|k| (PROFILE_GRID_POINTS - k) as f64 / PROFILE_GRID_POINTS as f64)
        .collect()
}

fn sanitize_depths(depths: Vec<f64>) -> Vec<f64> {
    depths
        .into_iter()
        .map(|z| if z.is_finite() { z } else { 0.0 })
        .collect()
}

fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y.iter()).map(|(a, b)| a * b).sum()
}
