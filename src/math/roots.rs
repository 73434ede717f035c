//! Scalar root finding.
//!
//! - `fzero`: damped Newton iteration with a secant fallback. It is used on the
//!   shape-exponent objective inside every candidate evaluation of the fitter.
//!   It does not bracket and does not guarantee convergence; the step clamp
//!   keeps it from running away on the steep parts of the fitted model.
//! - `bisect`: plain bracketing bisection, used by the forward model where a
//!   sign change is known to exist.

/// Forward-difference step for the numerical derivative.
const DERIV_STEP: f64 = 1e-8;

/// Derivatives smaller than this are treated as unusable.
const MIN_DERIVATIVE: f64 = 1e-12;

/// Secant denominators smaller than this are treated as unusable.
const MIN_SECANT_DENOM: f64 = 1e-16;

/// Step taken when neither Newton nor secant steps are usable.
const FALLBACK_STEP: f64 = 1e-3;

/// Upper bound on `|step|` per iteration.
const MAX_STEP: f64 = 1.0;

/// Offset of the initial "previous" point used by the first secant step.
const SECANT_OFFSET: f64 = 1e-2;

/// Root finder settings.
#[derive(Debug, Clone, Copy)]
pub struct RootOptions {
    /// Stop as soon as `|f(x)| < tolerance`.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Find a root of `f` starting from `x0`.
///
/// Returns the current iterate when `|f(x)| < tolerance` or the iteration
/// budget is spent. If `f` becomes non-finite the previous iterate is returned
/// instead of propagating `NaN`.
pub fn fzero<F>(f: F, x0: f64, opts: &RootOptions) -> f64
where
    F: Fn(f64) -> f64,
{
    let mut x = x0;
    let mut x_prev = x0 + SECANT_OFFSET;
    let mut fx_prev = f(x_prev);

    for _ in 0..opts.max_iterations {
        let fx = f(x);
        if !fx.is_finite() {
            return x_prev;
        }
        if fx.abs() < opts.tolerance {
            return x;
        }

        let derivative = (f(x + DERIV_STEP) - fx) / DERIV_STEP;

        let step = if derivative.is_finite() && derivative.abs() >= MIN_DERIVATIVE {
            fx / derivative
        } else {
            let denom = fx - fx_prev;
            if denom.abs() < MIN_SECANT_DENOM {
                fx.signum() * FALLBACK_STEP
            } else {
                (x - x_prev) * fx / denom
            }
        };

        let step = step.clamp(-MAX_STEP, MAX_STEP);
        x_prev = x;
        fx_prev = fx;
        x -= step;
    }

    x
}

/// Bisection on `[lo, hi]`.
///
/// Returns `None` when `f(lo)` and `f(hi)` have the same sign (or either is
/// non-finite).
pub fn bisect<F>(f: F, mut lo: f64, mut hi: f64, tolerance: f64) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let mut f_lo = f(lo);
    let f_hi = f(hi);
    if !(f_lo.is_finite() && f_hi.is_finite()) || f_lo * f_hi > 0.0 {
        return None;
    }

    for _ in 0..200 {
        if hi - lo <= tolerance {
            break;
        }
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if f_lo * f_mid <= 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }

    Some(0.5 * (lo + hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fzero_linear_root() {
        let root = fzero(|x| x - 3.0, 0.0, &RootOptions::default());
        assert!((root - 3.0).abs() < 1e-6, "got {root}");
    }

    #[test]
    fn fzero_smooth_nonlinear_root() {
        let root = fzero(|x| x * x - 2.0, 1.0, &RootOptions::default());
        assert!((root - 2.0_f64.sqrt()).abs() < 1e-6, "got {root}");

        let root = fzero(|x: f64| x.cos() - x, 0.5, &RootOptions::default());
        assert!((root.cos() - root).abs() < 1e-6, "got {root}");
    }

    #[test]
    fn fzero_steps_are_damped() {
        // A single undamped Newton step from 0 would land on 100 directly; the
        // clamp limits progress to one unit per iteration.
        let opts = RootOptions {
            tolerance: 1e-9,
            max_iterations: 5,
        };
        let x = fzero(|x| x - 100.0, 0.0, &opts);
        assert!((x - 5.0).abs() < 1e-6, "got {x}");
    }

    #[test]
    fn fzero_returns_previous_iterate_on_non_finite() {
        let x = fzero(|x: f64| if x > 0.5 { f64::NAN } else { x - 1.0 }, 0.0, &RootOptions::default());
        assert!(x.is_finite());
        assert!(x <= 0.5, "got {x}");
    }

    #[test]
    fn bisect_finds_bracketed_root() {
        let root = bisect(|x| x * x * x - 0.125, 0.0, 1.0, 1e-14).unwrap();
        assert!((root - 0.5).abs() < 1e-12);
    }

    #[test]
    fn bisect_rejects_missing_sign_change() {
        assert!(bisect(|x| x * x + 1.0, -1.0, 1.0, 1e-12).is_none());
    }
}
