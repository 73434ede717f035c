//! Dense linear solver.
//!
//! The fitter only ever solves the 2×2 normal equations for the coefficients
//! `A` and `B`, but the routine is written for square systems of any size.
//!
//! Singular systems are not special-cased: the division by a zero pivot yields
//! `NaN`/`Inf` components, which then surface as a degenerate residual in the
//! fitter. This is cheaper to reason about than an `Option` on a path that is
//! evaluated thousands of times per fit.

use nalgebra::{DMatrix, DVector};

/// Solve `a · x = b` by Gaussian elimination with partial pivoting.
///
/// # Panics
/// Panics if `a` is not square or `b` does not have `a.nrows()` entries.
pub fn solve_linear(a: &DMatrix<f64>, b: &DVector<f64>) -> DVector<f64> {
    let n = a.nrows();
    assert_eq!(a.ncols(), n, "solve_linear expects a square matrix");
    assert_eq!(b.len(), n, "right-hand side length must match the matrix");

    // Augmented matrix [a | b].
    let mut aug = DMatrix::<f64>::zeros(n, n + 1);
    for i in 0..n {
        for j in 0..n {
            aug[(i, j)] = a[(i, j)];
        }
        aug[(i, n)] = b[i];
    }

    // Forward elimination.
    for i in 0..n {
        let mut pivot_row = i;
        for k in (i + 1)..n {
            if aug[(k, i)].abs() > aug[(pivot_row, i)].abs() {
                pivot_row = k;
            }
        }
        aug.swap_rows(i, pivot_row);

        for k in (i + 1)..n {
            let factor = aug[(k, i)] / aug[(i, i)];
            for j in i..=n {
                let upper = aug[(i, j)];
                aug[(k, j)] -= factor * upper;
            }
        }
    }

    // Back substitution.
    let mut x = DVector::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut acc = aug[(i, n)];
        for j in (i + 1)..n {
            acc -= aug[(i, j)] * x[j];
        }
        x[i] = acc / aug[(i, i)];
    }

    x
}
