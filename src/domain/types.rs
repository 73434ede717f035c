//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - read from measurement files
//! - printed as JSON for downstream plotting/export tools

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sentinel `alpha_hint` requesting auto-estimation of the shape exponent.
pub const AUTO_ALPHA: f64 = -100.0;

/// Sentinel `gamma_hint` requesting auto-estimation of the ratio `B/A`.
pub const AUTO_GAMMA: f64 = 0.0;

/// Relative permittivity of the ambient medium above the guide (air).
pub const AMBIENT_DIELECTRIC: f64 = 1.0;

/// Polarization of the measured mode family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Polarization {
    /// Transverse electric.
    Te,
    /// Transverse magnetic.
    Tm,
}

impl Polarization {
    pub fn display_name(self) -> &'static str {
        match self {
            Polarization::Te => "TE",
            Polarization::Tm => "TM",
        }
    }
}

/// Input of one fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitInput {
    /// Refractive index of the coupling prism.
    pub prism_index: f64,
    /// Mode effective indices, fundamental mode first.
    ///
    /// The position in the list is the mode number.
    pub mode_indices: Vec<f64>,
    /// Effective index deep in the substrate (`Ne`).
    pub substrate_index: f64,
    /// Shape exponent, or [`AUTO_ALPHA`].
    pub alpha_hint: f64,
    /// Ratio `B/A`, or [`AUTO_GAMMA`].
    pub gamma_hint: f64,
    pub polarization: Polarization,
}

impl FitInput {
    pub fn alpha_is_auto(&self) -> bool {
        self.alpha_hint == AUTO_ALPHA
    }

    pub fn gamma_is_auto(&self) -> bool {
        self.gamma_hint == AUTO_GAMMA
    }
}

/// Relative permittivities of the three regions of the model:
/// near-surface guide (`e0`), substrate (`e1`) and ambient (`e2`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dielectric {
    pub e0: f64,
    pub e1: f64,
    pub e2: f64,
}

impl Dielectric {
    /// Build the stack for a candidate surface permittivity.
    pub fn new(e0: f64, substrate_index: f64) -> Self {
        Self {
            e0,
            e1: substrate_index * substrate_index,
            e2: AMBIENT_DIELECTRIC,
        }
    }

    /// `e0 - e1`.
    pub fn contrast(&self) -> f64 {
        self.e0 - self.e1
    }

    /// Index at normalized coordinate `b`: `√(b·(e0 - e1) + e1)`.
    pub fn index_at(&self, b: f64) -> f64 {
        (b * self.contrast() + self.e1).sqrt()
    }
}

/// Linear coefficients of the mode-number model `m = A·b1^α + B·F`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FitCoefficients {
    pub a: f64,
    pub b: f64,
}

impl FitCoefficients {
    pub fn as_array(&self) -> [f64; 2] {
        [self.a, self.b]
    }
}

/// Raw prism-coupler readings, all angles in decimal degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AngleReadings {
    /// Prism base angle.
    pub prism_angle: f64,
    /// Coupling angle of the substrate (radiation-mode edge).
    pub substrate_angle: f64,
    /// Reference ("volume") angle of the bulk material.
    pub volume_angle: f64,
    /// Synchronous coupling angle of each mode, fundamental first.
    pub mode_angles: Vec<f64>,
}

/// Effective indices derived from [`AngleReadings`].
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingIndices {
    pub substrate_index: f64,
    pub mode_indices: Vec<f64>,
}

/// Output of one fit.
///
/// Vectors of the dense profile share one index; vectors of the per-mode
/// results share another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    /// Depth (µm) on the dense grid. Out-of-model points are reported as 0.
    pub z: Vec<f64>,
    /// Reconstructed index on the dense grid.
    pub n: Vec<f64>,
    /// Normalized coordinate of the dense grid (1 down to 1e-4).
    pub b: Vec<f64>,
    /// Depth (µm) of each mode's turning point.
    pub zm: Vec<f64>,
    /// Effective index of each mode as reproduced by the fitted stack.
    pub nm: Vec<f64>,
    /// Normalized coordinate of each mode.
    pub bm: Vec<f64>,
    /// Continuous mode number on the dense grid.
    pub m: Vec<f64>,
    /// Phase-corrected mode orders.
    pub mi: Vec<f64>,
    pub calculated_alpha: f64,
    pub calculated_gamma: f64,
    /// `[A, B]`.
    pub ab: [f64; 2],
    /// Near-surface index `√e0`.
    pub n0: f64,
    /// Weighted sum of squared mode-order residuals.
    pub residual: f64,
    /// Outer minimizer steps taken (0 when both hints were fixed).
    pub iterations: usize,
    pub converged: bool,
}

impl FitResult {
    /// `(z, N)` pairs of the dense profile.
    pub fn depth_profile(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.z.iter().copied().zip(self.n.iter().copied())
    }

    /// `(z, N)` pairs of the measured modes.
    pub fn mode_depths(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.zm.iter().copied().zip(self.nm.iter().copied())
    }

    /// A fit whose scalar outputs contain NaN must be treated as failed.
    pub fn is_degenerate(&self) -> bool {
        !(self.residual.is_finite()
            && self.n0.is_finite()
            && self.calculated_alpha.is_finite()
            && self.ab.iter().all(|v| v.is_finite()))
    }
}

/// Parameters of a synthetic profile for the forward model.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticProfile {
    /// Near-surface index `n0`.
    pub surface_index: f64,
    pub substrate_index: f64,
    pub alpha: f64,
    pub coefficients: FitCoefficients,
    pub polarization: Polarization,
}

/// A run's configuration as understood by the pipeline (derived from CLI flags).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub input: FitInput,
    /// Rows of the decimated profile table in the terminal report.
    pub profile_rows: usize,
    /// Print the result as JSON instead of the text report.
    pub json: bool,
}
