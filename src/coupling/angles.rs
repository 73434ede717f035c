//! Prism-coupler geometry: coupling angles to effective indices.
//!
//! With prism base angle `P`, substrate coupling angle `S` and prism index
//! `np`, the reading at angle `θ` maps to
//!
//! ```text
//! ε  = S - P
//! sa = sin(P - θ)
//! N  = sa·cos ε + √(np² - sa²)·sin ε
//! ```
//!
//! The substrate index uses the same expression with the volume (bulk
//! reference) angle in place of `θ`.

use tracing::warn;

use crate::domain::{AngleReadings, CouplingIndices};

/// Index substituted when `np² - sa² < 0` (no real refraction angle).
pub const FALLBACK_INDEX: f64 = 1.5;

/// Convert prism-coupler readings to effective indices.
pub fn neff_from_angles(readings: &AngleReadings, prism_index: f64) -> CouplingIndices {
    let eps = (readings.substrate_angle - readings.prism_angle).to_radians();
    let (se, ce) = eps.sin_cos();

    let index_at = |angle: f64| -> f64 {
        let sa = (readings.prism_angle - angle).to_radians().sin();
        let radicand = prism_index * prism_index - sa * sa;
        if radicand < 0.0 {
            warn!(angle, prism_index, "no real refraction angle, substituting fallback index {FALLBACK_INDEX}");
            return FALLBACK_INDEX;
        }
        sa * ce + radicand.sqrt() * se
    };

    CouplingIndices {
        substrate_index: index_at(readings.volume_angle),
        mode_indices: readings.mode_angles.iter().map(|&a| index_at(a)).collect(),
    }
}
