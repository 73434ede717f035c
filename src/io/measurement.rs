//! Batch measurement files (JSON).
//!
//! A measurement file carries shared settings (prism index, polarization, hints)
//! and a list of samples. Each sample provides either effective indices
//! directly or raw prism-coupler angles, and may override any shared setting:
//!
//! ```json
//! {
//!   "prism_index": 2.5,
//!   "polarization": "te",
//!   "samples": [
//!     { "name": "wafer-1", "mode_indices": [1.72, 1.70, 1.68], "substrate_index": 1.65 },
//!     { "name": "wafer-2", "polarization": "tm",
//!       "angles": { "prism_angle": 60, "substrate_angle": 105,
//!                   "volume_angle": 20, "mode_angles": [30, 25, 22] } }
//!   ]
//! }
//! ```

use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::coupling::neff_from_angles;
use crate::domain::{AUTO_ALPHA, AUTO_GAMMA, AngleReadings, FitInput, Polarization};
use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeasurementFile {
    /// Shared prism index; falls back to the CLI/environment default.
    #[serde(default)]
    pub prism_index: Option<f64>,
    #[serde(default = "default_polarization")]
    pub polarization: Polarization,
    #[serde(default = "default_alpha_hint")]
    pub alpha_hint: f64,
    #[serde(default = "default_gamma_hint")]
    pub gamma_hint: f64,
    pub samples: Vec<Sample>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sample {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mode_indices: Option<Vec<f64>>,
    #[serde(default)]
    pub substrate_index: Option<f64>,
    #[serde(default)]
    pub angles: Option<AngleReadings>,
    #[serde(default)]
    pub prism_index: Option<f64>,
    #[serde(default)]
    pub polarization: Option<Polarization>,
    #[serde(default)]
    pub alpha_hint: Option<f64>,
    #[serde(default)]
    pub gamma_hint: Option<f64>,
}

/// A sample resolved into engine input.
#[derive(Debug, Clone)]
pub struct ResolvedSample {
    pub name: String,
    pub input: FitInput,
}

fn default_polarization() -> Polarization {
    Polarization::Te
}

fn default_alpha_hint() -> f64 {
    AUTO_ALPHA
}

fn default_gamma_hint() -> f64 {
    AUTO_GAMMA
}

/// Read and parse a measurement file.
pub fn read_measurement_file(path: &Path) -> Result<MeasurementFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open measurement file '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid measurement file: {e}")))
}

/// Parse a measurement file from a JSON string.
pub fn parse_measurement_file(json: &str) -> Result<MeasurementFile, AppError> {
    serde_json::from_str(json).map_err(|e| AppError::new(2, format!("Invalid measurement file: {e}")))
}

impl MeasurementFile {
    /// Resolve every sample into a `FitInput`, in file order.
    ///
    /// Errors with code 3 when there is nothing to fit and code 2 for a sample
    /// that is ill-formed.
    pub fn resolve(&self, default_prism_index: f64) -> Result<Vec<ResolvedSample>, AppError> {
        if self.samples.is_empty() {
            return Err(AppError::new(3, "Measurement file contains no samples."));
        }
        self.samples
            .iter()
            .enumerate()
            .map(|(i, sample)| self.resolve_sample(i, sample, default_prism_index))
            .collect()
    }

    fn resolve_sample(&self, i: usize, sample: &Sample, default_prism_index: f64) -> Result<ResolvedSample, AppError> {
        let name = sample.name.clone().unwrap_or_else(|| format!("sample-{}", i + 1));
        let prism_index = sample.prism_index.or(self.prism_index).unwrap_or(default_prism_index);

        let (mode_indices, substrate_index) = match (&sample.mode_indices, sample.substrate_index, &sample.angles) {
            (Some(modes), Some(ne), None) => (modes.clone(), ne),
            (None, None, Some(angles)) => {
                let indices = neff_from_angles(angles, prism_index);
                (indices.mode_indices, indices.substrate_index)
            }
            (Some(_), None, None) => {
                return Err(AppError::new(2, format!("Sample '{name}': mode_indices given without substrate_index.")));
            }
            _ => {
                return Err(AppError::new(
                    2,
                    format!("Sample '{name}': give either mode_indices + substrate_index or angles."),
                ));
            }
        };

        Ok(ResolvedSample {
            name,
            input: FitInput {
                prism_index,
                mode_indices,
                substrate_index,
                alpha_hint: sample.alpha_hint.unwrap_or(self.alpha_hint),
                gamma_hint: sample.gamma_hint.unwrap_or(self.gamma_hint),
                polarization: sample.polarization.unwrap_or(self.polarization),
            },
        })
    }
}
