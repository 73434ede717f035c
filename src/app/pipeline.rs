//! Shared fit workflows used by the subcommands.
//!
//! Keeping these in one place keeps the command handlers focused on
//! presentation (text report vs JSON):
//! - single fit: input -> fit -> result
//! - angles: readings -> effective indices -> single fit
//! - batch: measurement file -> resolved samples -> parallel fits
//! - simulate: synthetic profile -> mode indices (+ noise)

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::coupling::neff_from_angles;
use crate::data::{add_index_noise, synthesize_modes};
use crate::domain::{AngleReadings, FitConfig, FitInput, FitResult, SyntheticProfile};
use crate::error::AppError;
use crate::fit::fit_profile;
use crate::io::MeasurementFile;

/// All computed outputs of a single fit run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub input: FitInput,
    pub result: FitResult,
}

/// Outcome of one batch sample. A failed fit does not abort the batch.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub name: String,
    pub input: FitInput,
    pub outcome: Result<FitResult, AppError>,
}

/// JSON shape of a batch entry.
#[derive(Debug, Serialize)]
pub struct BatchRecord<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'a FitResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn record(&self) -> BatchRecord<'_> {
        BatchRecord {
            name: &self.name,
            result: self.outcome.as_ref().ok(),
            error: self.outcome.as_ref().err().map(|e| e.to_string()),
        }
    }
}

/// Execute one fit.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let result = fit_profile(&config.input)?;
    Ok(RunOutput {
        input: config.input.clone(),
        result,
    })
}

/// Convert angle readings with the configured prism index, then fit.
///
/// The mode and substrate indices of `config.input` are replaced by the
/// converted values.
pub fn run_angles(readings: &AngleReadings, config: &FitConfig) -> Result<RunOutput, AppError> {
    let indices = neff_from_angles(readings, config.input.prism_index);
    info!(
        substrate = indices.substrate_index,
        modes = ?indices.mode_indices,
        "converted coupling angles"
    );

    let config = FitConfig {
        input: FitInput {
            mode_indices: indices.mode_indices,
            substrate_index: indices.substrate_index,
            ..config.input.clone()
        },
        ..config.clone()
    };
    run_fit(&config)
}

/// Fit every sample of a measurement file in parallel; entries keep file order.
pub fn run_batch(file: &MeasurementFile, default_prism_index: f64) -> Result<Vec<BatchEntry>, AppError> {
    let samples = file.resolve(default_prism_index)?;
    info!(samples = samples.len(), "starting batch");

    let entries = samples
        .into_par_iter()
        .map(|sample| {
            let outcome = fit_profile(&sample.input);
            BatchEntry {
                name: sample.name,
                input: sample.input,
                outcome,
            }
        })
        .collect();

    Ok(entries)
}

/// Mode indices of a synthetic profile, optionally with seeded Gaussian noise.
pub fn run_simulate(profile: &SyntheticProfile, count: usize, noise: f64, seed: u64) -> Result<Vec<f64>, AppError> {
    let modes = synthesize_modes(profile, count)?;
    add_index_noise(&modes, noise, seed)
}
