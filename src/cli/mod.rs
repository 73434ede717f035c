//! Command-line parsing for the prism-coupling profile estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{AUTO_ALPHA, AUTO_GAMMA, Polarization};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "prism", version, about = "Waveguide index-profile estimation from prism-coupler mode indices")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a profile to measured mode effective indices.
    Fit(FitArgs),
    /// Convert prism-coupler angles to effective indices, then fit.
    Angles(AnglesArgs),
    /// Fit every sample of a JSON measurement file (in parallel).
    Batch(BatchArgs),
    /// Print the mode indices of a synthetic profile.
    Simulate(SimulateArgs),
}

/// Fit options shared by `fit` and `angles`.
#[derive(Debug, Args, Clone)]
pub struct FitOptions {
    /// Refractive index of the coupling prism.
    #[arg(long, env = "PRISM_INDEX", default_value_t = 2.5)]
    pub prism_index: f64,

    /// Polarization of the measured modes.
    #[arg(short, long, value_enum, env = "PRISM_POLARIZATION", default_value_t = Polarization::Te)]
    pub polarization: Polarization,

    /// Fixed shape exponent (omit or -100 to estimate it).
    #[arg(long, allow_negative_numbers = true, default_value_t = AUTO_ALPHA)]
    pub alpha: f64,

    /// Fixed ratio B/A (omit or 0 to estimate it).
    #[arg(long, allow_negative_numbers = true, default_value_t = AUTO_GAMMA)]
    pub gamma: f64,

    /// Rows of the profile table in the text report (0 hides it).
    #[arg(long, default_value_t = 20)]
    pub rows: usize,

    /// Print the full result as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Mode effective indices, fundamental first (comma separated).
    #[arg(short, long, value_delimiter = ',', num_args = 1.., required = true)]
    pub modes: Vec<f64>,

    /// Substrate effective index (Ne).
    #[arg(short, long)]
    pub substrate: f64,

    #[command(flatten)]
    pub options: FitOptions,
}

#[derive(Debug, Args, Clone)]
pub struct AnglesArgs {
    /// Prism base angle (degrees).
    #[arg(long, allow_negative_numbers = true)]
    pub prism_angle: f64,

    /// Substrate coupling angle (degrees).
    #[arg(long, allow_negative_numbers = true)]
    pub substrate_angle: f64,

    /// Volume (bulk reference) angle (degrees).
    #[arg(long, allow_negative_numbers = true)]
    pub volume_angle: f64,

    /// Mode coupling angles, fundamental first (degrees, comma separated).
    #[arg(long, value_delimiter = ',', num_args = 1.., required = true, allow_negative_numbers = true)]
    pub mode_angles: Vec<f64>,

    #[command(flatten)]
    pub options: FitOptions,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Measurement file (JSON).
    #[arg(short, long, value_name = "JSON")]
    pub input: PathBuf,

    /// Prism index for samples that do not set one.
    #[arg(long, env = "PRISM_INDEX", default_value_t = 2.5)]
    pub prism_index: f64,

    /// Rows of the profile table per sample (0 prints the overview only).
    #[arg(long, default_value_t = 0)]
    pub rows: usize,

    /// Print all results as a JSON array.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Near-surface index n0.
    #[arg(long)]
    pub surface_index: f64,

    /// Substrate index.
    #[arg(long)]
    pub substrate: f64,

    /// Shape exponent.
    #[arg(long, default_value_t = 1.5)]
    pub alpha: f64,

    /// Coefficient A of the power-law term.
    #[arg(long, default_value_t = 6.0)]
    pub a: f64,

    /// Coefficient B of the logarithmic term.
    #[arg(long, default_value_t = 1.5)]
    pub b: f64,

    /// Number of modes to generate.
    #[arg(long, default_value_t = 4)]
    pub count: usize,

    #[arg(short, long, value_enum, env = "PRISM_POLARIZATION", default_value_t = Polarization::Te)]
    pub polarization: Polarization,

    /// Standard deviation of Gaussian noise added to each index.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
