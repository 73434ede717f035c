//! Synthetic data generation (forward model + measurement noise).

pub mod synth;

pub use synth::*;
