//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - fit inputs (`FitInput`, `Polarization`, hint sentinels)
//! - the three-region permittivity stack (`Dielectric`)
//! - fit outputs (`FitResult`, `FitCoefficients`)
//! - prism-coupler readings (`AngleReadings`, `CouplingIndices`)

pub mod types;

pub use types::*;
