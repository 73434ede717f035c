//! Profile fitting.
//!
//! Responsibilities:
//!
//! - resolve a `FitInput` into the engine's `FitSetup`
//! - evaluate candidate surface permittivities (`FitState`)
//! - search the surface permittivity and reconstruct the depth profile

pub mod fitter;
pub mod state;

pub use fitter::*;
pub use state::*;
