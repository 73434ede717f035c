//! Profile model: mode orders, the mode-number dispersion relation and its
//! inversion to depth.
//!
//! Models are implemented as small, pure functions so that the fitter can stay
//! a straight pipeline.

pub mod modes;
pub mod profile;

pub use modes::*;
pub use profile::*;
