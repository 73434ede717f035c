//! Input/output helpers.
//!
//! - batch measurement files (`measurement`)

pub mod measurement;

pub use measurement::*;
