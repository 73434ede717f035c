//! `prism-profile` library crate.
//!
//! Estimates the refractive-index depth profile of a graded optical waveguide
//! from the effective indices of its guided modes, as measured with a coupling
//! prism. The binary (`prism`) is a thin wrapper around this library so that:
//!
//! - the fitting engine is testable without spawning processes
//! - the engine can be embedded in other front-ends

pub mod app;
pub mod cli;
pub mod coupling;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod report;
