//! Reporting utilities: formatted terminal output of fits and batches.

pub mod format;

pub use format::*;
