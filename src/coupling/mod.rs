//! Conversion of raw prism-coupler angle readings into effective indices.

pub mod angles;

pub use angles::*;
