//! Numerical building blocks: special functions, root finding, dense linear
//! solves and the basis functions of the mode-number model.

pub mod basis;
pub mod gamma;
pub mod linear;
pub mod roots;

pub use basis::*;
pub use gamma::*;
pub use linear::*;
pub use roots::*;
