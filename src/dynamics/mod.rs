//! Structures related to dynamics: joints, their limits and drives, and the solver-prep of
//! their constraints.

pub use self::joint::*;
pub use self::tolerance_scale::ToleranceScale;

mod joint;
pub mod solver;
mod tolerance_scale;
