//! Constraint rows emitted for the joints, and the functions computing them.

pub use self::joint_constraint::*;

mod joint_constraint;
