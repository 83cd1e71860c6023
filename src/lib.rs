//! # rapier3d-joint-prep
//!
//! Joint constraint preparation for 3D rigid-body solvers.
//!
//! Given a declarative description of a joint (which relative degrees of freedom between
//! two bodies are locked, limited, or free, plus the limits and drives applied to them),
//! this crate computes, at every simulation step, the one-dimensional constraint rows a
//! sequential-impulse solver needs to enforce that joint. After the solver ran, it can also
//! project the bodies' poses back within a tolerance of the joint's locked configuration.
//!
//! The supported joints are the generic six-degrees-of-freedom [`D6Joint`](dynamics::D6Joint),
//! the [`RevoluteJoint`](dynamics::RevoluteJoint), the [`PrismaticJoint`](dynamics::PrismaticJoint),
//! the [`SphericalJoint`](dynamics::SphericalJoint) and the [`FixedJoint`](dynamics::FixedJoint).

#![deny(bare_trait_objects)]
#![warn(missing_docs)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::module_inception)]

pub extern crate nalgebra as na;
#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;

#[cfg(feature = "parallel")]
pub use rayon;

#[allow(unused_macros)]
macro_rules! par_iter_mut {
    ($t: expr) => {{
        #[cfg(not(feature = "parallel"))]
        let it = $t.iter_mut();

        #[cfg(feature = "parallel")]
        let it = $t.par_iter_mut();
        it
    }};
}

pub(crate) const INVALID_U32: u32 = u32::MAX;

/// The string version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod data;
pub mod dynamics;
pub mod error_handler;
pub mod utils;

/// Elementary mathematical entities (vectors, matrices, isometries, etc).
pub mod math {
    /// The scalar type used throughout this crate.
    #[cfg(not(feature = "f64"))]
    pub type Real = f32;
    /// The scalar type used throughout this crate.
    #[cfg(feature = "f64")]
    pub type Real = f64;

    /// The dimension of the space.
    pub const DIM: usize = 3;
    /// The maximum number of rotational degrees of freedom of a rigid-body.
    pub const ANG_DIM: usize = 3;
    /// The maximum number of possible rotations and translations of a rigid body.
    pub const SPATIAL_DIM: usize = 6;

    /// The vector type.
    pub type Vector<N> = na::Vector3<N>;
    /// The point type.
    pub type Point<N> = na::Point3<N>;
    /// The unit quaternion type used for orientations.
    pub type Rotation<N> = na::UnitQuaternion<N>;
    /// The translation type.
    pub type Translation<N> = na::Translation3<N>;
    /// The transformation type: a rotation followed by a translation.
    pub type Isometry<N> = na::Isometry3<N>;
    /// The square matrix type.
    pub type Matrix<N> = na::Matrix3<N>;
}

/// Prelude containing the common types defined by this crate.
pub mod prelude {
    pub use crate::dynamics::*;
    pub use crate::error_handler::JointError;
    pub use crate::math::*;
    pub use na::{point, vector};
    pub extern crate nalgebra;
}
