use crate::dynamics::solver::{ConstraintFlags, JointRows, ProjectedBody, SolverPrepOutput};
use crate::dynamics::{D6Joint, FixedJoint, JointData, PrismaticJoint, RevoluteJoint, SphericalJoint};
use crate::math::{Isometry, Real};

/// The kind of a joint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum JointKind {
    /// A [`D6Joint`].
    D6,
    /// A [`RevoluteJoint`].
    Revolute,
    /// A [`PrismaticJoint`].
    Prismatic,
    /// A [`SphericalJoint`].
    Spherical,
    /// A [`FixedJoint`].
    Fixed,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
/// An enum grouping all possible types of joints.
pub enum JointParams {
    /// A joint where each relative degree of freedom can be locked, limited or free, and
    /// driven.
    D6Joint(D6Joint),
    /// A joint that removes all relative degrees of freedom between the affected bodies
    /// except for the rotation about one axis.
    RevoluteJoint(RevoluteJoint),
    /// A joint that removes all relative degrees of freedom between the affected bodies
    /// except for the translation along one axis.
    PrismaticJoint(PrismaticJoint),
    /// A joint that removes all relative linear degrees of freedom between the affected
    /// bodies.
    SphericalJoint(SphericalJoint),
    /// A joint that removes all relative degrees of freedom between the affected bodies.
    FixedJoint(FixedJoint),
}

macro_rules! dispatch {
    ($self: expr, $j: ident => $e: expr) => {
        match $self {
            JointParams::D6Joint($j) => $e,
            JointParams::RevoluteJoint($j) => $e,
            JointParams::PrismaticJoint($j) => $e,
            JointParams::SphericalJoint($j) => $e,
            JointParams::FixedJoint($j) => $e,
        }
    };
}

impl JointParams {
    /// The kind of this joint.
    pub fn kind(&self) -> JointKind {
        match self {
            JointParams::D6Joint(_) => JointKind::D6,
            JointParams::RevoluteJoint(_) => JointKind::Revolute,
            JointParams::PrismaticJoint(_) => JointKind::Prismatic,
            JointParams::SphericalJoint(_) => JointKind::Spherical,
            JointParams::FixedJoint(_) => JointKind::Fixed,
        }
    }

    /// The frames, mass scales and projection tolerances of this joint.
    pub fn data(&self) -> &JointData {
        dispatch!(self, j => j.data())
    }

    /// The frames, mass scales and projection tolerances of this joint, for modification.
    pub fn data_mut(&mut self) -> &mut JointData {
        dispatch!(self, j => j.data_mut())
    }

    /// Has this joint been modified since its cached data was last refreshed?
    pub fn is_dirty(&self) -> bool {
        dispatch!(self, j => j.is_dirty())
    }

    /// Recomputes the cached data used by the solver-prep functions, if needed.
    pub fn refresh(&mut self) {
        dispatch!(self, j => j.refresh())
    }

    /// Static properties of this joint kind.
    pub fn constraint_flags(&self) -> ConstraintFlags {
        match self {
            JointParams::D6Joint(_) => D6Joint::SHADERS.flags,
            JointParams::RevoluteJoint(_) => RevoluteJoint::SHADERS.flags,
            JointParams::PrismaticJoint(_) => PrismaticJoint::SHADERS.flags,
            JointParams::SphericalJoint(_) => SphericalJoint::SHADERS.flags,
            JointParams::FixedJoint(_) => FixedJoint::SHADERS.flags,
        }
    }

    /// Appends the constraint rows of this joint to `rows`, given the world-space
    /// center-of-mass poses of both bodies.
    pub fn solver_prep(
        &self,
        rows: &mut JointRows,
        pose1: &Isometry<Real>,
        pose2: &Isometry<Real>,
    ) -> SolverPrepOutput {
        match self {
            JointParams::D6Joint(j) => (D6Joint::SHADERS.solver_prep)(j, rows, pose1, pose2),
            JointParams::RevoluteJoint(j) => {
                (RevoluteJoint::SHADERS.solver_prep)(j, rows, pose1, pose2)
            }
            JointParams::PrismaticJoint(j) => {
                (PrismaticJoint::SHADERS.solver_prep)(j, rows, pose1, pose2)
            }
            JointParams::SphericalJoint(j) => {
                (SphericalJoint::SHADERS.solver_prep)(j, rows, pose1, pose2)
            }
            JointParams::FixedJoint(j) => (FixedJoint::SHADERS.solver_prep)(j, rows, pose1, pose2),
        }
    }

    /// Moves the `target` body so that this joint's drift is within its projection
    /// tolerances. Returns `true` if a pose was modified.
    pub fn project(
        &self,
        pose1: &mut Isometry<Real>,
        pose2: &mut Isometry<Real>,
        target: ProjectedBody,
    ) -> bool {
        match self {
            JointParams::D6Joint(j) => (D6Joint::SHADERS.project)(j, pose1, pose2, target),
            JointParams::RevoluteJoint(j) => {
                (RevoluteJoint::SHADERS.project)(j, pose1, pose2, target)
            }
            JointParams::PrismaticJoint(j) => {
                (PrismaticJoint::SHADERS.project)(j, pose1, pose2, target)
            }
            JointParams::SphericalJoint(j) => {
                (SphericalJoint::SHADERS.project)(j, pose1, pose2, target)
            }
            JointParams::FixedJoint(j) => (FixedJoint::SHADERS.project)(j, pose1, pose2, target),
        }
    }

    /// Gets a reference to the underlying D6 joint, if `self` is one.
    pub fn as_d6_joint(&self) -> Option<&D6Joint> {
        if let JointParams::D6Joint(j) = self {
            Some(j)
        } else {
            None
        }
    }

    /// Gets a mutable reference to the underlying D6 joint, if `self` is one.
    pub fn as_d6_joint_mut(&mut self) -> Option<&mut D6Joint> {
        if let JointParams::D6Joint(j) = self {
            Some(j)
        } else {
            None
        }
    }

    /// Gets a reference to the underlying revolute joint, if `self` is one.
    pub fn as_revolute_joint(&self) -> Option<&RevoluteJoint> {
        if let JointParams::RevoluteJoint(j) = self {
            Some(j)
        } else {
            None
        }
    }

    /// Gets a mutable reference to the underlying revolute joint, if `self` is one.
    pub fn as_revolute_joint_mut(&mut self) -> Option<&mut RevoluteJoint> {
        if let JointParams::RevoluteJoint(j) = self {
            Some(j)
        } else {
            None
        }
    }

    /// Gets a reference to the underlying prismatic joint, if `self` is one.
    pub fn as_prismatic_joint(&self) -> Option<&PrismaticJoint> {
        if let JointParams::PrismaticJoint(j) = self {
            Some(j)
        } else {
            None
        }
    }

    /// Gets a mutable reference to the underlying prismatic joint, if `self` is one.
    pub fn as_prismatic_joint_mut(&mut self) -> Option<&mut PrismaticJoint> {
        if let JointParams::PrismaticJoint(j) = self {
            Some(j)
        } else {
            None
        }
    }

    /// Gets a reference to the underlying spherical joint, if `self` is one.
    pub fn as_spherical_joint(&self) -> Option<&SphericalJoint> {
        if let JointParams::SphericalJoint(j) = self {
            Some(j)
        } else {
            None
        }
    }

    /// Gets a mutable reference to the underlying spherical joint, if `self` is one.
    pub fn as_spherical_joint_mut(&mut self) -> Option<&mut SphericalJoint> {
        if let JointParams::SphericalJoint(j) = self {
            Some(j)
        } else {
            None
        }
    }

    /// Gets a reference to the underlying fixed joint, if `self` is one.
    pub fn as_fixed_joint(&self) -> Option<&FixedJoint> {
        if let JointParams::FixedJoint(j) = self {
            Some(j)
        } else {
            None
        }
    }
}

impl From<D6Joint> for JointParams {
    fn from(j: D6Joint) -> Self {
        JointParams::D6Joint(j)
    }
}

impl From<RevoluteJoint> for JointParams {
    fn from(j: RevoluteJoint) -> Self {
        JointParams::RevoluteJoint(j)
    }
}

impl From<PrismaticJoint> for JointParams {
    fn from(j: PrismaticJoint) -> Self {
        JointParams::PrismaticJoint(j)
    }
}

impl From<SphericalJoint> for JointParams {
    fn from(j: SphericalJoint) -> Self {
        JointParams::SphericalJoint(j)
    }
}

impl From<FixedJoint> for JointParams {
    fn from(j: FixedJoint) -> Self {
        JointParams::FixedJoint(j)
    }
}

/// One of the two bodies attached by a joint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum JointBody {
    /// The static world frame. Its pose is always the identity.
    World,
    /// The body whose pose is at the given index of the pose buffers passed to
    /// [`JointSet`](crate::dynamics::JointSet).
    Body(usize),
}

impl JointBody {
    /// The world-space center-of-mass pose of this body.
    ///
    /// # Panics
    /// If this is a body index out of the bounds of `poses`.
    pub fn pose(self, poses: &[Isometry<Real>]) -> Isometry<Real> {
        match self {
            JointBody::World => Isometry::identity(),
            JointBody::Body(i) => poses[i],
        }
    }
}

#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
/// A joint attached to two bodies.
pub struct Joint {
    /// The first body attached to this joint.
    pub body1: JointBody,
    /// The second body attached to this joint.
    pub body2: JointBody,
    /// The joint geometric parameters.
    pub params: JointParams,
}
