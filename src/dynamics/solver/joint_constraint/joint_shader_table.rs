use super::constraint_row::{JointRows, SolverPrepOutput};
use super::d6_joint_constraint::{d6_project, d6_solver_prep};
use super::fixed_joint_constraint::{fixed_project, fixed_solver_prep};
use super::joint_projection::ProjectedBody;
use super::prismatic_joint_constraint::{prismatic_project, prismatic_solver_prep};
use super::revolute_joint_constraint::{revolute_project, revolute_solver_prep};
use super::spherical_joint_constraint::{spherical_project, spherical_solver_prep};
use crate::dynamics::{D6Joint, FixedJoint, PrismaticJoint, RevoluteJoint, SphericalJoint};
use crate::math::{Isometry, Real};

bitflags::bitflags! {
    #[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
    /// Static properties of a joint kind.
    pub struct ConstraintFlags: u8 {
        /// The solver-prep function of this joint kind can run on a GPU solver.
        const GPU_COMPATIBLE = 1 << 0;
    }
}

/// Signature of the function appending the constraint rows of a joint of type `J`.
pub type SolverPrepFn<J> =
    fn(&J, &mut JointRows, &Isometry<Real>, &Isometry<Real>) -> SolverPrepOutput;
/// Signature of the function projecting the bodies of a joint of type `J`.
pub type ProjectFn<J> = fn(&J, &mut Isometry<Real>, &mut Isometry<Real>, ProjectedBody) -> bool;

/// The functions a solver calls for every joint of type `J`.
pub struct JointShaderTable<J> {
    /// Appends the constraint rows of a joint.
    pub solver_prep: SolverPrepFn<J>,
    /// Projects the bodies of a joint back within its tolerances.
    pub project: ProjectFn<J>,
    /// Static properties of this joint kind.
    pub flags: ConstraintFlags,
}

impl<J> Copy for JointShaderTable<J> {}
impl<J> Clone for JointShaderTable<J> {
    fn clone(&self) -> Self {
        *self
    }
}

impl D6Joint {
    /// The solver functions of D6 joints.
    pub const SHADERS: JointShaderTable<Self> = JointShaderTable {
        solver_prep: d6_solver_prep,
        project: d6_project,
        flags: ConstraintFlags::GPU_COMPATIBLE,
    };
}

impl RevoluteJoint {
    /// The solver functions of revolute joints.
    pub const SHADERS: JointShaderTable<Self> = JointShaderTable {
        solver_prep: revolute_solver_prep,
        project: revolute_project,
        flags: ConstraintFlags::GPU_COMPATIBLE,
    };
}

impl PrismaticJoint {
    /// The solver functions of prismatic joints.
    pub const SHADERS: JointShaderTable<Self> = JointShaderTable {
        solver_prep: prismatic_solver_prep,
        project: prismatic_project,
        flags: ConstraintFlags::GPU_COMPATIBLE,
    };
}

impl SphericalJoint {
    /// The solver functions of spherical joints.
    pub const SHADERS: JointShaderTable<Self> = JointShaderTable {
        solver_prep: spherical_solver_prep,
        project: spherical_project,
        flags: ConstraintFlags::GPU_COMPATIBLE,
    };
}

impl FixedJoint {
    /// The solver functions of fixed joints.
    pub const SHADERS: JointShaderTable<Self> = JointShaderTable {
        solver_prep: fixed_solver_prep,
        project: fixed_project,
        flags: ConstraintFlags::GPU_COMPATIBLE,
    };
}
