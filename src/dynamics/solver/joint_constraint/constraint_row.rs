use crate::dynamics::InvMassScale;
use crate::math::{Real, Vector};
use arrayvec::ArrayVec;

/// The maximum number of rows a single joint can emit on a single step.
pub const MAX_JOINT_ROWS: usize = 16;

/// The buffer a joint writes its constraint rows into.
pub type JointRows = ArrayVec<ConstraintRow, MAX_JOINT_ROWS>;

bitflags::bitflags! {
    #[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
    /// Flags controlling how the solver treats a constraint row.
    pub struct RowFlags: u16 {
        /// The row is a spring: use `RowModifiers::Spring`.
        const SPRING = 1 << 0;
        /// The spring coefficients are accelerations, not forces.
        const ACCELERATION_SPRING = 1 << 1;
        /// The row bounces: use the restitution of `RowModifiers::Bounce`.
        const RESTITUTION = 1 << 2;
        /// Keep the positional bias while the error is positive.
        const KEEP_BIAS = 1 << 3;
        /// The impulse applied by this row contributes to the joint's reported force.
        const OUTPUT_FORCE = 1 << 4;
        /// The impulse bounds of this row are the force limit of a drive.
        const HAS_DRIVE_LIMIT = 1 << 5;
    }
}

/// A hint letting the solver batch rows of the same kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum SolveHint {
    /// No particular structure.
    #[default]
    None,
    /// One of the three rows of a SLERP drive.
    SlerpSpring,
    /// A bilateral hard constraint.
    Equality,
    /// A unilateral hard constraint.
    Inequality,
}

/// Coefficients modifying the behavior of a row.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum RowModifiers {
    /// A plain rigid row.
    #[default]
    None,
    /// The row of a soft limit or of a drive.
    Spring {
        /// The spring stiffness.
        stiffness: Real,
        /// The spring damping.
        damping: Real,
    },
    /// The row of a hard limit.
    Bounce {
        /// The restitution coefficient, in `[0, 1]`.
        restitution: Real,
        /// Relative velocity below which the row does not bounce.
        velocity_threshold: Real,
    },
}

/// A one-dimensional constraint row consumed by the solver.
///
/// The constrained velocity is
/// `linear0 · v1 + angular0 · ω1 - linear1 · v2 - angular1 · ω2`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ConstraintRow {
    /// Linear part of the Jacobian of the first body.
    pub linear0: Vector<Real>,
    /// Angular part of the Jacobian of the first body.
    pub angular0: Vector<Real>,
    /// Linear part of the Jacobian of the second body.
    pub linear1: Vector<Real>,
    /// Angular part of the Jacobian of the second body.
    pub angular1: Vector<Real>,
    /// The positional error the solver drives toward zero.
    pub geometric_error: Real,
    /// The target relative velocity along the row.
    pub velocity_target: Real,
    /// The minimum impulse the row may apply.
    pub min_impulse: Real,
    /// The maximum impulse the row may apply.
    pub max_impulse: Real,
    /// Hint for the solver.
    pub solve_hint: SolveHint,
    /// Spring or bounce coefficients.
    pub modifiers: RowModifiers,
    /// Row flags.
    pub flags: RowFlags,
}

impl Default for ConstraintRow {
    fn default() -> Self {
        Self {
            linear0: Vector::zeros(),
            angular0: Vector::zeros(),
            linear1: Vector::zeros(),
            angular1: Vector::zeros(),
            geometric_error: 0.0,
            velocity_target: 0.0,
            min_impulse: -Real::MAX,
            max_impulse: Real::MAX,
            solve_hint: SolveHint::None,
            modifiers: RowModifiers::None,
            flags: RowFlags::empty(),
        }
    }
}

impl ConstraintRow {
    /// Does this row constrain a relative translation?
    #[inline]
    pub fn is_linear(&self) -> bool {
        self.linear0 != Vector::zeros() || self.linear1 != Vector::zeros()
    }

    /// Is this row a limit, soft or hard?
    #[inline]
    pub fn is_limit(&self) -> bool {
        self.min_impulse == 0.0 && !self.flags.contains(RowFlags::HAS_DRIVE_LIMIT)
    }

    /// Is this row a drive?
    #[inline]
    pub fn is_drive(&self) -> bool {
        self.flags.contains(RowFlags::HAS_DRIVE_LIMIT)
    }
}

/// The per-joint data returned by a solver-prep function alongside its rows.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SolverPrepOutput {
    /// World-space offset from the first body's center of mass to the joint anchor.
    pub body1_world_offset: Vector<Real>,
    /// The mass scales the solver must apply to this joint's bodies.
    pub inv_mass_scale: InvMassScale,
}
