use crate::math::Real;

bitflags::bitflags! {
    #[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
    /// Flags modifying the behavior of a [`JointDrive`].
    pub struct JointDriveFlags: u8 {
        /// The drive stiffness and damping are accelerations, independent of the bodies'
        /// masses, instead of forces.
        const ACCELERATION = 1 << 0;
    }
}

/// A spring-damper pulling a degree of freedom toward a target position and velocity.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct JointDrive {
    /// The spring strength of the drive. Force proportional to the position error.
    pub stiffness: Real,
    /// The damping strength of the drive. Force proportional to the velocity error.
    pub damping: Real,
    /// The maximum impulse the drive can apply on a single step.
    pub force_limit: Real,
    /// The drive flags.
    pub flags: JointDriveFlags,
}

impl Default for JointDrive {
    fn default() -> Self {
        Self {
            stiffness: 0.0,
            damping: 0.0,
            force_limit: Real::MAX,
            flags: JointDriveFlags::empty(),
        }
    }
}

impl JointDrive {
    /// Creates a new drive.
    pub fn new(stiffness: Real, damping: Real, force_limit: Real, is_acceleration: bool) -> Self {
        let flags = if is_acceleration {
            JointDriveFlags::ACCELERATION
        } else {
            JointDriveFlags::empty()
        };
        Self {
            stiffness,
            damping,
            force_limit,
            flags,
        }
    }

    /// Does this drive generate any constraint?
    #[inline]
    pub fn is_active(&self) -> bool {
        self.stiffness != 0.0 || self.damping != 0.0
    }

    /// Checks every coefficient is non-negative and not NaN. The force limit may be infinite.
    pub fn is_valid(&self) -> bool {
        self.stiffness.is_finite()
            && self.stiffness >= 0.0
            && self.damping.is_finite()
            && self.damping >= 0.0
            && self.force_limit >= 0.0
    }
}

/// The drives of a [`D6Joint`](crate::dynamics::D6Joint).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum D6Drive {
    /// Drive along the joint's X axis.
    X = 0,
    /// Drive along the joint's Y axis.
    Y,
    /// Drive along the joint's Z axis.
    Z,
    /// Drive of the swing, i.e., the rotation orthogonal to the X axis.
    Swing,
    /// Drive of the twist, i.e., the rotation about the X axis.
    Twist,
    /// Drive of the whole relative rotation, by spherical interpolation.
    ///
    /// Only effective when no angular degree of freedom is locked. It takes precedence
    /// over the `Swing` and `Twist` drives.
    Slerp,
}

impl D6Drive {
    /// The number of D6 drives.
    pub const COUNT: usize = 6;
}
