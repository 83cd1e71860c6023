use crate::dynamics::{DirtyFlags, JointAngularLimitPair, JointData};
use crate::error_handler::{reject, JointError};
use crate::math::{Isometry, Real};
use crate::utils::twist_angle;
use na::RealField;

bitflags::bitflags! {
    #[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
    /// Flags enabling the optional features of a [`RevoluteJoint`].
    pub struct RevoluteJointFlags: u8 {
        /// Enforce the limit on the rotation angle.
        const LIMIT_ENABLED = 1 << 0;
        /// Drive the rotation toward the target velocity.
        const DRIVE_ENABLED = 1 << 1;
        /// The drive only accelerates the joint toward its target velocity, never brakes it.
        const DRIVE_FREESPIN = 1 << 2;
    }
}

/// Quantities derived from the configuration of a [`RevoluteJoint`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RevoluteCache {
    /// `tan(θ/4)` of the lower limit.
    pub tq_low: Real,
    /// `tan(θ/4)` of the upper limit.
    pub tq_high: Real,
    /// `tan(θ/4)` of the limit padding.
    pub tq_pad: Real,
}

/// A joint that removes all relative motion between two bodies, except for the rotations
/// about the X axis of the joint frames.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RevoluteJoint {
    pub(crate) data: JointData,
    limit: JointAngularLimitPair,
    drive_velocity: Real,
    drive_force_limit: Real,
    drive_gear_ratio: Real,
    flags: RevoluteJointFlags,
    pub(crate) cache: RevoluteCache,
}

impl RevoluteJoint {
    /// Creates a new revolute joint attached to the given frames, rotating about their X
    /// axes.
    pub fn new(
        local_frame1: &Isometry<Real>,
        local_frame2: &Isometry<Real>,
    ) -> Result<Self, JointError> {
        let mut joint = Self {
            data: JointData::new(local_frame1, local_frame2)?,
            limit: JointAngularLimitPair::new(-Real::frac_pi_2(), Real::frac_pi_2()),
            drive_velocity: 0.0,
            drive_force_limit: Real::MAX,
            drive_gear_ratio: 1.0,
            flags: RevoluteJointFlags::empty(),
            cache: RevoluteCache::default(),
        };
        joint.refresh();
        Ok(joint)
    }

    /// The frames and mass scales of this joint.
    #[must_use]
    pub fn data(&self) -> &JointData {
        &self.data
    }

    /// The frames and mass scales of this joint, for modification.
    pub fn data_mut(&mut self) -> &mut JointData {
        &mut self.data
    }

    /// The joint flags.
    #[must_use]
    pub fn flags(&self) -> RevoluteJointFlags {
        self.flags
    }

    /// Sets the joint flags.
    pub fn set_flags(&mut self, flags: RevoluteJointFlags) -> &mut Self {
        self.flags = flags;
        self.data.dirty |= DirtyFlags::MOTION;
        self
    }

    /// The limit of the rotation angle.
    #[must_use]
    pub fn limit(&self) -> &JointAngularLimitPair {
        &self.limit
    }

    /// Sets the limit of the rotation angle. Both bounds must lie within `(-2π, 2π)`.
    ///
    /// The limit is only enforced with [`RevoluteJointFlags::LIMIT_ENABLED`].
    pub fn set_limit(&mut self, limit: JointAngularLimitPair) -> Result<&mut Self, JointError> {
        if !limit.is_valid() || limit.lower <= -Real::two_pi() || limit.upper >= Real::two_pi() {
            return reject(JointError::InvalidLimit("RevoluteJoint::set_limit"));
        }

        self.limit = limit;
        self.data.dirty |= DirtyFlags::LIMITS;
        Ok(self)
    }

    /// The target angular velocity of the drive.
    #[must_use]
    pub fn drive_velocity(&self) -> Real {
        self.drive_velocity
    }

    /// Sets the target angular velocity of the drive.
    pub fn set_drive_velocity(&mut self, velocity: Real) -> Result<&mut Self, JointError> {
        if !velocity.is_finite() {
            return reject(JointError::InvalidParameter(
                "RevoluteJoint::set_drive_velocity",
            ));
        }

        self.drive_velocity = velocity;
        self.data.dirty |= DirtyFlags::DRIVES;
        Ok(self)
    }

    /// The maximum impulse the drive can apply.
    #[must_use]
    pub fn drive_force_limit(&self) -> Real {
        self.drive_force_limit
    }

    /// Sets the maximum impulse the drive can apply. Must be non-negative.
    pub fn set_drive_force_limit(&mut self, limit: Real) -> Result<&mut Self, JointError> {
        if limit.is_nan() || limit < 0.0 {
            return reject(JointError::InvalidDrive("RevoluteJoint::set_drive_force_limit"));
        }

        self.drive_force_limit = limit;
        self.data.dirty |= DirtyFlags::DRIVES;
        Ok(self)
    }

    /// The ratio between the angular velocities of the second and first bodies targeted by
    /// the drive.
    #[must_use]
    pub fn drive_gear_ratio(&self) -> Real {
        self.drive_gear_ratio
    }

    /// Sets the drive gear ratio. Must be finite and non-negative.
    pub fn set_drive_gear_ratio(&mut self, ratio: Real) -> Result<&mut Self, JointError> {
        if !ratio.is_finite() || ratio < 0.0 {
            return reject(JointError::InvalidParameter(
                "RevoluteJoint::set_drive_gear_ratio",
            ));
        }

        self.drive_gear_ratio = ratio;
        self.data.dirty |= DirtyFlags::DRIVES;
        Ok(self)
    }

    /// The rotation angle of the joint, in `(-π, π]`, given the center-of-mass poses of both
    /// bodies.
    pub fn angle(&self, pose1: &Isometry<Real>, pose2: &Isometry<Real>) -> Real {
        twist_angle(&self.data.relative_transform(pose1, pose2).rotation)
    }

    /// Has this joint been modified since its cached data was last refreshed?
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.data.dirty.is_empty()
    }

    /// Recomputes the cached data used by the solver-prep functions, if needed.
    pub fn refresh(&mut self) {
        if !self.is_dirty() {
            return;
        }

        self.cache = RevoluteCache {
            tq_low: (self.limit.lower / 4.0).tan(),
            tq_high: (self.limit.upper / 4.0).tan(),
            tq_pad: (self.limit.params.padding() / 4.0).tan(),
        };
        self.data.dirty = DirtyFlags::empty();
    }
}
