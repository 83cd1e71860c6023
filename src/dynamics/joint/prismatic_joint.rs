use crate::dynamics::{DirtyFlags, JointData, JointLinearLimitPair, ToleranceScale};
use crate::error_handler::{reject, JointError};
use crate::math::{Isometry, Real};

bitflags::bitflags! {
    #[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
    /// Flags enabling the optional features of a [`PrismaticJoint`].
    pub struct PrismaticJointFlags: u8 {
        /// Enforce the limit on the translation.
        const LIMIT_ENABLED = 1 << 0;
    }
}

/// A joint that removes all relative motion between two bodies, except for the translation
/// along the X axis of the joint frames.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PrismaticJoint {
    pub(crate) data: JointData,
    limit: JointLinearLimitPair,
    flags: PrismaticJointFlags,
}

impl PrismaticJoint {
    /// Creates a new prismatic joint attached to the given frames, sliding along their X
    /// axes.
    ///
    /// The default limit spans the whole real line and is disabled.
    pub fn new(
        scale: &ToleranceScale,
        local_frame1: &Isometry<Real>,
        local_frame2: &Isometry<Real>,
    ) -> Result<Self, JointError> {
        let mut joint = Self {
            data: JointData::new(local_frame1, local_frame2)?,
            limit: JointLinearLimitPair::new(scale, -Real::MAX / 3.0, Real::MAX / 3.0),
            flags: PrismaticJointFlags::empty(),
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
    pub fn flags(&self) -> PrismaticJointFlags {
        self.flags
    }

    /// Sets the joint flags.
    pub fn set_flags(&mut self, flags: PrismaticJointFlags) -> &mut Self {
        self.flags = flags;
        self.data.dirty |= DirtyFlags::MOTION;
        self
    }

    /// The limit of the translation.
    #[must_use]
    pub fn limit(&self) -> &JointLinearLimitPair {
        &self.limit
    }

    /// Sets the limit of the translation.
    ///
    /// The limit is only enforced with [`PrismaticJointFlags::LIMIT_ENABLED`].
    pub fn set_limit(&mut self, limit: JointLinearLimitPair) -> Result<&mut Self, JointError> {
        if !limit.is_valid() {
            return reject(JointError::InvalidLimit("PrismaticJoint::set_limit"));
        }

        self.limit = limit;
        self.data.dirty |= DirtyFlags::LIMITS;
        Ok(self)
    }

    /// The translation of the joint along its axis, given the center-of-mass poses of both
    /// bodies.
    pub fn position(&self, pose1: &Isometry<Real>, pose2: &Isometry<Real>) -> Real {
        self.data.relative_transform(pose1, pose2).translation.vector.x
    }

    /// Has this joint been modified since its cached data was last refreshed?
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.data.dirty.is_empty()
    }

    /// Marks this joint as up to date. A prismatic joint has no other cached data.
    pub fn refresh(&mut self) {
        self.data.dirty = DirtyFlags::empty();
    }
}
