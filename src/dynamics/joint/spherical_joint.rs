use crate::dynamics::{DirtyFlags, JointData, JointLimitCone};
use crate::error_handler::{reject, JointError};
use crate::math::{Isometry, Real};
use na::RealField;

bitflags::bitflags! {
    #[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
    /// Flags enabling the optional features of a [`SphericalJoint`].
    pub struct SphericalJointFlags: u8 {
        /// Enforce the cone limit on the swing.
        const LIMIT_ENABLED = 1 << 0;
    }
}

/// Quantities derived from the configuration of a [`SphericalJoint`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SphericalCache {
    /// `tan(θ/4)` of the cone half-angle about Y.
    pub tan_q_y: Real,
    /// `tan(θ/4)` of the cone half-angle about Z.
    pub tan_q_z: Real,
    /// `tan(θ/4)` of the limit padding.
    pub tan_q_pad: Real,
}

/// A joint that removes all relative translations between two bodies. The rotations are
/// free, optionally limited by an elliptical cone around the X axis.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SphericalJoint {
    pub(crate) data: JointData,
    limit: JointLimitCone,
    flags: SphericalJointFlags,
    pub(crate) cache: SphericalCache,
}

impl SphericalJoint {
    /// Creates a new spherical joint attached to the given frames.
    pub fn new(
        local_frame1: &Isometry<Real>,
        local_frame2: &Isometry<Real>,
    ) -> Result<Self, JointError> {
        let half_pi = Real::frac_pi_2();
        let mut joint = Self {
            data: JointData::new(local_frame1, local_frame2)?,
            limit: JointLimitCone::new(half_pi, half_pi),
            flags: SphericalJointFlags::empty(),
            cache: SphericalCache::default(),
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
    pub fn flags(&self) -> SphericalJointFlags {
        self.flags
    }

    /// Sets the joint flags.
    pub fn set_flags(&mut self, flags: SphericalJointFlags) -> &mut Self {
        self.flags = flags;
        self.data.dirty |= DirtyFlags::MOTION;
        self
    }

    /// The cone limiting the swing.
    #[must_use]
    pub fn limit_cone(&self) -> &JointLimitCone {
        &self.limit
    }

    /// Sets the cone limiting the swing.
    ///
    /// The limit is only enforced with [`SphericalJointFlags::LIMIT_ENABLED`].
    pub fn set_limit_cone(&mut self, limit: JointLimitCone) -> Result<&mut Self, JointError> {
        if !limit.is_valid() {
            return reject(JointError::InvalidLimit("SphericalJoint::set_limit_cone"));
        }

        self.limit = limit;
        self.data.dirty |= DirtyFlags::LIMITS;
        Ok(self)
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

        self.cache = SphericalCache {
            tan_q_y: (self.limit.y_angle / 4.0).tan(),
            tan_q_z: (self.limit.z_angle / 4.0).tan(),
            tan_q_pad: (self.limit.params.padding() / 4.0).tan(),
        };
        self.data.dirty = DirtyFlags::empty();
    }
}
