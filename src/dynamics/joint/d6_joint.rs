use crate::dynamics::joint::joint_data::validated_pose;
use crate::dynamics::{
    D6Drive, DirtyFlags, JointAngularLimitPair, JointAxesMask, JointAxis, JointData, JointDrive,
    JointLimitCone, JointLinearLimit, JointMotion, ToleranceScale,
};
use crate::error_handler::{reject, JointError};
use crate::math::{Isometry, Real, Vector, SPATIAL_DIM};
use crate::utils::{swing_angle, twist_angle};
use na::RealField;

bitflags::bitflags! {
    #[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
    /// The set of drives of a D6 joint generating constraint rows.
    pub struct D6DriveMask: u8 {
        /// Linear drive along X.
        const X = 1 << D6Drive::X as u8;
        /// Linear drive along Y.
        const Y = 1 << D6Drive::Y as u8;
        /// Linear drive along Z.
        const Z = 1 << D6Drive::Z as u8;
        /// Swing drive.
        const SWING = 1 << D6Drive::Swing as u8;
        /// Twist drive.
        const TWIST = 1 << D6Drive::Twist as u8;
        /// SLERP drive.
        const SLERP = 1 << D6Drive::Slerp as u8;
        /// All the linear drives.
        const LINEAR = Self::X.bits() | Self::Y.bits() | Self::Z.bits();
        /// All the angular drives.
        const ANGULAR = Self::SWING.bits() | Self::TWIST.bits() | Self::SLERP.bits();
    }
}

/// Quantities derived from the configuration of a [`D6Joint`], refreshed by
/// [`D6Joint::refresh`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct D6Cache {
    /// The locked degrees of freedom.
    pub locked: JointAxesMask,
    /// The limited degrees of freedom.
    pub limited: JointAxesMask,
    /// The drives generating rows.
    pub driving: D6DriveMask,
    /// `tan(θ/2)` of the swing limit about Y.
    pub th_swing_y: Real,
    /// `tan(θ/2)` of the swing limit about Z.
    pub th_swing_z: Real,
    /// `tan(θ/2)` of the swing limit padding.
    pub th_swing_pad: Real,
    /// `tan(θ/4)` of the swing limit about Y.
    pub tq_swing_y: Real,
    /// `tan(θ/4)` of the swing limit about Z.
    pub tq_swing_z: Real,
    /// `tan(θ/4)` of the swing limit padding.
    pub tq_swing_pad: Real,
    /// `tan(θ/4)` of the lower twist limit.
    pub tq_twist_low: Real,
    /// `tan(θ/4)` of the upper twist limit.
    pub tq_twist_high: Real,
    /// `tan(θ/4)` of the twist limit padding.
    pub tq_twist_pad: Real,
}

/// A generic joint where each of the six relative degrees of freedom can be locked,
/// limited or free, and driven toward a target pose and velocity.
///
/// The translational degrees of freedom are expressed along the axes of the first joint
/// frame. The rotation is decomposed into a twist about the X axis, followed by a swing
/// about an axis orthogonal to X with components about Y (swing1) and Z (swing2).
///
/// All degrees of freedom are locked by default.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct D6Joint {
    pub(crate) data: JointData,
    motion: [JointMotion; SPATIAL_DIM],
    linear_limit: JointLinearLimit,
    twist_limit: JointAngularLimitPair,
    swing_limit: JointLimitCone,
    drives: [JointDrive; D6Drive::COUNT],
    drive_position: Isometry<Real>,
    drive_linear_velocity: Vector<Real>,
    drive_angular_velocity: Vector<Real>,
    linear_min_dist: Real,
    pub(crate) cache: D6Cache,
}

impl D6Joint {
    /// Creates a new D6 joint attached to the given frames, with all its degrees of
    /// freedom locked.
    pub fn new(
        scale: &ToleranceScale,
        local_frame1: &Isometry<Real>,
        local_frame2: &Isometry<Real>,
    ) -> Result<Self, JointError> {
        let half_pi = Real::frac_pi_2();
        let mut joint = Self {
            data: JointData::new(local_frame1, local_frame2)?,
            motion: [JointMotion::Locked; SPATIAL_DIM],
            linear_limit: JointLinearLimit::new(scale, Real::MAX),
            twist_limit: JointAngularLimitPair::new(-half_pi, half_pi),
            swing_limit: JointLimitCone::new(half_pi, half_pi),
            drives: [JointDrive::default(); D6Drive::COUNT],
            drive_position: Isometry::identity(),
            drive_linear_velocity: Vector::zeros(),
            drive_angular_velocity: Vector::zeros(),
            linear_min_dist: scale.linear_min_dist(),
            cache: D6Cache::default(),
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

    /// The motion allowed along the given degree of freedom.
    #[must_use]
    pub fn motion(&self, axis: JointAxis) -> JointMotion {
        self.motion[axis as usize]
    }

    /// Sets the motion allowed along the given degree of freedom.
    pub fn set_motion(&mut self, axis: JointAxis, motion: JointMotion) -> &mut Self {
        self.motion[axis as usize] = motion;
        self.data.dirty |= DirtyFlags::MOTION;
        self
    }

    /// The limit of the distance between the joint frames' origins, along the limited
    /// translational degrees of freedom.
    #[must_use]
    pub fn linear_limit(&self) -> &JointLinearLimit {
        &self.linear_limit
    }

    /// Sets the linear limit.
    pub fn set_linear_limit(&mut self, limit: JointLinearLimit) -> Result<&mut Self, JointError> {
        if !limit.is_valid() {
            return reject(JointError::InvalidLimit("D6Joint::set_linear_limit"));
        }

        self.linear_limit = limit;
        self.data.dirty |= DirtyFlags::LIMITS;
        Ok(self)
    }

    /// The limit of the twist angle.
    #[must_use]
    pub fn twist_limit(&self) -> &JointAngularLimitPair {
        &self.twist_limit
    }

    /// Sets the twist limit. Both bounds must lie within `(-2π, 2π)`.
    pub fn set_twist_limit(
        &mut self,
        limit: JointAngularLimitPair,
    ) -> Result<&mut Self, JointError> {
        if !limit.is_valid() || limit.lower <= -Real::two_pi() || limit.upper >= Real::two_pi() {
            return reject(JointError::InvalidLimit("D6Joint::set_twist_limit"));
        }

        self.twist_limit = limit;
        self.data.dirty |= DirtyFlags::LIMITS;
        Ok(self)
    }

    /// The cone limiting the swing.
    #[must_use]
    pub fn swing_limit(&self) -> &JointLimitCone {
        &self.swing_limit
    }

    /// Sets the swing limit.
    pub fn set_swing_limit(&mut self, limit: JointLimitCone) -> Result<&mut Self, JointError> {
        if !limit.is_valid() {
            return reject(JointError::InvalidLimit("D6Joint::set_swing_limit"));
        }

        self.swing_limit = limit;
        self.data.dirty |= DirtyFlags::LIMITS;
        Ok(self)
    }

    /// The given drive.
    #[must_use]
    pub fn drive(&self, index: D6Drive) -> &JointDrive {
        &self.drives[index as usize]
    }

    /// Sets the given drive.
    pub fn set_drive(&mut self, index: D6Drive, drive: JointDrive) -> Result<&mut Self, JointError> {
        if !drive.is_valid() {
            return reject(JointError::InvalidDrive("D6Joint::set_drive"));
        }

        self.drives[index as usize] = drive;
        self.data.dirty |= DirtyFlags::DRIVES;
        Ok(self)
    }

    /// The target pose of the second joint frame relative to the first one.
    #[must_use]
    pub fn drive_position(&self) -> &Isometry<Real> {
        &self.drive_position
    }

    /// Sets the drive target pose, relative to the first joint frame.
    pub fn set_drive_position(&mut self, pose: &Isometry<Real>) -> Result<&mut Self, JointError> {
        self.drive_position = validated_pose(pose, "D6Joint::set_drive_position")?;
        self.data.dirty |= DirtyFlags::DRIVES;
        Ok(self)
    }

    /// The target linear and angular velocities of the drives, in the first joint frame.
    #[must_use]
    pub fn drive_velocity(&self) -> (Vector<Real>, Vector<Real>) {
        (self.drive_linear_velocity, self.drive_angular_velocity)
    }

    /// Sets the target velocities of the drives, in the first joint frame.
    pub fn set_drive_velocity(
        &mut self,
        linear: &Vector<Real>,
        angular: &Vector<Real>,
    ) -> Result<&mut Self, JointError> {
        if !linear.iter().chain(angular.iter()).all(|e| e.is_finite()) {
            return reject(JointError::InvalidParameter("D6Joint::set_drive_velocity"));
        }

        self.drive_linear_velocity = *linear;
        self.drive_angular_velocity = *angular;
        self.data.dirty |= DirtyFlags::DRIVES;
        Ok(self)
    }

    /// The twist angle of the joint, in `(-π, π]`, given the center-of-mass poses of both
    /// bodies.
    pub fn twist_angle(&self, pose1: &Isometry<Real>, pose2: &Isometry<Real>) -> Real {
        twist_angle(&self.data.relative_transform(pose1, pose2).rotation)
    }

    /// The swing angle of the joint about its Y axis.
    pub fn swing_y_angle(&self, pose1: &Isometry<Real>, pose2: &Isometry<Real>) -> Real {
        swing_angle(&self.data.relative_transform(pose1, pose2).rotation, 1)
    }

    /// The swing angle of the joint about its Z axis.
    pub fn swing_z_angle(&self, pose1: &Isometry<Real>, pose2: &Isometry<Real>) -> Real {
        swing_angle(&self.data.relative_transform(pose1, pose2).rotation, 2)
    }

    /// Has this joint been modified since its cached data was last refreshed?
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.data.dirty.is_empty()
    }

    /// Recomputes the cached data used by the solver-prep functions, if needed.
    ///
    /// This must be called after any modification and before the next solver prep.
    pub fn refresh(&mut self) {
        if !self.is_dirty() {
            return;
        }

        let mut locked = JointAxesMask::empty();
        let mut limited = JointAxesMask::empty();
        for (i, motion) in self.motion.iter().enumerate() {
            let axis = JointAxesMask::from_bits_retain(1 << i);
            match motion {
                JointMotion::Locked => locked |= axis,
                JointMotion::Limited => limited |= axis,
                JointMotion::Free => {}
            }
        }

        let swing = &self.swing_limit;
        let swing_pad = swing.params.padding();
        let twist = &self.twist_limit;
        let twist_pad = twist.params.padding();

        let mut driving = D6DriveMask::empty();
        for (i, drive_bit) in [D6DriveMask::X, D6DriveMask::Y, D6DriveMask::Z]
            .into_iter()
            .enumerate()
        {
            if self.drives[i].is_active() && self.motion[i] != JointMotion::Locked {
                driving |= drive_bit;
            }
        }

        let is_active = |drive: D6Drive| self.drives[drive as usize].is_active();
        if !locked.intersects(JointAxesMask::ANG_AXES) && is_active(D6Drive::Slerp) {
            driving |= D6DriveMask::SLERP;
        } else {
            if !locked.contains(JointAxesMask::TWIST) && is_active(D6Drive::Twist) {
                driving |= D6DriveMask::TWIST;
            }
            if !locked.contains(JointAxesMask::SWING1 | JointAxesMask::SWING2)
                && is_active(D6Drive::Swing)
            {
                driving |= D6DriveMask::SWING;
            }
        }

        self.cache = D6Cache {
            locked,
            limited,
            driving,
            th_swing_y: (swing.y_angle / 2.0).tan(),
            th_swing_z: (swing.z_angle / 2.0).tan(),
            th_swing_pad: (swing_pad / 2.0).tan(),
            tq_swing_y: (swing.y_angle / 4.0).tan(),
            tq_swing_z: (swing.z_angle / 4.0).tan(),
            tq_swing_pad: (swing_pad / 4.0).tan(),
            tq_twist_low: (twist.lower / 4.0).tan(),
            tq_twist_high: (twist.upper / 4.0).tan(),
            tq_twist_pad: (twist_pad / 4.0).tan(),
        };

        log::trace!(
            "Refreshed D6 joint: locked {:?}, limited {:?}, driving {:?}.",
            locked,
            limited,
            driving
        );
        self.data.dirty = DirtyFlags::empty();
    }

    pub(crate) fn drives(&self) -> &[JointDrive; D6Drive::COUNT] {
        &self.drives
    }

    pub(crate) fn drive_targets(&self) -> (&Isometry<Real>, &Vector<Real>, &Vector<Real>) {
        (
            &self.drive_position,
            &self.drive_linear_velocity,
            &self.drive_angular_velocity,
        )
    }

    pub(crate) fn linear_min_dist(&self) -> Real {
        self.linear_min_dist
    }
}
