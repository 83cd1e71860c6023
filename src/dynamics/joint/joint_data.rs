use crate::error_handler::{reject, JointError};
use crate::math::{Isometry, Real};
use na::RealField;

bitflags::bitflags! {
    #[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Hash)]
    /// A set of relative degrees of freedom of a joint.
    pub struct JointAxesMask: u8 {
        /// The translation along the joint's X axis.
        const X = 1 << 0;
        /// The translation along the joint's Y axis.
        const Y = 1 << 1;
        /// The translation along the joint's Z axis.
        const Z = 1 << 2;
        /// The rotation about the joint's X axis.
        const TWIST = 1 << 3;
        /// The rotation about the joint's Y axis.
        const SWING1 = 1 << 4;
        /// The rotation about the joint's Z axis.
        const SWING2 = 1 << 5;
        /// All the translational degrees of freedom.
        const LIN_AXES = Self::X.bits() | Self::Y.bits() | Self::Z.bits();
        /// All the rotational degrees of freedom.
        const ANG_AXES = Self::TWIST.bits() | Self::SWING1.bits() | Self::SWING2.bits();
    }
}

impl JointAxesMask {
    /// The translational degrees of freedom, as a 3-bit mask (X in the lowest bit).
    #[inline]
    pub fn linear_bits(self) -> u8 {
        self.bits() & 0b111
    }

    /// The rotational degrees of freedom, as a 3-bit mask (twist in the lowest bit).
    #[inline]
    pub fn angular_bits(self) -> u8 {
        self.bits() >> 3
    }
}

/// One of the six relative degrees of freedom of a joint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum JointAxis {
    /// The translation along the joint's X axis.
    X = 0,
    /// The translation along the joint's Y axis.
    Y,
    /// The translation along the joint's Z axis.
    Z,
    /// The rotation about the joint's X axis.
    Twist,
    /// The rotation about the joint's Y axis.
    Swing1,
    /// The rotation about the joint's Z axis.
    Swing2,
}

impl From<JointAxis> for JointAxesMask {
    fn from(axis: JointAxis) -> Self {
        JointAxesMask::from_bits_retain(1 << axis as usize)
    }
}

/// How a degree of freedom of a joint may move.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum JointMotion {
    /// The degree of freedom is removed.
    #[default]
    Locked,
    /// The degree of freedom is restricted by a limit.
    Limited,
    /// The degree of freedom is unconstrained.
    Free,
}

bitflags::bitflags! {
    #[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
    /// Which parts of a joint were modified since its cached data was last refreshed.
    pub struct DirtyFlags: u8 {
        /// The motion of one of the degrees of freedom changed.
        const MOTION = 1 << 0;
        /// A limit changed.
        const LIMITS = 1 << 1;
        /// A drive, or drive target, changed.
        const DRIVES = 1 << 2;
        /// A joint or center-of-mass frame, a mass scale or a projection tolerance changed.
        const DATA = 1 << 3;
    }
}

/// Factors applied to the inverse masses and inertias of the bodies attached by a joint,
/// as seen by the solver for this joint only.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct InvMassScale {
    /// Scale of the inverse mass of the first body.
    pub linear1: Real,
    /// Scale of the inverse inertia of the first body.
    pub angular1: Real,
    /// Scale of the inverse mass of the second body.
    pub linear2: Real,
    /// Scale of the inverse inertia of the second body.
    pub angular2: Real,
}

impl Default for InvMassScale {
    fn default() -> Self {
        Self {
            linear1: 1.0,
            angular1: 1.0,
            linear2: 1.0,
            angular2: 1.0,
        }
    }
}

/// The tolerances beyond which a joint's drift is projected away.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct JointProjection {
    /// Is projection enabled for this joint?
    /// (default `false`).
    pub enabled: bool,
    /// The linear drift tolerance.
    /// (default `1.0e10`).
    pub linear_tolerance: Real,
    /// The angular drift tolerance, in `[0, π]`.
    /// (default `π`).
    pub angular_tolerance: Real,
}

impl Default for JointProjection {
    fn default() -> Self {
        Self {
            enabled: false,
            linear_tolerance: 1.0e10,
            angular_tolerance: Real::pi(),
        }
    }
}

/// Checks `pose` is finite with a rotation close to unit length, and renormalizes it.
pub(crate) fn validated_pose(
    pose: &Isometry<Real>,
    context: &'static str,
) -> Result<Isometry<Real>, JointError> {
    let coords = pose.rotation.coords;
    let finite = pose.translation.vector.iter().all(|e| e.is_finite())
        && coords.iter().all(|e| e.is_finite());

    if !finite || (coords.norm() - 1.0).abs() > 1.0e-2 {
        return reject(JointError::InvalidTransform(context));
    }

    Ok(crate::utils::renormalized(*pose))
}

pub(crate) fn is_valid_scale(value: Real) -> bool {
    value.is_finite() && value >= 0.0
}

/// The data shared by every joint: its attachment frames, mass scales and projection
/// tolerances.
///
/// The joint frame attached to each body is given relative to that body's actor frame.
/// The solver itself works with bodies' center-of-mass frames, so each joint frame is also
/// cached relative to its body's center of mass. Whenever a body's center of mass moves,
/// [`JointData::set_body_com_frame1`] (or `2`) must be called.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct JointData {
    local_frame1: Isometry<Real>,
    local_frame2: Isometry<Real>,
    body_com1: Isometry<Real>,
    body_com2: Isometry<Real>,
    c2b: [Isometry<Real>; 2],
    inv_mass_scale: InvMassScale,
    projection: JointProjection,
    pub(crate) dirty: DirtyFlags,
}

impl Default for JointData {
    fn default() -> Self {
        Self {
            local_frame1: Isometry::identity(),
            local_frame2: Isometry::identity(),
            body_com1: Isometry::identity(),
            body_com2: Isometry::identity(),
            c2b: [Isometry::identity(); 2],
            inv_mass_scale: InvMassScale::default(),
            projection: JointProjection::default(),
            dirty: DirtyFlags::all(),
        }
    }
}

impl JointData {
    /// Creates the data of a joint attached to the given frames, expressed relative to each
    /// body's actor frame.
    pub fn new(
        local_frame1: &Isometry<Real>,
        local_frame2: &Isometry<Real>,
    ) -> Result<Self, JointError> {
        let mut result = Self::default();
        result.local_frame1 = validated_pose(local_frame1, "JointData::new")?;
        result.local_frame2 = validated_pose(local_frame2, "JointData::new")?;
        result.update_c2b();
        Ok(result)
    }

    fn update_c2b(&mut self) {
        self.c2b = [
            self.body_com1.inv_mul(&self.local_frame1),
            self.body_com2.inv_mul(&self.local_frame2),
        ];
        self.dirty |= DirtyFlags::DATA;
    }

    /// The joint frame attached to the first body, relative to its actor frame.
    #[must_use]
    pub fn local_frame1(&self) -> &Isometry<Real> {
        &self.local_frame1
    }

    /// The joint frame attached to the second body, relative to its actor frame.
    #[must_use]
    pub fn local_frame2(&self) -> &Isometry<Real> {
        &self.local_frame2
    }

    /// The joint frames relative to each body's center-of-mass frame.
    #[must_use]
    pub fn c2b(&self) -> &[Isometry<Real>; 2] {
        &self.c2b
    }

    /// Sets the joint frame attached to the first body, relative to its actor frame.
    pub fn set_local_frame1(&mut self, frame: &Isometry<Real>) -> Result<&mut Self, JointError> {
        self.local_frame1 = validated_pose(frame, "set_local_frame1")?;
        self.update_c2b();
        Ok(self)
    }

    /// Sets the joint frame attached to the second body, relative to its actor frame.
    pub fn set_local_frame2(&mut self, frame: &Isometry<Real>) -> Result<&mut Self, JointError> {
        self.local_frame2 = validated_pose(frame, "set_local_frame2")?;
        self.update_c2b();
        Ok(self)
    }

    /// Sets the center-of-mass frame of the first body, relative to its actor frame.
    ///
    /// For a joint attached to the world, this is left to identity.
    pub fn set_body_com_frame1(
        &mut self,
        com_frame: &Isometry<Real>,
    ) -> Result<&mut Self, JointError> {
        self.body_com1 = validated_pose(com_frame, "set_body_com_frame1")?;
        self.update_c2b();
        Ok(self)
    }

    /// Sets the center-of-mass frame of the second body, relative to its actor frame.
    pub fn set_body_com_frame2(
        &mut self,
        com_frame: &Isometry<Real>,
    ) -> Result<&mut Self, JointError> {
        self.body_com2 = validated_pose(com_frame, "set_body_com_frame2")?;
        self.update_c2b();
        Ok(self)
    }

    /// The world-space joint frames, given the world-space center-of-mass poses of both bodies.
    #[inline]
    pub fn world_frames(
        &self,
        pose1: &Isometry<Real>,
        pose2: &Isometry<Real>,
    ) -> (Isometry<Real>, Isometry<Real>) {
        (pose1 * self.c2b[0], pose2 * self.c2b[1])
    }

    /// The pose of the second joint frame relative to the first one.
    pub fn relative_transform(&self, pose1: &Isometry<Real>, pose2: &Isometry<Real>) -> Isometry<Real> {
        let (frame1, frame2) = self.world_frames(pose1, pose2);
        frame1.inv_mul(&frame2)
    }

    /// The inverse mass and inertia scales of this joint.
    #[must_use]
    pub fn inv_mass_scale(&self) -> &InvMassScale {
        &self.inv_mass_scale
    }

    /// Sets the inverse mass scales of this joint. Every factor must be finite and non-negative.
    pub fn set_inv_mass_scale(&mut self, scale: InvMassScale) -> Result<&mut Self, JointError> {
        if ![scale.linear1, scale.angular1, scale.linear2, scale.angular2]
            .into_iter()
            .all(is_valid_scale)
        {
            return reject(JointError::InvalidParameter("set_inv_mass_scale"));
        }

        self.inv_mass_scale = scale;
        self.dirty |= DirtyFlags::DATA;
        Ok(self)
    }

    /// The projection parameters of this joint.
    #[must_use]
    pub fn projection(&self) -> &JointProjection {
        &self.projection
    }

    /// Enables or disables the projection of this joint.
    pub fn set_projection_enabled(&mut self, enabled: bool) -> &mut Self {
        self.projection.enabled = enabled;
        self.dirty |= DirtyFlags::DATA;
        self
    }

    /// Sets the linear drift beyond which the joint is projected. Must be non-negative.
    pub fn set_projection_linear_tolerance(
        &mut self,
        tolerance: Real,
    ) -> Result<&mut Self, JointError> {
        if !is_valid_scale(tolerance) {
            return reject(JointError::InvalidParameter(
                "set_projection_linear_tolerance",
            ));
        }

        self.projection.linear_tolerance = tolerance;
        self.dirty |= DirtyFlags::DATA;
        Ok(self)
    }

    /// Sets the angular drift beyond which the joint is projected. Must lie in `[0, π]`.
    pub fn set_projection_angular_tolerance(
        &mut self,
        tolerance: Real,
    ) -> Result<&mut Self, JointError> {
        if !is_valid_scale(tolerance) || tolerance > Real::pi() {
            return reject(JointError::InvalidParameter(
                "set_projection_angular_tolerance",
            ));
        }

        self.projection.angular_tolerance = tolerance;
        self.dirty |= DirtyFlags::DATA;
        Ok(self)
    }
}
