use crate::dynamics::ToleranceScale;
use crate::math::Real;
use na::RealField;

/// The stiffness and damping of a spring.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Spring {
    /// The spring strength. Force proportional to the position error.
    pub stiffness: Real,
    /// The damping strength. Force proportional to the velocity error.
    pub damping: Real,
}

impl Spring {
    /// Creates a new spring.
    pub fn new(stiffness: Real, damping: Real) -> Self {
        Self { stiffness, damping }
    }
}

/// Parameters shared by every kind of joint limit.
///
/// A limit with a non-zero `stiffness` or `damping` is *soft*: it behaves like a spring
/// pulling the joint back within its bounds. Otherwise it is *hard*: the solver prevents
/// any further violation, optionally bouncing off it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct JointLimitParameters {
    /// Controls the amount of bounce when the joint hits a hard limit, in `[0, 1]`.
    /// (default `0.0`).
    pub restitution: Real,
    /// Relative velocity below which a hard limit does not bounce, even with a
    /// positive restitution.
    /// (default `0.0`).
    pub bounce_threshold: Real,
    /// The stiffness of a soft limit.
    /// (default `0.0`).
    pub stiffness: Real,
    /// The damping of a soft limit.
    /// (default `0.0`).
    pub damping: Real,
    /// The distance from a hard limit at which the limit starts being enforced.
    ///
    /// A non-zero contact distance lets the solver start slowing down the joint before it
    /// actually reaches its limit. It is ignored for soft limits.
    pub contact_distance: Real,
}

impl JointLimitParameters {
    fn hard(contact_distance: Real) -> Self {
        Self {
            restitution: 0.0,
            bounce_threshold: 0.0,
            stiffness: 0.0,
            damping: 0.0,
            contact_distance,
        }
    }

    fn soft(spring: Spring) -> Self {
        Self {
            restitution: 0.0,
            bounce_threshold: 0.0,
            stiffness: spring.stiffness,
            damping: spring.damping,
            contact_distance: 0.0,
        }
    }

    /// Does this limit behave like a spring?
    #[inline]
    pub fn is_soft(&self) -> bool {
        self.stiffness > 0.0 || self.damping > 0.0
    }

    /// Checks that every parameter is finite and within its range.
    pub fn is_valid(&self) -> bool {
        self.restitution.is_finite()
            && (0.0..=1.0).contains(&self.restitution)
            && self.bounce_threshold.is_finite()
            && self.bounce_threshold >= 0.0
            && self.stiffness.is_finite()
            && self.stiffness >= 0.0
            && self.damping.is_finite()
            && self.damping >= 0.0
            && self.contact_distance.is_finite()
            && self.contact_distance >= 0.0
    }

    /// The distance from the bounds at which the limit is enforced: zero for soft limits.
    #[inline]
    pub fn padding(&self) -> Real {
        if self.is_soft() {
            0.0
        } else {
            self.contact_distance
        }
    }
}

/// A single-sided limit on a distance.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct JointLinearLimit {
    /// The maximum allowed distance.
    pub value: Real,
    /// The restitution, spring and contact-distance parameters.
    pub params: JointLimitParameters,
}

impl JointLinearLimit {
    /// A hard limit with a contact distance derived from the tolerance scale.
    pub fn new(scale: &ToleranceScale, extent: Real) -> Self {
        Self {
            value: extent,
            params: JointLimitParameters::hard(scale.linear_contact_distance()),
        }
    }

    /// A soft limit.
    pub fn new_soft(extent: Real, spring: Spring) -> Self {
        Self {
            value: extent,
            params: JointLimitParameters::soft(spring),
        }
    }

    /// Checks that this limit is well-formed.
    pub fn is_valid(&self) -> bool {
        self.params.is_valid() && self.value.is_finite() && self.value >= 0.0
    }
}

/// A two-sided limit on a distance.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct JointLinearLimitPair {
    /// The lower bound. Must be smaller than `upper`.
    pub lower: Real,
    /// The upper bound.
    pub upper: Real,
    /// The restitution, spring and contact-distance parameters.
    pub params: JointLimitParameters,
}

impl JointLinearLimitPair {
    /// A hard limit pair.
    ///
    /// The contact distance is `0.01 * scale.length`, capped to just under half the range.
    pub fn new(scale: &ToleranceScale, lower: Real, upper: Real) -> Self {
        let contact_distance = scale
            .linear_contact_distance()
            .min(0.49 * (upper - lower));
        Self {
            lower,
            upper,
            params: JointLimitParameters::hard(contact_distance),
        }
    }

    /// A soft limit pair.
    pub fn new_soft(lower: Real, upper: Real, spring: Spring) -> Self {
        Self {
            lower,
            upper,
            params: JointLimitParameters::soft(spring),
        }
    }

    /// Checks that this limit is well-formed.
    pub fn is_valid(&self) -> bool {
        self.params.is_valid()
            && self.lower.is_finite()
            && self.upper.is_finite()
            && self.lower < self.upper
    }
}

/// A two-sided limit on a rotation angle, in radians.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct JointAngularLimitPair {
    /// The lower bound. Must be smaller than `upper`.
    pub lower: Real,
    /// The upper bound.
    pub upper: Real,
    /// The restitution, spring and contact-distance parameters.
    pub params: JointLimitParameters,
}

impl JointAngularLimitPair {
    /// A hard limit pair.
    ///
    /// The contact distance is `0.1` radians, capped to just under half the range.
    pub fn new(lower: Real, upper: Real) -> Self {
        let contact_distance = (0.1 as Real).min(0.49 * (upper - lower));
        Self {
            lower,
            upper,
            params: JointLimitParameters::hard(contact_distance),
        }
    }

    /// A soft limit pair.
    pub fn new_soft(lower: Real, upper: Real, spring: Spring) -> Self {
        Self {
            lower,
            upper,
            params: JointLimitParameters::soft(spring),
        }
    }

    /// Checks that this limit is well-formed, and spans less than a full turn.
    pub fn is_valid(&self) -> bool {
        self.params.is_valid()
            && self.lower.is_finite()
            && self.upper.is_finite()
            && self.lower < self.upper
            && self.upper - self.lower < Real::two_pi()
    }
}

/// An elliptical cone limiting the swing of a joint.
///
/// The cone is centered around the joint's X axis. `y_angle` is the maximum rotation about
/// the Y axis and `z_angle` the maximum rotation about the Z axis.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct JointLimitCone {
    /// The half-angle of the cone about the Y axis, in `(0, π)`.
    pub y_angle: Real,
    /// The half-angle of the cone about the Z axis, in `(0, π)`.
    pub z_angle: Real,
    /// The restitution, spring and contact-distance parameters.
    pub params: JointLimitParameters,
}

impl JointLimitCone {
    /// A hard cone limit.
    ///
    /// The contact distance is `0.1` radians, capped to just under half the smallest angle.
    pub fn new(y_angle: Real, z_angle: Real) -> Self {
        let contact_distance = (0.1 as Real).min(0.49 * y_angle.min(z_angle));
        Self {
            y_angle,
            z_angle,
            params: JointLimitParameters::hard(contact_distance),
        }
    }

    /// A soft cone limit.
    pub fn new_soft(y_angle: Real, z_angle: Real, spring: Spring) -> Self {
        Self {
            y_angle,
            z_angle,
            params: JointLimitParameters::soft(spring),
        }
    }

    /// Checks that this limit is well-formed.
    pub fn is_valid(&self) -> bool {
        let in_range = |angle: Real| angle.is_finite() && angle > 0.0 && angle < Real::pi();
        self.params.is_valid() && in_range(self.y_angle) && in_range(self.z_angle)
    }
}
