use crate::error_handler::{reject, JointError};
use crate::math::Real;

/// Typical scales of the simulated world, used to derive length-based joint tolerances.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ToleranceScale {
    /// The approximate size of most dynamic objects in the scene.
    ///
    /// This value can be understood as the number of units-per-meter in your physical world
    /// compared to a human-sized world in meters. Default contact distances of linear limits
    /// (`0.01 * length`) and the minimum distance below which the D6 linear limit is
    /// ignored (`1.0e-6 * length`) scale with it.
    /// (default `1.0`).
    pub length: Real,
    /// The typical magnitude of velocities of objects in the scene.
    /// (default `10.0`).
    pub speed: Real,
}

impl Default for ToleranceScale {
    fn default() -> Self {
        Self {
            length: 1.0,
            speed: 10.0,
        }
    }
}

impl ToleranceScale {
    /// Builds a tolerance scale, checking both values are finite and positive.
    pub fn new(length: Real, speed: Real) -> Result<Self, JointError> {
        if !(length.is_finite() && length > 0.0 && speed.is_finite() && speed > 0.0) {
            return reject(JointError::InvalidParameter("ToleranceScale::new"));
        }

        Ok(Self { length, speed })
    }

    /// The default contact distance of hard linear limits.
    #[inline]
    pub fn linear_contact_distance(&self) -> Real {
        0.01 * self.length
    }

    /// The distance below which a D6 linear limit is not enforced.
    #[inline]
    pub fn linear_min_dist(&self) -> Real {
        1.0e-6 * self.length
    }
}
