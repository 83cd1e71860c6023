use crate::dynamics::{DirtyFlags, JointData};
use crate::error_handler::JointError;
use crate::math::{Isometry, Real};

/// A joint that removes all relative motion between two bodies.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FixedJoint {
    pub(crate) data: JointData,
}

impl FixedJoint {
    /// Creates a new fixed joint attached to the given frames.
    pub fn new(
        local_frame1: &Isometry<Real>,
        local_frame2: &Isometry<Real>,
    ) -> Result<Self, JointError> {
        let mut joint = Self {
            data: JointData::new(local_frame1, local_frame2)?,
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

    /// Has this joint been modified since its cached data was last refreshed?
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.data.dirty.is_empty()
    }

    /// Marks this joint as up to date.
    pub fn refresh(&mut self) {
        self.data.dirty = DirtyFlags::empty();
    }
}
