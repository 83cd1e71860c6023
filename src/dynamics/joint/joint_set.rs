use super::{Joint, JointBody};
use crate::data::arena::{Arena, Index};
use crate::dynamics::solver::{JointRows, ProjectedBody, SolverPrepOutput};
use crate::dynamics::JointParams;
use crate::error_handler::{reject, JointError};
use crate::math::{Isometry, Real};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The unique identifier of a joint added to the joint set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct JointHandle(pub(crate) Index);

impl JointHandle {
    /// Converts this handle into its (index, generation) components.
    pub fn into_raw_parts(self) -> (u32, u32) {
        self.0.into_raw_parts()
    }

    /// Reconstructs an handle from its (index, generation) components.
    pub fn from_raw_parts(id: u32, generation: u32) -> Self {
        Self(Index::from_raw_parts(id, generation))
    }

    /// An always-invalid joint handle.
    pub fn invalid() -> Self {
        Self(Index::from_raw_parts(crate::INVALID_U32, crate::INVALID_U32))
    }
}

/// The constraint rows of a single joint, as computed by [`JointSet::prepare_constraints`].
#[derive(Clone, Debug)]
pub struct PreparedJoint {
    /// The joint these rows were computed for.
    pub handle: JointHandle,
    /// The constraint rows.
    pub rows: JointRows,
    /// The anchor offset and mass scales returned alongside the rows.
    pub output: SolverPrepOutput,
}

impl Default for PreparedJoint {
    fn default() -> Self {
        Self {
            handle: JointHandle::invalid(),
            rows: JointRows::new(),
            output: SolverPrepOutput::default(),
        }
    }
}

#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default)]
/// A set of joints, and the batch operations run on them every step.
pub struct JointSet {
    joints: Arena<Joint>,
}

impl JointSet {
    /// Creates a new empty set of joints.
    pub fn new() -> Self {
        Self {
            joints: Arena::new(),
        }
    }

    /// The number of joints on this set.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// `true` if there are no joints in this set.
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Is the given joint handle valid?
    pub fn contains(&self, handle: JointHandle) -> bool {
        self.joints.contains(handle.0)
    }

    /// Gets the joint with the given handle.
    pub fn get(&self, handle: JointHandle) -> Option<&Joint> {
        self.joints.get(handle.0)
    }

    /// Gets a mutable reference to the joint with the given handle.
    ///
    /// Any modification of its parameters marks it dirty: it will be refreshed by the next
    /// call to [`JointSet::prepare_constraints`].
    pub fn get_mut(&mut self, handle: JointHandle) -> Option<&mut Joint> {
        self.joints.get_mut(handle.0)
    }

    /// Gets the joint with the given handle without a known generation.
    ///
    /// This is useful when you know you want the joint at position `i` but
    /// don't know what is its current generation number. Generation numbers are
    /// used to protect from the ABA problem because the joint position `i`
    /// are recycled between two insertion and a removal.
    ///
    /// Using this is discouraged in favor of `self.get(handle)` which does not
    /// suffer form the ABA problem.
    pub fn get_unknown_gen(&self, i: u32) -> Option<(&Joint, JointHandle)> {
        let (joint, handle) = self.joints.get_unknown_gen(i)?;
        Some((joint, JointHandle(handle)))
    }

    /// Iterates through all the joints on this set.
    pub fn iter(&self) -> impl Iterator<Item = (JointHandle, &Joint)> {
        self.joints.iter().map(|(h, j)| (JointHandle(h), j))
    }

    /// Iterates mutably through all the joints on this set.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (JointHandle, &mut Joint)> {
        self.joints.iter_mut().map(|(h, j)| (JointHandle(h), j))
    }

    /// Inserts a new joint into this set and retrieve its handle.
    ///
    /// Fails if both bodies are the same.
    pub fn insert<J>(
        &mut self,
        body1: JointBody,
        body2: JointBody,
        joint_params: J,
    ) -> Result<JointHandle, JointError>
    where
        J: Into<JointParams>,
    {
        if body1 == body2 {
            return reject(JointError::SameBody);
        }

        let joint = Joint {
            body1,
            body2,
            params: joint_params.into(),
        };
        let handle = JointHandle(self.joints.insert(joint));
        log::trace!("Inserted joint {:?} between {:?} and {:?}.", handle, body1, body2);
        Ok(handle)
    }

    /// Removes a joint from this set.
    ///
    /// Returns `None` if the handle is stale.
    pub fn remove(&mut self, handle: JointHandle) -> Option<Joint> {
        self.joints.remove(handle.0)
    }

    /// Recomputes the cached data of every modified joint.
    pub fn refresh(&mut self) {
        for (_, joint) in self.joints.iter_mut() {
            joint.params.refresh();
        }
    }

    /// Checks every body attached to a joint has a pose in `poses`.
    fn check_poses(&self, num_poses: usize) -> Result<(), JointError> {
        for (_, joint) in self.joints.iter() {
            for body in [joint.body1, joint.body2] {
                if let JointBody::Body(index) = body {
                    if index >= num_poses {
                        return reject(JointError::MissingBodyPose { index, num_poses });
                    }
                }
            }
        }

        Ok(())
    }

    /// Computes the constraint rows of every joint.
    ///
    /// `poses` holds the world-space center-of-mass pose of each body, indexed by
    /// [`JointBody::Body`]. The joints are refreshed first, then prepared independently
    /// from each other, in parallel with the `parallel` feature. `out` receives one entry
    /// per joint, in iteration order.
    ///
    /// Fails, leaving `out` untouched, if a joint is attached to a body without a pose.
    #[profiling::function]
    pub fn prepare_constraints(
        &mut self,
        poses: &[Isometry<Real>],
        out: &mut Vec<PreparedJoint>,
    ) -> Result<(), JointError> {
        self.check_poses(poses.len())?;
        self.refresh();

        out.clear();
        out.resize_with(self.joints.len(), PreparedJoint::default);
        for (prepared, (handle, _)) in out.iter_mut().zip(self.joints.iter()) {
            prepared.handle = JointHandle(handle);
        }

        let joints = &self.joints;
        par_iter_mut!(out).for_each(|prepared| {
            if let Some(joint) = joints.get(prepared.handle.0) {
                let pose1 = joint.body1.pose(poses);
                let pose2 = joint.body2.pose(poses);
                prepared.output = joint.params.solver_prep(&mut prepared.rows, &pose1, &pose2);
            }
        });

        Ok(())
    }

    /// Projects the bodies of every joint with projection enabled, one joint after the
    /// other.
    ///
    /// The second body is moved, unless it is the world. Returns the number of joints that
    /// moved a body. Fails, leaving `poses` untouched, if a joint is attached to a body
    /// without a pose.
    #[profiling::function]
    pub fn project_constraints(
        &mut self,
        poses: &mut [Isometry<Real>],
    ) -> Result<usize, JointError> {
        self.check_poses(poses.len())?;
        self.refresh();

        let mut num_projected = 0;
        for (handle, joint) in self.joints.iter() {
            if !joint.params.data().projection().enabled {
                continue;
            }

            let (target, moved) = match joint.body2 {
                JointBody::World => (ProjectedBody::Body1, joint.body1),
                JointBody::Body(_) => (ProjectedBody::Body2, joint.body2),
            };
            let JointBody::Body(moved) = moved else {
                continue;
            };

            let mut pose1 = joint.body1.pose(poses);
            let mut pose2 = joint.body2.pose(poses);
            if joint.params.project(&mut pose1, &mut pose2, target) {
                poses[moved] = match target {
                    ProjectedBody::Body1 => pose1,
                    ProjectedBody::Body2 => pose2,
                };
                num_projected += 1;
                log::trace!("Projected joint {:?}.", JointHandle(handle));
            }
        }

        Ok(num_projected)
    }
}
