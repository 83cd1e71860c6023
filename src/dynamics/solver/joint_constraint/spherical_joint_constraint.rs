use super::cone_limit_helper::ConeLimitHelper;
use super::constraint_row::{JointRows, SolverPrepOutput};
use super::joint_constraint_builder::{JointConstraintBuilder, JointFrames};
use super::joint_projection::{project_transforms, truncate_linear, ProjectedBody};
use crate::dynamics::{SphericalJoint, SphericalJointFlags};
use crate::math::{Isometry, Real};
use crate::utils::WQuat;

/// Appends the constraint rows of a spherical joint to `rows`.
pub fn spherical_solver_prep(
    joint: &SphericalJoint,
    rows: &mut JointRows,
    pose1: &Isometry<Real>,
    pose2: &Isometry<Real>,
) -> SolverPrepOutput {
    debug_assert!(!joint.is_dirty(), "The joint must be refreshed first.");

    let data = joint.data();
    let frames = JointFrames::new(data, pose1, pose2);
    let (q1, q2) = (frames.frame1.rotation, frames.frame2.rotation);

    let anchor = frames.frame2.translation.vector;
    let ra = anchor - pose1.translation.vector;
    let rb = anchor - pose2.translation.vector;
    let mut builder = JointConstraintBuilder::new(rows, ra, rb);

    if joint.flags().contains(SphericalJointFlags::LIMIT_ENABLED) {
        let cache = &joint.cache;
        let (swing, _) = frames.relative.rotation.separate_swing_twist();
        let helper = ConeLimitHelper::new(cache.tan_q_z, cache.tan_q_y, cache.tan_q_pad);

        if let Some((axis, error)) = helper.limit(&swing) {
            builder.angular_limit_error(&(q1 * axis), error, &joint.limit_cone().params);
        }
    }

    builder.prepare_locked_axes(&q1, &q2, &frames.relative.translation.vector, 0b111, 0);

    SolverPrepOutput {
        body1_world_offset: ra,
        inv_mass_scale: *data.inv_mass_scale(),
    }
}

/// Moves one of the bodies of a spherical joint so that its anchors drift by at most the
/// joint's linear projection tolerance.
///
/// Returns `true` if a pose was modified.
pub fn spherical_project(
    joint: &SphericalJoint,
    pose1: &mut Isometry<Real>,
    pose2: &mut Isometry<Real>,
    target: ProjectedBody,
) -> bool {
    let data = joint.data();
    let frames = JointFrames::new(data, pose1, pose2);
    let rel = &frames.relative;

    let (translation, truncated) =
        truncate_linear(&rel.translation.vector, data.projection().linear_tolerance);

    if !truncated {
        return false;
    }

    let projected = Isometry::from_parts(translation.into(), rel.rotation);
    project_transforms(data, &frames, &projected, pose1, pose2, target);
    true
}
