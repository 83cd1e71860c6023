use super::constraint_row::{JointRows, SolverPrepOutput};
use super::joint_constraint_builder::{JointConstraintBuilder, JointFrames};
use super::joint_projection::{project_transforms, truncate_angular, truncate_linear, ProjectedBody};
use crate::dynamics::FixedJoint;
use crate::math::{Isometry, Real};

/// Appends the constraint rows of a fixed joint to `rows`.
pub fn fixed_solver_prep(
    joint: &FixedJoint,
    rows: &mut JointRows,
    pose1: &Isometry<Real>,
    pose2: &Isometry<Real>,
) -> SolverPrepOutput {
    debug_assert!(!joint.is_dirty(), "The joint must be refreshed first.");

    let data = joint.data();
    let frames = JointFrames::new(data, pose1, pose2);

    let anchor = frames.frame2.translation.vector;
    let ra = anchor - pose1.translation.vector;
    let rb = anchor - pose2.translation.vector;
    JointConstraintBuilder::new(rows, ra, rb).prepare_locked_axes(
        &frames.frame1.rotation,
        &frames.frame2.rotation,
        &frames.relative.translation.vector,
        0b111,
        0b111,
    );

    SolverPrepOutput {
        body1_world_offset: ra,
        inv_mass_scale: *data.inv_mass_scale(),
    }
}

/// Moves one of the bodies of a fixed joint so that its frames drift by at most the joint's
/// projection tolerances.
///
/// Returns `true` if a pose was modified.
pub fn fixed_project(
    joint: &FixedJoint,
    pose1: &mut Isometry<Real>,
    pose2: &mut Isometry<Real>,
    target: ProjectedBody,
) -> bool {
    let data = joint.data();
    let projection = data.projection();
    let frames = JointFrames::new(data, pose1, pose2);
    let rel = &frames.relative;

    let (translation, linear_truncated) =
        truncate_linear(&rel.translation.vector, projection.linear_tolerance);
    let half_tol = projection.angular_tolerance / 2.0;
    let (rotation, angular_truncated) =
        truncate_angular(&rel.rotation, half_tol.sin(), half_tol.cos());

    if !linear_truncated && !angular_truncated {
        return false;
    }

    let projected = Isometry::from_parts(translation.into(), rotation);
    project_transforms(data, &frames, &projected, pose1, pose2, target);
    true
}
