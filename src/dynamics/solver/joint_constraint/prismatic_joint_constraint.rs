use super::constraint_row::{JointRows, SolverPrepOutput};
use super::joint_constraint_builder::{JointConstraintBuilder, JointFrames};
use super::joint_projection::{project_transforms, truncate_angular, truncate_linear, ProjectedBody};
use crate::dynamics::{PrismaticJoint, PrismaticJointFlags};
use crate::math::{Isometry, Real, Vector};

/// Appends the constraint rows of a prismatic joint to `rows`.
pub fn prismatic_solver_prep(
    joint: &PrismaticJoint,
    rows: &mut JointRows,
    pose1: &Isometry<Real>,
    pose2: &Isometry<Real>,
) -> SolverPrepOutput {
    debug_assert!(!joint.is_dirty(), "The joint must be refreshed first.");

    let data = joint.data();
    let frames = JointFrames::new(data, pose1, pose2);
    let (q1, q2) = (frames.frame1.rotation, frames.frame2.rotation);
    let rel_pos = frames.relative.translation.vector;

    let anchor = frames.frame2.translation.vector;
    let ra = anchor - pose1.translation.vector;
    let rb = anchor - pose2.translation.vector;
    let mut builder = JointConstraintBuilder::new(rows, ra, rb);

    builder.prepare_locked_axes(&q1, &q2, &rel_pos, 0b110, 0b111);

    if joint.flags().contains(PrismaticJointFlags::LIMIT_ENABLED) {
        let limit = joint.limit();
        let axis = q1 * Vector::x();
        let ordinate = rel_pos.x;
        builder.linear_limit(&axis, ordinate, limit.upper, &limit.params);
        builder.linear_limit(&-axis, -ordinate, -limit.lower, &limit.params);
    }

    SolverPrepOutput {
        body1_world_offset: ra,
        inv_mass_scale: *data.inv_mass_scale(),
    }
}

/// Moves one of the bodies of a prismatic joint so that its anchors and frames drift by at
/// most the joint's projection tolerances. The translation along the joint axis is kept.
///
/// Returns `true` if a pose was modified.
pub fn prismatic_project(
    joint: &PrismaticJoint,
    pose1: &mut Isometry<Real>,
    pose2: &mut Isometry<Real>,
    target: ProjectedBody,
) -> bool {
    let data = joint.data();
    let projection = data.projection();
    let frames = JointFrames::new(data, pose1, pose2);
    let rel = &frames.relative;
    let rel_pos = rel.translation.vector;

    let off_axis = Vector::new(0.0, rel_pos.y, rel_pos.z);
    let (mut translation, linear_truncated) =
        truncate_linear(&off_axis, projection.linear_tolerance);
    let half_tol = projection.angular_tolerance / 2.0;
    let (rotation, angular_truncated) =
        truncate_angular(&rel.rotation, half_tol.sin(), half_tol.cos());

    if !linear_truncated && !angular_truncated {
        return false;
    }

    translation.x = rel_pos.x;
    let projected = Isometry::from_parts(translation.into(), rotation);
    project_transforms(data, &frames, &projected, pose1, pose2, target);
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dynamics::{JointLinearLimitPair, ToleranceScale};
    use approx::assert_relative_eq;

    fn joint() -> PrismaticJoint {
        let scale = ToleranceScale::default();
        let mut joint =
            PrismaticJoint::new(&scale, &Isometry::identity(), &Isometry::identity()).unwrap();
        joint
            .set_limit(JointLinearLimitPair::new(&scale, -1.0, 1.0))
            .unwrap()
            .set_flags(PrismaticJointFlags::LIMIT_ENABLED);
        joint.refresh();
        joint
    }

    fn prep(joint: &PrismaticJoint, pose2: &Isometry<Real>) -> JointRows {
        let mut rows = JointRows::new();
        prismatic_solver_prep(joint, &mut rows, &Isometry::identity(), pose2);
        rows
    }

    #[test]
    fn limit_rows_only_near_the_bounds() {
        let joint = joint();

        let rows = prep(&joint, &Isometry::translation(0.5, 0.2, 0.0));
        assert_eq!(rows.len(), 5);
        // The Y error is corrected, X is free.
        assert_relative_eq!(rows[3].linear0, Vector::y());
        assert_relative_eq!(rows[3].geometric_error, -0.2);

        let rows = prep(&joint, &Isometry::translation(1.5, 0.0, 0.0));
        assert_eq!(rows.len(), 6);
        assert_relative_eq!(rows[5].linear0, Vector::x());
        assert_relative_eq!(rows[5].geometric_error, -0.5);

        let rows = prep(&joint, &Isometry::translation(-1.25, 0.0, 0.0));
        assert_eq!(rows.len(), 6);
        assert_relative_eq!(rows[5].linear0, -Vector::x());
        assert_relative_eq!(rows[5].geometric_error, -0.25);
    }

    #[test]
    fn projection_keeps_the_sliding_offset() {
        let mut joint = joint();
        joint
            .data_mut()
            .set_projection_linear_tolerance(0.1)
            .unwrap();

        let mut pose1 = Isometry::identity();
        let mut pose2 = Isometry::translation(3.0, 0.0, 0.5);
        assert!(prismatic_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2));
        assert_relative_eq!(
            pose2.translation.vector,
            Vector::new(3.0, 0.0, 0.1),
            epsilon = 1.0e-6
        );
    }
}
