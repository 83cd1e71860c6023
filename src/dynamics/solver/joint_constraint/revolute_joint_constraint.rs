use super::constraint_row::{JointRows, RowFlags, SolverPrepOutput};
use super::joint_constraint_builder::{JointConstraintBuilder, JointFrames};
use super::joint_projection::{project_transforms, truncate_angular, truncate_linear, ProjectedBody};
use crate::dynamics::{RevoluteJoint, RevoluteJointFlags};
use crate::math::{Isometry, Real, Rotation, Vector};
use crate::utils::WQuat;
use na::Quaternion;

/// Appends the constraint rows of a revolute joint to `rows`.
pub fn revolute_solver_prep(
    joint: &RevoluteJoint,
    rows: &mut JointRows,
    pose1: &Isometry<Real>,
    pose2: &Isometry<Real>,
) -> SolverPrepOutput {
    debug_assert!(!joint.is_dirty(), "The joint must be refreshed first.");

    let data = joint.data();
    let flags = joint.flags();
    let frames = JointFrames::new(data, pose1, pose2);
    let (q1, q2) = (frames.frame1.rotation, frames.frame2.rotation);

    let anchor = frames.frame2.translation.vector;
    let ra = anchor - pose1.translation.vector;
    let rb = anchor - pose2.translation.vector;
    let mut builder = JointConstraintBuilder::new(rows, ra, rb);

    builder.prepare_locked_axes(&q1, &q2, &frames.relative.translation.vector, 0b111, 0b110);

    let axis = q1 * Vector::x();

    if flags.contains(RevoluteJointFlags::DRIVE_ENABLED) {
        let velocity = joint.drive_velocity();
        let force_limit = joint.drive_force_limit();
        let row = builder.angular_raw(&-axis, &(-axis * joint.drive_gear_ratio()));
        row.velocity_target = velocity;
        row.min_impulse = -force_limit;
        row.max_impulse = force_limit;

        if flags.contains(RevoluteJointFlags::DRIVE_FREESPIN) {
            if velocity > 0.0 {
                row.min_impulse = 0.0;
            }
            if velocity < 0.0 {
                row.max_impulse = 0.0;
            }
        }
        row.flags |= RowFlags::HAS_DRIVE_LIMIT;
    }

    if flags.contains(RevoluteJointFlags::LIMIT_ENABLED) {
        let rel = q1.conjugate() * q2;
        let twist = Quaternion::new(rel.w, rel.i, 0.0, 0.0);
        let magnitude = twist.norm();
        let tq_phi = if magnitude > 1.0e-6 {
            let twist = twist / magnitude;
            twist.i / (1.0 + twist.w)
        } else {
            0.0
        };

        let cache = &joint.cache;
        builder.quarter_angle_pair(
            tq_phi,
            cache.tq_low,
            cache.tq_high,
            cache.tq_pad,
            &axis,
            &joint.limit().params,
        );
    }

    SolverPrepOutput {
        body1_world_offset: ra,
        inv_mass_scale: *data.inv_mass_scale(),
    }
}

/// Moves one of the bodies of a revolute joint so that its anchors and rotation axes drift
/// by at most the joint's projection tolerances. The rotation about the joint axis is kept.
///
/// Returns `true` if a pose was modified.
pub fn revolute_project(
    joint: &RevoluteJoint,
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
    let (swing, twist) = rel.rotation.separate_swing_twist();
    let half_tol = projection.angular_tolerance / 2.0;
    let (swing, angular_truncated) = truncate_angular(&swing, half_tol.sin(), half_tol.cos());

    if !linear_truncated && !angular_truncated {
        return false;
    }

    let rotation: Rotation<Real> = swing * twist;
    let projected = Isometry::from_parts(translation.into(), rotation);
    project_transforms(data, &frames, &projected, pose1, pose2, target);
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dynamics::JointAngularLimitPair;
    use super::super::constraint_row::SolveHint;
    use approx::assert_relative_eq;
    use na::RealField;

    fn twisted(angle: Real) -> Isometry<Real> {
        Isometry::from_parts(
            Vector::zeros().into(),
            Rotation::from_scaled_axis(Vector::x() * angle),
        )
    }

    fn limited_joint() -> RevoluteJoint {
        let quarter_pi = Real::frac_pi_4();
        let mut limit = JointAngularLimitPair::new(-quarter_pi, quarter_pi);
        limit.params.contact_distance = 0.05;

        let mut joint = RevoluteJoint::new(&Isometry::identity(), &Isometry::identity()).unwrap();
        joint.set_limit(limit).unwrap();
        joint.set_flags(RevoluteJointFlags::LIMIT_ENABLED);
        joint.refresh();
        joint
    }

    fn prep(joint: &RevoluteJoint, pose2: &Isometry<Real>) -> JointRows {
        let mut rows = JointRows::new();
        revolute_solver_prep(joint, &mut rows, &Isometry::identity(), pose2);
        rows
    }

    #[test]
    fn locked_rows_leave_the_twist_free() {
        let joint = RevoluteJoint::new(&Isometry::identity(), &Isometry::identity()).unwrap();
        let rows = prep(&joint, &twisted(1.0));
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.solve_hint == SolveHint::Equality));
        // The two swing rows come first.
        assert!(!rows[0].is_linear() && !rows[1].is_linear());
        for row in &rows {
            assert_relative_eq!(row.geometric_error, 0.0, epsilon = 1.0e-6);
        }
    }

    #[test]
    fn limit_rows_only_near_the_bounds() {
        let joint = limited_joint();
        let quarter_pi = Real::frac_pi_4();

        assert_eq!(prep(&joint, &twisted(0.0)).len(), 5);
        // The padded bound sits slightly above π/4 - 0.05.
        assert_eq!(prep(&joint, &twisted(0.72)).len(), 5);
        assert_eq!(prep(&joint, &twisted(0.75)).len(), 6);

        let rows = prep(&joint, &twisted(quarter_pi + 0.1));
        assert_eq!(rows.len(), 6);
        let limit = rows[5];
        assert!(limit.is_limit());
        assert_eq!(limit.solve_hint, SolveHint::Inequality);
        assert_relative_eq!(limit.angular0, Vector::x(), epsilon = 1.0e-6);
        assert!(limit.geometric_error < 0.0);

        let rows = prep(&joint, &twisted(-quarter_pi - 0.1));
        assert_eq!(rows.len(), 6);
        assert_relative_eq!(rows[5].angular0, -Vector::x(), epsilon = 1.0e-6);
    }

    #[test]
    fn free_spinning_drive_is_one_sided() {
        let mut joint = RevoluteJoint::new(&Isometry::identity(), &Isometry::identity()).unwrap();
        joint
            .set_drive_velocity(2.0)
            .unwrap()
            .set_drive_force_limit(10.0)
            .unwrap()
            .set_drive_gear_ratio(0.5)
            .unwrap()
            .set_flags(RevoluteJointFlags::DRIVE_ENABLED | RevoluteJointFlags::DRIVE_FREESPIN);
        joint.refresh();

        let rows = prep(&joint, &Isometry::identity());
        assert_eq!(rows.len(), 6);
        let drive = rows[5];
        assert!(drive.is_drive());
        assert_relative_eq!(drive.angular0, -Vector::x());
        assert_relative_eq!(drive.angular1, -Vector::x() * 0.5);
        assert_eq!(drive.velocity_target, 2.0);
        assert_eq!((drive.min_impulse, drive.max_impulse), (0.0, 10.0));
    }

    #[test]
    fn projection_keeps_the_twist() {
        let mut joint = RevoluteJoint::new(&Isometry::identity(), &Isometry::identity()).unwrap();
        joint
            .data_mut()
            .set_projection_angular_tolerance(0.1)
            .unwrap();

        let mut pose1 = Isometry::identity();
        let mut pose2 = twisted(1.0);
        assert!(!revolute_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2));

        let swing = Rotation::from_scaled_axis(Vector::y() * 0.5);
        let mut pose2 = Isometry::from_parts(
            Vector::zeros().into(),
            swing * twisted(1.0).rotation,
        );
        assert!(revolute_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2));
        assert_relative_eq!(joint.angle(&pose1, &pose2), 1.0, epsilon = 1.0e-5);

        let (swing, _) = pose2.rotation.separate_swing_twist();
        assert_relative_eq!(swing.angle(), 0.1, epsilon = 1.0e-4);
    }
}
