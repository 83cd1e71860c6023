use super::cone_limit_helper::ConeLimitHelper;
use super::constraint_row::{JointRows, SolveHint, SolverPrepOutput};
use super::joint_constraint_builder::{compute_jacobian_axes, JointConstraintBuilder, JointFrames};
use super::joint_projection::{angular_project, project_transforms, truncate_linear, ProjectedBody};
use crate::dynamics::{D6Drive, D6DriveMask, D6Joint, JointAxesMask};
use crate::math::{Isometry, Real, Vector};
use crate::utils::{tan_half, tan_half_from_sin, WQuat};

/// Appends the constraint rows of a D6 joint to `rows`.
///
/// `pose1` and `pose2` are the world-space center-of-mass poses of both bodies. The joint
/// must have been refreshed since its last modification.
pub fn d6_solver_prep(
    joint: &D6Joint,
    rows: &mut JointRows,
    pose1: &Isometry<Real>,
    pose2: &Isometry<Real>,
) -> SolverPrepOutput {
    debug_assert!(!joint.is_dirty(), "The joint must be refreshed first.");

    let data = joint.data();
    let cache = &joint.cache;
    let frames = JointFrames::new(data, pose1, pose2);
    let (q1, q2) = (frames.frame1.rotation, frames.frame2.rotation);
    let rel = &frames.relative;
    let rel_pos = rel.translation.vector;

    let anchor = frames.frame2.translation.vector;
    let ra = anchor - pose1.translation.vector;
    let rb = anchor - pose2.translation.vector;
    let mut builder = JointConstraintBuilder::new(rows, ra, rb);

    let a_axes = q1.basis_vectors();
    let b_axes = q2.basis_vectors();
    let drives = joint.drives();
    let (drive_pose, linvel, angvel) = joint.drive_targets();

    /*
     * Drives.
     */
    if cache.driving.intersects(D6DriveMask::LINEAR) {
        let pos_err = drive_pose.translation.vector - rel_pos;
        for (i, bit) in [D6DriveMask::X, D6DriveMask::Y, D6DriveMask::Z]
            .into_iter()
            .enumerate()
        {
            if cache.driving.contains(bit) {
                builder.linear_drive(&a_axes[i], linvel[i], pos_err[i], &drives[i]);
            }
        }
    }

    if cache.driving.intersects(D6DriveMask::ANGULAR) {
        let target = drive_pose.rotation.sign_aligned_with(&rel.rotation);
        let delta = target.conjugate() * rel.rotation;
        let delta_imag = delta.imag();

        if cache.driving.contains(D6DriveMask::SLERP) {
            let drive = &drives[D6Drive::Slerp as usize];
            let axes = if drive.stiffness != 0.0 {
                compute_jacobian_axes(&(q1 * target), &q2)
            } else {
                [Vector::x(), Vector::y(), Vector::z()]
            };
            let vel_target = q1 * angvel;

            for i in 0..3 {
                builder.angular_drive(
                    &axes[i],
                    axes[i].dot(&vel_target),
                    -delta_imag[i],
                    drive,
                    SolveHint::SlerpSpring,
                );
            }
        } else {
            if cache.driving.contains(D6DriveMask::TWIST) {
                builder.angular_drive(
                    &b_axes[0],
                    angvel.x,
                    -2.0 * delta.i,
                    &drives[D6Drive::Twist as usize],
                    SolveHint::None,
                );
            }

            if cache.driving.contains(D6DriveMask::SWING) {
                let drive = &drives[D6Drive::Swing as usize];
                let err = delta * Vector::x();

                if !cache.locked.contains(JointAxesMask::SWING1) {
                    builder.angular_drive(&b_axes[1], angvel.y, err.z, drive, SolveHint::None);
                }
                if !cache.locked.contains(JointAxesMask::SWING2) {
                    builder.angular_drive(&b_axes[2], angvel.z, -err.y, drive, SolveHint::None);
                }
            }
        }
    }

    /*
     * Limits.
     */
    if cache.limited.intersects(JointAxesMask::ANG_AXES) {
        let (swing, twist) = rel.rotation.separate_swing_twist();
        let swing_limit = &joint.swing_limit().params;
        let swing1 = cache.limited.contains(JointAxesMask::SWING1);
        let swing2 = cache.limited.contains(JointAxesMask::SWING2);

        // With a single limited swing, the tan-quarter measure covers (-π, π) when the
        // other swing is locked, and the tan-half measure covers (-π/2, π/2) otherwise.
        if swing1 && swing2 {
            let helper =
                ConeLimitHelper::new(cache.tq_swing_z, cache.tq_swing_y, cache.tq_swing_pad);
            if let Some((axis, error)) = helper.limit(&swing) {
                builder.angular_limit_error(&(q1 * axis), error, swing_limit);
            }
        } else if swing1 {
            if cache.locked.contains(JointAxesMask::SWING2) {
                builder.quarter_angle_pair(
                    tan_half(swing.j, swing.w),
                    -cache.tq_swing_y,
                    cache.tq_swing_y,
                    cache.tq_swing_pad,
                    &a_axes[1],
                    swing_limit,
                );
            } else {
                let dot = -a_axes[2].dot(&b_axes[0]);
                builder.half_angle_pair(
                    tan_half_from_sin(dot),
                    -cache.th_swing_y,
                    cache.th_swing_y,
                    cache.th_swing_pad,
                    &a_axes[2].cross(&b_axes[0]),
                    swing_limit,
                );
            }
        } else if swing2 {
            if cache.locked.contains(JointAxesMask::SWING1) {
                builder.quarter_angle_pair(
                    tan_half(swing.k, swing.w),
                    -cache.tq_swing_z,
                    cache.tq_swing_z,
                    cache.tq_swing_pad,
                    &a_axes[2],
                    swing_limit,
                );
            } else {
                let dot = a_axes[1].dot(&b_axes[0]);
                builder.half_angle_pair(
                    tan_half_from_sin(dot),
                    -cache.th_swing_z,
                    cache.th_swing_z,
                    cache.th_swing_pad,
                    &-a_axes[1].cross(&b_axes[0]),
                    swing_limit,
                );
            }
        }

        if cache.limited.contains(JointAxesMask::TWIST) {
            builder.quarter_angle_pair(
                tan_half(twist.i, twist.w),
                cache.tq_twist_low,
                cache.tq_twist_high,
                cache.tq_twist_pad,
                &b_axes[0],
                &joint.twist_limit().params,
            );
        }
    }

    if cache.limited.intersects(JointAxesMask::LIN_AXES) {
        let mut dir = Vector::zeros();
        for i in 0..3 {
            if cache.limited.contains(JointAxesMask::from_bits_retain(1 << i)) {
                dir += a_axes[i] * rel_pos[i];
            }
        }

        let dist = dir.norm();
        if dist > joint.linear_min_dist() {
            let limit = joint.linear_limit();
            builder.linear_limit(&(dir / dist), dist, limit.value, &limit.params);
        }
    }

    /*
     * Locked axes.
     */
    let mut locked = cache.locked;
    let locked_ang = locked & JointAxesMask::ANG_AXES;

    // A single locked swing is constrained on its own, relative to the twist axis.
    if locked_ang == JointAxesMask::SWING1 {
        builder.angular_hard(&b_axes[0].cross(&a_axes[2]), -b_axes[0].dot(&a_axes[2]));
        locked.remove(JointAxesMask::SWING1);
    } else if locked_ang == JointAxesMask::SWING2 {
        builder.angular_hard(&b_axes[0].cross(&a_axes[1]), -b_axes[0].dot(&a_axes[1]));
        locked.remove(JointAxesMask::SWING2);
    }

    builder.prepare_locked_axes(
        &q1,
        &q2,
        &rel_pos,
        locked.linear_bits(),
        locked.angular_bits(),
    );

    SolverPrepOutput {
        body1_world_offset: ra,
        inv_mass_scale: *data.inv_mass_scale(),
    }
}

/// Moves one of the bodies of a D6 joint so that its locked degrees of freedom drift by at
/// most the joint's projection tolerances.
///
/// Returns `true` if a pose was modified.
pub fn d6_project(
    joint: &D6Joint,
    pose1: &mut Isometry<Real>,
    pose2: &mut Isometry<Real>,
    target: ProjectedBody,
) -> bool {
    let data = joint.data();
    let projection = data.projection();
    let locked = joint.cache.locked;
    let frames = JointFrames::new(data, pose1, pose2);
    let rel = &frames.relative;

    let mut locked_pos = rel.translation.vector;
    for i in 0..3 {
        if !locked.contains(JointAxesMask::from_bits_retain(1 << i)) {
            locked_pos[i] = 0.0;
        }
    }

    let (truncated_pos, linear_truncated) =
        truncate_linear(&locked_pos, projection.linear_tolerance);
    let (rotation, angular_truncated) = angular_project(
        locked.angular_bits(),
        &rel.rotation,
        (projection.angular_tolerance / 2.0).cos(),
    );

    if !linear_truncated && !angular_truncated {
        return false;
    }

    let translation = truncated_pos + (rel.translation.vector - locked_pos);
    let projected = Isometry::from_parts(translation.into(), rotation);
    project_transforms(data, &frames, &projected, pose1, pose2, target);
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use super::super::constraint_row::RowFlags;
    use crate::dynamics::{
        JointAngularLimitPair, JointAxis, JointDrive, JointLimitCone, JointLinearLimit,
        JointMotion, ToleranceScale,
    };
    use crate::math::Rotation;
    use crate::utils::twist_angle;
    use approx::assert_relative_eq;

    fn joint() -> D6Joint {
        D6Joint::new(
            &ToleranceScale::default(),
            &Isometry::identity(),
            &Isometry::identity(),
        )
        .unwrap()
    }

    fn prep(joint: &D6Joint, pose2: &Isometry<Real>) -> JointRows {
        let mut rows = JointRows::new();
        d6_solver_prep(joint, &mut rows, &Isometry::identity(), pose2);
        rows
    }

    #[test]
    fn all_locked_joint_emits_one_row_per_dof() {
        let joint = joint();
        let pose2 = Isometry::translation(1.0, 0.0, 0.0);
        let mut rows = JointRows::new();
        let out = d6_solver_prep(&joint, &mut rows, &Isometry::identity(), &pose2);

        assert_eq!(rows.len(), 6);
        assert_relative_eq!(out.body1_world_offset, Vector::new(1.0, 0.0, 0.0));

        // The rotations come first.
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.is_linear(), i >= 3);
            assert_eq!(row.solve_hint, SolveHint::Equality);
            assert!(!row.is_drive() && !row.is_limit());
        }
        for row in &rows[..3] {
            assert_relative_eq!(row.geometric_error, 0.0);
        }

        let errors: Vec<_> = rows[3..].iter().map(|r| r.geometric_error).collect();
        assert_relative_eq!(errors[0], -1.0);
        assert_relative_eq!(errors[1], 0.0);
        assert_relative_eq!(errors[2], 0.0);
    }

    #[test]
    fn twist_limit_rows_appear_near_the_bounds() {
        let mut joint = joint();
        joint.set_motion(JointAxis::Twist, JointMotion::Limited);
        joint
            .set_twist_limit(JointAngularLimitPair::new(-0.5, 0.5))
            .unwrap();
        joint.refresh();

        let twisted = |angle: Real| {
            Isometry::from_parts(
                Vector::zeros().into(),
                Rotation::from_scaled_axis(Vector::x() * angle),
            )
        };

        // 5 locked degrees of freedom.
        assert_eq!(prep(&joint, &twisted(0.0)).len(), 5);

        let rows = prep(&joint, &twisted(0.6));
        assert_eq!(rows.len(), 6);
        let limit = rows[0];
        assert!(limit.is_limit());
        assert_eq!(limit.solve_hint, SolveHint::Inequality);
        assert!(limit.geometric_error < 0.0);
        assert_relative_eq!(limit.angular0, Vector::x(), epsilon = 1.0e-6);

        let rows = prep(&joint, &twisted(-0.6));
        assert_relative_eq!(rows[0].angular0, -Vector::x(), epsilon = 1.0e-6);
        assert!(rows[0].geometric_error < 0.0);
    }

    #[test]
    fn cone_limit_with_both_swings_limited() {
        let mut joint = joint();
        joint
            .set_motion(JointAxis::Swing1, JointMotion::Limited)
            .set_motion(JointAxis::Swing2, JointMotion::Limited);
        joint.set_swing_limit(JointLimitCone::new(0.5, 0.5)).unwrap();
        joint.refresh();

        let swung = |angle: Real| {
            Isometry::from_parts(
                Vector::zeros().into(),
                Rotation::from_scaled_axis(Vector::y() * angle),
            )
        };

        // 3 linear rows and the twist row.
        assert_eq!(prep(&joint, &swung(0.2)).len(), 4);

        let rows = prep(&joint, &swung(0.8));
        assert_eq!(rows.len(), 5);
        assert!(rows[0].is_limit());
        assert_relative_eq!(rows[0].geometric_error, -(0.3 as Real).sin(), epsilon = 1.0e-3);
    }

    fn swung_about_y(angle: Real) -> Isometry<Real> {
        Isometry::from_parts(
            Vector::zeros().into(),
            Rotation::from_scaled_axis(Vector::y() * angle),
        )
    }

    #[test]
    fn single_limited_swing_with_a_free_partner() {
        let mut joint = joint();
        joint
            .set_motion(JointAxis::Swing1, JointMotion::Limited)
            .set_motion(JointAxis::Swing2, JointMotion::Free);
        joint.set_swing_limit(JointLimitCone::new(0.5, 0.5)).unwrap();
        joint.refresh();

        // 3 linear rows and the twist row.
        assert_eq!(prep(&joint, &swung_about_y(0.2)).len(), 4);

        // The row acts about Z × X(body 2), which is shorter than unit once swung.
        let rows = prep(&joint, &swung_about_y(0.6));
        assert_eq!(rows.len(), 5);
        let above = rows[0];
        assert!(above.is_limit() && !above.is_linear());
        assert_eq!(above.solve_hint, SolveHint::Inequality);
        assert!(above.geometric_error < 0.0);
        assert_relative_eq!(above.angular0.x, 0.0, epsilon = 1.0e-6);
        assert_relative_eq!(above.angular0.z, 0.0, epsilon = 1.0e-6);
        assert_relative_eq!(above.angular0.y.abs(), (0.6 as Real).cos(), epsilon = 1.0e-5);

        let rows = prep(&joint, &swung_about_y(-0.6));
        assert_eq!(rows.len(), 5);
        let below = rows[0];
        assert!(below.is_limit());
        assert!(below.geometric_error < 0.0);
        assert_relative_eq!(below.geometric_error, above.geometric_error, epsilon = 1.0e-5);
        assert_relative_eq!(below.angular0, -above.angular0, epsilon = 1.0e-5);
    }

    #[test]
    fn single_limited_swing_with_a_locked_partner() {
        let mut joint = joint();
        joint.set_motion(JointAxis::Swing1, JointMotion::Limited);
        joint.set_swing_limit(JointLimitCone::new(0.5, 0.5)).unwrap();
        joint.refresh();

        // 3 linear rows, the twist and swing2 rows.
        assert_eq!(prep(&joint, &swung_about_y(0.2)).len(), 5);

        let rows = prep(&joint, &swung_about_y(0.6));
        assert_eq!(rows.len(), 6);
        let above = rows[0];
        assert!(above.is_limit());
        assert!(above.geometric_error < 0.0);
        assert_relative_eq!(above.angular0.y.abs(), 1.0, epsilon = 1.0e-6);
        assert_relative_eq!(above.angular0.x, 0.0, epsilon = 1.0e-6);
        assert_relative_eq!(above.angular0.z, 0.0, epsilon = 1.0e-6);

        let rows = prep(&joint, &swung_about_y(-0.6));
        let below = rows[0];
        assert!(below.is_limit());
        assert!(below.geometric_error < 0.0);
        assert_relative_eq!(below.angular0, -above.angular0, epsilon = 1.0e-6);
    }

    #[test]
    fn swing_drive_skips_the_locked_swing() {
        let mut joint = joint();
        joint.set_motion(JointAxis::Swing1, JointMotion::Free);
        joint
            .set_drive(D6Drive::Swing, JointDrive::new(10.0, 1.0, Real::MAX, false))
            .unwrap();
        joint.refresh();

        let rows = prep(&joint, &Isometry::identity());
        // 1 drive, the twist and swing2 rows, and 3 linear rows.
        assert_eq!(rows.len(), 6);
        assert_eq!(rows.iter().filter(|r| r.is_drive()).count(), 1);
        assert!(rows[0].is_drive() && !rows[0].is_linear());
        assert_relative_eq!(rows[0].angular0, Vector::y());
        assert_relative_eq!(rows[0].geometric_error, 0.0);

        // Both swings locked: no swing drive at all.
        joint.set_motion(JointAxis::Swing1, JointMotion::Locked);
        joint.refresh();
        let rows = prep(&joint, &Isometry::identity());
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|r| !r.is_drive()));
    }

    #[test]
    fn single_locked_swing_is_a_separate_hard_row() {
        let mut joint = joint();
        joint
            .set_motion(JointAxis::Twist, JointMotion::Free)
            .set_motion(JointAxis::Swing2, JointMotion::Free);
        joint.refresh();

        let rows = prep(&joint, &Isometry::identity());
        assert_eq!(rows.len(), 4);
        // The swing1 row is emitted before the batched linear rows.
        assert!(!rows[0].is_linear());
        assert_relative_eq!(rows[0].angular0, -Vector::y());
        assert!(rows.iter().all(|r| r.flags == RowFlags::OUTPUT_FORCE));
    }

    #[test]
    fn linear_limit_is_radial() {
        let mut joint = joint();
        joint
            .set_motion(JointAxis::Y, JointMotion::Limited)
            .set_motion(JointAxis::Z, JointMotion::Limited);
        joint
            .set_linear_limit(JointLinearLimit::new(&ToleranceScale::default(), 1.0))
            .unwrap();
        joint.refresh();

        // Below the limit: only the 4 locked rows.
        assert_eq!(prep(&joint, &Isometry::translation(0.0, 0.5, 0.0)).len(), 4);

        let rows = prep(&joint, &Isometry::translation(0.0, 1.2, 1.6));
        assert_eq!(rows.len(), 5);
        assert_relative_eq!(rows[0].linear0, Vector::new(0.0, 0.6, 0.8), epsilon = 1.0e-6);
        assert_relative_eq!(rows[0].geometric_error, -1.0, epsilon = 1.0e-5);
    }

    #[test]
    fn drives_target_the_drive_pose() {
        let mut joint = joint();
        let drive = JointDrive::new(100.0, 10.0, 1000.0, false);
        joint
            .set_motion(JointAxis::X, JointMotion::Free)
            .set_motion(JointAxis::Twist, JointMotion::Free);
        joint
            .set_drive(D6Drive::X, drive)
            .unwrap()
            .set_drive(D6Drive::Twist, drive)
            .unwrap()
            .set_drive_position(&Isometry::translation(2.0, 0.0, 0.0))
            .unwrap()
            .set_drive_velocity(&Vector::new(0.5, 0.0, 0.0), &Vector::new(1.5, 0.0, 0.0))
            .unwrap();
        joint.refresh();

        let rows = prep(&joint, &Isometry::translation(0.5, 0.0, 0.0));
        // 2 drives and 4 locked rows.
        assert_eq!(rows.len(), 6);

        let (linear, angular) = (rows[0], rows[1]);
        assert!(linear.is_drive() && angular.is_drive());
        assert_relative_eq!(linear.linear0, Vector::x());
        assert_relative_eq!(linear.geometric_error, 1.5);
        assert_relative_eq!(linear.velocity_target, 0.5);
        assert_eq!((linear.min_impulse, linear.max_impulse), (-1000.0, 1000.0));

        assert!(!angular.is_linear());
        assert_relative_eq!(angular.angular0, Vector::x());
        assert_relative_eq!(angular.geometric_error, 0.0);
        assert_relative_eq!(angular.velocity_target, 1.5);
    }

    #[test]
    fn slerp_drive_emits_three_rows() {
        let mut joint = joint();
        joint
            .set_motion(JointAxis::Twist, JointMotion::Free)
            .set_motion(JointAxis::Swing1, JointMotion::Free)
            .set_motion(JointAxis::Swing2, JointMotion::Free);
        joint
            .set_drive(D6Drive::Slerp, JointDrive::new(10.0, 0.0, Real::MAX, true))
            .unwrap();
        joint.refresh();

        let pose2 = Isometry::from_parts(
            Vector::zeros().into(),
            Rotation::from_scaled_axis(Vector::new(0.0, 0.0, 0.4)),
        );
        let rows = prep(&joint, &pose2);
        assert_eq!(rows.len(), 6);
        assert!(rows[..3]
            .iter()
            .all(|r| r.solve_hint == SolveHint::SlerpSpring && r.is_drive()));
        // The error pulls the rotation back toward the identity target.
        assert_relative_eq!(rows[2].geometric_error, -(0.2 as Real).sin(), epsilon = 1.0e-6);
    }

    #[test]
    fn projection_only_moves_drifting_bodies() {
        let mut joint = joint();
        joint
            .data_mut()
            .set_projection_linear_tolerance(0.1)
            .unwrap();

        let mut pose1 = Isometry::identity();
        let mut pose2 = Isometry::translation(0.05, 0.0, 0.0);
        assert!(!d6_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2));
        assert_eq!(pose2, Isometry::translation(0.05, 0.0, 0.0));

        let mut pose2 = Isometry::translation(1.0, 0.0, 0.0);
        assert!(d6_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2));
        assert_relative_eq!(
            pose2.translation.vector,
            Vector::new(0.1, 0.0, 0.0),
            epsilon = 1.0e-6
        );
        assert_eq!(pose1, Isometry::identity());

        // Projecting again is a no-op.
        let projected = pose2;
        assert!(!d6_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2));
        assert_relative_eq!(pose2, projected, epsilon = 1.0e-6);
    }

    #[test]
    fn projection_ignores_free_translations() {
        let mut joint = joint();
        joint.set_motion(JointAxis::Y, JointMotion::Free);
        joint.refresh();
        joint
            .data_mut()
            .set_projection_linear_tolerance(0.1)
            .unwrap();

        let mut pose1 = Isometry::translation(0.0, -3.0, 0.0);
        let mut pose2 = Isometry::translation(0.5, 0.0, 0.0);
        assert!(d6_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body1));
        assert_relative_eq!(
            pose1.translation.vector,
            Vector::new(0.4, -3.0, 0.0),
            epsilon = 1.0e-6
        );
    }

    fn angular_projection_joint(free: Option<JointAxis>) -> D6Joint {
        let mut joint = joint();
        if let Some(axis) = free {
            joint.set_motion(axis, JointMotion::Free);
        }
        joint
            .data_mut()
            .set_projection_angular_tolerance(0.1)
            .unwrap();
        joint.refresh();
        joint
    }

    fn rotated(rotation: Rotation<Real>) -> Isometry<Real> {
        Isometry::from_parts(Vector::zeros().into(), rotation)
    }

    #[test]
    fn projection_truncates_a_fully_locked_rotation() {
        let joint = angular_projection_joint(None);
        let axis = Vector::new(1.0, 1.0, 0.0).normalize();
        let mut pose1 = Isometry::identity();

        // Within the tolerance.
        let mut pose2 = rotated(Rotation::from_scaled_axis(axis * 0.05));
        assert!(!d6_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2));

        let mut pose2 = rotated(Rotation::from_scaled_axis(axis * 0.7));
        assert!(d6_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2));
        assert_relative_eq!(
            pose2.rotation,
            Rotation::from_scaled_axis(axis * 0.1),
            epsilon = 1.0e-5
        );
        assert_eq!(pose1, Isometry::identity());

        // Projecting again leaves the pose where it is.
        let projected = pose2;
        d6_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2);
        assert_relative_eq!(pose2, projected, epsilon = 1.0e-6);
    }

    #[test]
    fn projection_preserves_a_free_twist() {
        let joint = angular_projection_joint(Some(JointAxis::Twist));
        let twist = Rotation::from_scaled_axis(Vector::x() * 1.0);
        let mut pose1 = Isometry::identity();

        // A pure twist is never projected.
        let mut pose2 = rotated(twist);
        assert!(!d6_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2));

        let mut pose2 = rotated(Rotation::from_scaled_axis(Vector::y() * 0.5) * twist);
        assert!(d6_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2));
        assert_relative_eq!(twist_angle(&pose2.rotation), 1.0, epsilon = 1.0e-5);
        assert_relative_eq!(
            pose2.rotation,
            Rotation::from_scaled_axis(Vector::y() * 0.1) * twist,
            epsilon = 1.0e-5
        );

        let projected = pose2;
        d6_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2);
        assert_relative_eq!(pose2, projected, epsilon = 1.0e-6);
    }

    #[test]
    fn projection_preserves_a_free_swing() {
        let joint = angular_projection_joint(Some(JointAxis::Swing1));
        let swing = Rotation::from_scaled_axis(Vector::y() * 0.8);
        let mut pose1 = Isometry::identity();

        let mut pose2 = rotated(swing);
        assert!(!d6_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2));

        let mut pose2 = rotated(Rotation::from_scaled_axis(Vector::x() * 0.4) * swing);
        assert!(d6_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2));
        assert_relative_eq!(
            pose2.rotation,
            Rotation::from_scaled_axis(Vector::x() * 0.1) * swing,
            epsilon = 1.0e-5
        );

        let projected = pose2;
        d6_project(&joint, &mut pose1, &mut pose2, ProjectedBody::Body2);
        assert_relative_eq!(pose2, projected, epsilon = 1.0e-6);
    }
}
