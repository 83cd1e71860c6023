use super::constraint_row::{ConstraintRow, JointRows, RowFlags, RowModifiers, SolveHint};
use crate::dynamics::{JointData, JointDrive, JointDriveFlags, JointLimitParameters};
use crate::math::{Isometry, Real, Rotation, Vector};
use crate::utils::WQuat;

/// The world-space joint frames of a joint, and the second frame relative to the first.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JointFrames {
    /// The joint frame attached to the first body.
    pub frame1: Isometry<Real>,
    /// The joint frame attached to the second body, with its rotation in the same
    /// hemisphere as `frame1.rotation`.
    pub frame2: Isometry<Real>,
    /// `frame1⁻¹ * frame2`.
    pub relative: Isometry<Real>,
}

impl JointFrames {
    /// Computes the joint frames from the world-space center-of-mass poses of both bodies.
    pub fn new(data: &JointData, pose1: &Isometry<Real>, pose2: &Isometry<Real>) -> Self {
        let (frame1, mut frame2) = data.world_frames(pose1, pose2);
        frame2.rotation = frame2.rotation.sign_aligned_with(&frame1.rotation);
        let relative = frame1.inv_mul(&frame2);

        Self {
            frame1,
            frame2,
            relative,
        }
    }
}

/// The rows mapping relative angular velocities to the rate of change of the imaginary
/// part of `q1⁻¹ * q2`.
pub fn compute_jacobian_axes(q1: &Rotation<Real>, q2: &Rotation<Real>) -> [Vector<Real>; 3] {
    let (w1, w2) = (q1.w, q2.w);
    let (v1, v2) = (q1.imag(), q2.imag());

    let c = v2 * w1 + v1 * w2;
    let d0 = w1 * w2;
    let d1 = v1.dot(&v2);
    let d = d0 - d1;

    let mut rows = [
        (v1 * v2.x + v2 * v1.x + Vector::new(d, c.z, -c.y)) * 0.5,
        (v1 * v2.y + v2 * v1.y + Vector::new(-c.z, d, c.x)) * 0.5,
        (v1 * v2.z + v2 * v1.z + Vector::new(c.y, -c.x, d)) * 0.5,
    ];

    // The matrix is singular for a relative rotation of exactly 180 degrees.
    if d0 + d1 == 0.0 {
        rows[0].x += Real::EPSILON;
        rows[1].y += Real::EPSILON;
        rows[2].z += Real::EPSILON;
    }

    rows
}

/// Appends the constraint rows of a single joint to a row buffer.
///
/// `ra` and `rb` are the world-space offsets from each body's center of mass to the
/// origin of the second joint frame.
pub struct JointConstraintBuilder<'a> {
    rows: &'a mut JointRows,
    first_row: usize,
    ra: Vector<Real>,
    rb: Vector<Real>,
}

impl<'a> JointConstraintBuilder<'a> {
    /// Starts appending rows to `rows`.
    pub fn new(rows: &'a mut JointRows, ra: Vector<Real>, rb: Vector<Real>) -> Self {
        let first_row = rows.len();
        Self {
            rows,
            first_row,
            ra,
            rb,
        }
    }

    /// The number of rows appended by this builder so far.
    pub fn count(&self) -> usize {
        self.rows.len() - self.first_row
    }

    /// The rows appended by this builder so far.
    pub fn rows(&self) -> &[ConstraintRow] {
        &self.rows[self.first_row..]
    }

    fn push(&mut self, row: ConstraintRow) -> &mut ConstraintRow {
        debug_assert!(!self.rows.is_full(), "Too many rows for a single joint.");
        self.rows.push(row);
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    fn linear_row(
        &mut self,
        axis: &Vector<Real>,
        ra: &Vector<Real>,
        error: Real,
        hint: SolveHint,
    ) -> &mut ConstraintRow {
        let rb = self.rb;
        self.push(ConstraintRow {
            linear0: *axis,
            angular0: ra.cross(axis),
            linear1: *axis,
            angular1: rb.cross(axis),
            geometric_error: error,
            solve_hint: hint,
            ..ConstraintRow::default()
        })
    }

    fn angular_row(
        &mut self,
        axis: &Vector<Real>,
        error: Real,
        hint: SolveHint,
    ) -> &mut ConstraintRow {
        self.push(ConstraintRow {
            angular0: *axis,
            angular1: *axis,
            geometric_error: error,
            solve_hint: hint,
            ..ConstraintRow::default()
        })
    }

    /// A bilateral hard row removing the relative translation along `axis`.
    pub fn linear_hard(&mut self, axis: &Vector<Real>, error: Real) {
        let ra = self.ra;
        let row = self.linear_row(axis, &ra, error, SolveHint::Equality);
        row.flags |= RowFlags::OUTPUT_FORCE;
    }

    /// A bilateral hard row removing the relative rotation about `axis`.
    pub fn angular_hard(&mut self, axis: &Vector<Real>, error: Real) {
        let row = self.angular_row(axis, error, SolveHint::Equality);
        row.flags |= RowFlags::OUTPUT_FORCE;
    }

    /// A one-sided row keeping `ordinate` below `limit_value` along `axis`.
    ///
    /// Nothing is emitted while `ordinate` is further than the limit padding from
    /// `limit_value`.
    pub fn linear_limit(
        &mut self,
        axis: &Vector<Real>,
        ordinate: Real,
        limit_value: Real,
        limit: &JointLimitParameters,
    ) {
        if ordinate + limit.padding() > limit_value {
            let ra = self.ra;
            let row = self.linear_row(axis, &ra, limit_value - ordinate, SolveHint::None);
            add_limit(row, limit);
        }
    }

    /// A one-sided row keeping the angular `ordinate` below `limit_value` about `axis`.
    pub fn angular_limit(
        &mut self,
        axis: &Vector<Real>,
        ordinate: Real,
        limit_value: Real,
        pad: Real,
        limit: &JointLimitParameters,
    ) {
        if ordinate + pad > limit_value {
            self.angular_limit_error(axis, limit_value - ordinate, limit);
        }
    }

    /// An unconditional one-sided angular row with the given error.
    pub fn angular_limit_error(
        &mut self,
        axis: &Vector<Real>,
        error: Real,
        limit: &JointLimitParameters,
    ) {
        let row = self.angular_row(axis, error, SolveHint::None);
        add_limit(row, limit);
    }

    fn angle_pair(
        &mut self,
        value: Real,
        lower: Real,
        upper: Real,
        pad: Real,
        axis: &Vector<Real>,
        limit: &JointLimitParameters,
        scale: Real,
    ) {
        if value < lower + pad {
            self.angular_limit_error(&-axis, -(lower - value) * scale, limit);
        }
        if value > upper - pad {
            self.angular_limit_error(axis, (upper - value) * scale, limit);
        }
    }

    /// Up to two one-sided rows keeping a tan-half angle within `[lower, upper]`.
    pub fn half_angle_pair(
        &mut self,
        tan_half_angle: Real,
        lower: Real,
        upper: Real,
        pad: Real,
        axis: &Vector<Real>,
        limit: &JointLimitParameters,
    ) {
        self.angle_pair(tan_half_angle, lower, upper, pad, axis, limit, 2.0)
    }

    /// Up to two one-sided rows keeping a tan-quarter angle within `[lower, upper]`.
    pub fn quarter_angle_pair(
        &mut self,
        tan_quarter_angle: Real,
        lower: Real,
        upper: Real,
        pad: Real,
        axis: &Vector<Real>,
        limit: &JointLimitParameters,
    ) {
        self.angle_pair(tan_quarter_angle, lower, upper, pad, axis, limit, 4.0)
    }

    /// A drive row along `axis`.
    pub fn linear_drive(
        &mut self,
        axis: &Vector<Real>,
        velocity_target: Real,
        error: Real,
        drive: &JointDrive,
    ) {
        let ra = self.ra;
        let row = self.linear_row(axis, &ra, error, SolveHint::None);
        add_drive(row, velocity_target, drive);
    }

    /// A drive row about `axis`.
    pub fn angular_drive(
        &mut self,
        axis: &Vector<Real>,
        velocity_target: Real,
        error: Real,
        drive: &JointDrive,
        hint: SolveHint,
    ) {
        let row = self.angular_row(axis, error, hint);
        add_drive(row, velocity_target, drive);
    }

    /// A raw angular row with the given body Jacobians, used by velocity-only drives.
    pub fn angular_raw(
        &mut self,
        angular0: &Vector<Real>,
        angular1: &Vector<Real>,
    ) -> &mut ConstraintRow {
        self.push(ConstraintRow {
            angular0: *angular0,
            angular1: *angular1,
            ..ConstraintRow::default()
        })
    }

    /// Hard rows for every locked degree of freedom, the rotations first.
    ///
    /// `q1` and `q2` are the world-space rotations of both joint frames (sign-aligned),
    /// `rel_pos` the position of the second frame relative to the first. `lin` and `ang`
    /// are 3-bit masks of the locked translations (X, Y, Z) and rotations (twist, swing1,
    /// swing2).
    pub fn prepare_locked_axes(
        &mut self,
        q1: &Rotation<Real>,
        q2: &Rotation<Real>,
        rel_pos: &Vector<Real>,
        lin: u8,
        ang: u8,
    ) {
        if ang != 0 {
            let rel_rot = q1.conjugate() * q2;
            let jac = compute_jacobian_axes(q1, q2);
            let imag = rel_rot.imag();

            for i in 0..3 {
                if ang & (1 << i) != 0 {
                    self.angular_row(&jac[i], -imag[i], SolveHint::Equality).flags =
                        RowFlags::OUTPUT_FORCE;
                }
            }
        }

        if lin != 0 {
            let axes = q1.basis_vectors();
            // Snap the anchor of the first body to the locked configuration.
            let mut ra = self.ra;
            for i in 0..3 {
                if lin & (1 << i) != 0 {
                    ra -= axes[i] * rel_pos[i];
                }
            }

            for i in 0..3 {
                if lin & (1 << i) != 0 {
                    self.linear_row(&axes[i], &ra, -rel_pos[i], SolveHint::Equality).flags =
                        RowFlags::OUTPUT_FORCE;
                }
            }
        }
    }
}

fn add_limit(row: &mut ConstraintRow, limit: &JointLimitParameters) {
    let mut flags = RowFlags::OUTPUT_FORCE;

    if limit.is_soft() {
        flags |= RowFlags::SPRING;
        row.modifiers = RowModifiers::Spring {
            stiffness: limit.stiffness,
            damping: limit.damping,
        };
    } else {
        row.solve_hint = SolveHint::Inequality;
        row.modifiers = RowModifiers::Bounce {
            restitution: limit.restitution,
            velocity_threshold: limit.bounce_threshold,
        };
        if row.geometric_error > 0.0 {
            flags |= RowFlags::KEEP_BIAS;
        }
        if limit.restitution > 0.0 {
            flags |= RowFlags::RESTITUTION;
        }
    }

    row.flags |= flags;
    row.min_impulse = 0.0;
}

fn add_drive(row: &mut ConstraintRow, velocity_target: Real, drive: &JointDrive) {
    row.velocity_target = velocity_target;

    let mut flags = RowFlags::SPRING | RowFlags::HAS_DRIVE_LIMIT;
    if drive.flags.contains(JointDriveFlags::ACCELERATION) {
        flags |= RowFlags::ACCELERATION_SPRING;
    }

    row.flags |= flags;
    row.modifiers = RowModifiers::Spring {
        stiffness: drive.stiffness,
        damping: drive.damping,
    };
    row.min_impulse = -drive.force_limit;
    row.max_impulse = drive.force_limit;
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dynamics::{JointAngularLimitPair, JointLinearLimit, Spring, ToleranceScale};
    use approx::assert_relative_eq;
    use na::RealField;

    fn hard_limit(contact_distance: Real) -> JointLimitParameters {
        let mut limit = JointAngularLimitPair::new(-1.0, 1.0).params;
        limit.contact_distance = contact_distance;
        limit
    }

    #[test]
    fn locked_rows_match_the_relative_error() {
        let mut rows = JointRows::new();
        let q1 = Rotation::identity();
        let q2 = Rotation::from_scaled_axis(Vector::new(0.0, 0.0, 0.2));
        let rel_pos = Vector::new(0.5, -0.25, 0.0);
        let mut builder = JointConstraintBuilder::new(&mut rows, Vector::zeros(), Vector::zeros());
        builder.prepare_locked_axes(&q1, &q2, &rel_pos, 0b011, 0b100);
        assert_eq!(builder.count(), 3);

        assert_relative_eq!(rows[0].geometric_error, -(0.1 as Real).sin());
        assert_relative_eq!(rows[1].geometric_error, -0.5);
        assert_relative_eq!(rows[2].geometric_error, 0.25);
        assert!(!rows[0].is_linear() && rows[1].is_linear() && rows[2].is_linear());

        for row in &rows {
            assert_eq!(row.flags, RowFlags::OUTPUT_FORCE);
            assert_eq!(row.solve_hint, SolveHint::Equality);
            assert_eq!(row.min_impulse, -Real::MAX);
            assert_eq!(row.max_impulse, Real::MAX);
        }

        // Locked translations move the first anchor onto the locked configuration.
        assert_relative_eq!(
            rows[1].angular0,
            Vector::new(-0.5, 0.25, 0.0).cross(&Vector::x())
        );
    }

    #[test]
    fn jacobian_axes_of_aligned_frames() {
        let q = Rotation::from_scaled_axis(Vector::new(0.3, 0.2, -0.1));
        let rows = compute_jacobian_axes(&q, &q);
        // For aligned frames, the rows are half the axes of the (shared) frame.
        let axes = q.basis_vectors();
        for i in 0..3 {
            assert_relative_eq!(rows[i], axes[i] * 0.5, epsilon = 1.0e-6);
        }
    }

    #[test]
    fn jacobian_axes_at_half_turn_are_regularized() {
        let q1 = Rotation::identity();
        let q2 = Rotation::from_scaled_axis(Vector::new(0.0, Real::pi(), 0.0));
        let rows = compute_jacobian_axes(&q1, &q2);
        assert!(rows.iter().all(|r| r.iter().all(|e| e.is_finite())));
    }

    #[test]
    fn limit_rows_respect_the_padding() {
        let limit = hard_limit(0.1);
        let mut rows = JointRows::new();
        let mut builder = JointConstraintBuilder::new(&mut rows, Vector::zeros(), Vector::zeros());

        builder.angular_limit(&Vector::x(), 0.85, 1.0, 0.1, &limit);
        assert_eq!(builder.count(), 0);
        builder.angular_limit(&Vector::x(), 0.95, 1.0, 0.1, &limit);
        assert_eq!(builder.count(), 1);

        let row = builder.rows()[0];
        assert_eq!(row.solve_hint, SolveHint::Inequality);
        assert_eq!(row.min_impulse, 0.0);
        assert_eq!(row.max_impulse, Real::MAX);
        assert!(row.flags.contains(RowFlags::KEEP_BIAS | RowFlags::OUTPUT_FORCE));
        assert!(!row.flags.contains(RowFlags::RESTITUTION));
        assert_relative_eq!(row.geometric_error, 0.05, epsilon = 1.0e-6);
    }

    #[test]
    fn soft_limits_are_springs() {
        let limit = JointLinearLimit::new_soft(1.0, Spring::new(5.0, 0.5));
        let mut rows = JointRows::new();
        let mut builder = JointConstraintBuilder::new(&mut rows, Vector::zeros(), Vector::zeros());

        builder.linear_limit(&Vector::y(), 0.999, limit.value, &limit.params);
        assert_eq!(builder.count(), 0);
        builder.linear_limit(&Vector::y(), 1.5, limit.value, &limit.params);
        let row = builder.rows()[0];
        assert!(row.flags.contains(RowFlags::SPRING));
        assert_eq!(row.solve_hint, SolveHint::None);
        assert_eq!(
            row.modifiers,
            RowModifiers::Spring {
                stiffness: 5.0,
                damping: 0.5
            }
        );
    }

    #[test]
    fn angle_pairs_emit_one_row_per_violated_side() {
        let limit = hard_limit(0.0);
        let mut rows = JointRows::new();
        let mut builder = JointConstraintBuilder::new(&mut rows, Vector::zeros(), Vector::zeros());

        builder.quarter_angle_pair(0.0, -0.2, 0.2, 0.0, &Vector::x(), &limit);
        assert_eq!(builder.count(), 0);

        builder.quarter_angle_pair(-0.3, -0.2, 0.2, 0.0, &Vector::x(), &limit);
        assert_eq!(builder.count(), 1);
        assert_relative_eq!(builder.rows()[0].angular0, -Vector::x());
        assert_relative_eq!(builder.rows()[0].geometric_error, -0.4, epsilon = 1.0e-6);

        builder.half_angle_pair(0.3, -0.2, 0.2, 0.0, &Vector::z(), &limit);
        assert_eq!(builder.count(), 2);
        assert_relative_eq!(builder.rows()[1].angular0, Vector::z());
        assert_relative_eq!(builder.rows()[1].geometric_error, -0.2, epsilon = 1.0e-6);
    }

    #[test]
    fn drive_rows_carry_the_force_limit() {
        let drive = JointDrive::new(10.0, 1.0, 50.0, true);
        let mut rows = JointRows::new();
        let mut builder = JointConstraintBuilder::new(&mut rows, Vector::zeros(), Vector::zeros());
        builder.linear_drive(&Vector::z(), 2.0, -0.5, &drive);

        let row = builder.rows()[0];
        assert!(row.is_drive());
        assert_eq!(row.velocity_target, 2.0);
        assert_eq!(row.geometric_error, -0.5);
        assert_eq!((row.min_impulse, row.max_impulse), (-50.0, 50.0));
        assert!(row
            .flags
            .contains(RowFlags::SPRING | RowFlags::HAS_DRIVE_LIMIT | RowFlags::ACCELERATION_SPRING));
    }

    #[test]
    fn linear_rows_use_both_anchors() {
        let scale = ToleranceScale::default();
        let limit = JointLinearLimit::new(&scale, 0.0);
        let ra = Vector::new(0.0, 1.0, 0.0);
        let rb = Vector::new(0.0, 0.0, 2.0);
        let mut rows = JointRows::new();
        let mut builder = JointConstraintBuilder::new(&mut rows, ra, rb);
        builder.linear_limit(&Vector::x(), 0.5, limit.value, &limit.params);

        let row = builder.rows()[0];
        assert_relative_eq!(row.angular0, ra.cross(&Vector::x()));
        assert_relative_eq!(row.angular1, rb.cross(&Vector::x()));
        assert_relative_eq!(row.geometric_error, -0.5);
    }
}
