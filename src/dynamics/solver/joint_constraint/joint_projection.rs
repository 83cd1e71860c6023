use super::joint_constraint_builder::JointFrames;
use crate::dynamics::JointData;
use crate::math::{Isometry, Real, Rotation, Vector};
use crate::utils::{renormalized, WQuat};
use na::{Quaternion, Unit};

/// The body whose pose is rewritten when a joint is projected.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ProjectedBody {
    /// Move the first body onto the second one.
    Body1,
    /// Move the second body onto the first one.
    #[default]
    Body2,
}

/// Clamps the length of `v` to `tolerance`.
///
/// Returns the clamped vector, and whether it was actually clamped.
pub fn truncate_linear(v: &Vector<Real>, tolerance: Real) -> (Vector<Real>, bool) {
    let sq_norm = v.norm_squared();
    if sq_norm > tolerance * tolerance {
        (v * (tolerance / sq_norm.sqrt()), true)
    } else {
        (*v, false)
    }
}

/// Clamps the angle of `q` so that the norm of its imaginary part does not exceed
/// `sin_half_tol`.
///
/// The returned rotation always has a non-negative real part. A tolerance of (nearly) π
/// disables truncation.
pub fn truncate_angular(
    q: &Rotation<Real>,
    sin_half_tol: Real,
    cos_half_tol: Real,
) -> (Rotation<Real>, bool) {
    if sin_half_tol > 0.9999 {
        return (*q, false);
    }

    let q = q.with_positive_w();
    let imag = q.imag();
    let sq_norm = imag.norm_squared();

    if sq_norm > sin_half_tol * sin_half_tol {
        let imag = imag * (sin_half_tol / sq_norm.sqrt());
        let truncated = Quaternion::from_parts(cos_half_tol, imag);
        (Unit::new_unchecked(truncated), true)
    } else {
        (q, false)
    }
}

// Clamps the rotation angle so that its real part is at least `min_cos_half_tol`.
fn truncate(q: &Rotation<Real>, min_cos_half_tol: Real) -> (Rotation<Real>, bool) {
    let q = q.with_positive_w();
    if q.w >= min_cos_half_tol {
        return (q, false);
    }

    let sin_half_tol = (1.0 - min_cos_half_tol * min_cos_half_tol).max(0.0).sqrt();
    let imag = q.imag().try_normalize(0.0).unwrap_or_else(Vector::zeros) * sin_half_tol;
    let truncated = Quaternion::from_parts(min_cos_half_tol, imag);
    (Unit::new_unchecked(truncated), true)
}

// Decomposes `q` as `q1 * q2` with `q2` a rotation about `axis`, and truncates `q1` only.
fn project_about(
    q: &Rotation<Real>,
    axis: &Vector<Real>,
    cos_half_tol: Real,
) -> (Rotation<Real>, bool) {
    let a = q.imag().dot(axis);
    let q2 = if a.abs() >= 1.0e-6 {
        Rotation::new_normalize(Quaternion::from_parts(q.w, axis * a))
    } else {
        Rotation::identity()
    };
    let q1 = q * q2.conjugate();

    if q1.w < cos_half_tol {
        let (q1, truncated) = truncate(&q1, cos_half_tol);
        (q1 * q2, truncated)
    } else {
        (*q, false)
    }
}

/// Truncates the part of the relative rotation `q` made of locked rotational degrees of
/// freedom.
///
/// `locked_ang` is the 3-bit mask of the locked rotations (twist, swing1, swing2). When
/// exactly two rotations are locked, only the rotation orthogonal to the free axis is
/// truncated. When all three are, the whole rotation is. A single locked rotation leaves
/// `q` unchanged.
pub fn angular_project(
    locked_ang: u8,
    q: &Rotation<Real>,
    cos_half_tol: Real,
) -> (Rotation<Real>, bool) {
    match locked_ang {
        // Locked twist and swing1: swing2 (about Z) is free.
        0b011 => project_about(q, &Vector::z(), cos_half_tol),
        // Locked twist and swing2: swing1 (about Y) is free.
        0b101 => project_about(q, &Vector::y(), cos_half_tol),
        // Both swings locked: the twist is free.
        0b110 => project_about(q, &Vector::x(), cos_half_tol),
        0b111 => truncate(q, cos_half_tol),
        // TODO: a single locked rotation is not projected yet.
        _ => (*q, false),
    }
}

/// Rewrites the pose of the projected body so that the relative pose of the joint frames
/// becomes `projected`.
pub fn project_transforms(
    data: &JointData,
    frames: &JointFrames,
    projected: &Isometry<Real>,
    pose1: &mut Isometry<Real>,
    pose2: &mut Isometry<Real>,
    target: ProjectedBody,
) {
    let c2b = data.c2b();
    match target {
        ProjectedBody::Body2 => {
            *pose2 = renormalized(frames.frame1 * projected * c2b[1].inverse());
        }
        ProjectedBody::Body1 => {
            *pose1 = renormalized(frames.frame2 * projected.inverse() * c2b[0].inverse());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_truncation() {
        let (v, truncated) = truncate_linear(&Vector::new(3.0, 4.0, 0.0), 1.0);
        assert!(truncated);
        assert_relative_eq!(v, Vector::new(0.6, 0.8, 0.0), epsilon = 1.0e-6);

        let (v, truncated) = truncate_linear(&Vector::new(0.3, 0.4, 0.0), 1.0);
        assert!(!truncated);
        assert_eq!(v, Vector::new(0.3, 0.4, 0.0));
    }

    #[test]
    fn angular_truncation() {
        let tol: Real = 0.2;
        let q = Rotation::from_scaled_axis(Vector::new(0.0, 0.5, 0.0));
        let (projected, truncated) = truncate_angular(&q, (tol / 2.0).sin(), (tol / 2.0).cos());
        assert!(truncated);
        assert_relative_eq!(projected.angle(), tol, epsilon = 1.0e-5);
        assert_relative_eq!(
            projected.axis().unwrap().into_inner(),
            Vector::y(),
            epsilon = 1.0e-5
        );

        // A tolerance of π never truncates.
        let (_, truncated) = truncate_angular(&q, 1.0, 0.0);
        assert!(!truncated);
    }

    #[test]
    fn angular_projection_keeps_the_free_rotation() {
        let tol: Real = 0.1;
        let free = Rotation::from_scaled_axis(Vector::new(0.0, 0.0, 1.0));
        let locked = Rotation::from_scaled_axis(Vector::new(0.4, 0.0, 0.0));
        let q = locked * free;

        let (projected, truncated) = angular_project(0b011, &q, (tol / 2.0).cos());
        assert!(truncated);
        // The swing about Z is untouched while the remaining rotation is truncated.
        let remaining = projected * free.conjugate();
        assert_relative_eq!(remaining.angle(), tol, epsilon = 1.0e-4);

        // A single locked rotation is not projected.
        let (unchanged, truncated) = angular_project(0b001, &q, (tol / 2.0).cos());
        assert!(!truncated);
        assert_eq!(unchanged, q);
    }
}
