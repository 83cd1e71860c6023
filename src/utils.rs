//! Miscellaneous utilities.

use crate::math::{Isometry, Real, Rotation, Vector};
use na::{Quaternion, RealField, Vector3};

/// The tangent of half the angle whose sine and cosine are `sin` and `cos`.
///
/// When called with the imaginary component and real part of a unit quaternion, this
/// gives the tangent of a quarter of the rotation angle.
#[inline]
pub fn tan_half(sin: Real, cos: Real) -> Real {
    sin / (1.0 + cos)
}

/// Same as [`tan_half`] but only the sine is known and the angle is assumed to lie in
/// `[-π/2, π/2]`.
#[inline]
pub fn tan_half_from_sin(sin: Real) -> Real {
    tan_half(sin, (1.0 - sin * sin).max(0.0).sqrt())
}

/// The tangent of the sum of two angles, given their respective tangents.
#[inline]
pub fn tan_add(tan1: Real, tan2: Real) -> Real {
    (tan1 + tan2) / (1.0 - tan1 * tan2)
}

/// Trait to compute the orthonormal basis of a vector.
pub trait WBasis: Sized {
    /// The type of the array of orthonormal vectors.
    type Basis;
    /// Computes the vectors which, when combined with `self`, form an orthonormal basis.
    fn orthonormal_basis(self) -> Self::Basis;
}

impl WBasis for Vector3<Real> {
    type Basis = [Vector3<Real>; 2];
    // Robust and branchless implementation from Pixar:
    // https://graphics.pixar.com/library/OrthonormalB/paper.pdf
    fn orthonormal_basis(self) -> [Vector3<Real>; 2] {
        let sign = (1.0 as Real).copysign(self.z);
        let a = -1.0 / (sign + self.z);
        let b = self.x * self.y * a;

        [
            Vector3::new(1.0 + sign * self.x * self.x * a, sign * b, -sign * self.x),
            Vector3::new(b, sign + self.y * self.y * a, -self.y),
        ]
    }
}

/// Quaternion operations shared by the joint solver-prep and projection code.
pub trait WQuat: Sized {
    /// Returns `self` or `-self`, whichever lies in the same hemisphere as `reference`.
    fn sign_aligned_with(&self, reference: &Self) -> Self;
    /// Returns `self` or `-self`, whichever has a non-negative real part.
    fn with_positive_w(&self) -> Self;
    /// The images of the three canonical axes by this rotation.
    fn basis_vectors(&self) -> [Vector<Real>; 3];
    /// Splits this rotation into `(swing, twist)` such that `swing * twist == self`, with
    /// `twist` a rotation about the local X axis and `swing` a rotation about an axis
    /// orthogonal to X.
    fn separate_swing_twist(&self) -> (Self, Self);
}

impl WQuat for Rotation<Real> {
    #[inline]
    fn sign_aligned_with(&self, reference: &Self) -> Self {
        if self.dot(reference) < 0.0 {
            Rotation::new_unchecked(-self.into_inner())
        } else {
            *self
        }
    }

    #[inline]
    fn with_positive_w(&self) -> Self {
        if self.w < 0.0 {
            Rotation::new_unchecked(-self.into_inner())
        } else {
            *self
        }
    }

    #[inline]
    fn basis_vectors(&self) -> [Vector<Real>; 3] {
        [
            self * Vector::x(),
            self * Vector::y(),
            self * Vector::z(),
        ]
    }

    fn separate_swing_twist(&self) -> (Self, Self) {
        let twist = if self.i != 0.0 {
            Rotation::try_new(Quaternion::new(self.w, self.i, 0.0, 0.0), 0.0)
                .unwrap_or_else(Rotation::identity)
        } else {
            Rotation::identity()
        };
        let swing = self * twist.conjugate();
        (swing, twist)
    }
}

/// The signed angle, in `(-π, π]`, of the rotation of `q` about the X axis.
pub fn twist_angle(q: &Rotation<Real>) -> Real {
    let (_, twist) = q.separate_swing_twist();
    let twist = if twist.i < 0.0 {
        Rotation::new_unchecked(-twist.into_inner())
    } else {
        twist
    };

    let angle = 2.0 * twist.w.clamp(-1.0, 1.0).acos();
    if angle <= Real::pi() {
        angle
    } else {
        angle - Real::two_pi()
    }
}

/// The angle of the swing of `q` about the given swing axis (1 for Y, 2 for Z).
pub(crate) fn swing_angle(q: &Rotation<Real>, axis: usize) -> Real {
    let (swing, _) = q.separate_swing_twist();
    let swing = swing.with_positive_w();
    4.0 * swing.imag()[axis].atan2(1.0 + swing.w)
}

/// Renormalizes the rotational part of an isometry, cancelling accumulated rounding errors.
pub(crate) fn renormalized(mut pose: Isometry<Real>) -> Isometry<Real> {
    pose.rotation.renormalize();
    pose
}
