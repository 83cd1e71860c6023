use crate::math::{Real, Rotation, Vector};
use crate::utils::{tan_add, tan_half};
use na::Vector2;

const MAX_CLAMP_ITERATIONS: usize = 20;
const CLAMP_CONVERGENCE_THRESHOLD: Real = 1.0e-4;

/// Finds the point of the axis-aligned ellipse with the given `radii` closest to `point`.
///
/// This finds the root of the Lagrange multiplier equation with Newton iterations, starting
/// from an estimate guaranteed to lie on the convergent side of the root.
pub fn ellipse_clamp(point: &Vector2<Real>, radii: &Vector2<Real>) -> Vector2<Real> {
    // Points very close to the minor axis are clamped trivially.
    const TINY: Real = 1.0e-6;

    let q = point.abs();
    if radii.x >= radii.y {
        if q.y < TINY {
            return Vector2::new(radii.x.copysign(point.x), 0.0);
        }
    } else if q.x < TINY {
        return Vector2::new(0.0, radii.y.copysign(point.y));
    }

    let e2 = radii.component_mul(radii);
    let eq = radii.component_mul(&q);

    let mut t = (eq.x - e2.x).max(eq.y - e2.y);
    let mut denom = Vector2::zeros();

    for _ in 0..MAX_CLAMP_ITERATIONS {
        denom = Vector2::new(1.0 / (t + e2.x), 1.0 / (t + e2.y));
        let scaled = eq.component_mul(&denom);
        let fv = scaled.component_mul(&scaled);
        let f = fv.x + fv.y - 1.0;

        // Catastrophic cancellation may make `f` negative close to the origin: accept it.
        if f < CLAMP_CONVERGENCE_THRESHOLD {
            return e2.component_mul(point).component_mul(&denom);
        }

        let df = -2.0 * fv.dot(&denom);
        t -= f / df;
    }

    // Not converged: project what we have onto the ellipse.
    let r = e2.component_mul(point).component_mul(&denom);
    let scale = (r.x / radii.x).powi(2) + (r.y / radii.y).powi(2);
    r / scale.sqrt()
}

/// Tests and clamps swing rotations against an elliptical cone.
///
/// Swings are represented by their "tan-quarter swing vector": the 2D vector
/// `(tan(θz/4), tan(θy/4))` where `θy` and `θz` are the rotation angles of the swing
/// about the Y and Z axes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConeLimitHelper {
    tan_q_y_max: Real,
    tan_q_z_max: Real,
    tan_q_pad: Real,
}

impl ConeLimitHelper {
    /// Creates a helper for the cone with the given tan-quarter half-angles and padding.
    pub fn new(tan_q_y_max: Real, tan_q_z_max: Real, tan_q_pad: Real) -> Self {
        Self {
            tan_q_y_max,
            tan_q_z_max,
            tan_q_pad,
        }
    }

    /// Is the swing inside the inwardly padded cone?
    pub fn contains(&self, tan_q_swing: &Vector2<Real>) -> bool {
        let y = tan_add(tan_q_swing.x.abs(), self.tan_q_pad) / self.tan_q_y_max;
        let z = tan_add(tan_q_swing.y.abs(), self.tan_q_pad) / self.tan_q_z_max;
        y * y + z * z <= 1.0
    }

    /// The point of the cone's boundary closest to the swing, and the (unnormalized)
    /// outward normal of the boundary at that point.
    pub fn clamp(&self, tan_q_swing: &Vector2<Real>) -> (Vector2<Real>, Vector2<Real>) {
        let point = ellipse_clamp(
            tan_q_swing,
            &Vector2::new(self.tan_q_y_max, self.tan_q_z_max),
        );
        let normal = Vector2::new(
            point.x / (self.tan_q_y_max * self.tan_q_y_max),
            point.y / (self.tan_q_z_max * self.tan_q_z_max),
        );
        (point, normal)
    }

    /// Computes the limit row of a swing rotation.
    ///
    /// Returns `None` if the swing lies within the padded cone. Otherwise returns an axis,
    /// relative to the first joint frame, such that a positive rotation about it moves the
    /// image of the X axis away from the cone boundary, and the sine of the angular
    /// difference between the X axis image and the boundary (negative outside the cone).
    ///
    /// The swing must have no X component and a non-negative real part.
    pub fn limit(&self, swing: &Rotation<Real>) -> Option<(Vector<Real>, Real)> {
        debug_assert!(swing.w >= 0.0);
        let twist_axis = swing * Vector::x();
        let tan_q_swing = Vector2::new(tan_half(swing.k, swing.w), -tan_half(swing.j, swing.w));

        if self.contains(&tan_q_swing) {
            return None;
        }

        let (clamped, normal) = self.clamp(&tan_q_swing);

        // Rotation vector of the clamped point, and the boundary direction at that point.
        let r = Vector::new(0.0, -clamped.y, clamped.x);
        let d = Vector::new(0.0, -normal.y, normal.x);

        // The image of the X axis by the swing whose tan-quarter vector is `r`.
        let r2 = r.norm_squared();
        let a = 1.0 - r2;
        let b = 1.0 / (1.0 + r2);
        let b2 = b * b;
        let v1 = 2.0 * a * b2;
        let v2 = Vector::new(a, 2.0 * r.z, -2.0 * r.y);
        let cone_line = v2 * v1 - Vector::x();

        // Its derivative in the direction `d`.
        let rd = r.dot(&d);
        let dv1 = -4.0 * rd * (3.0 - r2) * b2 * b;
        let dv2 = Vector::new(-2.0 * rd, 2.0 * d.z, -2.0 * d.y);
        let cone_normal = dv2 * v1 + v2 * dv1;

        let axis = cone_line.cross(&cone_normal) / cone_normal.norm();
        let error = cone_line.cross(&axis).dot(&twist_axis);

        Some((axis, error))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn on_ellipse(p: &Vector2<Real>, radii: &Vector2<Real>) -> Real {
        (p.x / radii.x).powi(2) + (p.y / radii.y).powi(2)
    }

    #[test]
    fn clamped_points_lie_on_the_ellipse() {
        let radii = Vector2::new(0.4, 0.2);
        let points = [
            Vector2::new(1.0, 1.0),
            Vector2::new(-0.5, 0.1),
            Vector2::new(0.05, -0.9),
            Vector2::new(2.0, 0.0),
            Vector2::new(0.0, -3.0),
        ];

        for p in points {
            let clamped = ellipse_clamp(&p, &radii);
            assert_relative_eq!(on_ellipse(&clamped, &radii), 1.0, epsilon = 1.0e-3);
            // The clamped point lies in the same quadrant as the input point.
            assert!(clamped.x * p.x >= 0.0 && clamped.y * p.y >= 0.0);
        }
    }

    #[test]
    fn cone_contains_small_swings() {
        let helper = ConeLimitHelper::new((0.25 as Real).tan(), (0.125 as Real).tan(), 0.0);
        assert!(helper.contains(&Vector2::zeros()));
        assert!(helper.contains(&Vector2::new(0.1, 0.05)));
        assert!(!helper.contains(&Vector2::new(0.3, 0.0)));
        assert!(!helper.contains(&Vector2::new(0.0, 0.2)));

        // The padding shrinks the cone.
        let padded = ConeLimitHelper::new((0.25 as Real).tan(), (0.125 as Real).tan(), 0.05);
        assert!(!padded.contains(&Vector2::new(0.2, 0.0)));
    }

    #[test]
    fn swing_inside_the_cone_has_no_limit() {
        let helper = ConeLimitHelper::new((0.25 as Real).tan(), (0.25 as Real).tan(), 0.0);
        let swing = Rotation::from_scaled_axis(Vector::new(0.0, 0.3, 0.0));
        assert!(helper.limit(&swing).is_none());
    }

    #[test]
    fn swing_outside_the_cone_gives_a_violated_limit() {
        // Circular cone of half-angle 1 rad, swing of 1.2 rad about Y.
        let tan_q = (0.25 as Real).tan();
        let helper = ConeLimitHelper::new(tan_q, tan_q, 0.0);
        let swing = Rotation::from_scaled_axis(Vector::new(0.0, 1.2, 0.0));
        let (axis, error) = helper.limit(&swing).unwrap();

        assert_relative_eq!(axis.norm(), 1.0, epsilon = 1.0e-4);
        // The error is the sine of the angular violation, negative outside the cone.
        assert_relative_eq!(error, -(0.2 as Real).sin(), epsilon = 1.0e-3);
        // The limit axis is the swing axis, up to its sign.
        assert_relative_eq!(axis.y.abs(), 1.0, epsilon = 1.0e-3);
    }
}
