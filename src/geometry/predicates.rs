//! Geometric predicates for planar triangles.
//!
//! All predicates in this module operate on finite [`Point`]s. Predicates that
//! must also handle the symbolic bounding vertices live in
//! [`crate::geometry::symbolic`] and delegate here for the finite cases.

use crate::geometry::point::Point;

/// Represents the position of a point relative to a circumcircle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InCircle {
    /// The point is outside the circumcircle
    OUTSIDE,
    /// The point is on the circumcircle (within numerical tolerance)
    BOUNDARY,
    /// The point is strictly inside the circumcircle
    INSIDE,
}

impl std::fmt::Display for InCircle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BOUNDARY => write!(f, "BOUNDARY"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

/// Represents the orientation of an ordered point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Clockwise (determinant < 0)
    NEGATIVE,
    /// Collinear (determinant ≈ 0)
    DEGENERATE,
    /// Counter-clockwise (determinant > 0)
    POSITIVE,
}

impl Orientation {
    /// The orientation of the reversed triple.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::NEGATIVE => Self::POSITIVE,
            Self::DEGENERATE => Self::DEGENERATE,
            Self::POSITIVE => Self::NEGATIVE,
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

/// Classification of a point against a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Containment {
    /// The point is outside the triangle
    OUTSIDE,
    /// The point lies on the triangle boundary (within numerical tolerance)
    BORDER,
    /// The point is strictly inside the triangle
    INSIDE,
}

impl Containment {
    /// Returns `true` for [`Containment::INSIDE`] and [`Containment::BORDER`].
    #[must_use]
    pub const fn contains(self) -> bool {
        !matches!(self, Self::OUTSIDE)
    }
}

impl std::fmt::Display for Containment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BORDER => write!(f, "BORDER"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

/// Twice the signed area of triangle `abc` (positive when counter-clockwise).
#[inline]
#[must_use]
pub fn orientation_determinant(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

/// Orientation of the triangle `abc`.
///
/// The triple is DEGENERATE when `|det| <= tolerance * longest_edge²`, i.e. when
/// the triangle's height over its longest edge is within `tolerance` of that
/// edge's length.
///
/// # Examples
///
/// ```rust
/// use delaunay_dag::geometry::point::Point;
/// use delaunay_dag::geometry::predicates::{Orientation, triangle_orientation};
///
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(1.0, 0.0);
/// let c = Point::new(0.0, 1.0);
/// assert_eq!(triangle_orientation(a, b, c, 1e-12), Orientation::POSITIVE);
/// assert_eq!(triangle_orientation(a, c, b, 1e-12), Orientation::NEGATIVE);
/// assert_eq!(
///     triangle_orientation(a, b, Point::new(2.0, 0.0), 1e-12),
///     Orientation::DEGENERATE
/// );
/// ```
#[must_use]
pub fn triangle_orientation(a: Point, b: Point, c: Point, tolerance: f64) -> Orientation {
    let det = orientation_determinant(a, b, c);
    let scale = a
        .distance_squared(b)
        .max(b.distance_squared(c))
        .max(c.distance_squared(a));
    classify_determinant(det, scale, tolerance)
}

/// Side of `q` relative to the directed line `a → b`.
///
/// POSITIVE means left, NEGATIVE right. The band is measured as the distance
/// from the line relative to `|ab|`.
#[must_use]
pub fn edge_side(a: Point, b: Point, q: Point, tolerance: f64) -> Orientation {
    let det = orientation_determinant(a, b, q);
    classify_determinant(det, a.distance_squared(b), tolerance)
}

fn classify_determinant(det: f64, scale: f64, tolerance: f64) -> Orientation {
    if !det.is_finite() || scale <= 0.0 || det.abs() <= tolerance * scale {
        Orientation::DEGENERATE
    } else if det > 0.0 {
        Orientation::POSITIVE
    } else {
        Orientation::NEGATIVE
    }
}

/// Barycentric coordinates of `p` with respect to triangle `abc`.
///
/// Returns `None` for an exactly degenerate triangle.
#[must_use]
pub fn barycentric_coordinates(a: Point, b: Point, c: Point, p: Point) -> Option<[f64; 3]> {
    let det = orientation_determinant(a, b, c);
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    let lambda_a = orientation_determinant(p, b, c) / det;
    let lambda_b = orientation_determinant(a, p, c) / det;
    let lambda_c = 1.0 - lambda_a - lambda_b;
    Some([lambda_a, lambda_b, lambda_c])
}

/// Classify `p` against the finite triangle `abc` using barycentric coordinates.
///
/// All three coordinates above `epsilon` is INSIDE, any below `-epsilon` is
/// OUTSIDE, anything else is BORDER. A degenerate triangle contains nothing.
#[must_use]
pub fn classify_point_in_triangle(
    a: Point,
    b: Point,
    c: Point,
    p: Point,
    epsilon: f64,
) -> Containment {
    let Some(lambdas) = barycentric_coordinates(a, b, c, p) else {
        return Containment::OUTSIDE;
    };
    if lambdas.iter().any(|l| *l < -epsilon) {
        Containment::OUTSIDE
    } else if lambdas.iter().all(|l| *l > epsilon) {
        Containment::INSIDE
    } else {
        Containment::BORDER
    }
}

/// The gap between `|x|` and the next larger representable `f64`.
#[inline]
#[must_use]
pub fn ulp(x: f64) -> f64 {
    let x = x.abs();
    x.next_up() - x
}

/// Returns `true` if `p` lies on segment `ab`.
///
/// The test accepts `p` when `|ap| + |pb|` is within `ulps` units in the last
/// place of `|ab|`. Endpoints count as on the segment.
#[must_use]
pub fn is_point_on_segment(a: Point, b: Point, p: Point, ulps: u32) -> bool {
    let length = a.distance(b);
    if length == 0.0 || !length.is_finite() {
        return false;
    }
    let detour = a.distance(p) + p.distance(b);
    (detour - length).abs() <= f64::from(ulps) * ulp(length)
}

/// The in-circle determinant of `d` against `abc`.
///
/// Positive when `d` is inside the circle through a counter-clockwise `abc`,
/// negative outside, zero when the four points are cocircular. Returned with
/// its permanent (the same sum with every product taken in absolute value),
/// which bounds the magnitude of the terms and serves as the scale of the
/// tolerance band.
#[must_use]
pub fn incircle_determinant(a: Point, b: Point, c: Point, d: Point) -> (f64, f64) {
    let (ad, bd, cd) = (a - d, b - d, c - d);
    let (a_lift, b_lift, c_lift) = (ad.dot(ad), bd.dot(bd), cd.dot(cd));

    let (bc, cb) = (bd.x() * cd.y(), cd.x() * bd.y());
    let (ca, ac) = (cd.x() * ad.y(), ad.x() * cd.y());
    let (ab, ba) = (ad.x() * bd.y(), bd.x() * ad.y());

    let det = a_lift * (bc - cb) + b_lift * (ca - ac) + c_lift * (ab - ba);
    let permanent = a_lift * (bc.abs() + cb.abs())
        + b_lift * (ca.abs() + ac.abs())
        + c_lift * (ab.abs() + ba.abs());
    (det, permanent)
}

/// Strict in-circle test against the circumcircle of `abc`, in either winding.
///
/// The band is `|det| <= epsilon * permanent` (see [`incircle_determinant`]),
/// so it does not widen with the circumradius of thin triangles. Exactly
/// collinear `abc` yields BOUNDARY.
///
/// # Examples
///
/// ```rust
/// use delaunay_dag::geometry::point::Point;
/// use delaunay_dag::geometry::predicates::{InCircle, incircle};
///
/// // A sliver with a circumradius near 5e7.
/// let (a, b, c) = (Point::new(-1.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1e-8));
/// assert_eq!(incircle(a, b, c, Point::new(0.0, -1.0), 1e-10), InCircle::INSIDE);
/// assert_eq!(incircle(a, b, c, Point::new(0.0, 1.0), 1e-10), InCircle::OUTSIDE);
/// ```
#[must_use]
pub fn incircle(a: Point, b: Point, c: Point, d: Point, epsilon: f64) -> InCircle {
    let orientation = orientation_determinant(a, b, c);
    if orientation == 0.0 || !orientation.is_finite() {
        return InCircle::BOUNDARY;
    }
    let (det, permanent) = incircle_determinant(a, b, c, d);
    if !det.is_finite() || !permanent.is_finite() || det.abs() <= epsilon * permanent {
        return InCircle::BOUNDARY;
    }
    if (det > 0.0) == (orientation > 0.0) {
        InCircle::INSIDE
    } else {
        InCircle::OUTSIDE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::util::circumcircle::Circumcircle;
    use approx::assert_relative_eq;

    fn unit_triangle() -> (Point, Point, Point) {
        (
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        )
    }

    #[test]
    fn orientation_detects_ccw_cw_and_collinear() {
        let (a, b, c) = unit_triangle();
        assert_eq!(triangle_orientation(a, b, c, 1e-12), Orientation::POSITIVE);
        assert_eq!(triangle_orientation(b, a, c, 1e-12), Orientation::NEGATIVE);
        assert_eq!(
            triangle_orientation(a, Point::new(1.0, 1.0), Point::new(3.0, 3.0), 1e-12),
            Orientation::DEGENERATE
        );
        assert_eq!(Orientation::POSITIVE.reversed(), Orientation::NEGATIVE);
    }

    #[test]
    fn orientation_tolerance_scales_with_triangle_size() {
        // Same shape, scaled by 1e6: classification must not change.
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        let c = Point::new(0.5, 1e-8);
        let k = 1e6;
        assert_eq!(
            triangle_orientation(a, b, c, 1e-6),
            triangle_orientation(a * k, b * k, c * k, 1e-6)
        );
        assert_eq!(triangle_orientation(a, b, c, 1e-6), Orientation::DEGENERATE);
        assert_eq!(triangle_orientation(a, b, c, 1e-12), Orientation::POSITIVE);
    }

    #[test]
    fn edge_side_reports_left_and_right() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(edge_side(a, b, Point::new(5.0, 1.0), 1e-9), Orientation::POSITIVE);
        assert_eq!(edge_side(a, b, Point::new(5.0, -1.0), 1e-9), Orientation::NEGATIVE);
        assert_eq!(edge_side(a, b, Point::new(20.0, 0.0), 1e-9), Orientation::DEGENERATE);
        assert_eq!(edge_side(a, a, Point::new(1.0, 1.0), 1e-9), Orientation::DEGENERATE);
    }

    #[test]
    fn barycentric_coordinates_sum_to_one() {
        let (a, b, c) = unit_triangle();
        let lambdas = barycentric_coordinates(a, b, c, Point::new(0.25, 0.25)).unwrap();
        assert_relative_eq!(lambdas.iter().sum::<f64>(), 1.0);
        assert_relative_eq!(lambdas[0], 0.5);
        assert_relative_eq!(lambdas[1], 0.25);
        assert_relative_eq!(lambdas[2], 0.25);

        assert!(barycentric_coordinates(a, a, c, Point::new(0.1, 0.1)).is_none());
    }

    #[test]
    fn classify_point_in_triangle_cases() {
        let (a, b, c) = unit_triangle();
        let eps = 1e-9;
        assert_eq!(
            classify_point_in_triangle(a, b, c, Point::new(0.2, 0.2), eps),
            Containment::INSIDE
        );
        assert_eq!(
            classify_point_in_triangle(a, b, c, Point::new(0.5, 0.0), eps),
            Containment::BORDER
        );
        assert_eq!(
            classify_point_in_triangle(a, b, c, a, eps),
            Containment::BORDER
        );
        assert_eq!(
            classify_point_in_triangle(a, b, c, Point::new(1.0, 1.0), eps),
            Containment::OUTSIDE
        );
        assert!(Containment::BORDER.contains());
        assert!(!Containment::OUTSIDE.contains());
    }

    #[test]
    fn ulp_matches_epsilon_at_one() {
        assert_relative_eq!(ulp(1.0), f64::EPSILON);
        assert_relative_eq!(ulp(-1.0), f64::EPSILON);
        assert!(ulp(1e6) > ulp(1.0));
    }

    #[test]
    fn point_on_segment_accepts_midpoints_and_rejects_offsets() {
        let a = Point::new(10.0, 10.0);
        let b = Point::new(1910.0, 10.0);
        assert!(is_point_on_segment(a, b, a.midpoint(b), 8));
        assert!(is_point_on_segment(a, b, a, 8));

        let diagonal_a = Point::new(0.1, 0.3);
        let diagonal_b = Point::new(7.7, 3.9);
        assert!(is_point_on_segment(
            diagonal_a,
            diagonal_b,
            diagonal_a.midpoint(diagonal_b),
            8
        ));

        assert!(!is_point_on_segment(a, b, Point::new(960.0, 11.0), 8));
        assert!(!is_point_on_segment(a, b, Point::new(2000.0, 10.0), 8));
        assert!(!is_point_on_segment(a, a, a, 8));
    }

    #[test]
    fn incircle_is_strict_on_the_circle() {
        let a = Point::new(1.0, 0.0);
        let b = Point::new(0.0, 1.0);
        let c = Point::new(-1.0, 0.0);
        assert_eq!(incircle(a, b, c, Point::new(0.0, 0.0), 1e-10), InCircle::INSIDE);
        assert_eq!(incircle(a, b, c, Point::new(0.0, -1.0), 1e-10), InCircle::BOUNDARY);
        assert_eq!(incircle(a, b, c, Point::new(3.0, 3.0), 1e-10), InCircle::OUTSIDE);
        assert_eq!(
            incircle(a, a, c, Point::new(0.0, 0.0), 1e-10),
            InCircle::BOUNDARY
        );
        // Clockwise input classifies the same way.
        assert_eq!(incircle(c, b, a, Point::new(0.0, 0.0), 1e-10), InCircle::INSIDE);
        assert_eq!(incircle(c, b, a, Point::new(3.0, 3.0), 1e-10), InCircle::OUTSIDE);
    }

    #[test]
    fn incircle_band_does_not_grow_with_circumradius() {
        // Sliver with circumradius about 5e8; a radius-relative band is 0.05
        // wide there.
        let a = Point::new(-10.0, 0.0);
        let b = Point::new(10.0, 0.0);
        let c = Point::new(0.0, 1e-7);
        let circle = Circumcircle::from_points(a, b, c).unwrap();
        assert!(circle.radius() > 1e8);

        // 1e-3 inside the circle, just below `a`.
        let d = Point::new(-10.0, -1e-3);
        assert_eq!(circle.classify(d, 1e-10), InCircle::BOUNDARY);
        assert_eq!(incircle(a, b, c, d, 1e-10), InCircle::INSIDE);
        assert_eq!(incircle(a, b, c, Point::new(-10.0, 1e-3), 1e-10), InCircle::OUTSIDE);
    }

    #[test]
    fn incircle_determinant_scales_homogeneously() {
        let (a, b, c) = unit_triangle();
        let d = Point::new(0.3, 0.2);
        let (det, permanent) = incircle_determinant(a, b, c, d);
        let k = 1e3;
        let (det_k, permanent_k) = incircle_determinant(a * k, b * k, c * k, d * k);
        assert!(det > 0.0);
        assert_relative_eq!(det_k, det * k.powi(4), max_relative = 1e-12);
        assert_relative_eq!(permanent_k, permanent * k.powi(4), max_relative = 1e-12);
    }
}
