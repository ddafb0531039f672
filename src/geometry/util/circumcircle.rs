//! Circumcircles and counter-clockwise triangles.

use serde::{Deserialize, Serialize};

use crate::geometry::point::Point;
use crate::geometry::predicates::{InCircle, Orientation, orientation_determinant, triangle_orientation};

/// Errors that can occur when building circumcircles and triangles.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CircumcenterError {
    /// The three points are collinear (or coincide), so no circle passes through them.
    #[error("Degenerate triangle: {a}, {b}, {c} are collinear")]
    Collinear {
        /// First corner.
        a: Point,
        /// Second corner.
        b: Point,
        /// Third corner.
        c: Point,
    },
    /// The circumcenter computation overflowed or produced NaN.
    #[error("Circumcenter of {a}, {b}, {c} is not finite")]
    NonFinite {
        /// First corner.
        a: Point,
        /// Second corner.
        b: Point,
        /// Third corner.
        c: Point,
    },
}

/// The circle through the three corners of a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circumcircle {
    center: Point,
    radius: f64,
}

impl Circumcircle {
    /// Compute the circumcircle of `a`, `b`, `c`.
    ///
    /// The circumcenter is the intersection of the perpendicular bisectors,
    /// computed in closed form relative to `a` to limit cancellation. The
    /// radius is the distance from the center to `a`.
    ///
    /// # Errors
    ///
    /// Returns [`CircumcenterError::Collinear`] when the corners are exactly
    /// collinear and [`CircumcenterError::NonFinite`] when the result overflows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use delaunay_dag::geometry::point::Point;
    /// use delaunay_dag::geometry::util::circumcircle::Circumcircle;
    ///
    /// let circle = Circumcircle::from_points(
    ///     Point::new(0.0, 0.0),
    ///     Point::new(2.0, 0.0),
    ///     Point::new(0.0, 2.0),
    /// )
    /// .unwrap();
    /// assert_eq!(circle.center(), Point::new(1.0, 1.0));
    /// assert!((circle.radius() - 2.0_f64.sqrt()).abs() < 1e-12);
    /// ```
    pub fn from_points(a: Point, b: Point, c: Point) -> Result<Self, CircumcenterError> {
        let ab = b - a;
        let ac = c - a;
        let d = 2.0 * ab.cross(ac);
        if d == 0.0 {
            return Err(CircumcenterError::Collinear { a, b, c });
        }

        let ab2 = ab.dot(ab);
        let ac2 = ac.dot(ac);
        let ux = (ac.y() * ab2 - ab.y() * ac2) / d;
        let uy = (ab.x() * ac2 - ac.x() * ab2) / d;
        let center = Point::new(a.x() + ux, a.y() + uy);
        let radius = center.distance(a);

        if !center.is_finite() || !radius.is_finite() {
            return Err(CircumcenterError::NonFinite { a, b, c });
        }
        Ok(Self { center, radius })
    }

    /// The circumcenter.
    #[must_use]
    pub const fn center(&self) -> Point {
        self.center
    }

    /// The circumradius.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Strict containment: `distance(center, p) < radius * (1 - epsilon)`.
    ///
    /// Points on the circle (within the band) are not contained.
    #[must_use]
    pub fn contains(&self, p: Point, epsilon: f64) -> bool {
        self.classify(p, epsilon) == InCircle::INSIDE
    }

    /// Classify `p` against the circle with a relative tolerance band.
    #[must_use]
    pub fn classify(&self, p: Point, epsilon: f64) -> InCircle {
        let distance = self.center.distance(p);
        if distance < self.radius * (1.0 - epsilon) {
            InCircle::INSIDE
        } else if distance > self.radius * (1.0 + epsilon) {
            InCircle::OUTSIDE
        } else {
            InCircle::BOUNDARY
        }
    }
}

/// A finite triangle stored in counter-clockwise order with its circumcircle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    corners: [Point; 3],
    circumcircle: Circumcircle,
}

impl Triangle {
    /// Build a triangle, swapping two corners if the input is clockwise.
    ///
    /// # Errors
    ///
    /// Returns [`CircumcenterError::Collinear`] if the corners are collinear
    /// within `degeneracy_epsilon` (relative to the squared longest edge).
    pub fn new(
        a: Point,
        b: Point,
        c: Point,
        degeneracy_epsilon: f64,
    ) -> Result<Self, CircumcenterError> {
        let corners = match triangle_orientation(a, b, c, degeneracy_epsilon) {
            Orientation::POSITIVE => [a, b, c],
            Orientation::NEGATIVE => [a, c, b],
            Orientation::DEGENERATE => return Err(CircumcenterError::Collinear { a, b, c }),
        };
        let circumcircle = Circumcircle::from_points(corners[0], corners[1], corners[2])?;
        Ok(Self {
            corners,
            circumcircle,
        })
    }

    /// Corners in counter-clockwise order.
    #[must_use]
    pub const fn corners(&self) -> [Point; 3] {
        self.corners
    }

    /// The cached circumcircle.
    #[must_use]
    pub const fn circumcircle(&self) -> Circumcircle {
        self.circumcircle
    }

    /// Unsigned area.
    #[must_use]
    pub fn area(&self) -> f64 {
        let [a, b, c] = self.corners;
        0.5 * orientation_determinant(a, b, c).abs()
    }
}
