//! Data and operations on planar points.
//!
//! A [`Point`] doubles as a 2D vector: the arithmetic operators treat it as a
//! displacement, while [`Point::distance`] and friends treat it as a location.
//!
//! # Lexicographic Order
//!
//! Symbolic predicates (see [`crate::geometry::symbolic`]) compare points
//! lexicographically by `y` first, then by `x`. That order is exposed via
//! [`Point::lexicographic_cmp`] and [`Point::lex_less`].

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

// =============================================================================
// POINT STRUCT DEFINITION
// =============================================================================

/// An immutable `(x, y)` pair of `f64` coordinates.
///
/// Points are intended to be immutable once created, so the coordinates are
/// private and exposed through accessors.
///
/// # Examples
///
/// ```rust
/// use delaunay_dag::geometry::point::Point;
///
/// let a = Point::new(1.0, 2.0);
/// let b = Point::new(4.0, 6.0);
/// assert_eq!(a.distance(b), 5.0);
/// assert_eq!(a.midpoint(b), Point::new(2.5, 4.0));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
}

/// Errors that can occur when validating point coordinates.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum PointValidationError {
    /// A coordinate was NaN or infinite.
    #[error("Invalid coordinate at index {coordinate_index}: {value} (must be finite)")]
    NonFinite {
        /// Index of the offending coordinate (0 = x, 1 = y).
        coordinate_index: usize,
        /// The offending value.
        value: f64,
    },
}

impl Point {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a point without validating its coordinates.
    ///
    /// Use [`Point::try_from`] when the coordinates come from untrusted input.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The x coordinate.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// The y coordinate.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// The coordinates as an array.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Check that both coordinates are finite.
    ///
    /// # Errors
    ///
    /// Returns [`PointValidationError::NonFinite`] naming the first
    /// coordinate that is NaN or infinite.
    pub fn validate(&self) -> Result<(), PointValidationError> {
        for (coordinate_index, value) in self.coords().into_iter().enumerate() {
            if !value.is_finite() {
                return Err(PointValidationError::NonFinite {
                    coordinate_index,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Returns `true` if both coordinates are finite.
    #[inline]
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Multiply both components by `factor`.
    #[inline]
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Linear interpolation: `self` at `t = 0`, `other` at `t = 1`.
    #[inline]
    #[must_use]
    pub fn interpolate(self, other: Self, t: f64) -> Self {
        Self::new(
            (other.x - self.x).mul_add(t, self.x),
            (other.y - self.y).mul_add(t, self.y),
        )
    }

    /// The midpoint of the segment `self`-`other`.
    #[inline]
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new(f64::midpoint(self.x, other.x), f64::midpoint(self.y, other.y))
    }

    /// Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Squared Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Dot product, treating both points as vectors.
    #[inline]
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    /// The z component of the 3D cross product, treating both points as vectors.
    #[inline]
    #[must_use]
    #[expect(
        clippy::suboptimal_flops,
        reason = "A fused multiply-add makes cross(v, v) non-zero; collinearity tests need exact cancellation"
    )]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Euclidean length, treating the point as a vector.
    #[inline]
    #[must_use]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Compare by `y`, then by `x`.
    ///
    /// Uses [`f64::total_cmp`], so the order is total even for NaN. Callers
    /// validate coordinates before relying on the geometric meaning.
    #[must_use]
    pub fn lexicographic_cmp(&self, other: &Self) -> Ordering {
        self.y
            .total_cmp(&other.y)
            .then_with(|| self.x.total_cmp(&other.x))
    }

    /// Returns `true` if `self` is strictly lexicographically smaller than `other`.
    #[inline]
    #[must_use]
    pub fn lex_less(&self, other: &Self) -> bool {
        self.lexicographic_cmp(other) == Ordering::Less
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl TryFrom<[f64; 2]> for Point {
    type Error = PointValidationError;

    fn try_from(coords: [f64; 2]) -> Result<Self, Self::Error> {
        let point = Self::new(coords[0], coords[1]);
        point.validate()?;
        Ok(point)
    }
}

impl TryFrom<(f64, f64)> for Point {
    type Error = PointValidationError;

    fn try_from((x, y): (f64, f64)) -> Result<Self, Self::Error> {
        Self::try_from([x, y])
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        point.coords()
    }
}

impl From<&Point> for [f64; 2] {
    fn from(point: &Point) -> Self {
        point.coords()
    }
}

// =============================================================================
// TESTS
// =============================================================================
