//! Predicates over finite and symbolic (infinitely distant) positions.
//!
//! The symbolic bounding vertices are modelled as limits:
//!
//! - [`Position::SymbolicTop`] sits at `R·(-1, η)`,
//! - [`Position::SymbolicBottom`] sits at `R·(1, -δ)`,
//!
//! with `R → ∞` and `0 < η ≪ δ ≪ 1`. Every orientation involving them then
//! reduces to a lexicographic comparison of the finite points (y first, then x):
//!
//! | triple                | positive iff       |
//! |-----------------------|--------------------|
//! | `(p, q, Bottom)`      | `q <lex p`         |
//! | `(p, q, Top)`         | `q >lex p`         |
//! | `(p, Top, Bottom)`    | always             |
//!
//! Orientation is invariant under cyclic rotation, so any triple is first
//! rotated into one of these forms. With a highest point `p0`, the triangle
//! `(p0, Top, Bottom)` covers exactly the points lexicographically below `p0`.
//!
//! A circumcircle through a point at infinity degenerates into the half-plane
//! on the symbolic side of the triangle's finite edge; with two symbolic
//! corners and finite corner `p` it becomes `{d : d <lex p}`. Symbolic query
//! points are never inside any circle.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::geometry::point::Point;
use crate::geometry::predicates::{
    Containment, InCircle, Orientation, classify_point_in_triangle, edge_side,
    incircle as finite_incircle, triangle_orientation,
};
use crate::geometry::robust_predicates::PredicateConfig;

/// Location of a mesh vertex: a finite point or one of the two symbolic points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Position {
    /// An ordinary point in the plane.
    Finite(Point),
    /// The symbolic point far to the left (and slightly up).
    SymbolicTop,
    /// The symbolic point far to the right (and slightly down).
    SymbolicBottom,
}

impl Position {
    /// The finite point, if any.
    #[must_use]
    pub const fn finite(&self) -> Option<Point> {
        match self {
            Self::Finite(p) => Some(*p),
            Self::SymbolicTop | Self::SymbolicBottom => None,
        }
    }

    /// Returns `true` for the two symbolic variants.
    #[must_use]
    pub const fn is_symbolic(&self) -> bool {
        !matches!(self, Self::Finite(_))
    }
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Self::Finite(point)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(p) => write!(f, "{p}"),
            Self::SymbolicTop => write!(f, "SymbolicTop"),
            Self::SymbolicBottom => write!(f, "SymbolicBottom"),
        }
    }
}

/// Number of symbolic positions in `corners`.
#[must_use]
pub fn symbolic_count(corners: &[Position; 3]) -> usize {
    corners.iter().filter(|c| c.is_symbolic()).count()
}

/// Rotate `corners` cyclically until `pred` holds for the position at `index`.
fn rotate_until(
    corners: [Position; 3],
    index: usize,
    pred: impl Fn(&Position) -> bool,
) -> Option<[Position; 3]> {
    let mut rotated = corners;
    for _ in 0..3 {
        if pred(&rotated[index]) {
            return Some(rotated);
        }
        rotated.rotate_left(1);
    }
    None
}

fn lex_orientation(ordering: Ordering) -> Orientation {
    match ordering {
        Ordering::Less => Orientation::NEGATIVE,
        Ordering::Equal => Orientation::DEGENERATE,
        Ordering::Greater => Orientation::POSITIVE,
    }
}

/// Orientation of a triple containing at least one symbolic position.
///
/// Returns `None` when all three positions are finite.
fn symbolic_orientation(corners: [Position; 3]) -> Option<Orientation> {
    match symbolic_count(&corners) {
        0 => None,
        1 => {
            let [p, q, s] = rotate_until(corners, 2, Position::is_symbolic)?;
            let (p, q) = (p.finite()?, q.finite()?);
            Some(match s {
                // positive iff q <lex p
                Position::SymbolicBottom => lex_orientation(p.lexicographic_cmp(&q)),
                // positive iff q >lex p
                Position::SymbolicTop => lex_orientation(q.lexicographic_cmp(&p)),
                Position::Finite(_) => Orientation::DEGENERATE,
            })
        }
        2 => {
            let [_, x, y] = rotate_until(corners, 0, |c| !c.is_symbolic())?;
            Some(match (x, y) {
                (Position::SymbolicTop, Position::SymbolicBottom) => Orientation::POSITIVE,
                (Position::SymbolicBottom, Position::SymbolicTop) => Orientation::NEGATIVE,
                _ => Orientation::DEGENERATE,
            })
        }
        _ => Some(Orientation::DEGENERATE),
    }
}

/// Orientation of the triangle `abc` where any corner may be symbolic.
///
/// Finite triples use [`triangle_orientation`] with `tolerance`.
#[must_use]
pub fn orientation(a: Position, b: Position, c: Position, tolerance: f64) -> Orientation {
    match (a, b, c) {
        (Position::Finite(a), Position::Finite(b), Position::Finite(c)) => {
            triangle_orientation(a, b, c, tolerance)
        }
        _ => symbolic_orientation([a, b, c]).unwrap_or(Orientation::DEGENERATE),
    }
}

/// Side of the finite point `q` relative to the directed edge `a → b`.
///
/// Finite edges use [`edge_side`] with `tolerance`; edges touching a symbolic
/// position use the exact lexicographic rules.
#[must_use]
pub fn side_of_edge(a: Position, b: Position, q: Point, tolerance: f64) -> Orientation {
    match (a, b) {
        (Position::Finite(a), Position::Finite(b)) => edge_side(a, b, q, tolerance),
        _ => symbolic_orientation([a, b, Position::Finite(q)]).unwrap_or(Orientation::DEGENERATE),
    }
}

/// Classify the finite point `q` against a counter-clockwise triangle whose
/// corners may be symbolic.
///
/// Finite triangles use barycentric coordinates; triangles with symbolic
/// corners use a per-edge side test. In both cases the border band is
/// `config.containment_epsilon`.
#[must_use]
pub fn classify_point(corners: [Position; 3], q: Point, config: &PredicateConfig) -> Containment {
    if let [Position::Finite(a), Position::Finite(b), Position::Finite(c)] = corners {
        return classify_point_in_triangle(a, b, c, q, config.containment_epsilon);
    }

    let mut on_border = false;
    for i in 0..3 {
        match side_of_edge(corners[i], corners[(i + 1) % 3], q, config.containment_epsilon) {
            Orientation::NEGATIVE => return Containment::OUTSIDE,
            Orientation::DEGENERATE => on_border = true,
            Orientation::POSITIVE => {}
        }
    }
    if on_border {
        Containment::BORDER
    } else {
        Containment::INSIDE
    }
}

/// In-circle test for a counter-clockwise triangle whose corners may be symbolic.
///
/// All-finite triangles use the normalized determinant of
/// [`predicates::incircle`](crate::geometry::predicates::incircle).
#[must_use]
pub fn incircle(corners: [Position; 3], d: Position, config: &PredicateConfig) -> InCircle {
    let Position::Finite(d) = d else {
        return InCircle::OUTSIDE;
    };

    match symbolic_count(&corners) {
        0 => match corners {
            [Position::Finite(a), Position::Finite(b), Position::Finite(c)] => {
                finite_incircle(a, b, c, d, config.circumcircle_epsilon)
            }
            _ => InCircle::BOUNDARY,
        },
        1 => {
            let Some([Position::Finite(a), Position::Finite(b), _]) =
                rotate_until(corners, 2, Position::is_symbolic)
            else {
                return InCircle::BOUNDARY;
            };
            match edge_side(a, b, d, config.circumcircle_epsilon) {
                Orientation::POSITIVE => InCircle::INSIDE,
                Orientation::DEGENERATE => InCircle::BOUNDARY,
                Orientation::NEGATIVE => InCircle::OUTSIDE,
            }
        }
        2 => {
            let Some(p) = corners.iter().find_map(Position::finite) else {
                return InCircle::OUTSIDE;
            };
            match d.lexicographic_cmp(&p) {
                Ordering::Less => InCircle::INSIDE,
                Ordering::Equal => InCircle::BOUNDARY,
                Ordering::Greater => InCircle::OUTSIDE,
            }
        }
        _ => InCircle::OUTSIDE,
    }
}
