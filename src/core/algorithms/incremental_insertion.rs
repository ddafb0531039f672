//! Incremental Delaunay insertion by face and edge splitting.
//!
//! Insertion of a point `p` proceeds as follows:
//! 1. Locate the live face containing `p` through the history DAG
//! 2. Classify `p` against that face: strictly inside, or on its border
//! 3. Split: one face into three, or the two faces sharing an edge into four
//! 4. Record the replacement in the history DAG
//! 5. Legalize the edges opposite `p` with Lawson flips
//!
//! All candidate faces are validated before the mesh is touched, so a point
//! that would create a degenerate face fails with
//! [`InsertionError::DegenerateTriangle`] and no mutation. Errors that surface
//! later (flip budget, broken wiring) rely on the caller's transaction to undo
//! the partial work.

use crate::core::algorithms::flips::{self, BoundingVertices, FlipError};
use crate::core::algorithms::locate::{LocateError, PointLocationHierarchy, classify_point_in_face};
use crate::core::collections::{FaceKeyBuffer, FaceKeySet, fast_hash_set_with_capacity};
use crate::core::operations::{InsertionStatistics, TopologicalOperation};
use crate::core::traits::data_type::DataType;
use crate::core::triangulation_data_structure::{EdgeKey, FaceKey, Tds, TdsError, VertexKey};
use crate::geometry::point::{Point, PointValidationError};
use crate::geometry::predicates::{Containment, Orientation, edge_side, is_point_on_segment};
use crate::geometry::robust_predicates::PredicateConfig;
use crate::geometry::symbolic::{self, Position};
use crate::geometry::util::circumcircle::Circumcircle;

/// Error during incremental insertion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InsertionError {
    /// The point lies outside (or on the boundary of) the bounding triangle.
    #[error("Point {point} is outside the triangulation bounds")]
    PointOutsideBounds {
        /// The rejected point.
        point: Point,
    },

    /// A vertex already exists within the minimum spacing.
    #[error("Point {point} coincides with existing vertex {existing:?}")]
    PointExists {
        /// The rejected point.
        point: Point,
        /// The vertex it collides with.
        existing: VertexKey,
    },

    /// The point is on the border of its face but no edge could be split and
    /// no neighboring face strictly contains it.
    #[error("Point {point} is on the border of face {face:?} but on none of its edges")]
    EdgeNotFound {
        /// The point being inserted.
        point: Point,
        /// The face it was located in.
        face: FaceKey,
    },

    /// The split would create a clockwise or collinear face.
    #[error(
        "Insertion would create degenerate triangle [{}, {}, {}]",
        .corners[0],
        .corners[1],
        .corners[2]
    )]
    DegenerateTriangle {
        /// Corners of the offending triangle.
        corners: [Position; 3],
    },

    /// The coordinates are not finite.
    #[error("Invalid point: {0}")]
    InvalidPoint(#[from] PointValidationError),

    /// Point location failed.
    #[error("Location error: {0}")]
    Location(#[from] LocateError),

    /// A mesh lookup or edit failed.
    #[error("Topology error: {0}")]
    Topology(#[from] TdsError),

    /// Legalization failed.
    #[error("Flip error: {0}")]
    Flip(#[from] FlipError),
}

impl InsertionError {
    /// Returns `true` when the triangulation is intact and the caller may
    /// simply try a different point.
    ///
    /// The remaining variants indicate a corrupted mesh or hierarchy.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PointOutsideBounds { .. }
                | Self::PointExists { .. }
                | Self::EdgeNotFound { .. }
                | Self::DegenerateTriangle { .. }
                | Self::InvalidPoint(_)
                | Self::Flip(FlipError::FlipLimitExceeded { .. })
        )
    }
}

/// Where a point will be inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionSite {
    /// Strictly inside a live face.
    Face(FaceKey),
    /// On an interior edge, given by one of its half-edges.
    Edge(EdgeKey),
}

/// Returns `true` if `corners` form a counter-clockwise, non-degenerate
/// triangle whose circumcircle (when finite) can be computed.
#[must_use]
pub fn is_valid_triangle(corners: [Position; 3], config: &PredicateConfig) -> bool {
    if symbolic::orientation(corners[0], corners[1], corners[2], config.degeneracy_epsilon)
        != Orientation::POSITIVE
    {
        return false;
    }
    match corners {
        [Position::Finite(a), Position::Finite(b), Position::Finite(c)] => {
            Circumcircle::from_points(a, b, c).is_ok()
        }
        _ => true,
    }
}

fn require_valid(corners: [Position; 3], config: &PredicateConfig) -> Result<(), InsertionError> {
    if is_valid_triangle(corners, config) {
        Ok(())
    } else {
        Err(InsertionError::DegenerateTriangle { corners })
    }
}

/// The three boundary half-edges of a live triangle.
fn triangle_edges<U: DataType>(tds: &Tds<U>, face: FaceKey) -> Result<[EdgeKey; 3], TdsError> {
    let edges = tds.face_edges(face)?;
    match edges.as_slice() {
        &[e0, e1, e2] => Ok([e0, e1, e2]),
        _ => Err(TdsError::NotATriangle { face }),
    }
}

/// The three faces an inside split of `face` would create, checked.
fn check_inside_split<U: DataType>(
    tds: &Tds<U>,
    face: FaceKey,
    p: Position,
    config: &PredicateConfig,
) -> Result<(), InsertionError> {
    let [a, b, c] = tds.face_positions(face)?;
    require_valid([a, b, p], config)?;
    require_valid([b, c, p], config)?;
    require_valid([c, a, p], config)
}

/// The four faces an edge split of `e` would create, checked.
///
/// Returns `Ok(false)` if the edge borders the outer face.
fn check_edge_split<U: DataType>(
    tds: &Tds<U>,
    e: EdgeKey,
    p: Position,
    config: &PredicateConfig,
) -> Result<bool, InsertionError> {
    let t = tds.twin(e)?;
    if tds.face_of(t)? == tds.outer_face() {
        return Ok(false);
    }
    let a = tds.position(tds.origin(e)?)?;
    let b = tds.position(tds.origin(t)?)?;
    let c = tds.position(tds.origin(tds.prev(e)?)?)?;
    let d = tds.position(tds.origin(tds.prev(t)?)?)?;
    require_valid([a, p, c], config)?;
    require_valid([p, b, c], config)?;
    require_valid([b, p, d], config)?;
    require_valid([p, a, d], config)?;
    Ok(true)
}

/// Decide how to insert a point classified BORDER against `face`.
///
/// A point that is not strictly left of a boundary edge of the frame is
/// rejected first. Otherwise tries, in order: an interior edge of `face` that
/// the point lies on (within `on_edge_ulps`) and whose four split faces are
/// valid; then an inside split of `face` or of any face around its corners
/// that strictly contains the point.
///
/// # Errors
///
/// [`InsertionError::PointOutsideBounds`] if the point is on or beyond an
/// edge of the outer boundary, [`InsertionError::EdgeNotFound`] if nothing
/// applies.
pub fn resolve_border<U: DataType>(
    tds: &Tds<U>,
    face: FaceKey,
    point: Point,
    config: &PredicateConfig,
) -> Result<(InsertionSite, bool), InsertionError> {
    let p = Position::Finite(point);
    let edges = triangle_edges(tds, face)?;

    for &e in &edges {
        if tds.face_of(tds.twin(e)?)? != tds.outer_face() {
            continue;
        }
        let (Position::Finite(a), Position::Finite(b)) =
            (tds.position(tds.origin(e)?)?, tds.position(tds.target(e)?)?)
        else {
            continue;
        };
        if edge_side(a, b, point, config.degeneracy_epsilon) != Orientation::POSITIVE {
            return Err(InsertionError::PointOutsideBounds { point });
        }
    }

    for e in edges {
        let (Position::Finite(a), Position::Finite(b)) =
            (tds.position(tds.origin(e)?)?, tds.position(tds.target(e)?)?)
        else {
            continue;
        };
        if !is_point_on_segment(a, b, point, config.on_edge_ulps) {
            continue;
        }
        match check_edge_split(tds, e, p, config) {
            Ok(true) => return Ok((InsertionSite::Edge(e), false)),
            // Strictly inside a boundary edge: an inside split applies.
            Ok(false) | Err(InsertionError::DegenerateTriangle { .. }) => {}
            Err(other) => return Err(other),
        }
    }

    // Near-edge points that fail the on-edge test: split a face that strictly
    // contains them, looking at the face itself first and then its corner fans.
    let mut candidates: FaceKeyBuffer = FaceKeyBuffer::new();
    candidates.push(face);
    let mut seen: FaceKeySet = fast_hash_set_with_capacity(16);
    seen.insert(face);
    seen.insert(tds.outer_face());
    for corner in tds.face_corners(face)? {
        for e in tds.vertex_edges(corner)? {
            let neighbor = tds.face_of(e)?;
            if seen.insert(neighbor) {
                candidates.push(neighbor);
            }
        }
    }
    for candidate in candidates {
        match check_inside_split(tds, candidate, p, config) {
            Ok(()) => return Ok((InsertionSite::Face(candidate), true)),
            Err(InsertionError::DegenerateTriangle { .. }) => {}
            Err(other) => return Err(other),
        }
    }

    Err(InsertionError::EdgeNotFound { point, face })
}

/// Locate `point` and decide where it goes.
///
/// Returns the site and whether the border fallback was used.
///
/// # Errors
///
/// [`InsertionError::PointOutsideBounds`] when the point maps to the outer
/// sentinel, [`InsertionError::DegenerateTriangle`] when an inside split
/// would be degenerate, and the errors of [`resolve_border`].
pub fn find_insertion_site<U: DataType>(
    tds: &Tds<U>,
    hierarchy: &PointLocationHierarchy,
    point: Point,
    config: &PredicateConfig,
) -> Result<(InsertionSite, bool), InsertionError> {
    let face = hierarchy.find_face(tds, point, config)?;
    if face == tds.outer_face() {
        return Err(InsertionError::PointOutsideBounds { point });
    }
    match classify_point_in_face(tds, face, point, config)? {
        Containment::INSIDE => {
            check_inside_split(tds, face, Position::Finite(point), config)?;
            Ok((InsertionSite::Face(face), false))
        }
        Containment::BORDER => resolve_border(tds, face, point, config),
        Containment::OUTSIDE => Err(LocateError::UnexpectedOutside { point, face }.into()),
    }
}

/// Split `face = (a, b, c)` at the new vertex `p` into `(a, b, p)`,
/// `(b, c, p)` and `(c, a, p)`.
///
/// # Errors
///
/// Mesh and history errors; validity of the new faces is the caller's
/// responsibility (see [`find_insertion_site`]).
pub fn split_face_inside<U: DataType>(
    tds: &mut Tds<U>,
    hierarchy: &mut PointLocationHierarchy,
    face: FaceKey,
    p: VertexKey,
    config: &PredicateConfig,
) -> Result<FaceKeyBuffer, InsertionError> {
    let [e0, e1, e2] = triangle_edges(tds, face)?;
    let [a, b, c] = [tds.origin(e0)?, tds.origin(e1)?, tds.origin(e2)?];

    let (pa, ap) = tds.add_edge_pair(p, a);
    let (pb, bp) = tds.add_edge_pair(p, b);
    let (pc, cp) = tds.add_edge_pair(p, c);

    let mut created = FaceKeyBuffer::new();
    created.push(tds.create_face([e0, bp, pa], config)?);
    created.push(tds.create_face([e1, cp, pb], config)?);
    created.push(tds.create_face([e2, ap, pc], config)?);
    tds.set_incident_edge(p, pa)?;

    hierarchy.replace_faces(&[face], &created)?;
    Ok(created)
}

/// Split the edge `e: a → b` at the new vertex `p`.
///
/// With `e` in `(a, b, c)` and its twin `t` in `(b, a, d)`, the faces
/// `(a, p, c)`, `(p, b, c)`, `(b, p, d)` and `(p, a, d)` replace them. `e`
/// and `t` are kept as the halves `a → p` and `b → p`.
///
/// # Errors
///
/// [`FlipError::BoundaryEdge`] (as [`InsertionError::Flip`]) if `e` borders
/// the outer face, otherwise mesh and history errors.
pub fn split_edge<U: DataType>(
    tds: &mut Tds<U>,
    hierarchy: &mut PointLocationHierarchy,
    e: EdgeKey,
    p: VertexKey,
    config: &PredicateConfig,
) -> Result<FaceKeyBuffer, InsertionError> {
    let t = tds.twin(e)?;
    let (f, g) = (tds.face_of(e)?, tds.face_of(t)?);
    if f == tds.outer_face() || g == tds.outer_face() {
        return Err(FlipError::BoundaryEdge { edge: e }.into());
    }
    let (e_next, e_prev) = (tds.next(e)?, tds.prev(e)?);
    let (t_next, t_prev) = (tds.next(t)?, tds.prev(t)?);
    let c = tds.origin(e_prev)?;
    let d = tds.origin(t_prev)?;

    let pa = tds.add_half_edge(p);
    let pb = tds.add_half_edge(p);
    tds.set_twins(e, pa)?;
    tds.set_twins(t, pb)?;
    let (pc, cp) = tds.add_edge_pair(p, c);
    let (pd, dp) = tds.add_edge_pair(p, d);

    let f1 = tds.create_face([e, pc, e_prev], config)?;
    let f2 = tds.create_face([pb, e_next, cp], config)?;
    let g1 = tds.create_face([t, pd, t_prev], config)?;
    let g2 = tds.create_face([pa, t_next, dp], config)?;
    tds.set_incident_edge(p, pa)?;

    hierarchy.replace_faces(&[f], &[f1, f2])?;
    hierarchy.replace_faces(&[g], &[g1, g2])?;
    Ok(FaceKeyBuffer::from_slice(&[f1, f2, g1, g2]))
}

/// Insert `point` as a new vertex, split and legalize.
///
/// This does not check for duplicates or open a transaction; on error the
/// mesh may be partially modified and must be rolled back by the caller.
///
/// # Errors
///
/// Any [`InsertionError`].
pub fn insert_vertex<U: DataType>(
    tds: &mut Tds<U>,
    hierarchy: &mut PointLocationHierarchy,
    point: Point,
    data: Option<U>,
    bounding: &BoundingVertices,
    config: &PredicateConfig,
    max_flips: usize,
) -> Result<(VertexKey, InsertionStatistics), InsertionError> {
    let (site, fallback) = find_insertion_site(tds, hierarchy, point, config)?;
    let vertex = tds.add_vertex(Position::Finite(point), data);

    let operation = match site {
        InsertionSite::Face(face) => {
            split_face_inside(tds, hierarchy, face, vertex, config)?;
            TopologicalOperation::SplitFace
        }
        InsertionSite::Edge(edge) => {
            split_edge(tds, hierarchy, edge, vertex, config)?;
            TopologicalOperation::SplitEdge
        }
    };

    let flip_stats =
        flips::legalize_around_vertex(tds, hierarchy, vertex, bounding, config, max_flips)?;

    let mut statistics = InsertionStatistics::new(operation);
    statistics.flips = flip_stats.flips_performed;
    statistics.edges_checked = flip_stats.edges_checked;
    statistics.flags.fallback_inside_split = fallback;
    statistics.flags.flip_skipped = flip_stats.flips_skipped > 0;
    tracing::trace!(
        %point,
        ?vertex,
        ?operation,
        flips = statistics.flips,
        "inserted vertex"
    );
    Ok((vertex, statistics))
}
