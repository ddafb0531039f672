//! Edge flips and Lawson legalization around a newly inserted vertex.
//!
//! After a split, only edges opposite the new vertex `v` can violate the
//! empty-circle property. They are processed from a FIFO worklist: an illegal
//! edge `a → b` between `(a, b, v)` and `(b, a, l)` is replaced by the
//! diagonal `v → l`, and the two edges of the quadrilateral that are now
//! opposite `v` are queued in turn.
//!
//! Edges between two bounding vertices are never flipped; neither is an edge
//! whose far vertex `l` is symbolic. With one symbolic endpoint the circle
//! through the point at infinity degenerates into a half-plane, which
//! [`symbolic::incircle`] handles.
//!
//! Setting `DELAUNAY_DAG_FLIP_TRACE` in the environment emits one
//! `tracing::debug!` event per examined edge.

use std::collections::VecDeque;

use thiserror::Error;

use crate::core::algorithms::locate::{LocateError, PointLocationHierarchy};
use crate::core::traits::data_type::DataType;
use crate::core::triangulation_data_structure::{EdgeKey, Tds, TdsError, VertexKey};
use crate::geometry::predicates::InCircle;
use crate::geometry::robust_predicates::PredicateConfig;
use crate::geometry::symbolic;

/// Smallest flip budget handed out by [`default_max_flips`].
pub const MIN_FLIP_BUDGET: usize = 128;

/// Errors that can occur while flipping or legalizing.
///
/// # Examples
///
/// ```rust
/// use delaunay_dag::core::algorithms::flips::FlipError;
///
/// let err = FlipError::FlipLimitExceeded {
///     vertex: Default::default(),
///     max_flips: 3,
/// };
/// assert!(err.to_string().contains("3 flips"));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum FlipError {
    /// Legalization did not finish within its flip budget.
    #[error("Legalization around vertex {vertex:?} exceeded {max_flips} flips")]
    FlipLimitExceeded {
        /// The vertex being legalized.
        vertex: VertexKey,
        /// The budget that was exhausted.
        max_flips: usize,
    },
    /// The half-edge borders the outer sentinel and has no second triangle.
    #[error("Half-edge {edge:?} lies on the outer boundary")]
    BoundaryEdge {
        /// The boundary half-edge.
        edge: EdgeKey,
    },
    /// A mesh lookup or edit failed.
    #[error("Mesh error during flip: {0}")]
    Topology(#[from] TdsError),
    /// The history graph rejected the face replacement.
    #[error("History update failed during flip: {0}")]
    Location(#[from] LocateError),
}

/// Counters collected while legalizing one insertion.
///
/// ```rust
/// use delaunay_dag::core::algorithms::flips::FlipStatistics;
///
/// let stats = FlipStatistics::default();
/// assert_eq!(stats.flips_performed, 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlipStatistics {
    /// Number of worklist entries examined.
    pub edges_checked: usize,
    /// Number of flips performed.
    pub flips_performed: usize,
    /// Illegal edges left alone because a new face would not be CCW.
    pub flips_skipped: usize,
    /// Longest worklist observed.
    pub max_queue_len: usize,
}

/// Vertices whose mutual edges are never flipped.
pub type BoundingVertices = [VertexKey; 3];

#[inline]
fn flip_trace_enabled() -> bool {
    std::env::var_os("DELAUNAY_DAG_FLIP_TRACE").is_some()
}

/// Flip budget for one insertion into a mesh with `live_faces` faces.
#[must_use]
pub fn default_max_flips(live_faces: usize) -> usize {
    live_faces.saturating_mul(3).max(MIN_FLIP_BUDGET)
}

/// Returns `true` if the edge carrying half-edge `e` is locally Delaunay.
///
/// `e` is read as `a → b` in face `(a, b, v)` with twin in `(b, a, l)`. The
/// edge is illegal when `l` lies strictly inside the (possibly degenerate)
/// circumcircle of `(a, b, v)`, or `v` strictly inside that of `(b, a, l)`.
///
/// # Errors
///
/// [`FlipError::Topology`] if the local neighborhood cannot be read.
pub fn is_edge_legal<U: DataType>(
    tds: &Tds<U>,
    e: EdgeKey,
    bounding: &BoundingVertices,
    config: &PredicateConfig,
) -> Result<bool, FlipError> {
    let t = tds.twin(e)?;
    let (f1, f2) = (tds.face_of(e)?, tds.face_of(t)?);
    if f1 == tds.outer_face() || f2 == tds.outer_face() {
        return Ok(true);
    }
    let (a, b) = (tds.origin(e)?, tds.origin(t)?);
    if bounding.contains(&a) && bounding.contains(&b) {
        return Ok(true);
    }
    let far = tds.position(tds.origin(tds.prev(t)?)?)?;
    if far.is_symbolic() {
        return Ok(true);
    }
    let near = tds.position(tds.origin(tds.prev(e)?)?)?;

    let illegal = symbolic::incircle(tds.face_positions(f1)?, far, config) == InCircle::INSIDE
        || symbolic::incircle(tds.face_positions(f2)?, near, config) == InCircle::INSIDE;
    Ok(!illegal)
}

/// Flip the diagonal of the quadrilateral around `e`.
///
/// With `e: a → b` in `(a, b, v)` and its twin `t` in `(b, a, l)`, the faces
/// `(v, a, l)` and `(v, l, b)` replace them; `e` becomes `v → l` and `t`
/// becomes `l → v`. Returns the two half-edges `a → l` and `l → b` now
/// opposite `v`, or `None` (mesh untouched) when either new face would not be
/// counter-clockwise.
///
/// # Errors
///
/// [`FlipError::BoundaryEdge`] if `e` or its twin lies in the outer face,
/// otherwise lookup and history errors.
pub fn flip_edge<U: DataType>(
    tds: &mut Tds<U>,
    hierarchy: &mut PointLocationHierarchy,
    e: EdgeKey,
    config: &PredicateConfig,
) -> Result<Option<[EdgeKey; 2]>, FlipError> {
    let t = tds.twin(e)?;
    let (f1, f2) = (tds.face_of(e)?, tds.face_of(t)?);
    if f1 == tds.outer_face() || f2 == tds.outer_face() {
        return Err(FlipError::BoundaryEdge { edge: e });
    }

    let (e_next, e_prev) = (tds.next(e)?, tds.prev(e)?);
    let (t_next, t_prev) = (tds.next(t)?, tds.prev(t)?);
    let (a, b) = (tds.origin(e)?, tds.origin(t)?);
    let v = tds.origin(e_prev)?;
    let l = tds.origin(t_prev)?;

    if tds.check_triangle([v, a, l], config).is_err()
        || tds.check_triangle([v, l, b], config).is_err()
    {
        tracing::warn!(
            ?e,
            ?v,
            ?l,
            "skipping flip: quadrilateral is not strictly convex"
        );
        return Ok(None);
    }

    tds.set_edge_origin(e, v)?;
    tds.set_edge_origin(t, l)?;
    if tds.vertex(a).and_then(|vertex| vertex.incident_edge()) == Some(e) {
        tds.set_incident_edge(a, t_next)?;
    }
    if tds.vertex(b).and_then(|vertex| vertex.incident_edge()) == Some(t) {
        tds.set_incident_edge(b, e_next)?;
    }

    let n1 = tds.create_face([e_prev, t_next, t], config)?;
    let n2 = tds.create_face([e, t_prev, e_next], config)?;
    hierarchy.replace_faces(&[f1, f2], &[n1, n2])?;
    Ok(Some([t_next, t_prev]))
}

/// Restore the Delaunay property around the freshly inserted vertex `v`.
///
/// # Errors
///
/// [`FlipError::FlipLimitExceeded`] if more than `max_flips` flips are needed;
/// the caller is expected to roll the insertion back.
pub fn legalize_around_vertex<U: DataType>(
    tds: &mut Tds<U>,
    hierarchy: &mut PointLocationHierarchy,
    v: VertexKey,
    bounding: &BoundingVertices,
    config: &PredicateConfig,
    max_flips: usize,
) -> Result<FlipStatistics, FlipError> {
    let mut stats = FlipStatistics::default();
    let mut queue: VecDeque<EdgeKey> = VecDeque::new();
    for spoke in tds.vertex_edges(v)? {
        queue.push_back(tds.next(spoke)?);
    }
    let trace = flip_trace_enabled();

    while let Some(e) = queue.pop_front() {
        stats.max_queue_len = stats.max_queue_len.max(queue.len() + 1);
        stats.edges_checked += 1;

        // The entry may have been rotated by an earlier flip.
        let Some(edge) = tds.half_edge(e) else {
            continue;
        };
        let face = edge.face();
        if face == tds.outer_face() || !tds.face(face).is_some_and(|f| f.has_corner(v)) {
            continue;
        }
        if edge.origin() == v || tds.target(e)? == v {
            continue;
        }

        let legal = is_edge_legal(tds, e, bounding, config)?;
        if trace {
            tracing::debug!("[flip] vertex={v:?} edge={e:?} legal={legal}");
        }
        if legal {
            continue;
        }
        if stats.flips_performed >= max_flips {
            return Err(FlipError::FlipLimitExceeded {
                vertex: v,
                max_flips,
            });
        }
        match flip_edge(tds, hierarchy, e, config)? {
            Some([left, right]) => {
                stats.flips_performed += 1;
                queue.push_back(left);
                queue.push_back(right);
            }
            None => stats.flips_skipped += 1,
        }
    }

    if trace {
        tracing::debug!(
            "[flip] vertex={v:?} checked={} flips={} skipped={} max_queue={}",
            stats.edges_checked,
            stats.flips_performed,
            stats.flips_skipped,
            stats.max_queue_len
        );
    }
    Ok(stats)
}
