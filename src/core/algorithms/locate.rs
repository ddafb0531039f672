//! History-DAG point location.
//!
//! Every face ever created by the triangulation is wrapped in a node of an
//! append-only directed acyclic graph. When a split or flip replaces faces,
//! the new faces become children of every replaced face. Leaves are exactly
//! the live faces, so locating a point is a descent from the roots that skips
//! any subtree whose face does not contain the point.
//!
//! Nodes are never removed during insertion. [`PointLocationHierarchy::compact`]
//! rebuilds the graph with the current leaves as roots when the history gets
//! too deep to be worth keeping.
//!
//! # References
//!
//! - L. J. Guibas, D. E. Knuth, and M. Sharir, "Randomized incremental
//!   construction of Delaunay and Voronoi diagrams", Algorithmica 7, 1992.
//! - M. de Berg et al., "Computational Geometry: Algorithms and Applications",
//!   3rd ed., chapter 9.

use crate::core::collections::{
    FaceKeySet, FaceToNodeMap, NodeIdSet, SmallBuffer, fast_hash_map_with_capacity,
    fast_hash_set_with_capacity,
};
use crate::core::traits::data_type::DataType;
use crate::core::triangulation_data_structure::{EdgeKey, FaceKey, Tds, TdsError, VertexKey};
use crate::geometry::point::Point;
use crate::geometry::predicates::{Containment, is_point_on_segment, ulp};
use crate::geometry::robust_predicates::PredicateConfig;
use crate::geometry::symbolic::{self, Position};

/// Inline capacity of a node's child list; an edge split's two calls and a
/// flip both produce at most this many children per node.
const CHILD_BUFFER_SIZE: usize = 4;

/// Inline capacity of the DFS stack.
const DFS_STACK_SIZE: usize = 32;

/// Result of point location query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateResult {
    /// Point is strictly inside the face (or within the tolerance band but
    /// not on any edge).
    InsideFace(FaceKey),
    /// Point is on the given half-edge.
    OnEdge(EdgeKey),
    /// Point coincides with a vertex.
    OnVertex(VertexKey),
    /// Point is outside the bounding triangle.
    Outside,
}

/// Error during point location.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocateError {
    /// A face handed to the hierarchy has no node.
    #[error("Face {face:?} is not tracked by the location hierarchy")]
    UnknownFace {
        /// The untracked face.
        face: FaceKey,
    },
    /// The located leaf does not contain the point.
    #[error("Point {point} lies outside its located face {face:?}")]
    UnexpectedOutside {
        /// The query point.
        point: Point,
        /// The face the hierarchy returned.
        face: FaceKey,
    },
    /// A mesh lookup failed while classifying.
    #[error("Mesh lookup failed during location: {0}")]
    Topology(#[from] TdsError),
}

/// Identifier of a history node, an index into the hierarchy's node arena.
///
/// Ids are allocated monotonically per hierarchy instance. Compaction
/// renumbers the arena, so ids must not be held across [`PointLocationHierarchy::compact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One face in the history graph.
#[derive(Debug, Clone)]
pub struct HistoryNode {
    face: FaceKey,
    children: SmallBuffer<NodeId, CHILD_BUFFER_SIZE>,
}

impl HistoryNode {
    /// The wrapped face.
    #[must_use]
    pub const fn face(&self) -> FaceKey {
        self.face
    }

    /// Child nodes; empty for live faces.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns `true` if the face has not been replaced.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Marker for [`PointLocationHierarchy::rollback_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyCheckpoint {
    nodes: usize,
    roots: usize,
    parents: usize,
}

/// Append-only DAG over faces answering "which live face contains `p`?".
#[derive(Debug, Clone)]
pub struct PointLocationHierarchy {
    nodes: Vec<HistoryNode>,
    roots: Vec<NodeId>,
    face_to_node: FaceToNodeMap,
    /// Nodes that received children, in order, for rollback.
    parent_log: Vec<NodeId>,
    outer_face: FaceKey,
}

impl PointLocationHierarchy {
    /// An empty hierarchy. `outer_face` is returned for points no root claims.
    #[must_use]
    pub fn new(outer_face: FaceKey) -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            face_to_node: FaceToNodeMap::default(),
            parent_log: Vec::new(),
            outer_face,
        }
    }

    /// Number of nodes ever allocated since construction or the last compaction.
    #[must_use]
    pub const fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Root node ids.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&HistoryNode> {
        self.nodes.get(id.0)
    }

    /// Node wrapping `face`, if the face is tracked.
    #[must_use]
    pub fn node_for_face(&self, face: FaceKey) -> Option<NodeId> {
        self.face_to_node.get(&face).copied()
    }

    /// Returns `true` if `face` is tracked and has not been replaced.
    #[must_use]
    pub fn is_leaf(&self, face: FaceKey) -> bool {
        self.node_for_face(face)
            .and_then(|id| self.node(id))
            .is_some_and(HistoryNode::is_leaf)
    }

    fn push_node(&mut self, face: FaceKey) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(HistoryNode {
            face,
            children: SmallBuffer::new(),
        });
        self.face_to_node.insert(face, id);
        id
    }

    /// Track a new root face.
    pub fn insert_root_face(&mut self, face: FaceKey) -> NodeId {
        let id = self.push_node(face);
        self.roots.push(id);
        id
    }

    /// Record that `originals` were replaced by `replacements`.
    ///
    /// Each replacement gets a new node; the same child list is attached to
    /// every original that has no children yet, so repeating the call for an
    /// already-replaced face is a no-op for that face.
    ///
    /// # Errors
    ///
    /// [`LocateError::UnknownFace`] if an original is not tracked; nothing is
    /// modified in that case.
    pub fn replace_faces(
        &mut self,
        originals: &[FaceKey],
        replacements: &[FaceKey],
    ) -> Result<(), LocateError> {
        let mut parents: SmallBuffer<NodeId, CHILD_BUFFER_SIZE> = SmallBuffer::new();
        for &face in originals {
            parents.push(
                self.node_for_face(face)
                    .ok_or(LocateError::UnknownFace { face })?,
            );
        }
        let children: SmallBuffer<NodeId, CHILD_BUFFER_SIZE> = replacements
            .iter()
            .map(|&face| self.push_node(face))
            .collect();
        for parent in parents {
            let node = &mut self.nodes[parent.0];
            if node.children.is_empty() {
                node.children.clone_from(&children);
                self.parent_log.push(parent);
            }
        }
        Ok(())
    }

    /// Find the live face containing `point`.
    ///
    /// Descends from the roots, pruning nodes whose face classifies OUTSIDE,
    /// and returns the first leaf that classifies INSIDE or BORDER. If the
    /// descent dead-ends (parent and child tolerance bands can disagree for
    /// points right on a replaced edge) the leaves are scanned directly.
    /// Points no live face claims map to the outer sentinel.
    ///
    /// # Errors
    ///
    /// [`LocateError::Topology`] if a face or vertex lookup fails.
    pub fn find_face<U: DataType>(
        &self,
        tds: &Tds<U>,
        point: Point,
        config: &PredicateConfig,
    ) -> Result<FaceKey, LocateError> {
        let mut stack: SmallBuffer<NodeId, DFS_STACK_SIZE> =
            self.roots.iter().rev().copied().collect();
        let mut visited: NodeIdSet = fast_hash_set_with_capacity(DFS_STACK_SIZE);

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = &self.nodes[id.0];
            if classify_point_in_face(tds, node.face, point, config)? == Containment::OUTSIDE {
                continue;
            }
            if node.is_leaf() {
                return Ok(node.face);
            }
            stack.extend(node.children.iter().rev().copied());
        }

        for face in self.leaves() {
            if classify_point_in_face(tds, face, point, config)?.contains() {
                tracing::debug!(%point, ?face, "history descent missed; leaf scan located point");
                return Ok(face);
            }
        }
        Ok(self.outer_face)
    }

    /// Faces of all reachable leaf nodes, each exactly once.
    #[must_use]
    pub fn leaves(&self) -> Vec<FaceKey> {
        let mut leaves = Vec::new();
        let mut visited: NodeIdSet = fast_hash_set_with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = &self.nodes[id.0];
            if node.is_leaf() {
                leaves.push(node.face);
            } else {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        leaves
    }

    /// Snapshot the append position for a later [`rollback_to`](Self::rollback_to).
    #[must_use]
    pub fn checkpoint(&self) -> HierarchyCheckpoint {
        HierarchyCheckpoint {
            nodes: self.nodes.len(),
            roots: self.roots.len(),
            parents: self.parent_log.len(),
        }
    }

    /// Undo every node, root and child list added since `checkpoint`.
    pub fn rollback_to(&mut self, checkpoint: HierarchyCheckpoint) {
        for parent in self.parent_log.drain(checkpoint.parents..) {
            if let Some(node) = self.nodes.get_mut(parent.0) {
                node.children.clear();
            }
        }
        for node in self.nodes.drain(checkpoint.nodes..) {
            self.face_to_node.remove(&node.face);
        }
        self.roots.truncate(checkpoint.roots);
    }

    /// Rebuild the graph with every current leaf as a root.
    ///
    /// Returns the faces that are no longer tracked; none of them is
    /// referenced by the mesh any more.
    pub fn compact(&mut self) -> Vec<FaceKey> {
        let leaves = self.leaves();
        let live: FaceKeySet = leaves.iter().copied().collect();
        let dead: Vec<FaceKey> = self
            .nodes
            .iter()
            .map(HistoryNode::face)
            .filter(|face| !live.contains(face))
            .collect();

        self.nodes.clear();
        self.roots.clear();
        self.parent_log.clear();
        self.face_to_node = fast_hash_map_with_capacity(leaves.len());
        for face in leaves {
            self.insert_root_face(face);
        }
        dead
    }
}

/// Classify `point` against a face.
///
/// The outer sentinel contains everything. Triangles use barycentric
/// coordinates when all corners are finite and per-edge side tests otherwise.
///
/// # Errors
///
/// [`LocateError::Topology`] for unknown faces or corners.
pub fn classify_point_in_face<U: DataType>(
    tds: &Tds<U>,
    face: FaceKey,
    point: Point,
    config: &PredicateConfig,
) -> Result<Containment, LocateError> {
    if face == tds.outer_face() {
        return Ok(Containment::INSIDE);
    }
    let corners = tds.face_positions(face)?;
    Ok(symbolic::classify_point(corners, point, config))
}

/// Returns `true` if `a` and `b` agree to within `ulps` units in the last place.
pub(crate) fn points_coincide(a: Point, b: Point, ulps: u32) -> bool {
    let scale = a
        .x()
        .abs()
        .max(a.y().abs())
        .max(b.x().abs())
        .max(b.y().abs());
    a.distance(b) <= f64::from(ulps) * ulp(scale)
}

/// Locate `point` down to vertex, edge or face.
///
/// # Errors
///
/// [`LocateError::UnexpectedOutside`] if the located leaf rejects the point,
/// or a lookup error.
pub fn locate<U: DataType>(
    tds: &Tds<U>,
    hierarchy: &PointLocationHierarchy,
    point: Point,
    config: &PredicateConfig,
) -> Result<LocateResult, LocateError> {
    let face = hierarchy.find_face(tds, point, config)?;
    if face == tds.outer_face() {
        return Ok(LocateResult::Outside);
    }
    match classify_point_in_face(tds, face, point, config)? {
        Containment::INSIDE => Ok(LocateResult::InsideFace(face)),
        Containment::OUTSIDE => Err(LocateError::UnexpectedOutside { point, face }),
        Containment::BORDER => {
            for corner in tds.face_corners(face)? {
                if let Position::Finite(p) = tds.position(corner)?
                    && points_coincide(p, point, config.on_edge_ulps)
                {
                    return Ok(LocateResult::OnVertex(corner));
                }
            }
            for e in tds.face_edges(face)? {
                let (Position::Finite(a), Position::Finite(b)) =
                    (tds.position(tds.origin(e)?)?, tds.position(tds.target(e)?)?)
                else {
                    continue;
                };
                if is_point_on_segment(a, b, point, config.on_edge_ulps) {
                    return Ok(LocateResult::OnEdge(e));
                }
            }
            Ok(LocateResult::InsideFace(face))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::delaunay_triangulation::DelaunayTriangulation;

    fn bounded() -> DelaunayTriangulation {
        DelaunayTriangulation::new_bounded([
            Point::new(-10.0, -10.0),
            Point::new(10.0, -10.0),
            Point::new(0.0, 10.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_root_only_hierarchy() {
        let dt = bounded();
        let h = dt.hierarchy();
        assert_eq!(h.number_of_nodes(), 1);
        assert_eq!(h.roots().len(), 1);
        let root = h.node(h.roots()[0]).unwrap();
        assert!(root.is_leaf());
        assert_eq!(h.leaves(), vec![root.face()]);
        assert_eq!(
            h.find_face(dt.tds(), Point::new(0.0, 0.0), dt.predicate_config())
                .unwrap(),
            root.face()
        );
    }

    #[test]
    fn test_points_outside_map_to_sentinel() {
        let dt = bounded();
        let face = dt
            .hierarchy()
            .find_face(dt.tds(), Point::new(50.0, 50.0), dt.predicate_config())
            .unwrap();
        assert_eq!(face, dt.tds().outer_face());
        assert_eq!(
            locate(dt.tds(), dt.hierarchy(), Point::new(50.0, 50.0), dt.predicate_config())
                .unwrap(),
            LocateResult::Outside
        );
    }

    #[test]
    fn test_inside_split_adds_three_children() {
        let mut dt = bounded();
        let root_face = dt.hierarchy().leaves()[0];
        dt.insert(Point::new(0.0, 0.0)).unwrap();

        let h = dt.hierarchy();
        let root = h.node(h.node_for_face(root_face).unwrap()).unwrap();
        assert_eq!(root.children().len(), 3);
        assert!(!h.is_leaf(root_face));
        let leaves = h.leaves();
        assert_eq!(leaves.len(), 3);
        for face in leaves {
            assert!(h.is_leaf(face));
        }
    }

    #[test]
    fn test_replace_faces_is_idempotent_per_original() {
        let mut dt = bounded();
        let root_face = dt.hierarchy().leaves()[0];
        dt.insert(Point::new(0.0, 0.0)).unwrap();
        let children_before = dt
            .hierarchy()
            .node(dt.hierarchy().node_for_face(root_face).unwrap())
            .unwrap()
            .children()
            .to_vec();

        let mut h = dt.hierarchy().clone();
        let extra = dt.hierarchy().leaves()[0];
        h.replace_faces(&[root_face], &[extra]).unwrap();
        let root = h.node(h.node_for_face(root_face).unwrap()).unwrap();
        assert_eq!(root.children(), children_before.as_slice());
    }

    #[test]
    fn test_replace_unknown_face_fails_without_changes() {
        let dt = bounded();
        let mut h = PointLocationHierarchy::new(dt.tds().outer_face());
        let nodes = h.number_of_nodes();
        let err = h
            .replace_faces(&[dt.tds().outer_face()], &[dt.tds().outer_face()])
            .unwrap_err();
        assert!(matches!(err, LocateError::UnknownFace { .. }));
        assert_eq!(h.number_of_nodes(), nodes);
    }

    #[test]
    fn test_checkpoint_rollback_restores_leaves() {
        let mut dt = bounded();
        dt.insert(Point::new(0.0, 0.0)).unwrap();
        let mut h = dt.hierarchy().clone();
        let before = h.leaves();
        let checkpoint = h.checkpoint();

        let target = before[0];
        h.replace_faces(&[target], &[dt.tds().outer_face()]).unwrap();
        assert!(!h.is_leaf(target));

        h.rollback_to(checkpoint);
        assert_eq!(h.leaves(), before);
        assert!(h.is_leaf(target));
        assert_eq!(h.number_of_nodes(), dt.hierarchy().number_of_nodes());
    }

    #[test]
    fn test_compact_keeps_leaves() {
        let mut dt = bounded();
        for p in [
            Point::new(0.0, 0.0),
            Point::new(1.0, 2.0),
            Point::new(-2.0, -1.0),
            Point::new(3.0, -4.0),
        ] {
            dt.insert(p).unwrap();
        }
        let mut h = dt.hierarchy().clone();
        let mut before = h.leaves();
        let dead = h.compact();
        let mut after = h.leaves();
        before.sort();
        after.sort();
        assert_eq!(before, after);
        assert_eq!(h.roots().len(), after.len());
        assert!(dead.iter().all(|face| !after.contains(face)));
    }

    #[test]
    fn test_locate_vertex_and_edge() {
        let mut dt = bounded();
        let v = dt.insert(Point::new(0.0, 0.0)).unwrap();
        let config = *dt.predicate_config();
        assert_eq!(
            locate(dt.tds(), dt.hierarchy(), Point::new(0.0, 0.0), &config).unwrap(),
            LocateResult::OnVertex(v)
        );
        // The spoke from (0, 0) to the corner (0, 10).
        match locate(dt.tds(), dt.hierarchy(), Point::new(0.0, 5.0), &config).unwrap() {
            LocateResult::OnEdge(e) => {
                let ends = [dt.tds().origin(e).unwrap(), dt.tds().target(e).unwrap()];
                assert!(ends.contains(&v));
            }
            other => panic!("expected OnEdge, got {other:?}"),
        }
        assert!(matches!(
            locate(dt.tds(), dt.hierarchy(), Point::new(1.0, 1.0), &config).unwrap(),
            LocateResult::InsideFace(_)
        ));
    }

    #[test]
    fn test_points_coincide_uses_relative_ulps() {
        let a = Point::new(1.0e6, 1.0);
        let b = Point::new(1.0e6 + ulp(1.0e6), 1.0);
        assert!(points_coincide(a, b, 8));
        assert!(!points_coincide(a, Point::new(1.0e6 + 1.0, 1.0), 8));
    }
}
