//! Half-edge storage for a planar triangulation.
//!
//! The [`Tds`] (triangulation data structure) owns three slotmaps: vertices,
//! half-edges and faces. It knows nothing about Delaunay legality or point
//! location; it only keeps the combinatorial wiring consistent and offers the
//! primitive edits the insertion algorithms are composed of.
//!
//! # Structure
//!
//! - every undirected edge is a pair of twinned [`HalfEdge`]s;
//! - every triangle face is a 3-cycle of half-edges linked by `next`/`prev`;
//! - exactly one [`Face`] is the outer sentinel, the face of every half-edge
//!   on the unbounded side of the bounding triangle.
//!
//! Faces replaced during insertion are not removed from storage: the history
//! DAG still classifies points against their cached corners. Such faces are
//! "dead" (no half-edge refers to them) until
//! [`remove_faces`](Tds::remove_faces) drops them during history compaction.
//!
//! # Transactions
//!
//! While a transaction is open every mutation is journaled. Rolling back
//! replays the journal in reverse and restores the mesh exactly, so a failed
//! insertion leaves no trace.
//!
//! | Invariant | Checked by |
//! |---|---|
//! | `twin(twin(e)) == e`, `twin(e) != e` | [`Tds::validate_half_edges`] |
//! | `prev(next(e)) == e`, same face along `next` | [`Tds::validate_half_edges`] |
//! | triangle faces are CCW 3-cycles matching their cached corners | [`Tds::validate_faces`] |
//! | vertex incident edges leave the vertex | [`Tds::validate_vertex_incidence`] |

// =============================================================================
// IMPORTS
// =============================================================================

use slotmap::new_key_type;
use thiserror::Error;

use crate::core::collections::{
    FaceEdgeBuffer, FaceKeySet, FastHashMap, StorageMap, VertexStarBuffer,
    fast_hash_map_with_capacity, fast_hash_set_with_capacity,
};
use crate::geometry::predicates::Orientation;
use crate::geometry::robust_predicates::PredicateConfig;
use crate::geometry::symbolic::{self, Position};
use crate::geometry::util::circumcircle::Circumcircle;

use super::{
    edge::{HalfEdge, UndirectedEdge},
    face::{Face, FaceKind},
    traits::data_type::DataType,
    vertex::Vertex,
};

/// Default cap on the number of steps of any single face or star walk.
///
/// A planar vertex of degree above this is far outside anything the game
/// produces; hitting the cap indicates a corrupted `next`/`twin` cycle.
pub const DEFAULT_TRAVERSAL_LIMIT: usize = 4096;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by mesh lookups and edits.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TdsError {
    /// A vertex key does not resolve.
    #[error("Vertex {vertex:?} not found")]
    VertexNotFound {
        /// The missing vertex.
        vertex: VertexKey,
    },
    /// A half-edge key does not resolve.
    #[error("Half-edge {edge:?} not found")]
    EdgeNotFound {
        /// The missing half-edge.
        edge: EdgeKey,
    },
    /// A face key does not resolve.
    #[error("Face {face:?} not found")]
    FaceNotFound {
        /// The missing face.
        face: FaceKey,
    },
    /// A triangle was required but the outer sentinel was given.
    #[error("Face {face:?} is the outer sentinel, not a triangle")]
    NotATriangle {
        /// The offending face.
        face: FaceKey,
    },
    /// The half-edges handed to face construction are not a closed chain.
    #[error("Half-edges {edges:?} do not form a closed chain")]
    OpenChain {
        /// The three half-edges, in the order given.
        edges: [EdgeKey; 3],
    },
    /// Face construction was given a clockwise or collinear edge cycle.
    #[error(
        "Corners [{}, {}, {}] do not form a counter-clockwise triangle",
        .corners[0],
        .corners[1],
        .corners[2]
    )]
    DegenerateFace {
        /// Positions of the would-be corners, in cycle order.
        corners: [Position; 3],
    },
    /// A vertex has not yet been attached to any half-edge.
    #[error("Vertex {vertex:?} has no incident half-edge")]
    NoIncidentEdge {
        /// The isolated vertex.
        vertex: VertexKey,
    },
    /// A face or star walk did not close within the configured cap.
    #[error("Walk starting at half-edge {start:?} did not close within {limit} steps")]
    TraversalLimitExceeded {
        /// Where the walk started.
        start: EdgeKey,
        /// The cap that was hit.
        limit: usize,
    },
    /// `begin_transaction` was called while a transaction was already open.
    #[error("A mesh transaction is already open")]
    TransactionAlreadyOpen,
}

/// Which kind of mesh entity a validation error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    /// A vertex.
    Vertex,
    /// A half-edge.
    HalfEdge,
    /// A face.
    Face,
}

/// Errors found by structural (and Delaunay) validation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TdsValidationError {
    /// A stored key refers to an entity that does not exist.
    #[error("{owner} refers to a missing {entity:?}")]
    DanglingReference {
        /// Debug rendering of the referring entity's key.
        owner: String,
        /// The kind of entity that is missing.
        entity: EntityKind,
    },
    /// `twin(twin(e)) != e` or `twin(e) == e`.
    #[error("Half-edge {edge:?} has an inconsistent twin")]
    TwinMismatch {
        /// The half-edge whose twin link is broken.
        edge: EdgeKey,
    },
    /// `prev(next(e)) != e`.
    #[error("Half-edge {edge:?} has inconsistent next/prev links")]
    NextPrevMismatch {
        /// The half-edge whose links disagree.
        edge: EdgeKey,
    },
    /// A half-edge and its successor disagree about their face.
    #[error("Half-edge {edge:?} and its successor lie in different faces")]
    FaceMismatch {
        /// The half-edge.
        edge: EdgeKey,
    },
    /// A twin pair does not share its two endpoints.
    #[error("Half-edge {edge:?} does not end where its twin starts")]
    EndpointMismatch {
        /// The half-edge.
        edge: EdgeKey,
    },
    /// Two distinct twin pairs join the same two vertices.
    #[error("Vertices {:?} and {:?} are joined by more than one edge", .edge.v0(), .edge.v1())]
    DuplicateEdge {
        /// The repeated vertex pair.
        edge: UndirectedEdge,
    },
    /// A triangle's boundary is not a 3-cycle.
    #[error("Boundary of face {face:?} has length {length}, expected 3")]
    FaceCycleLength {
        /// The face.
        face: FaceKey,
        /// The observed cycle length.
        length: usize,
    },
    /// The cached corners of a face disagree with its boundary.
    #[error("Cached corners of face {face:?} disagree with its half-edges")]
    StaleCorners {
        /// The face.
        face: FaceKey,
    },
    /// A live triangle is clockwise or degenerate.
    #[error("Face {face:?} is not counter-clockwise")]
    NotCounterClockwise {
        /// The face.
        face: FaceKey,
    },
    /// The outer sentinel's boundary does not close.
    #[error("The outer boundary cycle is not closed")]
    OpenOuterBoundary,
    /// A vertex's incident edge does not start at the vertex.
    #[error("Incident half-edge of vertex {vertex:?} does not start at it")]
    IncidentEdgeMismatch {
        /// The vertex.
        vertex: VertexKey,
    },
    /// A vertex lies strictly inside the circumcircle of a live face.
    #[error("Vertex {vertex:?} lies inside the circumcircle of face {face:?}")]
    DelaunayViolation {
        /// The face whose circle is not empty.
        face: FaceKey,
        /// The offending vertex.
        vertex: VertexKey,
    },
    /// A leaf of the history DAG is not a face of the mesh.
    #[error("History leaf {face:?} is not a live face")]
    StaleLeaf {
        /// The leaf face.
        face: FaceKey,
    },
    /// A face of the mesh is not a leaf of the history DAG.
    #[error("Live face {face:?} is not a history leaf")]
    UntrackedFace {
        /// The live face.
        face: FaceKey,
    },
    /// A walk failed while validating.
    #[error("Traversal failed during validation: {0}")]
    Traversal(#[from] TdsError),
}

/// Classifies the kind of invariant that failed during validation.
///
/// Used by [`TriangulationValidationReport`] to group related errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InvariantKind {
    /// Half-edge twin/next/prev wiring.
    HalfEdgeLinks,
    /// Triangle 3-cycles, cached corners and orientation; outer cycle.
    FaceCycles,
    /// Vertex incident-edge back-references.
    VertexIncidence,
    /// History leaves coincide with the live faces.
    HistoryLeaves,
    /// Empty circumcircle property.
    Delaunay,
}

/// A single invariant violation recorded during validation diagnostics.
#[derive(Clone, Debug)]
pub struct InvariantViolation {
    /// The kind of invariant that failed.
    pub kind: InvariantKind,
    /// The detailed validation error explaining the failure.
    pub error: TdsValidationError,
}

/// Aggregate report of one or more validation failures.
#[derive(Clone, Debug, Default)]
pub struct TriangulationValidationReport {
    /// The ordered list of invariant violations that occurred.
    pub violations: Vec<InvariantViolation>,
}

impl TriangulationValidationReport {
    /// Returns `true` if no violations were recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub(crate) fn record(&mut self, kind: InvariantKind, result: Result<(), TdsValidationError>) {
        if let Err(error) = result {
            self.violations.push(InvariantViolation { kind, error });
        }
    }
}

/// Configuration options for validation reports.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValidationOptions {
    /// Whether to validate the empty circumcircle invariant (quadratic).
    pub check_delaunay: bool,
}

// =============================================================================
// KEYS
// =============================================================================

new_key_type! {
    /// Key type for vertices in the mesh storage.
    ///
    /// Vertex identity is key identity: two vertices at the same coordinates
    /// are still distinct vertices.
    pub struct VertexKey;
}

new_key_type! {
    /// Key type for half-edges in the mesh storage.
    pub struct EdgeKey;
}

new_key_type! {
    /// Key type for faces in the mesh storage, including dead faces that are
    /// still referenced by the history DAG.
    pub struct FaceKey;
}

// =============================================================================
// JOURNAL
// =============================================================================

/// One undoable mesh mutation.
#[derive(Clone, Copy, Debug)]
enum JournalEntry {
    VertexAdded(VertexKey),
    EdgeAdded(EdgeKey),
    FaceAdded(FaceKey),
    /// Snapshot of a half-edge before it was modified.
    EdgeModified(EdgeKey, HalfEdge),
    /// Incident edge of a vertex before it was modified.
    VertexModified(VertexKey, Option<EdgeKey>),
}

// =============================================================================
// TDS
// =============================================================================

/// Half-edge mesh of a planar triangulation with optional per-vertex data `U`.
///
/// Mutation is crate-internal; the public surface is read-only navigation so
/// that collaborators (renderers, Voronoi scoring) can walk the mesh without
/// being able to break it.
#[derive(Clone, Debug)]
pub struct Tds<U = ()> {
    vertices: StorageMap<VertexKey, Vertex<U>>,
    edges: StorageMap<EdgeKey, HalfEdge>,
    faces: StorageMap<FaceKey, Face>,
    outer_face: FaceKey,
    traversal_limit: usize,
    journal: Option<Vec<JournalEntry>>,
}

impl<U: DataType> Default for Tds<U> {
    fn default() -> Self {
        Self::new(DEFAULT_TRAVERSAL_LIMIT)
    }
}

impl<U: DataType> Tds<U> {
    /// Create an empty mesh holding only the outer sentinel face.
    ///
    /// `traversal_limit` caps face and star walks; zero is replaced by
    /// [`DEFAULT_TRAVERSAL_LIMIT`].
    #[must_use]
    pub fn new(traversal_limit: usize) -> Self {
        let mut faces = StorageMap::with_key();
        let outer_face = faces.insert(Face::outer_sentinel());
        Self {
            vertices: StorageMap::with_key(),
            edges: StorageMap::with_key(),
            faces,
            outer_face,
            traversal_limit: if traversal_limit == 0 {
                DEFAULT_TRAVERSAL_LIMIT
            } else {
                traversal_limit
            },
            journal: None,
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// The outer sentinel face.
    #[inline]
    #[must_use]
    pub const fn outer_face(&self) -> FaceKey {
        self.outer_face
    }

    /// Number of vertices, symbolic ones included.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edges (twice the number of undirected edges).
    #[must_use]
    pub fn number_of_half_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of stored faces: live, dead and the sentinel.
    #[must_use]
    pub fn number_of_stored_faces(&self) -> usize {
        self.faces.len()
    }

    /// The walk cap in effect.
    #[must_use]
    pub const fn traversal_limit(&self) -> usize {
        self.traversal_limit
    }

    /// Vertex by key.
    #[must_use]
    pub fn vertex(&self, key: VertexKey) -> Option<&Vertex<U>> {
        self.vertices.get(key)
    }

    /// Half-edge by key.
    #[must_use]
    pub fn half_edge(&self, key: EdgeKey) -> Option<&HalfEdge> {
        self.edges.get(key)
    }

    /// Face by key (live or dead).
    #[must_use]
    pub fn face(&self, key: FaceKey) -> Option<&Face> {
        self.faces.get(key)
    }

    /// All vertices.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex<U>)> {
        self.vertices.iter()
    }

    /// All half-edges.
    pub fn half_edges(&self) -> impl Iterator<Item = (EdgeKey, &HalfEdge)> {
        self.edges.iter()
    }

    /// All stored faces, dead ones included.
    pub fn faces(&self) -> impl Iterator<Item = (FaceKey, &Face)> {
        self.faces.iter()
    }

    /// Faces referenced by at least one half-edge, the sentinel included.
    #[must_use]
    pub fn referenced_faces(&self) -> FaceKeySet {
        let mut set = fast_hash_set_with_capacity(self.edges.len() / 3 + 1);
        set.extend(self.edges.values().map(HalfEdge::face));
        set
    }

    fn edge_ref(&self, e: EdgeKey) -> Result<&HalfEdge, TdsError> {
        self.edges.get(e).ok_or(TdsError::EdgeNotFound { edge: e })
    }

    fn vertex_ref(&self, v: VertexKey) -> Result<&Vertex<U>, TdsError> {
        self.vertices.get(v).ok_or(TdsError::VertexNotFound { vertex: v })
    }

    fn face_ref(&self, f: FaceKey) -> Result<&Face, TdsError> {
        self.faces.get(f).ok_or(TdsError::FaceNotFound { face: f })
    }

    /// Position of a vertex.
    ///
    /// # Errors
    ///
    /// [`TdsError::VertexNotFound`] for an unknown key.
    pub fn position(&self, v: VertexKey) -> Result<Position, TdsError> {
        self.vertex_ref(v).map(Vertex::position)
    }

    /// Origin vertex of a half-edge.
    ///
    /// # Errors
    ///
    /// [`TdsError::EdgeNotFound`] for an unknown key.
    pub fn origin(&self, e: EdgeKey) -> Result<VertexKey, TdsError> {
        self.edge_ref(e).map(HalfEdge::origin)
    }

    /// Target vertex of a half-edge, the origin of its twin.
    ///
    /// # Errors
    ///
    /// [`TdsError::EdgeNotFound`] if the half-edge or its twin is unknown.
    pub fn target(&self, e: EdgeKey) -> Result<VertexKey, TdsError> {
        self.origin(self.twin(e)?)
    }

    /// Twin half-edge.
    ///
    /// # Errors
    ///
    /// [`TdsError::EdgeNotFound`] for an unknown key.
    pub fn twin(&self, e: EdgeKey) -> Result<EdgeKey, TdsError> {
        self.edge_ref(e).map(HalfEdge::twin)
    }

    /// Next half-edge around the face.
    ///
    /// # Errors
    ///
    /// [`TdsError::EdgeNotFound`] for an unknown key.
    pub fn next(&self, e: EdgeKey) -> Result<EdgeKey, TdsError> {
        self.edge_ref(e).map(HalfEdge::next)
    }

    /// Previous half-edge around the face.
    ///
    /// # Errors
    ///
    /// [`TdsError::EdgeNotFound`] for an unknown key.
    pub fn prev(&self, e: EdgeKey) -> Result<EdgeKey, TdsError> {
        self.edge_ref(e).map(HalfEdge::prev)
    }

    /// Face to the left of a half-edge.
    ///
    /// # Errors
    ///
    /// [`TdsError::EdgeNotFound`] for an unknown key.
    pub fn face_of(&self, e: EdgeKey) -> Result<FaceKey, TdsError> {
        self.edge_ref(e).map(HalfEdge::face)
    }

    /// Corners of a triangle face in counter-clockwise order.
    ///
    /// Works for dead faces too: the corners are cached.
    ///
    /// # Errors
    ///
    /// [`TdsError::FaceNotFound`] or [`TdsError::NotATriangle`].
    pub fn face_corners(&self, f: FaceKey) -> Result<[VertexKey; 3], TdsError> {
        self.face_ref(f)?
            .corners()
            .ok_or(TdsError::NotATriangle { face: f })
    }

    /// Corner positions of a triangle face in counter-clockwise order.
    ///
    /// # Errors
    ///
    /// Same as [`face_corners`](Self::face_corners), plus
    /// [`TdsError::VertexNotFound`].
    pub fn face_positions(&self, f: FaceKey) -> Result<[Position; 3], TdsError> {
        let [a, b, c] = self.face_corners(f)?;
        Ok([self.position(a)?, self.position(b)?, self.position(c)?])
    }

    /// The boundary half-edges of a live face, starting at its outer
    /// component and following `next`.
    ///
    /// # Errors
    ///
    /// [`TdsError::TraversalLimitExceeded`] if the cycle does not close, or a
    /// lookup error on a broken link.
    pub fn face_edges(&self, f: FaceKey) -> Result<FaceEdgeBuffer, TdsError> {
        let Some(start) = self.face_ref(f)?.outer_component() else {
            return Ok(FaceEdgeBuffer::new());
        };
        let mut edges = FaceEdgeBuffer::new();
        let mut current = start;
        loop {
            if edges.len() >= self.traversal_limit {
                return Err(TdsError::TraversalLimitExceeded {
                    start,
                    limit: self.traversal_limit,
                });
            }
            edges.push(current);
            current = self.next(current)?;
            if current == start {
                return Ok(edges);
            }
        }
    }

    /// All outgoing half-edges of a vertex in counter-clockwise order,
    /// starting at its incident edge.
    ///
    /// # Errors
    ///
    /// [`TdsError::NoIncidentEdge`] for an isolated vertex,
    /// [`TdsError::TraversalLimitExceeded`] if the star does not close.
    pub fn vertex_edges(&self, v: VertexKey) -> Result<VertexStarBuffer, TdsError> {
        let start = self
            .vertex_ref(v)?
            .incident_edge()
            .ok_or(TdsError::NoIncidentEdge { vertex: v })?;
        let mut star = VertexStarBuffer::new();
        let mut current = start;
        loop {
            if star.len() >= self.traversal_limit {
                return Err(TdsError::TraversalLimitExceeded {
                    start,
                    limit: self.traversal_limit,
                });
            }
            star.push(current);
            current = self.twin(self.prev(current)?)?;
            if current == start {
                return Ok(star);
            }
        }
    }

    /// The half-edge `a → b`, if the two vertices are adjacent.
    ///
    /// # Errors
    ///
    /// Propagates star-walk errors from [`vertex_edges`](Self::vertex_edges).
    pub fn find_half_edge(&self, a: VertexKey, b: VertexKey) -> Result<Option<EdgeKey>, TdsError> {
        for e in self.vertex_edges(a)? {
            if self.target(e)? == b {
                return Ok(Some(e));
            }
        }
        Ok(None)
    }

    /// Check that `corners` would make a counter-clockwise, non-degenerate
    /// triangle and compute its circumcircle when all corners are finite.
    ///
    /// # Errors
    ///
    /// [`TdsError::DegenerateFace`] when the corners are clockwise or
    /// collinear within `config.degeneracy_epsilon`.
    pub fn check_triangle(
        &self,
        corners: [VertexKey; 3],
        config: &PredicateConfig,
    ) -> Result<Option<Circumcircle>, TdsError> {
        let positions = [
            self.position(corners[0])?,
            self.position(corners[1])?,
            self.position(corners[2])?,
        ];
        if symbolic::orientation(
            positions[0],
            positions[1],
            positions[2],
            config.degeneracy_epsilon,
        ) != Orientation::POSITIVE
        {
            return Err(TdsError::DegenerateFace { corners: positions });
        }
        match positions {
            [Position::Finite(a), Position::Finite(b), Position::Finite(c)] => {
                Circumcircle::from_points(a, b, c)
                    .map(Some)
                    .map_err(|_| TdsError::DegenerateFace { corners: positions })
            }
            _ => Ok(None),
        }
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    fn log(&mut self, entry: JournalEntry) {
        if let Some(journal) = &mut self.journal {
            journal.push(entry);
        }
    }

    fn modify_edge(
        &mut self,
        e: EdgeKey,
        update: impl FnOnce(&mut HalfEdge),
    ) -> Result<(), TdsError> {
        let edge = self.edges.get_mut(e).ok_or(TdsError::EdgeNotFound { edge: e })?;
        if let Some(journal) = &mut self.journal {
            journal.push(JournalEntry::EdgeModified(e, *edge));
        }
        update(edge);
        Ok(())
    }

    /// Add an isolated vertex.
    pub(crate) fn add_vertex(&mut self, position: Position, data: Option<U>) -> VertexKey {
        let key = self.vertices.insert(Vertex::new(position, data));
        self.log(JournalEntry::VertexAdded(key));
        key
    }

    /// Add a twinned pair `a → b` / `b → a`, both lying in the outer face
    /// until a face claims them.
    pub(crate) fn add_edge_pair(&mut self, a: VertexKey, b: VertexKey) -> (EdgeKey, EdgeKey) {
        let outer = self.outer_face;
        let ab = self.edges.insert(HalfEdge::new(a, outer));
        let ba = self.edges.insert(HalfEdge::new(b, outer));
        if let Some(edge) = self.edges.get_mut(ab) {
            edge.twin = ba;
        }
        if let Some(edge) = self.edges.get_mut(ba) {
            edge.twin = ab;
        }
        self.log(JournalEntry::EdgeAdded(ab));
        self.log(JournalEntry::EdgeAdded(ba));
        (ab, ba)
    }

    /// Add a lone half-edge leaving `origin`; [`set_twins`](Self::set_twins)
    /// must pair it before any face uses it.
    pub(crate) fn add_half_edge(&mut self, origin: VertexKey) -> EdgeKey {
        let e = self.edges.insert(HalfEdge::new(origin, self.outer_face));
        self.log(JournalEntry::EdgeAdded(e));
        e
    }

    /// Make `a` and `b` each other's twin.
    pub(crate) fn set_twins(&mut self, a: EdgeKey, b: EdgeKey) -> Result<(), TdsError> {
        self.edge_ref(b)?;
        self.modify_edge(a, |edge| edge.twin = b)?;
        self.modify_edge(b, |edge| edge.twin = a)
    }

    /// Re-anchor a half-edge at a different origin.
    pub(crate) fn set_edge_origin(&mut self, e: EdgeKey, origin: VertexKey) -> Result<(), TdsError> {
        self.vertex_ref(origin)?;
        self.modify_edge(e, |edge| edge.origin = origin)
    }

    /// Point a vertex at one of its outgoing half-edges.
    pub(crate) fn set_incident_edge(&mut self, v: VertexKey, e: EdgeKey) -> Result<(), TdsError> {
        self.edge_ref(e)?;
        let vertex = self
            .vertices
            .get_mut(v)
            .ok_or(TdsError::VertexNotFound { vertex: v })?;
        let previous = vertex.incident_edge;
        vertex.incident_edge = Some(e);
        self.log(JournalEntry::VertexModified(v, previous));
        Ok(())
    }

    /// Build a triangle face from three half-edges that already form a chain.
    ///
    /// Wires `next`/`prev` into a 3-cycle, assigns the face to all three,
    /// makes `edges[0]` the outer component and caches corners and circle.
    ///
    /// # Errors
    ///
    /// [`TdsError::OpenChain`] if `target(edges[i]) != origin(edges[i + 1])`,
    /// [`TdsError::DegenerateFace`] for clockwise or collinear cycles. Nothing
    /// is modified on error.
    pub(crate) fn create_face(
        &mut self,
        edges: [EdgeKey; 3],
        config: &PredicateConfig,
    ) -> Result<FaceKey, TdsError> {
        let corners = [
            self.origin(edges[0])?,
            self.origin(edges[1])?,
            self.origin(edges[2])?,
        ];
        for i in 0..3 {
            if self.target(edges[i])? != corners[(i + 1) % 3] {
                return Err(TdsError::OpenChain { edges });
            }
        }
        let circumcircle = self.check_triangle(corners, config)?;

        let face = self
            .faces
            .insert(Face::triangle(corners, circumcircle, edges[0]));
        self.log(JournalEntry::FaceAdded(face));
        for i in 0..3 {
            let next = edges[(i + 1) % 3];
            let prev = edges[(i + 2) % 3];
            self.modify_edge(edges[i], |edge| {
                edge.next = next;
                edge.prev = prev;
                edge.face = face;
            })?;
        }
        Ok(face)
    }

    /// Close the unbounded side: link `cycle` (clockwise around the bounding
    /// triangle) into the outer sentinel's boundary.
    pub(crate) fn wire_outer_boundary(&mut self, cycle: &[EdgeKey]) -> Result<(), TdsError> {
        let n = cycle.len();
        let outer = self.outer_face;
        for i in 0..n {
            let next = cycle[(i + 1) % n];
            let prev = cycle[(i + n - 1) % n];
            self.modify_edge(cycle[i], |edge| {
                edge.next = next;
                edge.prev = prev;
                edge.face = outer;
            })?;
        }
        if let Some(face) = self.faces.get_mut(outer) {
            face.outer_component = cycle.first().copied();
        }
        Ok(())
    }

    /// Drop dead faces after history compaction.
    ///
    /// Faces still referenced by a half-edge and the sentinel are kept.
    /// Returns the number of faces removed.
    pub(crate) fn remove_faces(&mut self, dead: impl IntoIterator<Item = FaceKey>) -> usize {
        let referenced = self.referenced_faces();
        let mut removed = 0;
        for face in dead {
            if face == self.outer_face || referenced.contains(&face) {
                continue;
            }
            if self.faces.remove(face).is_some() {
                removed += 1;
            }
        }
        removed
    }

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    /// Returns `true` while mutations are being journaled.
    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.journal.is_some()
    }

    /// Start journaling mutations.
    ///
    /// # Errors
    ///
    /// [`TdsError::TransactionAlreadyOpen`] if one is open already.
    pub(crate) fn begin_transaction(&mut self) -> Result<(), TdsError> {
        if self.journal.is_some() {
            return Err(TdsError::TransactionAlreadyOpen);
        }
        self.journal = Some(Vec::new());
        Ok(())
    }

    /// Keep all journaled mutations.
    pub(crate) fn commit_transaction(&mut self) {
        self.journal = None;
    }

    /// Undo every journaled mutation, newest first.
    pub(crate) fn rollback_transaction(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        for entry in journal.into_iter().rev() {
            match entry {
                JournalEntry::VertexAdded(v) => {
                    self.vertices.remove(v);
                }
                JournalEntry::EdgeAdded(e) => {
                    self.edges.remove(e);
                }
                JournalEntry::FaceAdded(f) => {
                    self.faces.remove(f);
                }
                JournalEntry::EdgeModified(e, snapshot) => {
                    if let Some(edge) = self.edges.get_mut(e) {
                        *edge = snapshot;
                    }
                }
                JournalEntry::VertexModified(v, incident) => {
                    if let Some(vertex) = self.vertices.get_mut(v) {
                        vertex.incident_edge = incident;
                    }
                }
            }
        }
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Twin and next/prev wiring of every half-edge.
    ///
    /// # Errors
    ///
    /// The first broken link found.
    pub fn validate_half_edges(&self) -> Result<(), TdsValidationError> {
        let mut first_seen: FastHashMap<UndirectedEdge, EdgeKey> =
            fast_hash_map_with_capacity(self.edges.len() / 2);
        for (key, edge) in &self.edges {
            let dangling = |entity| TdsValidationError::DanglingReference {
                owner: format!("{key:?}"),
                entity,
            };
            if !self.vertices.contains_key(edge.origin) {
                return Err(dangling(EntityKind::Vertex));
            }
            if !self.faces.contains_key(edge.face) {
                return Err(dangling(EntityKind::Face));
            }
            let (Some(twin), Some(next)) = (self.edges.get(edge.twin), self.edges.get(edge.next))
            else {
                return Err(dangling(EntityKind::HalfEdge));
            };
            if !self.edges.contains_key(edge.prev) {
                return Err(dangling(EntityKind::HalfEdge));
            }
            if edge.twin == key || twin.twin != key {
                return Err(TdsValidationError::TwinMismatch { edge: key });
            }
            if next.prev != key {
                return Err(TdsValidationError::NextPrevMismatch { edge: key });
            }
            if next.face != edge.face {
                return Err(TdsValidationError::FaceMismatch { edge: key });
            }
            if next.origin != twin.origin {
                return Err(TdsValidationError::EndpointMismatch { edge: key });
            }
            let undirected = UndirectedEdge::new(edge.origin, twin.origin);
            match first_seen.get(&undirected) {
                None => {
                    first_seen.insert(undirected, key);
                }
                Some(&other) if other == edge.twin => {}
                Some(_) => return Err(TdsValidationError::DuplicateEdge { edge: undirected }),
            }
        }
        Ok(())
    }

    /// Every face referenced by a half-edge: triangles are CCW 3-cycles
    /// matching their cached corners; the outer boundary closes.
    ///
    /// # Errors
    ///
    /// The first inconsistent face found.
    pub fn validate_faces(&self, config: &PredicateConfig) -> Result<(), TdsValidationError> {
        for face_key in self.referenced_faces() {
            let face = self.face_ref(face_key)?;
            let edges = self.face_edges(face_key)?;
            if let Some(&start) = edges.first()
                && self.face_of(start)? != face_key
            {
                return Err(TdsValidationError::FaceMismatch { edge: start });
            }
            match face.kind() {
                FaceKind::OuterSentinel => {
                    if edges.len() < 3 {
                        return Err(TdsValidationError::OpenOuterBoundary);
                    }
                }
                FaceKind::Triangle { corners, .. } => {
                    if edges.len() != 3 {
                        return Err(TdsValidationError::FaceCycleLength {
                            face: face_key,
                            length: edges.len(),
                        });
                    }
                    for (i, &e) in edges.iter().enumerate() {
                        if self.origin(e)? != corners[i] {
                            return Err(TdsValidationError::StaleCorners { face: face_key });
                        }
                    }
                    if self.check_triangle(*corners, config).is_err() {
                        return Err(TdsValidationError::NotCounterClockwise { face: face_key });
                    }
                }
            }
        }
        Ok(())
    }

    /// Every attached vertex's incident edge starts at the vertex.
    ///
    /// # Errors
    ///
    /// The first mismatch found.
    pub fn validate_vertex_incidence(&self) -> Result<(), TdsValidationError> {
        for (key, vertex) in &self.vertices {
            let Some(e) = vertex.incident_edge() else {
                continue;
            };
            let Some(edge) = self.edges.get(e) else {
                return Err(TdsValidationError::DanglingReference {
                    owner: format!("{key:?}"),
                    entity: EntityKind::HalfEdge,
                });
            };
            if edge.origin != key {
                return Err(TdsValidationError::IncidentEdgeMismatch { vertex: key });
            }
        }
        Ok(())
    }

    /// Run every structural check, collecting all violations.
    #[must_use]
    pub fn structural_report(&self, config: &PredicateConfig) -> TriangulationValidationReport {
        let mut report = TriangulationValidationReport::default();
        let links = self.validate_half_edges();
        let links_ok = links.is_ok();
        report.record(InvariantKind::HalfEdgeLinks, links);
        // Face walks over broken links would only repeat the same failure.
        if links_ok {
            report.record(InvariantKind::FaceCycles, self.validate_faces(config));
        }
        report.record(
            InvariantKind::VertexIncidence,
            self.validate_vertex_incidence(),
        );
        report
    }

    /// Structural validation, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// The first [`TdsValidationError`] in invariant order.
    pub fn validate(&self, config: &PredicateConfig) -> Result<(), TdsValidationError> {
        self.validate_half_edges()?;
        self.validate_faces(config)?;
        self.validate_vertex_incidence()
    }
}
