//! Half-edges and canonical undirected edge identifiers.
//!
//! Every undirected mesh edge is stored as two [`HalfEdge`]s pointing in
//! opposite directions. A half-edge knows its origin vertex, its twin, the
//! previous and next half-edges around its incident face, and that face
//! (the face to its left).
//!
//! [`UndirectedEdge`] identifies an edge by its two endpoint [`VertexKey`]s
//! with canonical ordering, so `(a, b)` and `(b, a)` compare equal.
//!
//! ## Determinism
//!
//! `UndirectedEdge` ordering is derived from internal slotmap keys and is not
//! stable across processes.

use crate::core::triangulation_data_structure::{EdgeKey, FaceKey, VertexKey};
use slotmap::Key;

/// One directed half of a mesh edge.
///
/// Invariants maintained by [`crate::core::Tds`]:
/// - `twin(twin(e)) == e`
/// - `prev(next(e)) == e`
/// - following `next` three times returns to `e` on triangle faces
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalfEdge {
    pub(crate) origin: VertexKey,
    pub(crate) twin: EdgeKey,
    pub(crate) next: EdgeKey,
    pub(crate) prev: EdgeKey,
    pub(crate) face: FaceKey,
}

impl HalfEdge {
    /// A half-edge leaving `origin`, lying in `face`, with unset links.
    pub(crate) fn new(origin: VertexKey, face: FaceKey) -> Self {
        Self {
            origin,
            twin: EdgeKey::null(),
            next: EdgeKey::null(),
            prev: EdgeKey::null(),
            face,
        }
    }

    /// Origin vertex.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> VertexKey {
        self.origin
    }

    /// The oppositely directed half-edge.
    #[inline]
    #[must_use]
    pub const fn twin(&self) -> EdgeKey {
        self.twin
    }

    /// The next half-edge around the incident face.
    #[inline]
    #[must_use]
    pub const fn next(&self) -> EdgeKey {
        self.next
    }

    /// The previous half-edge around the incident face.
    #[inline]
    #[must_use]
    pub const fn prev(&self) -> EdgeKey {
        self.prev
    }

    /// The face to the left of this half-edge.
    #[inline]
    #[must_use]
    pub const fn face(&self) -> FaceKey {
        self.face
    }
}

/// Canonical, direction-free identifier for a mesh edge.
///
/// # Examples
///
/// ```rust
/// use delaunay_dag::core::edge::UndirectedEdge;
/// use delaunay_dag::core::triangulation_data_structure::VertexKey;
/// use slotmap::SlotMap;
///
/// let mut vertices: SlotMap<VertexKey, ()> = SlotMap::with_key();
/// let a = vertices.insert(());
/// let b = vertices.insert(());
/// assert_eq!(UndirectedEdge::new(a, b), UndirectedEdge::new(b, a));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UndirectedEdge {
    v0: VertexKey,
    v1: VertexKey,
}

impl UndirectedEdge {
    /// Create a canonical edge from two endpoints in any order.
    #[must_use]
    pub fn new(a: VertexKey, b: VertexKey) -> Self {
        if a.data().as_ffi() <= b.data().as_ffi() {
            Self { v0: a, v1: b }
        } else {
            Self { v0: b, v1: a }
        }
    }

    /// The endpoint with the smaller raw key.
    #[inline]
    #[must_use]
    pub const fn v0(self) -> VertexKey {
        self.v0
    }

    /// The endpoint with the larger raw key.
    #[inline]
    #[must_use]
    pub const fn v1(self) -> VertexKey {
        self.v1
    }

    /// Both endpoints in canonical order.
    #[inline]
    #[must_use]
    pub const fn endpoints(self) -> (VertexKey, VertexKey) {
        (self.v0, self.v1)
    }

    /// Returns `true` if `v` is one of the endpoints.
    #[inline]
    #[must_use]
    pub fn contains(self, v: VertexKey) -> bool {
        self.v0 == v || self.v1 == v
    }
}

impl From<(VertexKey, VertexKey)> for UndirectedEdge {
    #[inline]
    fn from((a, b): (VertexKey, VertexKey)) -> Self {
        Self::new(a, b)
    }
}
