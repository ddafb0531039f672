//! Fixed-shape buffers used by the triangle operations.

use super::SmallBuffer;
use crate::core::triangulation_data_structure::{EdgeKey, FaceKey, VertexKey};

/// Inline capacity for per-face edge and corner buffers.
pub const TRIANGLE_BUFFER_SIZE: usize = 3;

/// Inline capacity for the faces created by a single split or flip.
///
/// An on-edge split creates 4 faces, the largest local operation.
pub const REPLACEMENT_FACE_BUFFER_SIZE: usize = 4;

/// Inline capacity for vertex stars (outgoing half-edges of one vertex).
///
/// Planar Delaunay vertices average six neighbors.
pub const VERTEX_STAR_BUFFER_SIZE: usize = 8;

/// The three half-edges of one face, in `next` order.
pub type FaceEdgeBuffer = SmallBuffer<EdgeKey, TRIANGLE_BUFFER_SIZE>;

/// Outgoing half-edges of one vertex, in counter-clockwise order.
pub type VertexStarBuffer = SmallBuffer<EdgeKey, VERTEX_STAR_BUFFER_SIZE>;

/// Faces created by one split or flip.
pub type FaceKeyBuffer = SmallBuffer<FaceKey, REPLACEMENT_FACE_BUFFER_SIZE>;

/// Neighboring vertices of one vertex.
pub type VertexKeyBuffer = SmallBuffer<VertexKey, VERTEX_STAR_BUFFER_SIZE>;

/// Inline capacity for Delaunay violation reports.
pub const VIOLATION_BUFFER_SIZE: usize = 8;

/// Faces paired with one vertex found inside their circumcircle.
pub type ViolationBuffer = SmallBuffer<(FaceKey, VertexKey), VIOLATION_BUFFER_SIZE>;
