//! Mesh faces: triangles and the outer sentinel.
//!
//! Triangle faces cache their corner vertices (counter-clockwise, starting at
//! the origin of the outer component) and, when all corners are finite, their
//! circumcircle. The cache is what the history DAG classifies against, so it
//! stays valid after the face is replaced: replaced faces keep their corners
//! while their half-edges are reused by the faces that replaced them.
//!
//! Consequently [`crate::core::Tds::face_edges`] is only meaningful for live
//! faces.

use crate::core::triangulation_data_structure::{EdgeKey, VertexKey};
use crate::geometry::util::circumcircle::Circumcircle;

/// What a face is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FaceKind {
    /// A triangle with counter-clockwise corners.
    Triangle {
        /// Corners in counter-clockwise order; `corners[0]` is the origin of
        /// the outer component.
        corners: [VertexKey; 3],
        /// Circumcircle, present only when all corners are finite.
        circumcircle: Option<Circumcircle>,
    },
    /// The unbounded region outside the bounding triangle.
    OuterSentinel,
}

/// A face of the half-edge mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Face {
    pub(crate) kind: FaceKind,
    pub(crate) outer_component: Option<EdgeKey>,
}

impl Face {
    pub(crate) const fn outer_sentinel() -> Self {
        Self {
            kind: FaceKind::OuterSentinel,
            outer_component: None,
        }
    }

    pub(crate) const fn triangle(
        corners: [VertexKey; 3],
        circumcircle: Option<Circumcircle>,
        outer_component: EdgeKey,
    ) -> Self {
        Self {
            kind: FaceKind::Triangle {
                corners,
                circumcircle,
            },
            outer_component: Some(outer_component),
        }
    }

    /// The face variant.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &FaceKind {
        &self.kind
    }

    /// Returns `true` for the outer sentinel face.
    #[inline]
    #[must_use]
    pub const fn is_outer(&self) -> bool {
        matches!(self.kind, FaceKind::OuterSentinel)
    }

    /// Entry half-edge of the face boundary.
    #[inline]
    #[must_use]
    pub const fn outer_component(&self) -> Option<EdgeKey> {
        self.outer_component
    }

    /// Corner vertices in counter-clockwise order, or `None` for the sentinel.
    #[inline]
    #[must_use]
    pub const fn corners(&self) -> Option<[VertexKey; 3]> {
        match self.kind {
            FaceKind::Triangle { corners, .. } => Some(corners),
            FaceKind::OuterSentinel => None,
        }
    }

    /// Cached circumcircle of an all-finite triangle.
    #[inline]
    #[must_use]
    pub const fn circumcircle(&self) -> Option<&Circumcircle> {
        match &self.kind {
            FaceKind::Triangle {
                circumcircle: Some(circle),
                ..
            } => Some(circle),
            _ => None,
        }
    }

    /// Returns `true` if `v` is one of the corners.
    #[must_use]
    pub fn has_corner(&self, v: VertexKey) -> bool {
        self.corners().is_some_and(|corners| corners.contains(&v))
    }
}
