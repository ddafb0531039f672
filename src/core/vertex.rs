//! Mesh vertices.
//!
//! A vertex is a [`Position`] (finite point or one of the two symbolic
//! points), one outgoing half-edge used as the entry point for star walks, and
//! optional user data. Its identity is its [`VertexKey`](crate::core::VertexKey)
//! in the mesh storage.

#![forbid(unsafe_code)]

use super::{traits::DataType, triangulation_data_structure::EdgeKey};
use crate::geometry::{point::Point, symbolic::Position};

/// A mesh vertex carrying optional user data `U`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex<U = ()> {
    position: Position,
    pub(crate) incident_edge: Option<EdgeKey>,
    data: Option<U>,
}

impl<U: DataType> Vertex<U> {
    pub(crate) const fn new(position: Position, data: Option<U>) -> Self {
        Self {
            position,
            incident_edge: None,
            data,
        }
    }

    /// The vertex position.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// The finite point, or `None` for symbolic vertices.
    #[inline]
    #[must_use]
    pub const fn point(&self) -> Option<Point> {
        self.position.finite()
    }

    /// Returns `true` for the symbolic bounding vertices.
    #[inline]
    #[must_use]
    pub const fn is_symbolic(&self) -> bool {
        self.position.is_symbolic()
    }

    /// Some half-edge whose origin is this vertex.
    ///
    /// `None` only between creation and the first face that uses the vertex.
    #[inline]
    #[must_use]
    pub const fn incident_edge(&self) -> Option<EdgeKey> {
        self.incident_edge
    }

    /// The user data, if any.
    #[inline]
    #[must_use]
    pub const fn data(&self) -> Option<U> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_vertex_accessors() {
        let v: Vertex<u8> = Vertex::new(Position::Finite(Point::new(1.0, 2.0)), Some(3));
        assert_eq!(v.point(), Some(Point::new(1.0, 2.0)));
        assert!(!v.is_symbolic());
        assert_eq!(v.data(), Some(3));
        assert!(v.incident_edge().is_none());
    }

    #[test]
    fn symbolic_vertex_has_no_point() {
        let v: Vertex = Vertex::new(Position::SymbolicTop, None);
        assert!(v.is_symbolic());
        assert!(v.point().is_none());
        assert_eq!(v.position(), Position::SymbolicTop);
        assert!(v.data().is_none());
    }
}
