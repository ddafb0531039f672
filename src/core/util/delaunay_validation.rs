//! Delaunay empty-circumcircle property validation utilities.

#![forbid(unsafe_code)]

use crate::core::collections::ViolationBuffer;
use crate::core::face::FaceKind;
use crate::core::traits::data_type::DataType;
use crate::core::triangulation_data_structure::{FaceKey, Tds, TdsValidationError, VertexKey};
use crate::geometry::point::Point;
use crate::geometry::predicates::{InCircle, incircle};
use crate::geometry::robust_predicates::PredicateConfig;
use crate::geometry::symbolic::Position;
use thiserror::Error;

/// Errors that can occur during Delaunay property validation.
///
/// # Examples
///
/// ```rust
/// use delaunay_dag::core::triangulation_data_structure::{FaceKey, VertexKey};
/// use delaunay_dag::core::util::DelaunayValidationError;
///
/// let err = DelaunayValidationError::DelaunayViolation {
///     face: FaceKey::default(),
///     vertex: VertexKey::default(),
/// };
/// assert!(matches!(err, DelaunayValidationError::DelaunayViolation { .. }));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DelaunayValidationError {
    /// A face has a vertex strictly inside its circumcircle.
    #[error("Face {face:?} violates the Delaunay property: vertex {vertex:?} is inside its circumcircle")]
    DelaunayViolation {
        /// The offending face.
        face: FaceKey,
        /// A vertex inside the face's circumcircle.
        vertex: VertexKey,
    },
    /// Structural corruption found while walking the mesh.
    #[error("TDS corruption: {source}")]
    TriangulationState {
        /// The underlying structural error.
        #[source]
        source: TdsValidationError,
    },
}

impl From<TdsValidationError> for DelaunayValidationError {
    fn from(source: TdsValidationError) -> Self {
        Self::TriangulationState { source }
    }
}

// =============================================================================
// DELAUNAY PROPERTY VALIDATION
// =============================================================================

/// First vertex strictly inside `face`'s circumcircle, if any.
///
/// Uses the same in-circle predicate as edge legalization. Faces with a
/// symbolic corner carry no circle and are skipped; their legality is fully
/// decided by the symbolic rules applied during flips.
fn first_violator<U: DataType>(
    tds: &Tds<U>,
    face: FaceKey,
    finite: &[(VertexKey, Point)],
    config: &PredicateConfig,
) -> Option<VertexKey> {
    let FaceKind::Triangle {
        corners,
        circumcircle: Some(_),
    } = tds.face(face)?.kind()
    else {
        return None;
    };
    let [Position::Finite(a), Position::Finite(b), Position::Finite(c)] =
        tds.face_positions(face).ok()?
    else {
        return None;
    };
    finite
        .iter()
        .filter(|(key, _)| !corners.contains(key))
        .find(|(_, p)| incircle(a, b, c, *p, config.circumcircle_epsilon) == InCircle::INSIDE)
        .map(|(key, _)| *key)
}

/// Find faces that violate the empty-circumcircle property.
///
/// Checks `faces_to_check` when given, otherwise every live face of the mesh.
/// Only faces with three finite corners are tested, against every finite
/// vertex. This is an O(F·V) scan meant for tests and debugging.
///
/// Missing or replaced faces in `faces_to_check` are skipped.
///
/// # Errors
///
/// Returns [`DelaunayValidationError::TriangulationState`] if the face set
/// cannot be determined.
///
/// # Examples
///
/// ```
/// use delaunay_dag::prelude::*;
/// use delaunay_dag::core::util::find_delaunay_violations;
///
/// let mut dt = DelaunayTriangulation::new_bounded([
///     Point::new(0.0, 0.0),
///     Point::new(10.0, 0.0),
///     Point::new(0.0, 10.0),
/// ])
/// .unwrap();
/// dt.insert(Point::new(2.0, 3.0)).unwrap();
/// dt.insert(Point::new(3.0, 2.0)).unwrap();
///
/// let violations = find_delaunay_violations(dt.tds(), None, dt.predicate_config()).unwrap();
/// assert!(violations.is_empty());
/// ```
pub fn find_delaunay_violations<U: DataType>(
    tds: &Tds<U>,
    faces_to_check: Option<&[FaceKey]>,
    config: &PredicateConfig,
) -> Result<ViolationBuffer, DelaunayValidationError> {
    let live = tds.referenced_faces();
    let finite: Vec<(VertexKey, Point)> = tds
        .vertices()
        .filter_map(|(key, vertex)| vertex.point().map(|p| (key, p)))
        .collect();

    let mut violations = ViolationBuffer::new();
    let mut check = |face: FaceKey| {
        if face == tds.outer_face() || !live.contains(&face) {
            return;
        }
        if let Some(vertex) = first_violator(tds, face, &finite, config) {
            violations.push((face, vertex));
        }
    };
    match faces_to_check {
        Some(keys) => keys.iter().copied().for_each(&mut check),
        None => live.iter().copied().for_each(&mut check),
    }

    tracing::debug!(
        checked = faces_to_check.map_or(live.len(), <[FaceKey]>::len),
        violations = violations.len(),
        "find_delaunay_violations"
    );
    Ok(violations)
}

/// Validate the Delaunay property, reporting the first violation.
///
/// # Errors
///
/// Returns [`DelaunayValidationError::DelaunayViolation`] for the first
/// offending face, or a structural error if the mesh cannot be walked.
pub fn is_delaunay<U: DataType>(
    tds: &Tds<U>,
    config: &PredicateConfig,
) -> Result<(), DelaunayValidationError> {
    match find_delaunay_violations(tds, None, config)?.first() {
        Some(&(face, vertex)) => Err(DelaunayValidationError::DelaunayViolation { face, vertex }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::delaunay_triangulation::DelaunayTriangulation;

    #[test]
    fn test_delaunay_validation_handles_bootstrap_mesh() {
        let dt = DelaunayTriangulation::new_bounded([
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ])
        .unwrap();
        assert!(is_delaunay(dt.tds(), dt.predicate_config()).is_ok());
    }

    #[test]
    fn test_symbolic_faces_are_skipped() {
        let mut dt = DelaunayTriangulation::new_symbolic(Point::new(0.0, 10.0)).unwrap();
        dt.insert(Point::new(0.0, 0.0)).unwrap();
        let violations = find_delaunay_violations(dt.tds(), None, dt.predicate_config()).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_replaced_faces_are_ignored() {
        let mut dt = DelaunayTriangulation::new_bounded([
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ])
        .unwrap();
        let root = dt.live_faces()[0];
        dt.insert(Point::new(2.0, 2.0)).unwrap();
        let violations =
            find_delaunay_violations(dt.tds(), Some(&[root]), dt.predicate_config()).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_cocircular_neighbors_are_not_violations() {
        let mut dt = DelaunayTriangulation::new_bounded([
            Point::new(-10.0, -10.0),
            Point::new(10.0, -10.0),
            Point::new(0.0, 10.0),
        ])
        .unwrap();
        for p in [
            Point::new(-1.0, -1.0),
            Point::new(1.0, -1.0),
            Point::new(1.0, 1.0),
            Point::new(-1.0, 1.0),
        ] {
            dt.insert(p).unwrap();
        }
        assert!(is_delaunay(dt.tds(), dt.predicate_config()).is_ok());
    }
}
