//! Delaunay triangulation layer with incremental insertion.
//!
//! [`DelaunayTriangulation`] owns the three pieces that must evolve together:
//!
//! - the half-edge mesh ([`Tds`]);
//! - the point-location history DAG ([`PointLocationHierarchy`]);
//! - a spatial index of vertex positions used to reject near-duplicates.
//!
//! Every insertion runs inside a mesh transaction plus a hierarchy checkpoint.
//! When any step fails, both are rolled back before the error is returned, so
//! a failed insertion leaves the triangulation exactly as it was.

use thiserror::Error;

use crate::core::algorithms::flips::{self, BoundingVertices};
use crate::core::algorithms::incremental_insertion::{self, InsertionError};
use crate::core::algorithms::locate::{self, LocateError, LocateResult, PointLocationHierarchy};
use crate::core::builder::{Bounds, TriangulationConfig};
use crate::core::collections::spatial_hash_grid::HashGridIndex;
use crate::core::collections::{FaceKeySet, VertexKeyBuffer};
use crate::core::operations::{InsertionOutcome, InsertionStatistics, SkipReason};
use crate::core::traits::data_type::DataType;
use crate::core::triangulation_data_structure::{
    EdgeKey, FaceKey, InvariantKind, Tds, TdsError, TdsValidationError,
    TriangulationValidationReport, ValidationOptions, VertexKey,
};
use crate::core::util::{DelaunayValidationError, find_delaunay_violations};
use crate::core::vertex::Vertex;
use crate::geometry::point::Point;
use crate::geometry::robust_predicates::PredicateConfig;
use crate::geometry::symbolic::Position;
use crate::geometry::util::circumcircle::Triangle;

/// Errors from [`DelaunayTriangulationBuilder::build`](crate::core::builder::DelaunayTriangulationBuilder::build).
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum DelaunayTriangulationConstructionError {
    /// No bounds were given and there is no point to derive them from.
    #[error("Cannot derive bounds from an empty point set")]
    EmptyInput,
    /// The root face could not be built.
    #[error("Failed to build the root face: {source}")]
    Bootstrap {
        /// The underlying failure.
        #[source]
        source: InsertionError,
    },
    /// An initial point could not be inserted.
    #[error("Failed to insert point #{index}: {source}")]
    Insertion {
        /// Position of the point in the input slice.
        index: usize,
        /// The underlying failure.
        #[source]
        source: InsertionError,
    },
}

/// Incremental planar Delaunay triangulation with history-DAG point location.
///
/// # Type Parameters
/// - `U`: User data attached to vertices, such as an owner label.
///
/// # Bounds
///
/// The triangulation starts from a single root face:
///
/// - [`Bounds::Symbolic`]: `(apex, Top, Bottom)` where `Top` and `Bottom` are
///   symbolic points at infinity. It accepts every point lexicographically
///   below the apex.
/// - [`Bounds::Triangle`]: a finite triangle. It accepts points strictly
///   inside it.
///
/// # Delaunay Property
///
/// After each insertion every edge is locally Delaunay up to the configured
/// circumcircle tolerance. Faces touching a symbolic vertex follow the
/// symbolic limit rules and have no finite circumcircle.
///
/// # Examples
///
/// ```rust
/// use delaunay_dag::prelude::*;
///
/// let mut dt = DelaunayTriangulation::new_bounded([
///     Point::new(0.0, 0.0),
///     Point::new(10.0, 0.0),
///     Point::new(0.0, 10.0),
/// ])
/// .unwrap();
///
/// let v = dt.insert(Point::new(2.0, 2.0)).unwrap();
/// assert_eq!(dt.number_of_faces(), 3);
/// assert_eq!(dt.vertex_neighbors(v).unwrap().len(), 3);
///
/// // Inserting the same point again changes nothing.
/// assert!(matches!(
///     dt.insert(Point::new(2.0, 2.0)),
///     Err(InsertionError::PointExists { .. })
/// ));
/// assert_eq!(dt.number_of_faces(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct DelaunayTriangulation<U = ()> {
    tds: Tds<U>,
    hierarchy: PointLocationHierarchy,
    bounding: BoundingVertices,
    bounds: Bounds,
    config: TriangulationConfig,
    duplicate_index: HashGridIndex<VertexKey>,
    live_face_count: usize,
    last_insertion: Option<InsertionStatistics>,
}

// Most common case: no vertex data.
impl DelaunayTriangulation<()> {
    /// Create a triangulation whose root face is `(apex, Top, Bottom)`.
    ///
    /// `apex` should be the highest point that will ever be inserted.
    ///
    /// # Errors
    ///
    /// [`InsertionError::InvalidPoint`] if `apex` is not finite.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use delaunay_dag::prelude::*;
    ///
    /// let mut dt = DelaunayTriangulation::new_symbolic(Point::new(0.0, 100.0)).unwrap();
    /// dt.insert(Point::new(-3.0, 2.0)).unwrap();
    /// assert_eq!(dt.number_of_finite_vertices(), 2);
    ///
    /// // Nothing above the apex fits.
    /// assert!(dt.insert(Point::new(0.0, 101.0)).is_err());
    /// ```
    pub fn new_symbolic(apex: Point) -> Result<Self, InsertionError> {
        Self::with_bounds(Bounds::Symbolic { apex })
    }

    /// Create a triangulation bounded by a finite triangle.
    ///
    /// The corners may be given in either orientation.
    ///
    /// # Errors
    ///
    /// [`InsertionError::DegenerateTriangle`] for collinear corners and
    /// [`InsertionError::InvalidPoint`] for non-finite ones.
    pub fn new_bounded(corners: [Point; 3]) -> Result<Self, InsertionError> {
        Self::with_bounds(Bounds::Triangle(corners))
    }
}

impl<U: DataType> DelaunayTriangulation<U> {
    /// Create a triangulation with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`with_config`](Self::with_config).
    pub fn with_bounds(bounds: Bounds) -> Result<Self, InsertionError> {
        Self::with_config(bounds, TriangulationConfig::default())
    }

    /// Create a triangulation holding just the root face.
    ///
    /// The configuration is taken as is; use
    /// [`TriangulationConfigBuilder`](crate::core::builder::TriangulationConfigBuilder)
    /// to validate it first.
    ///
    /// # Errors
    ///
    /// [`InsertionError::InvalidPoint`] for non-finite corners,
    /// [`InsertionError::DegenerateTriangle`] for collinear ones.
    pub fn with_config(bounds: Bounds, config: TriangulationConfig) -> Result<Self, InsertionError> {
        let predicates = config.predicates;
        let positions = match bounds {
            Bounds::Symbolic { apex } => {
                apex.validate()?;
                [
                    Position::Finite(apex),
                    Position::SymbolicTop,
                    Position::SymbolicBottom,
                ]
            }
            Bounds::Triangle(corners) => {
                for corner in corners {
                    corner.validate()?;
                }
                let [a, b, c] = corners;
                Triangle::new(a, b, c, predicates.degeneracy_epsilon)
                    .map_err(|_| InsertionError::DegenerateTriangle {
                        corners: corners.map(Position::Finite),
                    })?
                    .corners()
                    .map(Position::Finite)
            }
        };

        let mut tds = Tds::new(config.traversal_limit);
        let bounding = positions.map(|position| tds.add_vertex(position, None));
        let [v0, v1, v2] = bounding;
        let (e0, t0) = tds.add_edge_pair(v0, v1);
        let (e1, t1) = tds.add_edge_pair(v1, v2);
        let (e2, t2) = tds.add_edge_pair(v2, v0);
        let root = tds.create_face([e0, e1, e2], &predicates)?;
        tds.wire_outer_boundary(&[t2, t1, t0])?;
        for (vertex, edge) in [(v0, e0), (v1, e1), (v2, e2)] {
            tds.set_incident_edge(vertex, edge)?;
        }

        let mut hierarchy = PointLocationHierarchy::new(tds.outer_face());
        hierarchy.insert_root_face(root);

        let mut duplicate_index = HashGridIndex::new(config.min_spacing);
        for (vertex, position) in bounding.into_iter().zip(positions) {
            if let Position::Finite(p) = position {
                duplicate_index.insert(vertex, p);
            }
        }

        tracing::debug!(?bounds, ?root, "bootstrapped triangulation");
        Ok(Self {
            tds,
            hierarchy,
            bounding,
            bounds,
            config,
            duplicate_index,
            live_face_count: 1,
            last_insertion: None,
        })
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// The half-edge mesh.
    #[must_use]
    pub const fn tds(&self) -> &Tds<U> {
        &self.tds
    }

    /// The point-location history.
    #[must_use]
    pub const fn hierarchy(&self) -> &PointLocationHierarchy {
        &self.hierarchy
    }

    /// Mesh and hierarchy together, for crate-internal algorithms.
    pub(crate) const fn parts_mut(&mut self) -> (&mut Tds<U>, &mut PointLocationHierarchy) {
        (&mut self.tds, &mut self.hierarchy)
    }

    /// The bounds this triangulation was created with.
    #[must_use]
    pub const fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &TriangulationConfig {
        &self.config
    }

    /// Tolerances of the geometric predicates.
    #[must_use]
    pub const fn predicate_config(&self) -> &PredicateConfig {
        &self.config.predicates
    }

    /// The three corners of the root face.
    #[must_use]
    pub const fn bounding_vertices(&self) -> &BoundingVertices {
        &self.bounding
    }

    /// Returns `true` for a corner of the root face.
    #[must_use]
    pub fn is_bounding_vertex(&self, v: VertexKey) -> bool {
        self.bounding.contains(&v)
    }

    /// Statistics of the most recent successful insertion.
    #[must_use]
    pub const fn last_insertion_statistics(&self) -> Option<InsertionStatistics> {
        self.last_insertion
    }

    /// Number of vertices, including the corners of the root face.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.tds.number_of_vertices()
    }

    /// Number of vertices with coordinates.
    #[must_use]
    pub fn number_of_finite_vertices(&self) -> usize {
        self.tds
            .vertices()
            .filter(|(_, vertex)| !vertex.is_symbolic())
            .count()
    }

    /// Number of live triangles (the outer sentinel is not counted).
    #[must_use]
    pub const fn number_of_faces(&self) -> usize {
        self.live_face_count
    }

    /// Vertices with coordinates and their positions.
    pub fn finite_vertices(&self) -> impl Iterator<Item = (VertexKey, Point)> + '_ {
        self.tds
            .vertices()
            .filter_map(|(key, vertex)| vertex.point().map(|p| (key, p)))
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// The live triangles.
    #[must_use]
    pub fn live_faces(&self) -> Vec<FaceKey> {
        self.hierarchy.leaves()
    }

    /// The live triangles followed by the outer sentinel.
    #[must_use]
    pub fn triangulated_faces(&self) -> Vec<FaceKey> {
        let mut faces = self.live_faces();
        faces.push(self.tds.outer_face());
        faces
    }

    /// One half-edge per undirected edge of the mesh.
    #[must_use]
    pub fn live_edges(&self) -> Vec<EdgeKey> {
        self.tds
            .half_edges()
            .filter(|(key, edge)| *key < edge.twin())
            .map(|(key, _)| key)
            .collect()
    }

    /// Neighbors of `v` in counter-clockwise order.
    ///
    /// # Errors
    ///
    /// [`TdsError`] if `v` is unknown or its star cannot be walked.
    pub fn vertex_neighbors(&self, v: VertexKey) -> Result<VertexKeyBuffer, TdsError> {
        self.tds
            .vertex_edges(v)?
            .into_iter()
            .map(|e| self.tds.target(e))
            .collect()
    }

    /// Corner positions of `face`, counter-clockwise.
    ///
    /// # Errors
    ///
    /// [`TdsError`] if `face` is unknown or is the outer sentinel.
    pub fn face_positions(&self, face: FaceKey) -> Result<[Position; 3], TdsError> {
        self.tds.face_positions(face)
    }

    /// The live face containing `point`, or the outer sentinel.
    ///
    /// Points on a shared edge may be reported in either adjacent face.
    ///
    /// # Errors
    ///
    /// [`LocateError`] if the history references a missing face.
    pub fn find_face(&self, point: Point) -> Result<FaceKey, LocateError> {
        self.hierarchy
            .find_face(&self.tds, point, &self.config.predicates)
    }

    /// Classify `point` against the triangulation.
    ///
    /// # Errors
    ///
    /// [`LocateError`] if the history and the mesh disagree.
    pub fn locate(&self, point: Point) -> Result<LocateResult, LocateError> {
        locate::locate(&self.tds, &self.hierarchy, point, &self.config.predicates)
    }

    // =========================================================================
    // INSERTION
    // =========================================================================

    /// Insert a point without user data.
    ///
    /// # Errors
    ///
    /// [`InsertionError::PointExists`] for a near-duplicate, otherwise any
    /// [`InsertionError`]. The triangulation is unchanged on error.
    pub fn insert(&mut self, point: Point) -> Result<VertexKey, InsertionError> {
        self.insert_or_report(point, None)
    }

    /// Insert a point carrying `data`.
    ///
    /// # Errors
    ///
    /// See [`insert`](Self::insert).
    pub fn insert_with_data(&mut self, point: Point, data: U) -> Result<VertexKey, InsertionError> {
        self.insert_or_report(point, Some(data))
    }

    fn insert_or_report(
        &mut self,
        point: Point,
        data: Option<U>,
    ) -> Result<VertexKey, InsertionError> {
        match self.try_insert(point, data)? {
            InsertionOutcome::Inserted { vertex_key, .. } => Ok(vertex_key),
            InsertionOutcome::Skipped {
                reason: SkipReason::PointExists { existing },
            } => Err(InsertionError::PointExists { point, existing }),
        }
    }

    /// Insert a point, reporting near-duplicates as a skipped outcome.
    ///
    /// # Errors
    ///
    /// Any [`InsertionError`] other than `PointExists`. The mesh, the
    /// history and the duplicate index are unchanged on error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use delaunay_dag::prelude::*;
    ///
    /// let mut dt = DelaunayTriangulation::new_symbolic(Point::new(0.0, 10.0)).unwrap();
    /// let first = dt.try_insert(Point::new(1.0, 1.0), None).unwrap();
    /// assert!(!first.is_skipped());
    ///
    /// let second = dt.try_insert(Point::new(1.0, 1.0), None).unwrap();
    /// assert!(second.is_skipped());
    /// assert_eq!(second.vertex_key(), None);
    /// ```
    pub fn try_insert(
        &mut self,
        point: Point,
        data: Option<U>,
    ) -> Result<InsertionOutcome, InsertionError> {
        point.validate()?;
        if let Some(existing) = self.find_nearby_vertex(point) {
            tracing::trace!(%point, ?existing, "skipping near-duplicate point");
            return Ok(InsertionOutcome::Skipped {
                reason: SkipReason::PointExists { existing },
            });
        }

        let max_flips = self
            .config
            .max_flips_per_insertion
            .unwrap_or_else(|| flips::default_max_flips(self.live_face_count));

        self.tds.begin_transaction()?;
        let checkpoint = self.hierarchy.checkpoint();
        let result = incremental_insertion::insert_vertex(
            &mut self.tds,
            &mut self.hierarchy,
            point,
            data,
            &self.bounding,
            &self.config.predicates,
            max_flips,
        );

        match result {
            Ok((vertex_key, statistics)) => {
                self.tds.commit_transaction();
                self.duplicate_index.insert(vertex_key, point);
                self.live_face_count += statistics.operation.face_delta();
                self.last_insertion = Some(statistics);
                if statistics.flags.is_suspicious() {
                    tracing::debug!(%point, ?statistics, "insertion took a fallback path");
                }
                Ok(InsertionOutcome::Inserted {
                    vertex_key,
                    statistics,
                })
            }
            Err(err) => {
                self.tds.rollback_transaction();
                self.hierarchy.rollback_to(checkpoint);
                tracing::debug!(%point, error = %err, "insertion rolled back");
                Err(err)
            }
        }
    }

    /// A vertex within `min_spacing` of `point`, if any.
    fn find_nearby_vertex(&self, point: Point) -> Option<VertexKey> {
        let spacing_sq = self.config.min_spacing * self.config.min_spacing;
        let is_near = |key: VertexKey| {
            self.tds
                .vertex(key)
                .and_then(Vertex::point)
                .is_some_and(|p| p == point || p.distance_squared(point) <= spacing_sq)
        };

        let mut found = None;
        let answered = self.duplicate_index.for_each_candidate(point, |key| {
            if is_near(key) {
                found = Some(key);
                return false;
            }
            true
        });
        if answered {
            return found;
        }
        self.tds.vertices().map(|(key, _)| key).find(|&key| is_near(key))
    }

    // =========================================================================
    // MAINTENANCE
    // =========================================================================

    /// Drop replaced faces from the history and the mesh.
    ///
    /// Every live face becomes a root of the history, so location keeps
    /// working while the memory held by dead faces is released. Node ids are
    /// renumbered.
    ///
    /// Returns the number of faces removed from the mesh.
    pub fn compact_history(&mut self) -> usize {
        let dead = self.hierarchy.compact();
        let removed = self.tds.remove_faces(dead);
        tracing::debug!(
            removed,
            live = self.live_face_count,
            "compacted point-location history"
        );
        removed
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// History leaves and live mesh faces must coincide.
    fn validate_history_leaves(&self) -> Result<(), TdsValidationError> {
        let outer = self.tds.outer_face();
        let mut live: FaceKeySet = self.tds.referenced_faces();
        live.remove(&outer);
        let leaves = self.live_faces();
        for &face in &leaves {
            if !live.remove(&face) {
                return Err(TdsValidationError::StaleLeaf { face });
            }
        }
        if let Some(&face) = live.iter().next() {
            return Err(TdsValidationError::UntrackedFace { face });
        }
        Ok(())
    }

    /// Structural validation of the mesh and its history.
    ///
    /// # Errors
    ///
    /// The first violated invariant.
    pub fn validate(&self) -> Result<(), TdsValidationError> {
        self.tds.validate(&self.config.predicates)?;
        self.validate_history_leaves()
    }

    /// Validate the empty-circumcircle property of every finite face.
    ///
    /// This is an **O(F×V)** scan meant for tests and debugging.
    ///
    /// # Errors
    ///
    /// The first violating face.
    pub fn validate_delaunay(&self) -> Result<(), DelaunayValidationError> {
        crate::core::util::is_delaunay(&self.tds, &self.config.predicates)
    }

    /// Run every check and collect all violations.
    ///
    /// # Errors
    ///
    /// A report listing each violated invariant.
    pub fn validation_report(
        &self,
        options: ValidationOptions,
    ) -> Result<(), TriangulationValidationReport> {
        let mut report = self.tds.structural_report(&self.config.predicates);
        report.record(InvariantKind::HistoryLeaves, self.validate_history_leaves());
        if options.check_delaunay {
            match find_delaunay_violations(&self.tds, None, &self.config.predicates) {
                Ok(violations) => {
                    for (face, vertex) in violations {
                        report.record(
                            InvariantKind::Delaunay,
                            Err(TdsValidationError::DelaunayViolation { face, vertex }),
                        );
                    }
                }
                Err(DelaunayValidationError::TriangulationState { source }) => {
                    report.record(InvariantKind::Delaunay, Err(source));
                }
                Err(DelaunayValidationError::DelaunayViolation { face, vertex }) => {
                    report.record(
                        InvariantKind::Delaunay,
                        Err(TdsValidationError::DelaunayViolation { face, vertex }),
                    );
                }
            }
        }
        if report.is_empty() {
            Ok(())
        } else {
            Err(report)
        }
    }

    /// Returns `true` if the mesh is structurally valid and Delaunay.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok() && self.validate_delaunay().is_ok()
    }
}
