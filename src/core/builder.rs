//! Fluent construction of [`DelaunayTriangulation`]s.
//!
//! Two pieces of configuration go into a triangulation:
//!
//! - [`Bounds`]: the root face, either a symbolic one hanging off the highest
//!   point or a large finite triangle;
//! - [`TriangulationConfig`]: tolerances, duplicate spacing and safety caps,
//!   built with the `derive_builder`-generated [`TriangulationConfigBuilder`].
//!
//! [`DelaunayTriangulationBuilder`] ties both together with an initial point
//! set.
//!
//! # Examples
//!
//! ```rust
//! use delaunay_dag::core::builder::DelaunayTriangulationBuilder;
//! use delaunay_dag::geometry::point::Point;
//!
//! let points = [
//!     Point::new(0.0, 0.0),
//!     Point::new(4.0, 1.0),
//!     Point::new(1.0, 3.0),
//!     Point::new(2.0, 5.0),
//! ];
//! let dt = DelaunayTriangulationBuilder::from_points(&points)
//!     .build::<()>()
//!     .unwrap();
//!
//! // The highest point becomes the apex of the symbolic root face.
//! assert_eq!(dt.number_of_finite_vertices(), 4);
//! assert!(dt.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::core::algorithms::incremental_insertion::InsertionError;
use crate::core::delaunay_triangulation::{
    DelaunayTriangulation, DelaunayTriangulationConstructionError,
};
use crate::core::operations::InsertionOutcome;
use crate::core::traits::data_type::DataType;
use crate::core::triangulation_data_structure::DEFAULT_TRAVERSAL_LIMIT;
use crate::geometry::point::Point;
use crate::geometry::robust_predicates::PredicateConfig;

/// Default minimum distance between two vertices.
pub const DEFAULT_MIN_SPACING: f64 = 1e-9;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Tunables of a triangulation.
///
/// # Examples
///
/// ```rust
/// use delaunay_dag::core::builder::TriangulationConfigBuilder;
/// use delaunay_dag::geometry::robust_predicates::config_presets;
///
/// let config = TriangulationConfigBuilder::default()
///     .predicates(config_presets::strict())
///     .min_spacing(1e-6)
///     .max_flips_per_insertion(500_usize)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_flips_per_insertion, Some(500));
///
/// assert!(TriangulationConfigBuilder::default().min_spacing(-1.0).build().is_err());
/// ```
#[derive(Builder, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct TriangulationConfig {
    /// Tolerances of the geometric predicates.
    #[builder(default)]
    pub predicates: PredicateConfig,
    /// Points closer than this to an existing vertex are reported as
    /// duplicates. Also the cell size of the duplicate index.
    #[builder(default = "DEFAULT_MIN_SPACING")]
    pub min_spacing: f64,
    /// Cap on flips per insertion; `None` scales with the mesh size.
    #[builder(setter(into, strip_option), default)]
    pub max_flips_per_insertion: Option<usize>,
    /// Cap on face and vertex-star walks.
    #[builder(default = "DEFAULT_TRAVERSAL_LIMIT")]
    pub traversal_limit: usize,
}

impl Default for TriangulationConfig {
    fn default() -> Self {
        Self {
            predicates: PredicateConfig::default(),
            min_spacing: DEFAULT_MIN_SPACING,
            max_flips_per_insertion: None,
            traversal_limit: DEFAULT_TRAVERSAL_LIMIT,
        }
    }
}

impl TriangulationConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(spacing) = self.min_spacing
            && !(spacing.is_finite() && spacing >= 0.0)
        {
            return Err(format!("min_spacing must be finite and non-negative, got {spacing}"));
        }
        if let Some(predicates) = &self.predicates
            && !predicates.is_valid()
        {
            return Err(format!("invalid predicate tolerances: {predicates:?}"));
        }
        if let Some(Some(0)) = self.max_flips_per_insertion {
            return Err("max_flips_per_insertion must be positive".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// BOUNDS
// =============================================================================

/// The region covered by the root face.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Bounds {
    /// Root face `(apex, Top, Bottom)` with two symbolic vertices.
    ///
    /// Covers every point lexicographically below `apex` (smaller `y`, or
    /// equal `y` and smaller `x`), so `apex` should be the highest point.
    Symbolic {
        /// The finite corner of the root face.
        apex: Point,
    },
    /// A finite root triangle; its corners may be given in either orientation.
    ///
    /// Only points strictly inside it can be inserted.
    Triangle([Point; 3]),
}

impl Bounds {
    /// Symbolic bounds whose apex is the lexicographic maximum of `points`.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        points
            .iter()
            .copied()
            .max_by(Point::lexicographic_cmp)
            .map(|apex| Self::Symbolic { apex })
    }
}

// =============================================================================
// TRIANGULATION BUILDER
// =============================================================================

/// Builder for [`DelaunayTriangulation`] from bounds and an initial point set.
///
/// Points are inserted in input order. Duplicates (within the configured
/// minimum spacing) are skipped; any other insertion failure aborts the
/// build.
///
/// # Examples
///
/// ```rust
/// use delaunay_dag::core::builder::{Bounds, DelaunayTriangulationBuilder, TriangulationConfig};
/// use delaunay_dag::geometry::point::Point;
///
/// let corners = [Point::new(0.0, 0.0), Point::new(0.0, 10.0), Point::new(10.0, 0.0)];
/// let points = [Point::new(1.0, 1.0), Point::new(2.0, 3.0), Point::new(1.0, 1.0)];
///
/// let dt = DelaunayTriangulationBuilder::new(Bounds::Triangle(corners))
///     .points(&points)
///     .config(TriangulationConfig::default())
///     .build::<()>()
///     .unwrap();
///
/// // Three corners plus two distinct points.
/// assert_eq!(dt.number_of_vertices(), 5);
/// ```
#[derive(Clone, Debug)]
pub struct DelaunayTriangulationBuilder<'p> {
    bounds: Option<Bounds>,
    points: &'p [Point],
    config: TriangulationConfig,
}

impl<'p> DelaunayTriangulationBuilder<'p> {
    /// Builder with explicit bounds and no initial points.
    #[must_use]
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds: Some(bounds),
            points: &[],
            config: TriangulationConfig::default(),
        }
    }

    /// Builder over `points` with symbolic bounds.
    ///
    /// The lexicographically highest point becomes the apex of the root face
    /// and every other point is inserted.
    #[must_use]
    pub fn from_points(points: &'p [Point]) -> Self {
        Self {
            bounds: Bounds::enclosing(points),
            points,
            config: TriangulationConfig::default(),
        }
    }

    /// Points inserted after bootstrapping.
    #[must_use]
    pub const fn points(mut self, points: &'p [Point]) -> Self {
        self.points = points;
        self
    }

    /// Replace the bounds.
    #[must_use]
    pub const fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Replace the configuration.
    #[must_use]
    pub const fn config(mut self, config: TriangulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Bootstrap and insert every point.
    ///
    /// # Errors
    ///
    /// - [`DelaunayTriangulationConstructionError::EmptyInput`] when no bounds
    ///   were given and the point set is empty;
    /// - [`DelaunayTriangulationConstructionError::Bootstrap`] when the root
    ///   face cannot be built;
    /// - [`DelaunayTriangulationConstructionError::Insertion`] for the first
    ///   point that fails to insert.
    pub fn build<U: DataType>(
        self,
    ) -> Result<DelaunayTriangulation<U>, DelaunayTriangulationConstructionError> {
        let bounds = self
            .bounds
            .ok_or(DelaunayTriangulationConstructionError::EmptyInput)?;
        let mut dt = DelaunayTriangulation::with_config(bounds, self.config)
            .map_err(|source| DelaunayTriangulationConstructionError::Bootstrap { source })?;

        let mut skipped = 0_usize;
        for (index, &point) in self.points.iter().enumerate() {
            match dt.try_insert(point, None) {
                Ok(InsertionOutcome::Inserted { .. }) => {}
                Ok(InsertionOutcome::Skipped { .. }) => skipped += 1,
                Err(source) => {
                    return Err(DelaunayTriangulationConstructionError::Insertion {
                        index,
                        source,
                    });
                }
            }
        }
        tracing::debug!(
            points = self.points.len(),
            skipped,
            vertices = dt.number_of_vertices(),
            "built triangulation"
        );
        Ok(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::robust_predicates::config_presets;

    #[test]
    fn test_config_builder_defaults_match_default() {
        let built = TriangulationConfigBuilder::default().build().unwrap();
        assert_eq!(built, TriangulationConfig::default());
    }

    #[test]
    fn test_config_builder_rejects_invalid_values() {
        assert!(
            TriangulationConfigBuilder::default()
                .min_spacing(f64::NAN)
                .build()
                .is_err()
        );
        assert!(
            TriangulationConfigBuilder::default()
                .max_flips_per_insertion(0_usize)
                .build()
                .is_err()
        );
        let mut predicates = config_presets::lenient();
        predicates.circumcircle_epsilon = 2.0;
        assert!(
            TriangulationConfigBuilder::default()
                .predicates(predicates)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_enclosing_uses_lexicographic_maximum() {
        let points = [
            Point::new(5.0, 1.0),
            Point::new(-3.0, 4.0),
            Point::new(2.0, 4.0),
        ];
        assert_eq!(
            Bounds::enclosing(&points),
            Some(Bounds::Symbolic {
                apex: Point::new(2.0, 4.0)
            })
        );
        assert_eq!(Bounds::enclosing(&[]), None);
    }

    #[test]
    fn test_from_points_skips_the_apex_and_duplicates() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(3.0, 5.0),
            Point::new(2.0, 1.0),
            Point::new(0.0, 0.0),
        ];
        let dt = DelaunayTriangulationBuilder::from_points(&points)
            .build::<()>()
            .unwrap();
        assert_eq!(dt.number_of_finite_vertices(), 3);
        dt.validate().unwrap();
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let err = DelaunayTriangulationBuilder::from_points(&[])
            .build::<()>()
            .unwrap_err();
        assert_eq!(err, DelaunayTriangulationConstructionError::EmptyInput);
    }

    #[test]
    fn test_point_outside_triangle_reports_its_index() {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ];
        let points = [Point::new(0.2, 0.2), Point::new(5.0, 5.0)];
        let err = DelaunayTriangulationBuilder::new(Bounds::Triangle(corners))
            .points(&points)
            .build::<()>()
            .unwrap_err();
        assert!(matches!(
            err,
            DelaunayTriangulationConstructionError::Insertion {
                index: 1,
                source: InsertionError::PointOutsideBounds { .. }
            }
        ));
    }

    #[test]
    fn test_bounds_round_trip_through_json() {
        let bounds = Bounds::Triangle([
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ]);
        let json = serde_json::to_string(&bounds).unwrap();
        let back: Bounds = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bounds);
    }
}
