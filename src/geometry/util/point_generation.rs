//! Random and structured point generation for tests and benchmarks.

use rand::{Rng, SeedableRng};

use crate::geometry::point::Point;

/// Default cap on the number of points a grid request may produce.
///
/// Overridable through the `DELAUNAY_DAG_MAX_GRID_POINTS` environment variable.
const MAX_GRID_POINTS_DEFAULT: usize = 4_000_000;

fn max_grid_points() -> usize {
    if let Ok(v) = std::env::var("DELAUNAY_DAG_MAX_GRID_POINTS")
        && let Ok(n) = v.parse::<usize>()
    {
        return n;
    }
    MAX_GRID_POINTS_DEFAULT
}

/// Errors from the point generators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RandomPointGenerationError {
    /// The coordinate range is empty or not finite.
    #[error("Invalid coordinate range: min {min} must be finite and less than max {max}")]
    InvalidRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// The requested point count is invalid.
    #[error("Invalid point count: {n_points}")]
    InvalidPointCount {
        /// Requested number of points.
        n_points: usize,
    },
    /// The request was rejected before generation.
    #[error("Point generation failed: {details}")]
    GenerationFailed {
        /// Human-readable reason.
        details: String,
    },
}

fn check_range(range: (f64, f64)) -> Result<(), RandomPointGenerationError> {
    if !range.0.is_finite() || !range.1.is_finite() || range.0 >= range.1 {
        return Err(RandomPointGenerationError::InvalidRange {
            min: range.0,
            max: range.1,
        });
    }
    Ok(())
}

fn sample_points<R: Rng>(rng: &mut R, n_points: usize, range: (f64, f64)) -> Vec<Point> {
    (0..n_points)
        .map(|_| {
            Point::new(
                rng.random_range(range.0..range.1),
                rng.random_range(range.0..range.1),
            )
        })
        .collect()
}

/// Generate `n_points` points with both coordinates uniform in `range`.
///
/// # Errors
///
/// Returns [`RandomPointGenerationError::InvalidRange`] if `range.0 >= range.1`
/// or either bound is not finite.
///
/// # Examples
///
/// ```
/// use delaunay_dag::geometry::util::generate_random_points;
///
/// let points = generate_random_points(100, (-10.0, 10.0)).unwrap();
/// assert_eq!(points.len(), 100);
/// assert!(generate_random_points(10, (1.0, -1.0)).is_err());
/// ```
pub fn generate_random_points(
    n_points: usize,
    range: (f64, f64),
) -> Result<Vec<Point>, RandomPointGenerationError> {
    check_range(range)?;
    Ok(sample_points(&mut rand::rng(), n_points, range))
}

/// Seeded variant of [`generate_random_points`] for reproducible runs.
///
/// # Errors
///
/// Returns [`RandomPointGenerationError::InvalidRange`] on an invalid range.
pub fn generate_random_points_seeded(
    n_points: usize,
    range: (f64, f64),
    seed: u64,
) -> Result<Vec<Point>, RandomPointGenerationError> {
    check_range(range)?;
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    Ok(sample_points(&mut rng, n_points, range))
}

/// Generate seeded points uniformly distributed inside triangle `abc`.
///
/// Uses the square-root parametrization, so no rejection sampling is needed.
/// Points never land exactly on the boundary unless the sampler returns 0.
///
/// # Errors
///
/// Returns [`RandomPointGenerationError::GenerationFailed`] if a corner is not finite.
pub fn generate_points_in_triangle_seeded(
    n_points: usize,
    corners: [Point; 3],
    seed: u64,
) -> Result<Vec<Point>, RandomPointGenerationError> {
    if corners.iter().any(|c| !c.is_finite()) {
        return Err(RandomPointGenerationError::GenerationFailed {
            details: format!("non-finite triangle corner in {corners:?}"),
        });
    }
    let [a, b, c] = corners;
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let points = (0..n_points)
        .map(|_| {
            let r1: f64 = rng.random_range(0.0..1.0);
            let r2: f64 = rng.random_range(0.0..1.0);
            let s = r1.sqrt();
            a * (1.0 - s) + b * (s * (1.0 - r2)) + c * (s * r2)
        })
        .collect();
    Ok(points)
}

/// Generate a `points_per_axis × points_per_axis` grid starting at `offset`.
///
/// Grids are the canonical cocircular stress input for Delaunay legalization.
///
/// # Errors
///
/// Returns [`RandomPointGenerationError::InvalidPointCount`] for an empty grid
/// and [`RandomPointGenerationError::GenerationFailed`] if the grid exceeds the
/// size cap or `spacing` is not a positive finite number.
///
/// # Examples
///
/// ```
/// use delaunay_dag::geometry::point::Point;
/// use delaunay_dag::geometry::util::generate_grid_points;
///
/// let grid = generate_grid_points(4, 1.0, Point::new(0.0, 0.0)).unwrap();
/// assert_eq!(grid.len(), 16);
/// assert_eq!(grid[5], Point::new(1.0, 1.0));
/// ```
pub fn generate_grid_points(
    points_per_axis: usize,
    spacing: f64,
    offset: Point,
) -> Result<Vec<Point>, RandomPointGenerationError> {
    if points_per_axis == 0 {
        return Err(RandomPointGenerationError::InvalidPointCount { n_points: 0 });
    }
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(RandomPointGenerationError::GenerationFailed {
            details: format!("grid spacing must be positive and finite, got {spacing}"),
        });
    }
    let total = points_per_axis
        .checked_mul(points_per_axis)
        .filter(|total| *total <= max_grid_points())
        .ok_or_else(|| RandomPointGenerationError::GenerationFailed {
            details: format!("grid of {points_per_axis}^2 points exceeds the size cap"),
        })?;

    let mut points = Vec::with_capacity(total);
    for row in 0..points_per_axis {
        for col in 0..points_per_axis {
            #[expect(
                clippy::cast_precision_loss,
                reason = "grid indices are bounded by the size cap"
            )]
            let (x, y) = (col as f64, row as f64);
            points.push(Point::new(
                x.mul_add(spacing, offset.x()),
                y.mul_add(spacing, offset.y()),
            ));
        }
    }
    Ok(points)
}
