//! Tolerance configuration for the floating-point predicates.
//!
//! The triangulation deliberately uses epsilon-based predicates rather than
//! exact arithmetic. Every tolerance lives in [`PredicateConfig`], so callers
//! can trade robustness near degeneracies against strictness.
//!
//! All tolerances are relative:
//! - containment and side-of-edge tests normalize by the squared longest edge
//!   involved, so the band scales with the triangle;
//! - circumcircle tests shrink the radius by a factor of `1 - epsilon`, so
//!   cocircular points count as outside;
//! - the on-edge test is expressed in units in the last place (ulps) of the
//!   edge length.

use serde::{Deserialize, Serialize};

/// Configuration for the tolerance-based geometric predicates.
///
/// # Examples
///
/// ```rust
/// use delaunay_dag::geometry::robust_predicates::{PredicateConfig, config_presets};
///
/// let config = PredicateConfig::default();
/// assert_eq!(config, config_presets::general_triangulation());
/// assert!(config_presets::strict().containment_epsilon < config.containment_epsilon);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredicateConfig {
    /// Band around each triangle edge, relative to the squared longest edge,
    /// inside which a point classifies as BORDER.
    pub containment_epsilon: f64,
    /// Relative shrink of the circumradius for strict in-circle tests.
    pub circumcircle_epsilon: f64,
    /// Relative area below which three corners are treated as collinear.
    pub degeneracy_epsilon: f64,
    /// Number of ulps of the edge length allowed by the on-edge test.
    pub on_edge_ulps: u32,
}

impl Default for PredicateConfig {
    fn default() -> Self {
        config_presets::general_triangulation()
    }
}

impl PredicateConfig {
    /// Returns `true` if every tolerance is finite and non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [
            self.containment_epsilon,
            self.circumcircle_epsilon,
            self.degeneracy_epsilon,
        ]
        .iter()
        .all(|eps| eps.is_finite() && *eps >= 0.0)
            && self.circumcircle_epsilon < 1.0
    }
}

/// Ready-made tolerance sets.
pub mod config_presets {
    use super::PredicateConfig;

    /// Configuration for general-purpose triangulation.
    #[must_use]
    pub const fn general_triangulation() -> PredicateConfig {
        PredicateConfig {
            containment_epsilon: 1e-6,
            circumcircle_epsilon: 1e-10,
            degeneracy_epsilon: 1e-12,
            on_edge_ulps: 8,
        }
    }

    /// Stricter tolerances: narrower border band, tighter circle test.
    #[must_use]
    pub const fn strict() -> PredicateConfig {
        PredicateConfig {
            containment_epsilon: 1e-9,
            circumcircle_epsilon: 1e-13,
            degeneracy_epsilon: 1e-14,
            on_edge_ulps: 4,
        }
    }

    /// More lenient tolerances for inputs with many near-degenerate
    /// configurations (grids, snapped coordinates).
    #[must_use]
    pub const fn lenient() -> PredicateConfig {
        PredicateConfig {
            containment_epsilon: 1e-4,
            circumcircle_epsilon: 1e-8,
            degeneracy_epsilon: 1e-10,
            on_edge_ulps: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid_and_ordered() {
        let strict = config_presets::strict();
        let general = config_presets::general_triangulation();
        let lenient = config_presets::lenient();

        for config in [strict, general, lenient] {
            assert!(config.is_valid(), "{config:?}");
        }

        assert!(strict.containment_epsilon < general.containment_epsilon);
        assert!(general.containment_epsilon < lenient.containment_epsilon);
        assert!(strict.on_edge_ulps < lenient.on_edge_ulps);
    }

    #[test]
    fn invalid_tolerances_are_detected() {
        let mut config = PredicateConfig::default();
        config.containment_epsilon = f64::NAN;
        assert!(!config.is_valid());

        let mut config = PredicateConfig::default();
        config.circumcircle_epsilon = 1.0;
        assert!(!config.is_valid());

        let mut config = PredicateConfig::default();
        config.degeneracy_epsilon = -1.0;
        assert!(!config.is_valid());
    }
}
