//! # delaunay-dag
//!
//! Incremental planar Delaunay triangulation on a half-edge mesh, with a
//! history DAG for point location.
//!
//! The library maintains a triangulation of a growing point set and answers
//! "which triangle contains this point?" in sub-linear time while the mesh
//! evolves. It was written as the computational core of a point-placement
//! game, where every move inserts a point and the resulting mesh is queried
//! by rendering and scoring code.
//!
//! # Features
//!
//! - Half-edge mesh with stable slotmap keys for vertices, half-edges and faces
//! - Incremental insertion: face and edge splits followed by edge-flip legalization
//! - Point location through an append-only history DAG, with explicit compaction
//! - Symbolic bounding vertices at infinity, or a finite bounding triangle
//! - Transactional insertion: a failed insertion leaves the triangulation untouched
//! - Copy-able data types associated with vertices (see [`DataType`](core::traits::DataType))
//! - Tolerance-based predicates with configurable presets
//!
//! # Basic Usage
//!
//! ```rust
//! use delaunay_dag::prelude::*;
//!
//! // The root face hangs off the highest point; Top and Bottom are symbolic.
//! let mut dt = DelaunayTriangulation::new_symbolic(Point::new(0.0, 10.0)).unwrap();
//!
//! for p in [
//!     Point::new(-3.0, 1.0),
//!     Point::new(4.0, 2.0),
//!     Point::new(0.5, -2.0),
//!     Point::new(1.0, 5.0),
//! ] {
//!     dt.insert(p).unwrap();
//! }
//!
//! assert_eq!(dt.number_of_finite_vertices(), 5);
//! assert!(dt.is_valid());
//!
//! // Point location returns a live face incident to an inserted vertex.
//! let face = dt.find_face(Point::new(4.0, 2.0)).unwrap();
//! assert!(dt.live_faces().contains(&face));
//! ```
//!
//! # Triangulation Invariants
//!
//! | Invariant | Checked by |
//! |---|---|
//! | `twin(twin(e)) == e`, `prev(next(e)) == e`, twins share endpoints | [`Tds::validate_half_edges`](core::triangulation_data_structure::Tds::validate_half_edges) |
//! | Live faces are counter-clockwise 3-cycles with matching cached corners | [`Tds::validate_faces`](core::triangulation_data_structure::Tds::validate_faces) |
//! | Each vertex's incident edge starts at it | [`Tds::validate_vertex_incidence`](core::triangulation_data_structure::Tds::validate_vertex_incidence) |
//! | History leaves are exactly the live faces | [`DelaunayTriangulation::validate`](core::delaunay_triangulation::DelaunayTriangulation::validate) |
//! | Empty circumcircle (finite faces) | [`DelaunayTriangulation::validate_delaunay`](core::delaunay_triangulation::DelaunayTriangulation::validate_delaunay) |
//!
//! [`DelaunayTriangulation::validation_report`](core::delaunay_triangulation::DelaunayTriangulation::validation_report)
//! collects every violation instead of stopping at the first one; set
//! [`ValidationOptions::check_delaunay`](core::triangulation_data_structure::ValidationOptions::check_delaunay)
//! to include the quadratic Delaunay check.
//!
//! # Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber. Set
//! `DELAUNAY_DAG_FLIP_TRACE` to get a debug event per legality test during
//! legalization.

// Allow multiple crate versions due to transitive dependencies
#![expect(clippy::multiple_crate_versions)]
// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// The `core` module contains the mesh, the point-location history and the
/// insertion algorithms.
///
/// It includes the `Tds` half-edge mesh and the `DelaunayTriangulation`
/// facade that ties it to the history DAG.
pub mod core {
    /// Triangulation algorithms for insertion, legalization and location
    pub mod algorithms {
        /// Edge flips and Delaunay legalization
        pub mod flips;
        /// Face and edge splits for a single inserted vertex
        pub mod incremental_insertion;
        /// History-DAG point location
        pub mod locate;
    }
    /// Fluent construction and configuration
    pub mod builder;
    /// High-performance collection types for keys, stars and replacement sets
    pub mod collections;
    /// Delaunay triangulation facade with transactional insertion
    pub mod delaunay_triangulation;
    pub mod edge;
    pub mod face;
    pub mod operations;
    pub mod triangulation_data_structure;
    pub mod util;
    pub mod vertex;
    /// Traits for triangulation data.
    pub mod traits {
        pub mod data_type;
        pub use data_type::*;
    }
    // Re-export the `core` modules.
    pub use builder::*;
    pub use delaunay_triangulation::*;
    pub use edge::*;
    pub use face::*;
    pub use operations::*;
    pub use traits::*;
    pub use triangulation_data_structure::*;
    pub use util::*;
    pub use vertex::*;
    // Note: collections module not re-exported here to avoid namespace pollution
}

/// Contains geometric types: the `Point` struct, the predicates and their
/// symbolic extension.
pub mod geometry {
    pub mod point;
    pub mod predicates;
    /// Tolerance configuration for the predicates
    pub mod robust_predicates;
    /// Predicates extended to the symbolic vertices at infinity
    pub mod symbolic;
    /// Circumcircles and point generators
    pub mod util;
    pub use point::*;
    pub use predicates::*;
    pub use robust_predicates::*;
    pub use symbolic::Position;
    pub use util::*;
}

/// A prelude module that re-exports commonly used types.
pub mod prelude {
    // Re-export from core
    pub use crate::core::{
        algorithms::{
            flips::FlipError,
            incremental_insertion::InsertionError,
            locate::{LocateError, LocateResult, PointLocationHierarchy},
        },
        builder::*,
        delaunay_triangulation::*,
        operations::*,
        traits::data_type::*,
        triangulation_data_structure::*,
        util::*,
    };

    // Re-export commonly used collection types from core::collections
    pub use crate::core::collections::{
        FastHashMap, FastHashSet, SmallBuffer, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };

    // Re-export from geometry
    pub use crate::geometry::{
        point::*, predicates::*, robust_predicates::*, symbolic::Position,
        util::circumcircle::*,
    };
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
