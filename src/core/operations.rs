//! Semantic classification and telemetry for triangulation operations.
//!
//! This module is intentionally **not** about implementation mechanics. It defines:
//! - What local operation an insertion performed
//! - What the outcome was
//! - Lightweight flags describing suspicious paths
//!
//! The actual algorithms live under `core::algorithms`.

use crate::core::triangulation_data_structure::VertexKey;

/// Semantic classification of local topological modifications.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TopologicalOperation {
    /// A point strictly inside a face: 1 face becomes 3.
    SplitFace,
    /// A point on an interior edge: 2 faces become 4.
    SplitEdge,
    /// Replace the diagonal of a convex quadrilateral: 2 faces become 2.
    FlipEdge,
}

impl TopologicalOperation {
    /// Number of live faces the operation replaces.
    #[must_use]
    pub const fn faces_removed(self) -> usize {
        match self {
            Self::SplitFace => 1,
            Self::SplitEdge | Self::FlipEdge => 2,
        }
    }

    /// Number of live faces the operation creates.
    #[must_use]
    pub const fn faces_created(self) -> usize {
        match self {
            Self::SplitFace => 3,
            Self::SplitEdge => 4,
            Self::FlipEdge => 2,
        }
    }

    /// Net change in the number of live faces.
    #[must_use]
    pub const fn face_delta(self) -> usize {
        self.faces_created() - self.faces_removed()
    }
}

/// Adaptive error-checking on suspicious operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SuspicionFlags {
    /// A border point was not on any splittable edge and was resolved by
    /// splitting a face that strictly contains it.
    pub fallback_inside_split: bool,

    /// At least one illegal edge was left unflipped because a new face would
    /// not have been counter-clockwise.
    pub flip_skipped: bool,
}

impl SuspicionFlags {
    /// Returns `true` if any suspicious condition was observed.
    #[inline]
    #[must_use]
    pub const fn is_suspicious(&self) -> bool {
        self.fallback_inside_split || self.flip_skipped
    }
}

/// Statistics about one successful vertex insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionStatistics {
    /// The split that placed the vertex.
    pub operation: TopologicalOperation,
    /// Number of edge flips performed while legalizing.
    pub flips: usize,
    /// Number of edges popped from the legalization worklist.
    pub edges_checked: usize,
    /// Unusual paths taken.
    pub flags: SuspicionFlags,
}

impl InsertionStatistics {
    pub(crate) const fn new(operation: TopologicalOperation) -> Self {
        Self {
            operation,
            flips: 0,
            edges_checked: 0,
            flags: SuspicionFlags {
                fallback_inside_split: false,
                flip_skipped: false,
            },
        }
    }

    /// Total faces created by the split and the flips.
    #[must_use]
    pub const fn faces_created(&self) -> usize {
        self.operation.faces_created() + self.flips * TopologicalOperation::FlipEdge.faces_created()
    }
}

/// Reason an insertion was skipped without modifying the triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A vertex already exists within the minimum spacing of the point.
    PointExists {
        /// The existing vertex.
        existing: VertexKey,
    },
}

/// Outcome of a single-vertex insertion attempt.
///
/// This distinguishes between:
/// - A successful insertion (`Inserted`)
/// - An intentionally skipped insertion (`Skipped`) where the triangulation is left unchanged
///
/// Failures are returned as `Err(InsertionError)` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionOutcome {
    /// The vertex was inserted successfully.
    Inserted {
        /// Key of the inserted vertex.
        vertex_key: VertexKey,
        /// What the insertion did.
        statistics: InsertionStatistics,
    },
    /// The vertex was intentionally not inserted.
    Skipped {
        /// Why the vertex was skipped.
        reason: SkipReason,
    },
}

impl InsertionOutcome {
    /// Key of the inserted vertex, if any.
    #[must_use]
    pub const fn vertex_key(&self) -> Option<VertexKey> {
        match self {
            Self::Inserted { vertex_key, .. } => Some(*vertex_key),
            Self::Skipped { .. } => None,
        }
    }

    /// Returns `true` if the point was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}
