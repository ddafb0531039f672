//! Spatial hash grid for near-duplicate detection.
//!
//! Vertices are bucketed by `floor(coord / cell_size)`. With `cell_size` equal
//! to the minimum vertex spacing, every vertex within that distance of a query
//! point lives in the 3×3 block of cells around the query's cell.
//!
//! ## Rollback semantics
//!
//! The index is a performance-only cache. The triangulation updates it only
//! after an insertion commits, so mesh rollbacks never need to touch it.

use super::{FastHashMap, SmallBuffer};
use crate::core::triangulation_data_structure::VertexKey;
use crate::geometry::point::Point;

const BUCKET_INLINE_CAPACITY: usize = 4;

/// Largest cell coordinate that still has unit resolution in `f64`.
const MAX_CELL_COORDINATE: f64 = 9_007_199_254_740_992.0; // 2^53

/// A uniform grid mapping cells to the keys stored in them.
#[derive(Clone, Debug)]
pub(crate) struct HashGridIndex<K = VertexKey> {
    cell_size: f64,
    usable: bool,
    cells: FastHashMap<(i64, i64), SmallBuffer<K, BUCKET_INLINE_CAPACITY>>,
}

impl<K: Copy> HashGridIndex<K> {
    /// Create a new grid index with the given cell size.
    ///
    /// A non-positive or non-finite size produces an unusable index; callers
    /// then fall back to linear scans.
    pub(crate) fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            usable: cell_size.is_finite() && cell_size > 0.0,
            cells: FastHashMap::default(),
        }
    }

    const fn disable(&mut self) {
        self.usable = false;
    }

    /// Insert a key at `point`.
    ///
    /// If the point cannot be keyed (non-finite, or too far out for the cell
    /// size), the whole index is disabled.
    pub(crate) fn insert(&mut self, key: K, point: Point) {
        if !self.usable {
            return;
        }
        let Some(cell) = self.cell_for(point) else {
            self.disable();
            return;
        };
        self.cells.entry(cell).or_default().push(key);
    }

    /// Visit all keys in the 3×3 neighborhood of `point`'s cell.
    ///
    /// The visitor returns `false` to stop early. Returns `true` if the index
    /// answered the query (even with zero candidates) and `false` if it was
    /// unusable.
    pub(crate) fn for_each_candidate<F>(&self, point: Point, mut f: F) -> bool
    where
        F: FnMut(K) -> bool,
    {
        if !self.usable {
            return false;
        }
        let Some((cx, cy)) = self.cell_for(point) else {
            return false;
        };

        for dx in -1..=1_i64 {
            for dy in -1..=1_i64 {
                let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &key in bucket {
                    if !f(key) {
                        return true;
                    }
                }
            }
        }
        true
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "cell coordinates are bounded by MAX_CELL_COORDINATE before the cast"
    )]
    fn cell_for(&self, point: Point) -> Option<(i64, i64)> {
        let to_cell = |coord: f64| {
            let cell = (coord / self.cell_size).floor();
            (cell.is_finite() && cell.abs() < MAX_CELL_COORDINATE).then_some(cell as i64)
        };
        Some((to_cell(point.x())?, to_cell(point.y())?))
    }
}
