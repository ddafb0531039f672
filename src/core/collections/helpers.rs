//! Constructors for the fast collections.

use super::{FastBuildHasher, FastHashMap, FastHashSet};

/// Create a [`FastHashMap`] with at least `capacity` slots.
#[inline]
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}

/// Create a [`FastHashSet`] with at least `capacity` slots.
#[inline]
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}
