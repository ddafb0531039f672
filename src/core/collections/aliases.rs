//! Core type aliases for the collection backends.

use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;

#[cfg(not(feature = "dense-slotmap"))]
use slotmap::SlotMap;

#[cfg(feature = "dense-slotmap")]
use slotmap::DenseSlotMap;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Storage map for mesh elements.
///
/// `SlotMap` by default; `DenseSlotMap` with the `dense-slotmap` feature for
/// faster iteration over live elements.
#[cfg(not(feature = "dense-slotmap"))]
pub type StorageMap<K, V> = SlotMap<K, V>;

/// Storage map for mesh elements.
#[cfg(feature = "dense-slotmap")]
pub type StorageMap<K, V> = DenseSlotMap<K, V>;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// Hash map with the non-cryptographic Fx hasher. Keys are internal handles,
/// never attacker-controlled input.
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Build-hasher behind [`FastHashMap`].
pub type FastBuildHasher = FxBuildHasher;

/// Hash set counterpart of [`FastHashMap`].
pub type FastHashSet<T> = FxHashSet<T>;

/// Stack-allocated buffer that spills to the heap beyond `N` elements.
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;
