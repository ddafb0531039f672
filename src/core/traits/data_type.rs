//! Bound for user data attached to vertices.

use serde::{Serialize, de::DeserializeOwned};
use std::{fmt::Debug, hash::Hash};

/// Trait alias for data that can be stored on a vertex.
///
/// The triangulation copies this data around freely (vertices are rolled back
/// by value), so it must be `Copy`. In the placement game this is typically a
/// player or owner label.
///
/// # Usage
///
/// ```rust
/// use delaunay_dag::core::DataType;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// enum Player {
///     Red,
///     Blue,
/// }
///
/// fn accepts<T: DataType>(_: T) {}
/// accepts(Player::Red);
/// accepts(());
/// accepts(7_u32);
/// ```
///
/// `String` does not qualify (not `Copy`); store a numeric id and keep the
/// strings in a side table instead.
pub trait DataType:
    Copy + Eq + Hash + Ord + PartialEq + PartialOrd + Debug + Serialize + DeserializeOwned
{
}

// Blanket implementation for all types that satisfy the bounds
impl<T> DataType for T where
    T: Copy + Eq + Hash + Ord + PartialEq + PartialOrd + Debug + Serialize + DeserializeOwned
{
}
