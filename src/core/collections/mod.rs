//! Collection types tuned for the mesh and the history DAG.
//!
//! - [`FastHashMap`]/[`FastHashSet`]: `rustc-hash` backed maps for internal keys
//! - [`SmallBuffer`]: stack-first buffers for the tiny, fixed-shape sets that
//!   dominate triangle manipulation (3 edges, 3 corners, 2-4 replacement faces)
//! - [`StorageMap`]: the slotmap backend for vertices, half-edges and faces

mod aliases;
mod buffers;
mod helpers;
mod key_maps;
pub(crate) mod spatial_hash_grid;

pub use aliases::*;
pub use buffers::*;
pub use helpers::*;
pub use key_maps::*;
