//! Key-based map and set aliases.

use super::{FastHashMap, FastHashSet};
use crate::core::algorithms::locate::NodeId;
use crate::core::triangulation_data_structure::FaceKey;

/// Set of face keys, e.g. the live faces of a triangulation.
pub type FaceKeySet = FastHashSet<FaceKey>;

/// Set of history node ids, the DFS visited-set of the hierarchy.
pub type NodeIdSet = FastHashSet<NodeId>;

/// Face → history node lookup.
pub type FaceToNodeMap = FastHashMap<FaceKey, NodeId>;
