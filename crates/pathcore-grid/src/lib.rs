//! Grid pathfinding for 2D tile worlds
//!
//! This crate answers "what route gets an agent from A to B avoiding static
//! obstacles" over a mutable 2D grid, repeatedly and cheaply. It provides a
//! family of search algorithms behind one trait plus the machinery around
//! them:
//!
//! - [`GridMap`]: walkability, per-cell cost multipliers and neighbor
//!   enumeration (4- or 8-connected, with optional corner-cutting)
//! - [`AStarPathfinder`]: classic uniform-cost informed search, the
//!   correctness baseline for everything else
//! - [`JpsPathfinder`]: Jump Point Search, same optimal costs with far fewer
//!   expansions on open uniform-cost terrain
//! - [`HierarchicalPathfinder`]: two-level cluster/entrance abstraction for
//!   large maps, with cached intra-cluster costs
//! - [`IncrementalPathfinder`]: the same search as a suspendable session
//!   state machine, stepped under a caller-supplied iteration budget
//! - [`PathCache`]: bounded LRU+TTL memoization of path results keyed by
//!   map version, with rectangular region invalidation
//!
//! All searches are synchronous and allocation-light: per-search node
//! bookkeeping lives in a generation-stamped arena that resets in O(1).
//!
//! The grid map is shared mutable state. Callers that edit it while searches
//! or cached results are live must pair the edit with
//! [`IncrementalPathfinder::notify_obstacle_change`] /
//! [`HierarchicalPathfinder::notify_region_change`] /
//! [`PathCache::invalidate_region`]; the engine does not snapshot the map.

mod arena;
mod astar;
mod cache;
mod grid;
mod hierarchical;
mod incremental;
mod jps;
mod open_list;
mod path;

pub use arena::SearchArena;
pub use astar::AStarPathfinder;
pub use cache::{CacheConfig, PathCache};
pub use grid::{Connectivity, GridMap, Point};
pub use hierarchical::{HierarchicalConfig, HierarchicalPathfinder, HierarchicalStats};
pub use incremental::{
    IncrementalPathfinder, Progress, SessionId, SessionState,
};
pub use jps::JpsPathfinder;
pub use open_list::OpenList;
pub use path::{GridPathfinder, Path, SearchOptions};

pub use pathcore_common::GridRect;

#[cfg(test)]
mod search_equivalence_tests;
