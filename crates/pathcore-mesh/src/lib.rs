//! Polygon navigation mesh
//!
//! The polygon-graph dual of grid pathfinding: convex walkable polygons
//! connected through shared edges ("portals"), searched with the same
//! informed-search scheme using Euclidean portal-to-portal costs.
//!
//! Build a [`NavMesh`] by adding polygons, call [`NavMesh::build`] once to
//! auto-detect shared edges, then query [`NavMesh::find_path`]. Disconnected
//! regions report not-found rather than erroring.

mod nav_mesh;

pub use nav_mesh::{MeshPath, MeshSearchOptions, NavMesh, PolyId};

pub use pathcore_common::{Error, Result, Vec2};
