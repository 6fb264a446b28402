//! Search results, options and the common pathfinder capability

use pathcore_common::GridRect;

use super::grid::{GridMap, Point};

/// The outcome of a grid search. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    /// Whether a route was found
    pub found: bool,
    /// Fully stepped point sequence, inclusive of start and end; empty when
    /// not found
    pub points: Vec<Point>,
    /// Total movement cost; 0 when not found
    pub cost: f32,
    /// Nodes expanded by the search that produced this result
    pub nodes_searched: usize,
}

impl Path {
    /// A not-found result carrying the work done before giving up
    pub fn not_found(nodes_searched: usize) -> Self {
        Self {
            found: false,
            points: Vec::new(),
            cost: 0.0,
            nodes_searched,
        }
    }

    /// The degenerate start == end result: one point, zero cost, nothing
    /// expanded
    pub fn trivial(p: Point) -> Self {
        Self {
            found: true,
            points: vec![p],
            cost: 0.0,
            nodes_searched: 0,
        }
    }

    /// Whether any point of the path lies inside `rect`. A not-found path
    /// never intersects anything.
    pub fn intersects(&self, rect: &GridRect) -> bool {
        self.found && self.points.iter().any(|p| rect.contains(p.x, p.y))
    }
}

/// Options accepted by every synchronous search call
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOptions {
    /// Expansion budget; exceeding it yields a not-found result rather than
    /// an error
    pub max_nodes: usize,
    /// Heuristic inflation for weighted A*. Values above 1 trade optimality
    /// for speed; clamped up to 1.
    pub heuristic_weight: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_nodes: 1_000_000,
            heuristic_weight: 1.0,
        }
    }
}

impl SearchOptions {
    pub(crate) fn weight(&self) -> f32 {
        self.heuristic_weight.max(1.0)
    }
}

/// Common capability of the A*, JPS and hierarchical pathfinders. One
/// implementation per algorithm, selected at construction.
pub trait GridPathfinder {
    /// Computes a path on the given map. Invalid endpoints produce an
    /// immediate not-found result, never an error.
    fn find_path(&mut self, map: &GridMap, start: Point, end: Point, options: &SearchOptions)
        -> Path;

    /// Discards any retained per-map state (abstractions, arenas)
    fn clear(&mut self);
}
