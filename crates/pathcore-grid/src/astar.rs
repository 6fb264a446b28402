//! Classic uniform-cost informed search over the grid graph
//!
//! Baseline correctness oracle for the other algorithms: JPS and HPA* are
//! validated against the costs this search produces.

use super::arena::{SearchArena, NO_PARENT};
use super::grid::{Connectivity, GridMap, Point};
use super::open_list::OpenList;
use super::path::{GridPathfinder, Path, SearchOptions};
use pathcore_common::{CARDINAL_COST, DIAGONAL_COST};

/// Admissible distance estimate matching the map's connectivity: octile for
/// 8-connected maps, Manhattan for 4-connected
pub(crate) fn heuristic(connectivity: Connectivity, a: Point, b: Point) -> f32 {
    let dx = (a.x - b.x).abs() as f32;
    let dy = (a.y - b.y).abs() as f32;
    match connectivity {
        Connectivity::Four => CARDINAL_COST * (dx + dy),
        Connectivity::Eight { .. } => {
            let min = dx.min(dy);
            let max = dx.max(dy);
            DIAGONAL_COST * min + CARDINAL_COST * (max - min)
        }
    }
}

/// Walks parent links back from the goal and reverses
pub(crate) fn reconstruct(arena: &SearchArena, map: &GridMap, goal: usize) -> Vec<Point> {
    let mut points = Vec::new();
    let mut idx = goal as u32;
    while idx != NO_PARENT {
        points.push(map.point(idx as usize));
        idx = arena.parent(idx as usize);
    }
    points.reverse();
    points
}

/// A* with a generation-stamped arena and an index-tracking open list.
///
/// Per-call state is reset in O(1); the pathfinder itself is cheap to keep
/// around and reuse across calls and maps.
#[derive(Debug, Default)]
pub struct AStarPathfinder {
    arena: SearchArena,
    open: OpenList,
}

impl AStarPathfinder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GridPathfinder for AStarPathfinder {
    fn find_path(
        &mut self,
        map: &GridMap,
        start: Point,
        end: Point,
        options: &SearchOptions,
    ) -> Path {
        if !map.is_walkable(start.x, start.y) || !map.is_walkable(end.x, end.y) {
            return Path::not_found(0);
        }
        if start == end {
            return Path::trivial(start);
        }

        self.arena.ensure(map.cell_count());
        self.arena.reset();
        self.open.ensure(map.cell_count());
        self.open.clear();

        let weight = options.weight();
        let start_idx = map.index(start);
        let goal_idx = map.index(end);

        self.arena.set_g(start_idx, 0.0);
        self.arena.set_open(start_idx, true);
        self.open
            .push(start_idx, weight * heuristic(map.connectivity(), start, end));

        let mut nodes_searched = 0usize;
        let mut buf = [(Point::new(0, 0), 0.0f32); 8];

        while let Some(current) = self.open.pop() {
            nodes_searched += 1;

            if current == goal_idx {
                return Path {
                    found: true,
                    points: reconstruct(&self.arena, map, goal_idx),
                    cost: self.arena.g(goal_idx),
                    nodes_searched,
                };
            }
            if nodes_searched >= options.max_nodes {
                log::debug!(
                    "a* expansion budget of {} exhausted, {:?} -> {:?}",
                    options.max_nodes,
                    start,
                    end
                );
                return Path::not_found(nodes_searched);
            }

            self.arena.set_open(current, false);
            self.arena.set_closed(current, true);
            let current_point = map.point(current);
            let current_g = self.arena.g(current);

            let n = map.neighbors(current_point, &mut buf);
            for &(neighbor, step_cost) in &buf[..n] {
                let nidx = map.index(neighbor);
                if self.arena.is_closed(nidx) {
                    continue;
                }
                let tentative = current_g + step_cost;
                if tentative < self.arena.g(nidx) {
                    self.arena.set_parent(nidx, current as u32);
                    self.arena.set_g(nidx, tentative);
                    let f = tentative + weight * heuristic(map.connectivity(), neighbor, end);
                    self.arena.set_f(nidx, f);
                    if self.arena.is_open(nidx) {
                        self.open.decrease(nidx, f);
                    } else {
                        self.arena.set_open(nidx, true);
                        self.open.push(nidx, f);
                    }
                }
            }
        }

        Path::not_found(nodes_searched)
    }

    fn clear(&mut self) {
        self.arena.reset();
        self.open.clear();
    }
}
