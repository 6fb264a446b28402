//! Jump Point Search on uniform-cost 8-connected grids
//!
//! Same open/closed/f bookkeeping as A*, but successor generation replaces
//! "all walkable neighbors" with jump points: straight and diagonal scans
//! that skip symmetric intermediate cells and stop only at forced neighbors,
//! obstacles or the goal. Symmetry pruning is lossless, so path cost equals
//! A* on the same grid while far fewer nodes are expanded on open terrain.
//!
//! Two rule sets are carried, matching the map's corner convention: the
//! classic Harabor rules when diagonal moves may cut corners, and the
//! blocked-behind forced-neighbor variant when they may not. Cell cost
//! multipliers are ignored — JPS is only valid on uniform-cost grids.
//! Under [`Connectivity::Four`] the jump rules degenerate, so the search
//! transparently falls back to plain A* expansion.

use super::arena::NO_PARENT;
use super::astar::{heuristic, AStarPathfinder};
use super::grid::{Connectivity, GridMap, Point};
use super::open_list::OpenList;
use super::path::{GridPathfinder, Path, SearchOptions};
use super::SearchArena;
use pathcore_common::{CARDINAL_COST, DIAGONAL_COST};

/// Jump Point Search pathfinder. See the module docs for scope and the
/// fallback behavior on 4-connected maps.
#[derive(Debug, Default)]
pub struct JpsPathfinder {
    arena: SearchArena,
    open: OpenList,
    fallback: AStarPathfinder,
}

impl JpsPathfinder {
    pub fn new() -> Self {
        Self::default()
    }
}

#[inline]
fn passable(map: &GridMap, x: i32, y: i32) -> bool {
    map.is_walkable(x, y)
}

/// Scan along a cardinal direction until a jump point, the goal, or a wall.
/// Returns the jump point and the number of steps to it.
fn jump_cardinal(
    map: &GridMap,
    cut: bool,
    from: Point,
    dx: i32,
    dy: i32,
    goal: Point,
) -> Option<(Point, i32)> {
    let mut x = from.x + dx;
    let mut y = from.y + dy;
    let mut steps = 1;
    loop {
        if !passable(map, x, y) {
            return None;
        }
        let n = Point::new(x, y);
        if n == goal {
            return Some((n, steps));
        }

        // Perpendicular axis of the scan
        let (px, py) = (dy.abs(), dx.abs());
        let forced = if cut {
            (!passable(map, x + px, y + py) && passable(map, x + dx + px, y + dy + py))
                || (!passable(map, x - px, y - py) && passable(map, x + dx - px, y + dy - py))
        } else {
            // Strict corners: a side cell is forced when the cell diagonally
            // behind it is blocked, so the parent could not reach it first
            (passable(map, x + px, y + py) && !passable(map, x - dx + px, y - dy + py))
                || (passable(map, x - px, y - py) && !passable(map, x - dx - px, y - dy - py))
        };
        if forced {
            return Some((n, steps));
        }

        x += dx;
        y += dy;
        steps += 1;
    }
}

/// Scan along a diagonal, recursing on the cardinal components at each cell
fn jump_diagonal(
    map: &GridMap,
    cut: bool,
    from: Point,
    dx: i32,
    dy: i32,
    goal: Point,
) -> Option<(Point, i32)> {
    let mut c = from;
    let mut steps = 0;
    loop {
        if !cut && !(passable(map, c.x + dx, c.y) && passable(map, c.x, c.y + dy)) {
            return None;
        }
        let n = Point::new(c.x + dx, c.y + dy);
        steps += 1;
        if !passable(map, n.x, n.y) {
            return None;
        }
        if n == goal {
            return Some((n, steps));
        }

        if cut {
            // Forced neighbors beside the diagonal only exist when corner
            // cutting is allowed
            if (!passable(map, n.x - dx, n.y) && passable(map, n.x - dx, n.y + dy))
                || (!passable(map, n.x, n.y - dy) && passable(map, n.x + dx, n.y - dy))
            {
                return Some((n, steps));
            }
        }

        if jump_cardinal(map, cut, n, dx, 0, goal).is_some()
            || jump_cardinal(map, cut, n, 0, dy, goal).is_some()
        {
            return Some((n, steps));
        }

        c = n;
    }
}

fn jump(
    map: &GridMap,
    cut: bool,
    from: Point,
    dx: i32,
    dy: i32,
    goal: Point,
) -> Option<(Point, i32)> {
    if dx != 0 && dy != 0 {
        jump_diagonal(map, cut, from, dx, dy, goal)
    } else {
        jump_cardinal(map, cut, from, dx, dy, goal)
    }
}

/// Directions worth scanning from `p`, pruned by the direction of arrival
fn prune_dirs(map: &GridMap, cut: bool, p: Point, dx: i32, dy: i32, dirs: &mut Vec<(i32, i32)>) {
    dirs.clear();
    if dx != 0 && dy != 0 {
        // Diagonal arrival: the two cardinal components plus the diagonal
        if passable(map, p.x + dx, p.y) {
            dirs.push((dx, 0));
        }
        if passable(map, p.x, p.y + dy) {
            dirs.push((0, dy));
        }
        if passable(map, p.x + dx, p.y + dy)
            && (cut || (passable(map, p.x + dx, p.y) && passable(map, p.x, p.y + dy)))
        {
            dirs.push((dx, dy));
        }
        if cut {
            if !passable(map, p.x - dx, p.y) && passable(map, p.x - dx, p.y + dy) {
                dirs.push((-dx, dy));
            }
            if !passable(map, p.x, p.y - dy) && passable(map, p.x + dx, p.y - dy) {
                dirs.push((dx, -dy));
            }
        }
    } else {
        // Cardinal arrival
        let (px, py) = (dy.abs(), dx.abs());
        if passable(map, p.x + dx, p.y + dy) {
            dirs.push((dx, dy));
        }
        for side in [1, -1] {
            let (sx, sy) = (px * side, py * side);
            if cut {
                if !passable(map, p.x + sx, p.y + sy)
                    && passable(map, p.x + dx + sx, p.y + dy + sy)
                {
                    dirs.push((dx + sx, dy + sy));
                }
            } else if passable(map, p.x + sx, p.y + sy)
                && !passable(map, p.x - dx + sx, p.y - dy + sy)
            {
                dirs.push((sx, sy));
                dirs.push((dx + sx, dy + sy));
            }
        }
    }
}

const ALL_DIRS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Expands a jump-point chain into a fully stepped point sequence
fn interpolate(jump_points: &[Point]) -> Vec<Point> {
    if jump_points.len() <= 1 {
        return jump_points.to_vec();
    }
    let mut points = Vec::new();
    for w in jump_points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let dx = (b.x - a.x).signum();
        let dy = (b.y - a.y).signum();
        let mut c = a;
        // Jump segments are exact straight or diagonal lines
        while c != b {
            points.push(c);
            c = Point::new(c.x + dx, c.y + dy);
        }
    }
    if let Some(&last) = jump_points.last() {
        points.push(last);
    }
    points
}

impl GridPathfinder for JpsPathfinder {
    fn find_path(
        &mut self,
        map: &GridMap,
        start: Point,
        end: Point,
        options: &SearchOptions,
    ) -> Path {
        let cut = match map.connectivity() {
            Connectivity::Four => return self.fallback.find_path(map, start, end, options),
            Connectivity::Eight { cut_corners } => cut_corners,
        };

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
        let mut dirs: Vec<(i32, i32)> = Vec::with_capacity(8);

        while let Some(current) = self.open.pop() {
            nodes_searched += 1;

            if current == goal_idx {
                let mut chain = Vec::new();
                let mut idx = current as u32;
                while idx != NO_PARENT {
                    chain.push(map.point(idx as usize));
                    idx = self.arena.parent(idx as usize);
                }
                chain.reverse();
                return Path {
                    found: true,
                    points: interpolate(&chain),
                    cost: self.arena.g(goal_idx),
                    nodes_searched,
                };
            }
            if nodes_searched >= options.max_nodes {
                log::debug!(
                    "jps expansion budget of {} exhausted, {:?} -> {:?}",
                    options.max_nodes,
                    start,
                    end
                );
                return Path::not_found(nodes_searched);
            }

            self.arena.set_open(current, false);
            self.arena.set_closed(current, true);
            let p = map.point(current);
            let g = self.arena.g(current);

            let parent = self.arena.parent(current);
            if parent == NO_PARENT {
                dirs.clear();
                dirs.extend_from_slice(&ALL_DIRS);
                dirs.retain(|&(dx, dy)| {
                    passable(map, p.x + dx, p.y + dy)
                        && (dx == 0
                            || dy == 0
                            || cut
                            || (passable(map, p.x + dx, p.y) && passable(map, p.x, p.y + dy)))
                });
            } else {
                let pp = map.point(parent as usize);
                prune_dirs(map, cut, p, (p.x - pp.x).signum(), (p.y - pp.y).signum(), &mut dirs);
            }

            for i in 0..dirs.len() {
                let (dx, dy) = dirs[i];
                let Some((jp, steps)) = jump(map, cut, p, dx, dy, end) else {
                    continue;
                };
                let jidx = map.index(jp);
                if self.arena.is_closed(jidx) {
                    continue;
                }
                let unit = if dx != 0 && dy != 0 {
                    DIAGONAL_COST
                } else {
                    CARDINAL_COST
                };
                let tentative = g + steps as f32 * unit;
                if tentative < self.arena.g(jidx) {
                    self.arena.set_parent(jidx, current as u32);
                    self.arena.set_g(jidx, tentative);
                    let f = tentative + weight * heuristic(map.connectivity(), jp, end);
                    self.arena.set_f(jidx, f);
                    if self.arena.is_open(jidx) {
                        self.open.decrease(jidx, f);
                    } else {
                        self.arena.set_open(jidx, true);
                        self.open.push(jidx, f);
                    }
                }
            }
        }

        Path::not_found(nodes_searched)
    }

    fn clear(&mut self) {
        self.arena.reset();
        self.open.clear();
        self.fallback.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_astar(map: &GridMap, start: Point, end: Point) -> Path {
        AStarPathfinder::new().find_path(map, start, end, &SearchOptions::default())
    }

    #[test]
    fn test_open_grid_matches_astar() {
        let map = GridMap::new(10, 10);
        let mut jps = JpsPathfinder::new();
        let path = jps.find_path(
            &map,
            Point::new(0, 0),
            Point::new(9, 9),
            &SearchOptions::default(),
        );
        let baseline = uniform_astar(&map, Point::new(0, 0), Point::new(9, 9));
        assert!(path.found);
        assert!((path.cost - baseline.cost).abs() < 1e-3);
        assert_eq!(path.points.len(), 10);
        // Fewer expansions than A* is the whole point on open terrain
        assert!(path.nodes_searched < baseline.nodes_searched);
    }

    #[test]
    fn test_path_is_fully_stepped() {
        let mut map = GridMap::new(16, 16);
        for y in 3..13 {
            map.set_walkable(8, y, false);
        }
        let mut jps = JpsPathfinder::new();
        let path = jps.find_path(
            &map,
            Point::new(2, 8),
            Point::new(14, 8),
            &SearchOptions::default(),
        );
        assert!(path.found);
        for w in path.points.windows(2) {
            assert!((w[1].x - w[0].x).abs() <= 1);
            assert!((w[1].y - w[0].y).abs() <= 1);
            assert!(w[0] != w[1]);
        }
        for p in &path.points {
            assert!(map.is_walkable(p.x, p.y));
        }
    }

    #[test]
    fn test_strict_corners_no_diagonal_squeeze() {
        let mut map = GridMap::new(4, 4);
        map.set_walkable(1, 0, false);
        map.set_walkable(0, 1, false);
        let mut jps = JpsPathfinder::new();
        // (0,0) is sealed off under the no-corner-cutting rule
        let path = jps.find_path(
            &map,
            Point::new(0, 0),
            Point::new(3, 3),
            &SearchOptions::default(),
        );
        assert!(!path.found);

        // With corner cutting the diagonal squeeze is legal
        let mut cutting =
            GridMap::with_connectivity(4, 4, Connectivity::Eight { cut_corners: true });
        cutting.set_walkable(1, 0, false);
        cutting.set_walkable(0, 1, false);
        let path = jps.find_path(
            &cutting,
            Point::new(0, 0),
            Point::new(3, 3),
            &SearchOptions::default(),
        );
        assert!(path.found);
    }

    #[test]
    fn test_four_way_falls_back_to_astar() {
        let map = GridMap::with_connectivity(8, 8, Connectivity::Four);
        let mut jps = JpsPathfinder::new();
        let path = jps.find_path(
            &map,
            Point::new(0, 0),
            Point::new(7, 7),
            &SearchOptions::default(),
        );
        assert!(path.found);
        assert!((path.cost - 14.0).abs() < 1e-3);
    }

    #[test]
    fn test_unreachable() {
        let mut map = GridMap::new(8, 8);
        for y in 0..8 {
            map.set_walkable(4, y, false);
        }
        let mut jps = JpsPathfinder::new();
        let path = jps.find_path(
            &map,
            Point::new(1, 1),
            Point::new(6, 6),
            &SearchOptions::default(),
        );
        assert!(!path.found);
    }
}
