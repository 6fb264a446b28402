//! Mutable 2D grid map: walkability, cost multipliers, neighbor enumeration

use pathcore_common::{CARDINAL_COST, DIAGONAL_COST};

/// A cell coordinate on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (chessboard) distance to another point
    pub fn chebyshev(&self, other: Point) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Neighbor connectivity rule for the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Connectivity {
    /// Cardinal moves only
    Four,
    /// Cardinal and diagonal moves. With `cut_corners == false` a diagonal
    /// from (x,y) to (x+1,y+1) is rejected unless both (x+1,y) and (x,y+1)
    /// are walkable; with `cut_corners == true` only the destination matters.
    Eight { cut_corners: bool },
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    walkable: bool,
    cost: f32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            walkable: true,
            cost: 1.0,
        }
    }
}

/// The graph all grid searches walk: a dense 2D array of cells.
///
/// Cells are never destroyed, only mutated; every mutation bumps
/// [`GridMap::version`], which keys cached path results.
#[derive(Debug, Clone)]
pub struct GridMap {
    width: i32,
    height: i32,
    connectivity: Connectivity,
    cells: Vec<Cell>,
    version: u64,
}

impl GridMap {
    /// Creates a fully walkable map with unit cost, 8-connected without
    /// corner cutting
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            connectivity: Connectivity::Eight { cut_corners: false },
            cells: vec![Cell::default(); (width as usize) * (height as usize)],
            version: 0,
        }
    }

    /// Creates a map with an explicit connectivity rule
    pub fn with_connectivity(width: i32, height: i32, connectivity: Connectivity) -> Self {
        let mut map = Self::new(width, height);
        map.connectivity = connectivity;
        map
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Monotonic edit counter; bumped by every `set_walkable` / `set_cost`
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of cells, for sizing search arenas
    pub fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Flat index of a cell. Caller must ensure the cell is in bounds.
    #[inline]
    pub fn index(&self, p: Point) -> usize {
        (p.y as usize) * (self.width as usize) + (p.x as usize)
    }

    /// Inverse of [`GridMap::index`]
    #[inline]
    pub fn point(&self, index: usize) -> Point {
        Point::new(
            (index % (self.width as usize)) as i32,
            (index / (self.width as usize)) as i32,
        )
    }

    /// Out-of-bounds coordinates are never walkable
    #[inline]
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.cells[(y as usize) * (self.width as usize) + (x as usize)].walkable
    }

    /// Cost multiplier of a cell; 1.0 for out-of-bounds
    #[inline]
    pub fn cost(&self, x: i32, y: i32) -> f32 {
        if self.in_bounds(x, y) {
            self.cells[(y as usize) * (self.width as usize) + (x as usize)].cost
        } else {
            1.0
        }
    }

    /// Sets walkability. Out-of-bounds edits are ignored.
    pub fn set_walkable(&mut self, x: i32, y: i32, walkable: bool) {
        if self.in_bounds(x, y) {
            let idx = (y as usize) * (self.width as usize) + (x as usize);
            self.cells[idx].walkable = walkable;
            self.version += 1;
        }
    }

    /// Sets the movement-cost multiplier, clamped to be non-negative
    pub fn set_cost(&mut self, x: i32, y: i32, cost: f32) {
        if self.in_bounds(x, y) {
            let idx = (y as usize) * (self.width as usize) + (x as usize);
            self.cells[idx].cost = cost.max(0.0);
            self.version += 1;
        }
    }

    /// Cost of stepping between two adjacent cells: 1 for cardinal moves,
    /// √2 for diagonal, scaled by the destination cell's multiplier
    #[inline]
    pub fn movement_cost(&self, from: Point, to: Point) -> f32 {
        let base = if from.x != to.x && from.y != to.y {
            DIAGONAL_COST
        } else {
            CARDINAL_COST
        };
        base * self.cost(to.x, to.y)
    }

    /// Whether a diagonal step from `p` by (`dx`, `dy`) is permitted by the
    /// corner rule (destination walkability checked separately)
    #[inline]
    pub fn diagonal_clear(&self, p: Point, dx: i32, dy: i32) -> bool {
        match self.connectivity {
            Connectivity::Four => false,
            Connectivity::Eight { cut_corners: true } => true,
            Connectivity::Eight { cut_corners: false } => {
                self.is_walkable(p.x + dx, p.y) && self.is_walkable(p.x, p.y + dy)
            }
        }
    }

    /// Enumerates walkable neighbors of `p` into a fixed buffer, returning
    /// how many were written. Each entry carries the movement cost of the
    /// step. Out-of-bounds points have no neighbors.
    pub fn neighbors(&self, p: Point, out: &mut [(Point, f32); 8]) -> usize {
        if !self.in_bounds(p.x, p.y) {
            return 0;
        }

        let mut n = 0;

        const CARDINALS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        for (dx, dy) in CARDINALS {
            let q = Point::new(p.x + dx, p.y + dy);
            if self.is_walkable(q.x, q.y) {
                out[n] = (q, CARDINAL_COST * self.cost(q.x, q.y));
                n += 1;
            }
        }

        if let Connectivity::Eight { .. } = self.connectivity {
            const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
            for (dx, dy) in DIAGONALS {
                let q = Point::new(p.x + dx, p.y + dy);
                if self.is_walkable(q.x, q.y) && self.diagonal_clear(p, dx, dy) {
                    out[n] = (q, DIAGONAL_COST * self.cost(q.x, q.y));
                    n += 1;
                }
            }
        }

        n
    }
}
