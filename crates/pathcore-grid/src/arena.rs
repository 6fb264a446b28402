//! Reusable per-search node bookkeeping
//!
//! Every A*-family search needs g/f costs, a parent link and open/closed
//! membership per touched cell. Allocating that per call would dominate the
//! hot loop, so the arena keeps flat per-cell vectors validated by a
//! generation stamp: `reset()` is a counter increment, and a cell's state is
//! only meaningful while its stamp matches the current generation.

/// Sentinel for "no parent" in the arena
pub const NO_PARENT: u32 = u32::MAX;

/// Generation-stamped search-node arena indexed by grid cell index.
///
/// Reads on cells not touched since the last [`SearchArena::reset`] return
/// neutral values (`g == +inf`, not open, not closed, no parent).
#[derive(Debug, Default)]
pub struct SearchArena {
    g: Vec<f32>,
    f: Vec<f32>,
    parent: Vec<u32>,
    open: Vec<bool>,
    closed: Vec<bool>,
    stamp: Vec<u32>,
    generation: u32,
}

impl SearchArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grows the arena to cover `len` cells. Existing stamps stay valid.
    pub fn ensure(&mut self, len: usize) {
        if self.g.len() < len {
            self.g.resize(len, 0.0);
            self.f.resize(len, 0.0);
            self.parent.resize(len, NO_PARENT);
            self.open.resize(len, false);
            self.closed.resize(len, false);
            self.stamp.resize(len, 0);
        }
    }

    /// O(1) reset: bump the generation so all cells read as untouched
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: old stamps could collide with the fresh generation
            self.stamp.fill(0);
            self.generation = 1;
        }
    }

    #[inline]
    fn live(&self, idx: usize) -> bool {
        self.stamp[idx] == self.generation
    }

    /// Stamps `idx` for this generation, clearing its state if stale
    #[inline]
    fn touch(&mut self, idx: usize) {
        if !self.live(idx) {
            self.stamp[idx] = self.generation;
            self.g[idx] = f32::INFINITY;
            self.f[idx] = f32::INFINITY;
            self.parent[idx] = NO_PARENT;
            self.open[idx] = false;
            self.closed[idx] = false;
        }
    }

    #[inline]
    pub fn g(&self, idx: usize) -> f32 {
        if self.live(idx) {
            self.g[idx]
        } else {
            f32::INFINITY
        }
    }

    #[inline]
    pub fn f(&self, idx: usize) -> f32 {
        if self.live(idx) {
            self.f[idx]
        } else {
            f32::INFINITY
        }
    }

    #[inline]
    pub fn parent(&self, idx: usize) -> u32 {
        if self.live(idx) {
            self.parent[idx]
        } else {
            NO_PARENT
        }
    }

    #[inline]
    pub fn is_open(&self, idx: usize) -> bool {
        self.live(idx) && self.open[idx]
    }

    #[inline]
    pub fn is_closed(&self, idx: usize) -> bool {
        self.live(idx) && self.closed[idx]
    }

    #[inline]
    pub fn set_g(&mut self, idx: usize, g: f32) {
        self.touch(idx);
        self.g[idx] = g;
    }

    #[inline]
    pub fn set_f(&mut self, idx: usize, f: f32) {
        self.touch(idx);
        self.f[idx] = f;
    }

    #[inline]
    pub fn set_parent(&mut self, idx: usize, parent: u32) {
        self.touch(idx);
        self.parent[idx] = parent;
    }

    #[inline]
    pub fn set_open(&mut self, idx: usize, open: bool) {
        self.touch(idx);
        self.open[idx] = open;
    }

    #[inline]
    pub fn set_closed(&mut self, idx: usize, closed: bool) {
        self.touch(idx);
        self.closed[idx] = closed;
    }
}
