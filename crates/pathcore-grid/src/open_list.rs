//! Index-tracking binary min-heap for A*-family open lists
//!
//! Ordered by f-cost with insertion sequence as the tie-break, so equal-cost
//! pops are stable across runs. A generation-stamped position table keyed by
//! cell index supports O(log n) in-place key decrease, which every search in
//! this crate relies on instead of lazy-deletion duplicates.

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    f: f32,
    seq: u64,
    cell: u32,
}

impl HeapEntry {
    #[inline]
    fn before(&self, other: &HeapEntry) -> bool {
        self.f < other.f || (self.f == other.f && self.seq < other.seq)
    }
}

/// Binary min-heap over cell indices with position tracking
#[derive(Debug, Default)]
pub struct OpenList {
    heap: Vec<HeapEntry>,
    pos: Vec<u32>,
    stamp: Vec<u32>,
    generation: u32,
    seq: u64,
}

impl OpenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grows the position table to cover `len` cells
    pub fn ensure(&mut self, len: usize) {
        if self.pos.len() < len {
            self.pos.resize(len, 0);
            self.stamp.resize(len, 0);
        }
    }

    /// Empties the heap in O(1) and restarts the tie-break sequence
    pub fn clear(&mut self) {
        self.heap.clear();
        self.seq = 0;
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamp.fill(0);
            self.generation = 1;
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Whether `cell` is currently queued
    #[inline]
    pub fn contains(&self, cell: usize) -> bool {
        self.stamp[cell] == self.generation && (self.pos[cell] as usize) < self.heap.len()
            && self.heap[self.pos[cell] as usize].cell == cell as u32
    }

    /// Queues a cell. The caller guarantees it is not already queued.
    pub fn push(&mut self, cell: usize, f: f32) {
        debug_assert!(!self.contains(cell));
        let entry = HeapEntry {
            f,
            seq: self.seq,
            cell: cell as u32,
        };
        self.seq += 1;
        self.heap.push(entry);
        self.stamp[cell] = self.generation;
        self.bubble_up(self.heap.len() - 1);
    }

    /// Lowers the key of a queued cell in place. A fresh sequence number is
    /// assigned, so a re-keyed entry ties like a new insertion.
    pub fn decrease(&mut self, cell: usize, f: f32) {
        debug_assert!(self.contains(cell));
        let i = self.pos[cell] as usize;
        debug_assert!(f <= self.heap[i].f);
        self.heap[i].f = f;
        self.heap[i].seq = self.seq;
        self.seq += 1;
        self.bubble_up(i);
    }

    /// Pops the cell with the lowest (f, seq)
    pub fn pop(&mut self) -> Option<usize> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap[0].cell as usize;
        self.stamp[top] = self.generation.wrapping_sub(1);
        if let Some(last) = self.heap.pop() {
            if !self.heap.is_empty() {
                self.heap[0] = last;
                self.set_pos(0);
                self.trickle_down(0);
            }
        }
        Some(top)
    }

    #[inline]
    fn set_pos(&mut self, i: usize) {
        self.pos[self.heap[i].cell as usize] = i as u32;
    }

    fn bubble_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.heap[i].before(&self.heap[parent]) {
                break;
            }
            self.heap.swap(i, parent);
            self.set_pos(i);
            i = parent;
        }
        self.set_pos(i);
    }

    fn trickle_down(&mut self, mut i: usize) {
        loop {
            let child1 = 2 * i + 1;
            if child1 >= self.heap.len() {
                break;
            }
            let child2 = child1 + 1;
            let mut min_child = child1;
            if child2 < self.heap.len() && self.heap[child2].before(&self.heap[child1]) {
                min_child = child2;
            }
            if !self.heap[min_child].before(&self.heap[i]) {
                break;
            }
            self.heap.swap(i, min_child);
            self.set_pos(i);
            i = min_child;
        }
        self.set_pos(i);
    }
}
