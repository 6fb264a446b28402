//! Balanced KD-tree over agent positions
//!
//! Rebuilt from scratch every tick; queries return the nearest agents
//! within a radius, capped at a neighbor budget. With the cap reached the
//! search radius shrinks to the current worst match, which prunes whole
//! subtrees on dense crowds.

use pathcore_common::{sq, Vec2};

use crate::agent::AgentState;

const MAX_LEAF_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
struct Node {
    begin: usize,
    end: usize,
    left: usize,
    right: usize,
    min: Vec2,
    max: Vec2,
}

/// Spatial index mapping a position to nearby agent indices
#[derive(Debug, Default)]
pub struct AgentKdTree {
    /// Agent indices, permuted so each node's range is contiguous
    indices: Vec<usize>,
    positions: Vec<Vec2>,
    nodes: Vec<Node>,
}

impl AgentKdTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the tree over the given agent snapshot
    pub fn build(&mut self, agents: &[AgentState]) {
        self.indices.clear();
        self.indices.extend(0..agents.len());
        self.positions.clear();
        self.positions
            .extend(agents.iter().map(|agent| agent.position));
        self.nodes.clear();
        if !agents.is_empty() {
            self.nodes.push(Node::default());
            self.build_recursive(0, agents.len(), 0);
        }
    }

    /// All agents within `radius` of `position`, nearest first, at most
    /// `max_neighbors` of them. The returned pairs are (agent index,
    /// squared distance). An agent exactly at `position` is included, so
    /// callers looking up "neighbors of agent i" filter `i` out themselves.
    pub fn query(&self, position: Vec2, radius: f32, max_neighbors: usize) -> Vec<(usize, f32)> {
        let mut out = Vec::new();
        if self.nodes.is_empty() || max_neighbors == 0 {
            return out;
        }
        let mut range_sq = sq(radius);
        self.query_recursive(position, &mut range_sq, max_neighbors, 0, &mut out);
        out
    }

    fn build_recursive(&mut self, begin: usize, end: usize, node: usize) {
        let mut min = self.positions[self.indices[begin]];
        let mut max = min;
        for &i in &self.indices[begin + 1..end] {
            min = min.min(self.positions[i]);
            max = max.max(self.positions[i]);
        }
        self.nodes[node] = Node {
            begin,
            end,
            left: 0,
            right: 0,
            min,
            max,
        };

        if end - begin <= MAX_LEAF_SIZE {
            return;
        }

        let vertical = max.x - min.x > max.y - min.y;
        let split = if vertical {
            0.5 * (max.x + min.x)
        } else {
            0.5 * (max.y + min.y)
        };

        let mut left = begin;
        let mut right = end;
        while left < right {
            while left < right && self.coord(self.indices[left], vertical) < split {
                left += 1;
            }
            while right > left && self.coord(self.indices[right - 1], vertical) >= split {
                right -= 1;
            }
            if left < right {
                self.indices.swap(left, right - 1);
                left += 1;
                right -= 1;
            }
        }
        // Guard against all points landing on one side of the split
        if left == begin {
            left += 1;
        }
        if left == end {
            left -= 1;
        }

        let left_node = self.nodes.len();
        let right_node = left_node + 1;
        self.nodes.push(Node::default());
        self.nodes.push(Node::default());
        self.nodes[node].left = left_node;
        self.nodes[node].right = right_node;
        self.build_recursive(begin, left, left_node);
        self.build_recursive(left, end, right_node);
    }

    #[inline]
    fn coord(&self, agent: usize, vertical: bool) -> f32 {
        if vertical {
            self.positions[agent].x
        } else {
            self.positions[agent].y
        }
    }

    fn query_recursive(
        &self,
        position: Vec2,
        range_sq: &mut f32,
        max_neighbors: usize,
        node: usize,
        out: &mut Vec<(usize, f32)>,
    ) {
        let n = self.nodes[node];
        if n.left == 0 && n.right == 0 {
            for &i in &self.indices[n.begin..n.end] {
                let dist_sq = position.distance_squared(self.positions[i]);
                if dist_sq < *range_sq {
                    insert_neighbor(out, max_neighbors, i, dist_sq);
                    if out.len() == max_neighbors {
                        *range_sq = out[out.len() - 1].1;
                    }
                }
            }
            return;
        }

        let dist_left = box_dist_sq(position, self.nodes[n.left].min, self.nodes[n.left].max);
        let dist_right = box_dist_sq(position, self.nodes[n.right].min, self.nodes[n.right].max);
        let (first, first_dist, second, second_dist) = if dist_left < dist_right {
            (n.left, dist_left, n.right, dist_right)
        } else {
            (n.right, dist_right, n.left, dist_left)
        };
        if first_dist < *range_sq {
            self.query_recursive(position, range_sq, max_neighbors, first, out);
        }
        if second_dist < *range_sq {
            self.query_recursive(position, range_sq, max_neighbors, second, out);
        }
    }
}

/// Sorted insertion capped at `max_neighbors`, dropping the farthest
fn insert_neighbor(out: &mut Vec<(usize, f32)>, max_neighbors: usize, agent: usize, dist_sq: f32) {
    if out.len() < max_neighbors {
        out.push((agent, dist_sq));
    } else if dist_sq < out[out.len() - 1].1 {
        out.pop();
        out.push((agent, dist_sq));
    } else {
        return;
    }
    let mut i = out.len() - 1;
    while i > 0 && out[i].1 < out[i - 1].1 {
        out.swap(i, i - 1);
        i -= 1;
    }
}

fn box_dist_sq(p: Vec2, min: Vec2, max: Vec2) -> f32 {
    let dx = (min.x - p.x).max(0.0).max(p.x - max.x);
    let dy = (min.y - p.y).max(0.0).max(p.y - max.y);
    sq(dx) + sq(dy)
}
