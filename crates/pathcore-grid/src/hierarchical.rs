//! Two-level hierarchical pathfinding (HPA*)
//!
//! The map is partitioned into fixed-size clusters. Maximal contiguous
//! walkable runs along each shared cluster border become entrances,
//! represented by one or two abstract nodes; intra-cluster costs between a
//! cluster's abstract nodes are precomputed with a bounded local A* and
//! optionally cached with their detailed sub-paths. A query then inserts the
//! start and end as temporary abstract nodes, searches the small abstract
//! graph, and stitches the relevant cluster-local sub-paths back together.
//!
//! Region-change notifications mark affected clusters' cached edges stale
//! without discarding entrance geometry; the stale clusters are lazily
//! recomputed on the next query. A full [`HierarchicalPathfinder::preprocess`]
//! rebuilds everything, which is also how entrance geometry catches up with
//! large map edits.

use std::collections::HashMap;

use pathcore_common::GridRect;

use super::arena::SearchArena;
use super::astar::heuristic;
use super::grid::{GridMap, Point};
use super::open_list::OpenList;
use super::path::{GridPathfinder, Path, SearchOptions};

/// Construction parameters for the abstraction
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HierarchicalConfig {
    /// Cluster edge length in cells; clusters at the map edge are clamped
    pub cluster_size: i32,
    /// Entrances wider than this are split into equal chunks
    pub max_entrance_width: i32,
    /// Cache detailed intra-cluster sub-paths, not just their costs
    pub cache_internal_paths: bool,
}

impl Default for HierarchicalConfig {
    fn default() -> Self {
        Self {
            cluster_size: 10,
            max_entrance_width: 6,
            cache_internal_paths: true,
        }
    }
}

/// Diagnostic counters for tests and tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchicalStats {
    pub clusters: usize,
    pub entrances: usize,
    pub abstract_nodes: usize,
    pub cached_edges: usize,
}

#[derive(Debug, Clone)]
struct AbstractEdge {
    to: usize,
    cost: f32,
    /// Detailed sub-path, cached for intra-cluster edges when enabled
    path: Option<Vec<Point>>,
    /// Intra-cluster edges are rebuilt when their cluster goes stale;
    /// inter-cluster edges are part of the entrance geometry
    intra: bool,
}

#[derive(Debug, Clone)]
struct AbstractNode {
    pos: Point,
    cluster: usize,
    edges: Vec<AbstractEdge>,
}

#[derive(Debug, Clone)]
struct Cluster {
    bounds: GridRect,
    nodes: Vec<usize>,
    stale: bool,
}

/// Abstract-graph queue entry; min-heap by (f, insertion order)
#[derive(PartialEq)]
struct QueueEntry {
    f: f32,
    seq: u64,
    node: usize,
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed so BinaryHeap pops the smallest f first
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Two-level HPA* pathfinder. Build the abstraction once with
/// [`HierarchicalPathfinder::preprocess`]; queries lazily rebuild whatever
/// region changes have made stale.
#[derive(Debug, Default)]
pub struct HierarchicalPathfinder {
    config: HierarchicalConfig,
    clusters: Vec<Cluster>,
    clusters_x: i32,
    clusters_y: i32,
    nodes: Vec<AbstractNode>,
    node_at: HashMap<Point, usize>,
    entrances: usize,
    preprocessed: bool,
    arena: SearchArena,
    open: OpenList,
}

impl HierarchicalPathfinder {
    pub fn new(config: HierarchicalConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Discards and rebuilds the whole abstraction for the current map state
    pub fn preprocess(&mut self, map: &GridMap) {
        self.clusters.clear();
        self.nodes.clear();
        self.node_at.clear();
        self.entrances = 0;

        let cs = self.config.cluster_size.max(1);
        self.clusters_x = (map.width() + cs - 1) / cs;
        self.clusters_y = (map.height() + cs - 1) / cs;

        for cy in 0..self.clusters_y {
            for cx in 0..self.clusters_x {
                self.clusters.push(Cluster {
                    bounds: GridRect::new(
                        cx * cs,
                        cy * cs,
                        ((cx + 1) * cs - 1).min(map.width() - 1),
                        ((cy + 1) * cs - 1).min(map.height() - 1),
                    ),
                    nodes: Vec::new(),
                    stale: false,
                });
            }
        }

        for cy in 0..self.clusters_y {
            for cx in 0..self.clusters_x {
                if cx + 1 < self.clusters_x {
                    self.detect_entrances(map, cx, cy, true);
                }
                if cy + 1 < self.clusters_y {
                    self.detect_entrances(map, cx, cy, false);
                }
            }
        }

        for c in 0..self.clusters.len() {
            self.build_intra_edges(map, c);
        }

        self.preprocessed = true;
        log::debug!(
            "hpa preprocess: {} clusters, {} entrances, {} abstract nodes",
            self.clusters.len(),
            self.entrances,
            self.nodes.len()
        );
    }

    /// Marks clusters overlapping `rect` stale; their intra-cluster edges
    /// are recomputed on the next query. Entrance geometry is kept.
    pub fn notify_region_change(&mut self, rect: GridRect) {
        for cluster in &mut self.clusters {
            if cluster.bounds.intersects(&rect) {
                cluster.stale = true;
            }
        }
    }

    pub fn stats(&self) -> HierarchicalStats {
        HierarchicalStats {
            clusters: self.clusters.len(),
            entrances: self.entrances,
            abstract_nodes: self.nodes.len(),
            cached_edges: self
                .nodes
                .iter()
                .flat_map(|n| n.edges.iter())
                .filter(|e| e.intra && e.path.is_some())
                .count(),
        }
    }

    fn cluster_index(&self, p: Point) -> usize {
        let cs = self.config.cluster_size.max(1);
        ((p.y / cs) * self.clusters_x + (p.x / cs)) as usize
    }

    /// Scans one shared border for maximal walkable runs and creates the
    /// entrance transitions
    fn detect_entrances(&mut self, map: &GridMap, cx: i32, cy: i32, vertical_border: bool) {
        let bounds = self.clusters[(cy * self.clusters_x + cx) as usize].bounds;

        // Cell pairs straddling the border, in border order
        let pairs: Vec<(Point, Point)> = if vertical_border {
            let x = bounds.max_x;
            (bounds.min_y..=bounds.max_y)
                .map(|y| (Point::new(x, y), Point::new(x + 1, y)))
                .collect()
        } else {
            let y = bounds.max_y;
            (bounds.min_x..=bounds.max_x)
                .map(|x| (Point::new(x, y), Point::new(x, y + 1)))
                .collect()
        };

        let mut run_start: Option<usize> = None;
        for i in 0..=pairs.len() {
            let open = i < pairs.len()
                && map.is_walkable(pairs[i].0.x, pairs[i].0.y)
                && map.is_walkable(pairs[i].1.x, pairs[i].1.y);
            match (open, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(s)) => {
                    self.add_entrance(map, &pairs[s..i]);
                    run_start = None;
                }
                _ => {}
            }
        }
    }

    /// Creates one or more transition pairs for a maximal walkable run
    fn add_entrance(&mut self, map: &GridMap, run: &[(Point, Point)]) {
        self.entrances += 1;
        let len = run.len() as i32;
        let mew = self.config.max_entrance_width.max(1);

        let mut picks: Vec<usize> = Vec::new();
        if len > mew {
            // Wide entrance: equal chunks, one transition per chunk midpoint
            let chunks = (len + mew - 1) / mew;
            let chunk_len = len as f32 / chunks as f32;
            for c in 0..chunks {
                picks.push(((c as f32 + 0.5) * chunk_len) as usize);
            }
        } else if len <= 3 {
            picks.push(run.len() / 2);
        } else {
            picks.push(0);
            picks.push(run.len() - 1);
        }

        for i in picks {
            let (a, b) = run[i];
            let a_idx = self.intern_node(a);
            let b_idx = self.intern_node(b);
            let ab = map.movement_cost(a, b);
            let ba = map.movement_cost(b, a);
            self.nodes[a_idx].edges.push(AbstractEdge {
                to: b_idx,
                cost: ab,
                path: None,
                intra: false,
            });
            self.nodes[b_idx].edges.push(AbstractEdge {
                to: a_idx,
                cost: ba,
                path: None,
                intra: false,
            });
        }
    }

    fn intern_node(&mut self, pos: Point) -> usize {
        if let Some(&idx) = self.node_at.get(&pos) {
            return idx;
        }
        let cluster = self.cluster_index(pos);
        let idx = self.nodes.len();
        self.nodes.push(AbstractNode {
            pos,
            cluster,
            edges: Vec::new(),
        });
        self.node_at.insert(pos, idx);
        self.clusters[cluster].nodes.push(idx);
        idx
    }

    /// Recomputes all intra-cluster edges of one cluster with bounded local
    /// searches
    fn build_intra_edges(&mut self, map: &GridMap, cluster: usize) {
        let node_ids = self.clusters[cluster].nodes.clone();
        for &n in &node_ids {
            self.nodes[n].edges.retain(|e| !e.intra);
        }
        let bounds = self.clusters[cluster].bounds;
        let cache = self.config.cache_internal_paths;

        for i in 0..node_ids.len() {
            for j in (i + 1)..node_ids.len() {
                let (a, b) = (node_ids[i], node_ids[j]);
                let (pa, pb) = (self.nodes[a].pos, self.nodes[b].pos);
                let (_, found) = local_search(
                    map,
                    &mut self.arena,
                    &mut self.open,
                    bounds,
                    pa,
                    pb,
                    1.0,
                    usize::MAX,
                );
                if let Some((cost, path)) = found {
                    let mut reversed = path.clone();
                    reversed.reverse();
                    // Reverse cost can differ when cell multipliers differ,
                    // since each step is priced by its destination
                    let rev_cost = path_cost(map, &reversed);
                    self.nodes[a].edges.push(AbstractEdge {
                        to: b,
                        cost,
                        path: cache.then_some(path),
                        intra: true,
                    });
                    self.nodes[b].edges.push(AbstractEdge {
                        to: a,
                        cost: rev_cost,
                        path: cache.then_some(reversed),
                        intra: true,
                    });
                }
            }
        }
        self.clusters[cluster].stale = false;
    }

    fn refresh_stale(&mut self, map: &GridMap) {
        let stale: Vec<usize> = (0..self.clusters.len())
            .filter(|&c| self.clusters[c].stale)
            .collect();
        if !stale.is_empty() {
            log::debug!("hpa refreshing {} stale clusters", stale.len());
        }
        for c in stale {
            self.build_intra_edges(map, c);
        }
    }
}

/// Total cost of a stepped path under the map's cost model
fn path_cost(map: &GridMap, points: &[Point]) -> f32 {
    points
        .windows(2)
        .map(|w| map.movement_cost(w[0], w[1]))
        .sum()
}

/// A* restricted to a rectangular region of the map. Returns the number of
/// expansions plus cost and the full stepped path on success; exceeding
/// `max_nodes` counts as failure.
fn local_search(
    map: &GridMap,
    arena: &mut SearchArena,
    open: &mut OpenList,
    bounds: GridRect,
    start: Point,
    end: Point,
    weight: f32,
    max_nodes: usize,
) -> (usize, Option<(f32, Vec<Point>)>) {
    if !map.is_walkable(start.x, start.y) || !map.is_walkable(end.x, end.y) {
        return (0, None);
    }
    if start == end {
        return (0, Some((0.0, vec![start])));
    }

    arena.ensure(map.cell_count());
    arena.reset();
    open.ensure(map.cell_count());
    open.clear();

    let start_idx = map.index(start);
    let goal_idx = map.index(end);
    arena.set_g(start_idx, 0.0);
    arena.set_open(start_idx, true);
    open.push(start_idx, weight * heuristic(map.connectivity(), start, end));

    let mut expanded = 0usize;
    let mut buf = [(Point::new(0, 0), 0.0f32); 8];

    while let Some(current) = open.pop() {
        expanded += 1;
        if current == goal_idx {
            let points = super::astar::reconstruct(arena, map, goal_idx);
            return (expanded, Some((arena.g(goal_idx), points)));
        }
        if expanded >= max_nodes {
            return (expanded, None);
        }
        arena.set_open(current, false);
        arena.set_closed(current, true);
        let p = map.point(current);
        let g = arena.g(current);

        let n = map.neighbors(p, &mut buf);
        for &(q, step) in &buf[..n] {
            if !bounds.contains(q.x, q.y) {
                continue;
            }
            let qidx = map.index(q);
            if arena.is_closed(qidx) {
                continue;
            }
            let tentative = g + step;
            if tentative < arena.g(qidx) {
                arena.set_parent(qidx, current as u32);
                arena.set_g(qidx, tentative);
                let f = tentative + weight * heuristic(map.connectivity(), q, end);
                if arena.is_open(qidx) {
                    open.decrease(qidx, f);
                } else {
                    arena.set_open(qidx, true);
                    open.push(qidx, f);
                }
            }
        }
    }
    (expanded, None)
}

impl GridPathfinder for HierarchicalPathfinder {
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

        if !self.preprocessed {
            self.preprocess(map);
        } else {
            self.refresh_stale(map);
        }

        // max_nodes bounds total expansions across the per-query local
        // searches and the abstract search combined
        let weight = options.weight();
        let max_nodes = options.max_nodes;
        let mut nodes_searched = 0usize;
        let start_cluster = self.cluster_index(start);
        let end_cluster = self.cluster_index(end);

        // Same cluster: the local search usually settles it outright
        if start_cluster == end_cluster {
            let (expanded, found) = local_search(
                map,
                &mut self.arena,
                &mut self.open,
                self.clusters[start_cluster].bounds,
                start,
                end,
                weight,
                max_nodes,
            );
            nodes_searched += expanded;
            if let Some((cost, points)) = found {
                return Path {
                    found: true,
                    points,
                    cost,
                    nodes_searched,
                };
            }
            if nodes_searched >= max_nodes {
                return Path::not_found(nodes_searched);
            }
        }

        // Temporary insertion: connect start and end to every abstract node
        // in their own clusters
        let mut start_links: Vec<(usize, f32, Vec<Point>)> = Vec::new();
        for &n in &self.clusters[start_cluster].nodes.clone() {
            if nodes_searched >= max_nodes {
                return Path::not_found(nodes_searched);
            }
            let pos = self.nodes[n].pos;
            let (expanded, found) = local_search(
                map,
                &mut self.arena,
                &mut self.open,
                self.clusters[start_cluster].bounds,
                start,
                pos,
                weight,
                max_nodes - nodes_searched,
            );
            nodes_searched += expanded;
            if let Some((cost, path)) = found {
                start_links.push((n, cost, path));
            }
        }

        let mut end_links: HashMap<usize, (f32, Vec<Point>)> = HashMap::new();
        for &n in &self.clusters[end_cluster].nodes.clone() {
            if nodes_searched >= max_nodes {
                return Path::not_found(nodes_searched);
            }
            let pos = self.nodes[n].pos;
            let (expanded, found) = local_search(
                map,
                &mut self.arena,
                &mut self.open,
                self.clusters[end_cluster].bounds,
                pos,
                end,
                weight,
                max_nodes - nodes_searched,
            );
            nodes_searched += expanded;
            if let Some((cost, path)) = found {
                end_links.insert(n, (cost, path));
            }
        }

        if start_links.is_empty() || end_links.is_empty() {
            return Path::not_found(nodes_searched);
        }

        // Search the abstract graph with octile heuristic to the goal
        const UNVISITED: usize = usize::MAX;
        let n_nodes = self.nodes.len();
        let virtual_end = n_nodes;
        let mut dist = vec![f32::INFINITY; n_nodes + 1];
        let mut parent = vec![UNVISITED; n_nodes + 1];
        let mut closed = vec![false; n_nodes + 1];
        let mut heap = std::collections::BinaryHeap::new();
        let mut seq = 0u64;

        for &(n, cost, _) in &start_links {
            if cost < dist[n] {
                dist[n] = cost;
                heap.push(QueueEntry {
                    f: cost + weight * heuristic(map.connectivity(), self.nodes[n].pos, end),
                    seq,
                    node: n,
                });
                seq += 1;
            }
        }

        let mut reached = false;
        while let Some(QueueEntry { node, .. }) = heap.pop() {
            if closed[node] {
                continue;
            }
            closed[node] = true;
            nodes_searched += 1;
            if node == virtual_end {
                reached = true;
                break;
            }
            if nodes_searched >= max_nodes {
                log::debug!("hpa query budget of {} exhausted", max_nodes);
                return Path::not_found(nodes_searched);
            }

            let relax = |to: usize, cost: f32, h: f32, heap: &mut std::collections::BinaryHeap<QueueEntry>, seq: &mut u64, dist: &mut Vec<f32>, parent: &mut Vec<usize>| {
                let tentative = dist[node] + cost;
                if tentative < dist[to] {
                    dist[to] = tentative;
                    parent[to] = node;
                    heap.push(QueueEntry {
                        f: tentative + h,
                        seq: *seq,
                        node: to,
                    });
                    *seq += 1;
                }
            };

            for i in 0..self.nodes[node].edges.len() {
                let (to, cost) = {
                    let e = &self.nodes[node].edges[i];
                    (e.to, e.cost)
                };
                if closed[to] {
                    continue;
                }
                let h = weight * heuristic(map.connectivity(), self.nodes[to].pos, end);
                relax(to, cost, h, &mut heap, &mut seq, &mut dist, &mut parent);
            }
            if let Some((cost, _)) = end_links.get(&node) {
                relax(virtual_end, *cost, 0.0, &mut heap, &mut seq, &mut dist, &mut parent);
            }
        }

        if !reached {
            return Path::not_found(nodes_searched);
        }

        // Abstract chain, virtual end excluded
        let mut chain = Vec::new();
        let mut n = parent[virtual_end];
        while n != UNVISITED {
            chain.push(n);
            n = parent[n];
        }
        chain.reverse();

        // Stitch: start link, cached or recomputed cluster sub-paths,
        // entrance steps, end link
        let mut points: Vec<Point> = Vec::new();
        let Some(&first) = chain.first() else {
            return Path::not_found(nodes_searched);
        };
        let Some((_, _, start_path)) = start_links.iter().find(|(n, _, _)| *n == first) else {
            return Path::not_found(nodes_searched);
        };
        append_segment(&mut points, start_path);

        for w in chain.windows(2) {
            let (u, v) = (w[0], w[1]);
            let Some(edge) = self.nodes[u]
                .edges
                .iter()
                .filter(|e| e.to == v)
                .min_by(|a, b| a.cost.partial_cmp(&b.cost).unwrap_or(std::cmp::Ordering::Equal))
                .cloned()
            else {
                return Path::not_found(nodes_searched);
            };
            if let Some(path) = edge.path {
                append_segment(&mut points, &path);
            } else if edge.intra {
                // Cost-only cache: recompute the detailed sub-path on demand
                let bounds = self.clusters[self.nodes[u].cluster].bounds;
                let (expanded, found) = local_search(
                    map,
                    &mut self.arena,
                    &mut self.open,
                    bounds,
                    self.nodes[u].pos,
                    self.nodes[v].pos,
                    weight,
                    max_nodes.saturating_sub(nodes_searched).max(1),
                );
                nodes_searched += expanded;
                match found {
                    Some((_, path)) => append_segment(&mut points, &path),
                    None => return Path::not_found(nodes_searched),
                }
            } else {
                // Entrance transition: adjacent cells
                append_segment(&mut points, &[self.nodes[u].pos, self.nodes[v].pos]);
            }
        }

        let last = *chain.last().unwrap_or(&first);
        let Some((_, end_path)) = end_links.get(&last) else {
            return Path::not_found(nodes_searched);
        };
        append_segment(&mut points, end_path);

        Path {
            found: true,
            cost: dist[virtual_end],
            points,
            nodes_searched,
        }
    }

    fn clear(&mut self) {
        self.clusters.clear();
        self.nodes.clear();
        self.node_at.clear();
        self.entrances = 0;
        self.preprocessed = false;
        self.arena.reset();
        self.open.clear();
    }
}

/// Appends a sub-path, dropping a duplicated joint point
fn append_segment(points: &mut Vec<Point>, segment: &[Point]) {
    for &p in segment {
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
}
