//! Polygon graph construction and portal-based search

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use pathcore_common::{dist_sq_point_segment, Error, Result, Vec2, EPSILON};

/// Handle to a polygon added to a [`NavMesh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolyId(pub u32);

/// Options for [`NavMesh::find_path`]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshSearchOptions {
    /// Maximum polygon expansions before the search gives up
    pub max_nodes: usize,
    /// Portals narrower than twice this radius are impassable
    pub agent_radius: f32,
}

impl Default for MeshSearchOptions {
    fn default() -> Self {
        Self {
            max_nodes: 100_000,
            agent_radius: 0.0,
        }
    }
}

/// Search result over the polygon graph
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshPath {
    pub found: bool,
    /// Start, portal midpoints in traversal order, end
    pub points: Vec<Vec2>,
    pub cost: f32,
    pub nodes_searched: usize,
}

impl MeshPath {
    fn not_found(nodes_searched: usize) -> Self {
        Self {
            found: false,
            points: Vec::new(),
            cost: 0.0,
            nodes_searched,
        }
    }
}

/// A shared edge between two polygons
#[derive(Debug, Clone)]
struct Portal {
    to: usize,
    a: Vec2,
    b: Vec2,
}

impl Portal {
    fn midpoint(&self) -> Vec2 {
        (self.a + self.b) * 0.5
    }

    fn width(&self) -> f32 {
        self.a.distance(self.b)
    }
}

#[derive(Debug, Clone)]
struct Polygon {
    verts: Vec<Vec2>,
    portals: Vec<Portal>,
}

impl Polygon {
    /// Ray-casting containment test, boundary-inclusive
    fn contains(&self, p: Vec2) -> bool {
        let n = self.verts.len();
        for i in 0..n {
            let a = self.verts[i];
            let b = self.verts[(i + 1) % n];
            if dist_sq_point_segment(p, a, b) <= EPSILON * EPSILON {
                return true;
            }
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (vi, vj) = (self.verts[i], self.verts[j]);
            if (vi.y > p.y) != (vj.y > p.y)
                && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Scored polygon on the search frontier; ordered as a min-heap on f with
/// insertion order as the tie-break
#[derive(Debug)]
struct FrontierEntry {
    f: f32,
    seq: u64,
    poly: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}

impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Walkable polygon soup with auto-detected adjacency
#[derive(Debug, Default)]
pub struct NavMesh {
    polygons: Vec<Polygon>,
    built: bool,
}

impl NavMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Adds a walkable polygon. Vertices may wind either way; they are
    /// normalized to counter-clockwise. Fewer than three vertices or a
    /// degenerate (zero-area) outline is rejected.
    pub fn add_polygon(&mut self, verts: &[Vec2]) -> Result<PolyId> {
        if verts.len() < 3 {
            return Err(Error::InvalidInput(format!(
                "polygon needs at least 3 vertices, got {}",
                verts.len()
            )));
        }
        let mut verts = verts.to_vec();
        let area = signed_area(&verts);
        if area.abs() <= EPSILON {
            return Err(Error::DegenerateGeometry(
                "polygon has zero area".to_string(),
            ));
        }
        if area < 0.0 {
            verts.reverse();
        }
        let id = self.polygons.len() as u32;
        self.polygons.push(Polygon {
            verts,
            portals: Vec::new(),
        });
        self.built = false;
        Ok(PolyId(id))
    }

    /// Detects shared edges between all polygon pairs and records them as
    /// bidirectional portals. Edges match when both endpoint pairs coincide
    /// within tolerance, in either orientation. Must be called after the
    /// last `add_polygon` and before `find_path`.
    pub fn build(&mut self) {
        for poly in &mut self.polygons {
            poly.portals.clear();
        }
        let n = self.polygons.len();
        let mut portal_count = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                if let Some((a, b)) = self.shared_edge(i, j) {
                    self.polygons[i].portals.push(Portal { to: j, a, b });
                    self.polygons[j].portals.push(Portal { to: i, a, b });
                    portal_count += 1;
                }
            }
        }
        self.built = true;
        log::debug!(
            "nav mesh built: {} polygons, {} portals",
            n,
            portal_count
        );
    }

    /// First polygon containing the point, boundary-inclusive
    pub fn locate(&self, p: Vec2) -> Option<PolyId> {
        self.polygons
            .iter()
            .position(|poly| poly.contains(p))
            .map(|i| PolyId(i as u32))
    }

    pub fn contains(&self, poly: PolyId, p: Vec2) -> bool {
        self.polygons
            .get(poly.0 as usize)
            .is_some_and(|polygon| polygon.contains(p))
    }

    /// Searches the polygon graph from `start` to `end`. The route goes
    /// start, then the midpoint of each portal crossed, then end. Endpoints
    /// outside every polygon or in disconnected regions yield not-found.
    pub fn find_path(&self, start: Vec2, end: Vec2, options: &MeshSearchOptions) -> MeshPath {
        if !self.built && !self.polygons.is_empty() {
            log::debug!("nav mesh queried before build; adjacency may be missing");
        }
        let (Some(start_poly), Some(end_poly)) = (self.locate(start), self.locate(end)) else {
            return MeshPath::not_found(0);
        };
        let (start_poly, end_poly) = (start_poly.0 as usize, end_poly.0 as usize);

        if start_poly == end_poly {
            return MeshPath {
                found: true,
                points: vec![start, end],
                cost: start.distance(end),
                nodes_searched: 0,
            };
        }

        let n = self.polygons.len();
        let mut g = vec![f32::INFINITY; n];
        // Where the search entered each polygon; costs chain through these
        let mut arrival = vec![Vec2::ZERO; n];
        let mut came_from = vec![usize::MAX; n];
        let mut closed = vec![false; n];
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;

        g[start_poly] = 0.0;
        arrival[start_poly] = start;
        heap.push(FrontierEntry {
            f: start.distance(end),
            seq,
            poly: start_poly,
        });

        let min_width = options.agent_radius * 2.0;
        let mut nodes_searched = 0usize;

        while let Some(entry) = heap.pop() {
            let u = entry.poly;
            if closed[u] {
                continue;
            }
            closed[u] = true;
            nodes_searched += 1;

            if u == end_poly {
                let mut points = Vec::new();
                let mut poly = u;
                while poly != start_poly {
                    points.push(arrival[poly]);
                    poly = came_from[poly];
                }
                points.push(start);
                points.reverse();
                points.push(end);
                return MeshPath {
                    found: true,
                    points,
                    cost: g[u] + arrival[u].distance(end),
                    nodes_searched,
                };
            }
            if nodes_searched >= options.max_nodes {
                log::debug!(
                    "nav mesh expansion budget of {} exhausted",
                    options.max_nodes
                );
                return MeshPath::not_found(nodes_searched);
            }

            for portal in &self.polygons[u].portals {
                let v = portal.to;
                if closed[v] {
                    continue;
                }
                if min_width > 0.0 && portal.width() < min_width {
                    continue;
                }
                let mid = portal.midpoint();
                let tentative = g[u] + arrival[u].distance(mid);
                if tentative < g[v] {
                    g[v] = tentative;
                    arrival[v] = mid;
                    came_from[v] = u;
                    seq += 1;
                    heap.push(FrontierEntry {
                        f: tentative + mid.distance(end),
                        seq,
                        poly: v,
                    });
                }
            }
        }

        MeshPath::not_found(nodes_searched)
    }

    fn shared_edge(&self, i: usize, j: usize) -> Option<(Vec2, Vec2)> {
        let (pi, pj) = (&self.polygons[i], &self.polygons[j]);
        let ni = pi.verts.len();
        let nj = pj.verts.len();
        for a in 0..ni {
            let (a0, a1) = (pi.verts[a], pi.verts[(a + 1) % ni]);
            for b in 0..nj {
                let (b0, b1) = (pj.verts[b], pj.verts[(b + 1) % nj]);
                let forward = a0.distance_squared(b0) <= EPSILON * EPSILON
                    && a1.distance_squared(b1) <= EPSILON * EPSILON;
                let reversed = a0.distance_squared(b1) <= EPSILON * EPSILON
                    && a1.distance_squared(b0) <= EPSILON * EPSILON;
                if forward || reversed {
                    return Some((a0, a1));
                }
            }
        }
        None
    }
}

fn signed_area(verts: &[Vec2]) -> f32 {
    let n = verts.len();
    let mut area = 0.0;
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        area += a.x * b.y - b.x * a.y;
    }
    area * 0.5
}
