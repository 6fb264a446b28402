//! Static polygonal obstacles as linked vertex rings

use pathcore_common::{det, Error, Result, Vec2, EPSILON};

/// One vertex of an obstacle ring, with precomputed edge data
#[derive(Debug, Clone)]
pub struct ObstacleVertex {
    pub point: Vec2,
    /// Unit direction toward the next vertex in the ring
    pub unit_dir: Vec2,
    /// True when the ring turns left here (or for open segments)
    pub convex: bool,
    pub next: usize,
    pub prev: usize,
}

/// All static obstacles known to the avoidance solver, stored as one flat
/// vertex pool. Rings wind counter-clockwise, which keeps agents outside
/// the polygon; a two-vertex obstacle is an open wall blocking both sides.
#[derive(Debug, Default)]
pub struct ObstacleSet {
    vertices: Vec<ObstacleVertex>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[ObstacleVertex] {
        &self.vertices
    }

    pub fn vertex(&self, i: usize) -> &ObstacleVertex {
        &self.vertices[i]
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Adds a closed polygonal obstacle (or an open wall for exactly two
    /// vertices). Vertex order may be either winding; it is normalized to
    /// counter-clockwise before the ring is linked.
    pub fn add(&mut self, vertices: &[Vec2]) -> Result<()> {
        if vertices.len() < 2 {
            return Err(Error::InvalidInput(format!(
                "obstacle needs at least 2 vertices, got {}",
                vertices.len()
            )));
        }
        let mut ring = vertices.to_vec();
        if ring.len() >= 3 && signed_area(&ring) < 0.0 {
            ring.reverse();
        }
        for window in ring.windows(2) {
            if window[0].distance_squared(window[1]) <= EPSILON * EPSILON {
                return Err(Error::DegenerateGeometry(
                    "obstacle has coincident consecutive vertices".to_string(),
                ));
            }
        }

        let base = self.vertices.len();
        let n = ring.len();
        for (i, &point) in ring.iter().enumerate() {
            let next = ring[(i + 1) % n];
            let prev = ring[(i + n - 1) % n];
            let convex = if n == 2 {
                true
            } else {
                // Left turn in a counter-clockwise ring
                det(point - prev, next - point) >= 0.0
            };
            self.vertices.push(ObstacleVertex {
                point,
                unit_dir: (next - point).normalize_or_zero(),
                convex,
                next: base + (i + 1) % n,
                prev: base + (i + n - 1) % n,
            });
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}

fn signed_area(verts: &[Vec2]) -> f32 {
    let n = verts.len();
    let mut area = 0.0;
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        area += det(a, b);
    }
    area * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_validation() {
        let mut set = ObstacleSet::new();
        assert!(matches!(
            set.add(&[Vec2::ZERO]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            set.add(&[Vec2::ZERO, Vec2::ZERO, Vec2::X]),
            Err(Error::DegenerateGeometry(_))
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn test_ring_links_and_directions() {
        let mut set = ObstacleSet::new();
        set.add(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
        ])
        .unwrap();
        let verts = set.vertices();
        assert_eq!(verts.len(), 4);
        for (i, v) in verts.iter().enumerate() {
            assert!(v.convex, "square corner {i} should be convex");
            assert!((v.unit_dir.length() - 1.0).abs() < 1e-5);
            assert_eq!(verts[v.next].prev, i);
        }
        assert_eq!(verts[0].unit_dir, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_clockwise_input_is_reversed() {
        let mut ccw = ObstacleSet::new();
        ccw.add(&[Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)])
            .unwrap();
        let mut cw = ObstacleSet::new();
        cw.add(&[Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.0)])
            .unwrap();
        // After normalization both rings traverse the same cycle
        let ccw_dirs: Vec<Vec2> = ccw.vertices().iter().map(|v| v.unit_dir).collect();
        assert!(cw
            .vertices()
            .iter()
            .all(|v| ccw_dirs.iter().any(|d| (*d - v.unit_dir).length() < 1e-5)));
    }

    #[test]
    fn test_concave_vertex_flagged() {
        let mut set = ObstacleSet::new();
        // An L-shape: the inner corner is concave
        set.add(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(0.0, 2.0),
        ])
        .unwrap();
        let concave = set
            .vertices()
            .iter()
            .filter(|v| !v.convex)
            .count();
        assert_eq!(concave, 1);
    }

    #[test]
    fn test_open_segment_is_convex_both_ends() {
        let mut set = ObstacleSet::new();
        set.add(&[Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)]).unwrap();
        assert_eq!(set.vertices().len(), 2);
        assert!(set.vertex(0).convex && set.vertex(1).convex);
        assert_eq!(set.vertex(0).next, 1);
        assert_eq!(set.vertex(1).next, 0);
    }
}
