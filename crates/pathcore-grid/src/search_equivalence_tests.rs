//! Cross-algorithm consistency tests: A*, JPS and the hierarchical search
//! run against the same maps and must agree where optimality is guaranteed,
//! and produce valid traversable paths everywhere else.

use crate::{
    AStarPathfinder, Connectivity, GridMap, GridPathfinder, HierarchicalConfig,
    HierarchicalPathfinder, JpsPathfinder, Path, Point, SearchOptions,
};

/// Deterministic xorshift so the scatter maps are stable across runs
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

fn scatter_map(width: i32, height: i32, connectivity: Connectivity, seed: u64) -> GridMap {
    let mut map = GridMap::with_connectivity(width, height, connectivity);
    let mut rng = Rng(seed);
    for y in 0..height {
        for x in 0..width {
            // ~25% obstacle density, corners kept open for the queries
            if rng.next() % 4 == 0 {
                map.set_walkable(x, y, false);
            }
        }
    }
    map.set_walkable(0, 0, true);
    map.set_walkable(width - 1, height - 1, true);
    map
}

fn assert_traversable(map: &GridMap, path: &Path) {
    for pair in path.points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(map.is_walkable(b.x, b.y), "path enters blocked cell {b:?}");
        assert!(
            a.chebyshev(b) == 1,
            "non-adjacent step {a:?} -> {b:?} in {:?}",
            path.points
        );
        if a.x != b.x && a.y != b.y {
            if let Connectivity::Eight { cut_corners: false } = map.connectivity() {
                assert!(
                    map.is_walkable(a.x, b.y) && map.is_walkable(b.x, a.y),
                    "diagonal step {a:?} -> {b:?} cuts a corner"
                );
            }
        }
    }
}

#[test]
fn test_jps_matches_astar_on_random_maps() {
    for (seed, connectivity) in [
        (11, Connectivity::Eight { cut_corners: false }),
        (29, Connectivity::Eight { cut_corners: false }),
        (43, Connectivity::Eight { cut_corners: true }),
        (57, Connectivity::Four),
        (71, Connectivity::Eight { cut_corners: true }),
    ] {
        let map = scatter_map(24, 24, connectivity, seed);
        let mut astar = AStarPathfinder::new();
        let mut jps = JpsPathfinder::new();
        let start = Point::new(0, 0);
        let end = Point::new(23, 23);

        let a = astar.find_path(&map, start, end, &SearchOptions::default());
        let j = jps.find_path(&map, start, end, &SearchOptions::default());

        assert_eq!(a.found, j.found, "seed {seed}: reachability disagreement");
        if a.found {
            assert!(
                (a.cost - j.cost).abs() < 1e-3,
                "seed {seed}: A* cost {} vs JPS cost {}",
                a.cost,
                j.cost
            );
            assert_eq!(j.points.first(), Some(&start));
            assert_eq!(j.points.last(), Some(&end));
            assert_traversable(&map, &j);
        }
    }
}

#[test]
fn test_hierarchical_paths_are_valid_and_near_optimal() {
    for seed in [5u64, 17, 31] {
        let map = scatter_map(40, 40, Connectivity::Eight { cut_corners: false }, seed);
        let mut astar = AStarPathfinder::new();
        let mut hpa = HierarchicalPathfinder::new(HierarchicalConfig::default());
        hpa.preprocess(&map);

        let start = Point::new(0, 0);
        let end = Point::new(39, 39);
        let exact = astar.find_path(&map, start, end, &SearchOptions::default());
        let approx = hpa.find_path(&map, start, end, &SearchOptions::default());

        if !exact.found {
            // The abstract graph can never connect what the grid does not
            assert!(!approx.found, "seed {seed}: hierarchical found a phantom path");
            continue;
        }
        if approx.found {
            assert_eq!(approx.points.first(), Some(&start));
            assert_eq!(approx.points.last(), Some(&end));
            assert_traversable(&map, &approx);
            // Abstraction loses optimality but not by much on open maps
            assert!(
                approx.cost >= exact.cost - 1e-3,
                "seed {seed}: hierarchical cost {} below optimal {}",
                approx.cost,
                exact.cost
            );
            assert!(
                approx.cost <= exact.cost * 1.5 + 2.0,
                "seed {seed}: hierarchical cost {} too far above optimal {}",
                approx.cost,
                exact.cost
            );
        }
    }
}

#[test]
fn test_all_algorithms_agree_on_unreachable() {
    let mut map = GridMap::new(20, 20);
    for y in 0..20 {
        map.set_walkable(10, y, false);
    }
    let start = Point::new(2, 10);
    let end = Point::new(17, 10);

    let mut astar = AStarPathfinder::new();
    let mut jps = JpsPathfinder::new();
    let mut hpa = HierarchicalPathfinder::new(HierarchicalConfig::default());
    hpa.preprocess(&map);

    assert!(!astar.find_path(&map, start, end, &SearchOptions::default()).found);
    assert!(!jps.find_path(&map, start, end, &SearchOptions::default()).found);
    assert!(!hpa.find_path(&map, start, end, &SearchOptions::default()).found);
}

#[test]
fn test_repeated_queries_are_deterministic() {
    let map = scatter_map(24, 24, Connectivity::Eight { cut_corners: false }, 99);
    let mut astar = AStarPathfinder::new();
    let mut jps = JpsPathfinder::new();
    let start = Point::new(0, 0);
    let end = Point::new(23, 23);

    let a1 = astar.find_path(&map, start, end, &SearchOptions::default());
    let j1 = jps.find_path(&map, start, end, &SearchOptions::default());
    for _ in 0..3 {
        assert_eq!(astar.find_path(&map, start, end, &SearchOptions::default()), a1);
        assert_eq!(jps.find_path(&map, start, end, &SearchOptions::default()), j1);
    }
}

#[test]
fn test_cost_field_steers_every_algorithm() {
    // A cheap southern corridor vs an expensive direct band
    let mut map = GridMap::new(20, 10);
    for x in 0..20 {
        for y in 0..5 {
            map.set_cost(x, y, 10.0);
        }
    }
    let start = Point::new(0, 2);
    let end = Point::new(19, 2);

    let mut astar = AStarPathfinder::new();
    let path = astar.find_path(&map, start, end, &SearchOptions::default());
    assert!(path.found);
    assert!(
        path.points.iter().any(|p| p.y >= 5),
        "A* ignored the cost field: {:?}",
        path.points
    );

    let mut hpa = HierarchicalPathfinder::new(HierarchicalConfig::default());
    hpa.preprocess(&map);
    let hpath = hpa.find_path(&map, start, end, &SearchOptions::default());
    assert!(hpath.found);
    assert!(hpath.cost <= path.cost * 1.5 + 2.0);
}
