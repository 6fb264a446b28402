//! Result cache for repeated path queries
//!
//! Keys are (start, end, map version), so any map edit implicitly misses
//! every stale entry without touching the cache. On top of that the cache
//! supports explicit rectangle invalidation (drop entries whose stored path
//! crosses a changed region), capacity-bounded LRU eviction, optional
//! time-to-live expiry and optional approximate matching that accepts a
//! cached path whose endpoints lie within a Chebyshev radius of the query.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use pathcore_common::GridRect;

use super::grid::Point;
use super::path::Path;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum live entries; 0 disables caching entirely
    pub capacity: usize,
    /// Entry lifetime; `Duration::ZERO` means entries never expire
    pub ttl: Duration,
    /// Chebyshev endpoint tolerance for `get_approximate`; 0 disables it
    pub approximate_radius: i32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            ttl: Duration::ZERO,
            approximate_radius: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    start: Point,
    end: Point,
    map_version: u64,
}

#[derive(Debug)]
struct CacheEntry {
    path: Path,
    inserted: Instant,
    /// Logical clock value of the last hit, for LRU ordering
    last_access: u64,
}

/// LRU + TTL cache of completed path results
#[derive(Debug)]
pub struct PathCache {
    config: CacheConfig,
    entries: HashMap<CacheKey, CacheEntry>,
    tick: u64,
    hits: u64,
    misses: u64,
}

impl PathCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            tick: 0,
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) over the cache's lifetime
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn insert(&mut self, start: Point, end: Point, map_version: u64, path: Path) {
        self.insert_at(start, end, map_version, path, Instant::now());
    }

    pub fn get(&mut self, start: Point, end: Point, map_version: u64) -> Option<Path> {
        self.get_at(start, end, map_version, Instant::now())
    }

    /// Exact-match probe under an approximate radius: returns the freshest
    /// cached path whose endpoints are each within `approximate_radius`
    /// (Chebyshev) of the query's. Radius 0 falls back to `get`.
    pub fn get_approximate(&mut self, start: Point, end: Point, map_version: u64) -> Option<Path> {
        self.get_approximate_at(start, end, map_version, Instant::now())
    }

    fn insert_at(
        &mut self,
        start: Point,
        end: Point,
        map_version: u64,
        path: Path,
        now: Instant,
    ) {
        if self.config.capacity == 0 {
            return;
        }
        let key = CacheKey {
            start,
            end,
            map_version,
        };
        self.tick += 1;
        let entry = CacheEntry {
            path,
            inserted: now,
            last_access: self.tick,
        };
        if self.entries.insert(key, entry).is_none() && self.entries.len() > self.config.capacity {
            self.evict_lru();
        }
    }

    fn get_at(
        &mut self,
        start: Point,
        end: Point,
        map_version: u64,
        now: Instant,
    ) -> Option<Path> {
        let key = CacheKey {
            start,
            end,
            map_version,
        };
        let ttl = self.config.ttl;
        let expired = match self.entries.get(&key) {
            Some(entry) => !ttl.is_zero() && now.duration_since(entry.inserted) >= ttl,
            None => {
                self.misses += 1;
                return None;
            }
        };
        if expired {
            self.entries.remove(&key);
            self.misses += 1;
            return None;
        }
        self.tick += 1;
        self.hits += 1;
        let entry = self.entries.get_mut(&key)?;
        entry.last_access = self.tick;
        Some(entry.path.clone())
    }

    fn get_approximate_at(
        &mut self,
        start: Point,
        end: Point,
        map_version: u64,
        now: Instant,
    ) -> Option<Path> {
        if let Some(path) = self.get_at(start, end, map_version, now) {
            return Some(path);
        }
        let radius = self.config.approximate_radius;
        if radius <= 0 {
            return None;
        }
        let ttl = self.config.ttl;
        let best = self
            .entries
            .iter()
            .filter(|(key, entry)| {
                key.map_version == map_version
                    && key.start.chebyshev(start) <= radius
                    && key.end.chebyshev(end) <= radius
                    && (ttl.is_zero() || now.duration_since(entry.inserted) < ttl)
            })
            .max_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| *key)?;
        self.tick += 1;
        self.hits += 1;
        // The exact probe above already counted one miss for this lookup
        self.misses -= 1;
        let entry = self.entries.get_mut(&best)?;
        entry.last_access = self.tick;
        Some(entry.path.clone())
    }

    /// Drops every entry whose endpoints or stored path touch `rect`
    pub fn invalidate_region(&mut self, rect: GridRect) {
        self.entries.retain(|key, entry| {
            !rect.contains(key.start.x, key.start.y)
                && !rect.contains(key.end.x, key.end.y)
                && !entry.path.intersects(&rect)
        });
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    fn evict_lru(&mut self) {
        // Capacities are small; a linear scan beats maintaining an ordered
        // side structure per access.
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| *key);
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
