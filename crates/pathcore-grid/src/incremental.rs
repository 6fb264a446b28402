//! Time-sliced pathfinding sessions
//!
//! The same A* search re-expressed as a suspendable state machine: callers
//! supply an iteration budget per [`IncrementalPathfinder::step`] call
//! instead of running to completion, so many in-flight searches can share a
//! per-frame compute budget cooperatively. Suspension only happens at step
//! boundaries, never mid-expansion.
//!
//! Sessions are fully isolated — each owns its arena and open list — so
//! interleaving steps across sessions cannot change any session's outcome:
//! for a fixed map and endpoints the final result is independent of how the
//! budget is sliced.
//!
//! The pathfinder does not watch the map. Callers pair map edits with
//! [`IncrementalPathfinder::notify_obstacle_change`] and are expected to
//! cancel and re-request flagged sessions; nothing is auto-repaired.

use std::collections::HashMap;

use pathcore_common::GridRect;

use super::arena::SearchArena;
use super::astar::{heuristic, reconstruct};
use super::grid::{GridMap, Point};
use super::open_list::OpenList;
use super::path::{Path, SearchOptions};

/// Handle to an in-flight search. Ids are reused after `cleanup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionId(pub u32);

/// Lifecycle of a session.
///
/// `Idle → InProgress → {Completed, Failed, Cancelled}`, with `Paused` a
/// reentrant sub-state of `InProgress`. Invalid transitions are silent
/// no-ops; terminal states never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionState {
    Idle,
    InProgress,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Cancelled
        )
    }
}

/// Progress snapshot returned by [`IncrementalPathfinder::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub state: SessionState,
    /// Scheduling weight supplied at request time, echoed back so callers
    /// can apportion their per-frame budget without a side table
    pub priority: i32,
    pub nodes_searched: usize,
    /// Current open-list size; 0 for terminal or unknown sessions
    pub open_len: usize,
    /// Rough completion estimate in [0, 1], informational only
    pub estimated_progress: f32,
}

impl Progress {
    /// Neutral snapshot for unknown or cleaned-up session ids
    fn idle() -> Self {
        Self {
            state: SessionState::Idle,
            priority: 0,
            nodes_searched: 0,
            open_len: 0,
            estimated_progress: 0.0,
        }
    }
}

#[derive(Debug)]
struct Session {
    start: Point,
    end: Point,
    options: SearchOptions,
    priority: i32,
    state: SessionState,
    arena: SearchArena,
    open: OpenList,
    nodes_searched: usize,
    /// Bounding box of everything this search has touched, for
    /// change-intersection tests
    explored: GridRect,
    initial_h: f32,
    best_h: f32,
    affected: bool,
    result: Option<Path>,
}

impl Session {
    fn progress(&self) -> Progress {
        let estimated = if self.state == SessionState::Completed {
            1.0
        } else if self.initial_h > 0.0 {
            (1.0 - self.best_h / self.initial_h).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Progress {
            state: self.state,
            priority: self.priority,
            nodes_searched: self.nodes_searched,
            open_len: if self.state.is_terminal() {
                0
            } else {
                self.open.len()
            },
            estimated_progress: estimated,
        }
    }
}

/// Owner of all time-sliced search sessions
#[derive(Debug, Default)]
pub struct IncrementalPathfinder {
    sessions: HashMap<u32, Session>,
    free_ids: Vec<u32>,
    next_id: u32,
}

impl IncrementalPathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Starts a new search at priority 0. Invalid endpoints fail immediately
    /// and `start == end` completes immediately; both still allocate a
    /// session so `get_result` works uniformly.
    pub fn request_path(
        &mut self,
        map: &GridMap,
        start: Point,
        end: Point,
        options: SearchOptions,
    ) -> SessionId {
        self.request_path_with_priority(map, start, end, options, 0)
    }

    /// Starts a new search with an explicit scheduling priority. The
    /// pathfinder never acts on it; it is carried on the session and
    /// surfaced through [`Progress`] for the caller's budget policy.
    pub fn request_path_with_priority(
        &mut self,
        map: &GridMap,
        start: Point,
        end: Point,
        options: SearchOptions,
        priority: i32,
    ) -> SessionId {
        let id = self.free_ids.pop().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        });

        let mut session = Session {
            start,
            end,
            options,
            priority,
            state: SessionState::InProgress,
            arena: SearchArena::new(),
            open: OpenList::new(),
            nodes_searched: 0,
            explored: GridRect::new(start.x, start.y, end.x, end.y),
            initial_h: heuristic(map.connectivity(), start, end),
            best_h: heuristic(map.connectivity(), start, end),
            affected: false,
            result: None,
        };

        if !map.is_walkable(start.x, start.y) || !map.is_walkable(end.x, end.y) {
            session.state = SessionState::Failed;
            session.result = Some(Path::not_found(0));
        } else if start == end {
            session.state = SessionState::Completed;
            session.result = Some(Path::trivial(start));
        } else {
            session.arena.ensure(map.cell_count());
            session.arena.reset();
            session.open.ensure(map.cell_count());
            session.open.clear();
            let start_idx = map.index(start);
            session.arena.set_g(start_idx, 0.0);
            session.arena.set_open(start_idx, true);
            let w = session.options.weight();
            session.open.push(start_idx, w * session.initial_h);
        }

        self.sessions.insert(id, session);
        SessionId(id)
    }

    /// Runs up to `iterations` expansions of one session. No-op (returning
    /// the current progress) on paused, terminal or unknown sessions.
    pub fn step(&mut self, map: &GridMap, id: SessionId, iterations: usize) -> Progress {
        let Some(session) = self.sessions.get_mut(&id.0) else {
            return Progress::idle();
        };
        if session.state != SessionState::InProgress || session.result.is_some() {
            return session.progress();
        }

        let weight = session.options.weight();
        let goal_idx = map.index(session.end);
        let end = session.end;
        let mut buf = [(Point::new(0, 0), 0.0f32); 8];

        for _ in 0..iterations {
            let Some(current) = session.open.pop() else {
                session.state = SessionState::Failed;
                session.result = Some(Path::not_found(session.nodes_searched));
                break;
            };
            session.nodes_searched += 1;

            if current == goal_idx {
                session.state = SessionState::Completed;
                session.result = Some(Path {
                    found: true,
                    points: reconstruct(&session.arena, map, goal_idx),
                    cost: session.arena.g(goal_idx),
                    nodes_searched: session.nodes_searched,
                });
                break;
            }
            if session.nodes_searched >= session.options.max_nodes {
                log::debug!(
                    "incremental session {} budget of {} exhausted",
                    id.0,
                    session.options.max_nodes
                );
                session.state = SessionState::Failed;
                session.result = Some(Path::not_found(session.nodes_searched));
                break;
            }

            session.arena.set_open(current, false);
            session.arena.set_closed(current, true);
            let p = map.point(current);
            session.explored = GridRect::from_points([
                (session.explored.min_x, session.explored.min_y),
                (session.explored.max_x, session.explored.max_y),
                (p.x, p.y),
            ])
            .unwrap_or(session.explored);
            let h_here = heuristic(map.connectivity(), p, end);
            if h_here < session.best_h {
                session.best_h = h_here;
            }
            let g = session.arena.g(current);

            let n = map.neighbors(p, &mut buf);
            for &(q, step_cost) in &buf[..n] {
                let qidx = map.index(q);
                if session.arena.is_closed(qidx) {
                    continue;
                }
                let tentative = g + step_cost;
                if tentative < session.arena.g(qidx) {
                    session.arena.set_parent(qidx, current as u32);
                    session.arena.set_g(qidx, tentative);
                    let f = tentative + weight * heuristic(map.connectivity(), q, end);
                    session.arena.set_f(qidx, f);
                    if session.arena.is_open(qidx) {
                        session.open.decrease(qidx, f);
                    } else {
                        session.arena.set_open(qidx, true);
                        session.open.push(qidx, f);
                    }
                }
            }
        }

        session.progress()
    }

    /// Paused ⇄ InProgress, keeping all accumulated search state
    pub fn pause(&mut self, id: SessionId) -> Progress {
        self.transition(id, SessionState::InProgress, SessionState::Paused)
    }

    pub fn resume(&mut self, id: SessionId) -> Progress {
        self.transition(id, SessionState::Paused, SessionState::InProgress)
    }

    /// Terminal from InProgress or Paused; the result becomes not-found
    pub fn cancel(&mut self, id: SessionId) -> Progress {
        let Some(session) = self.sessions.get_mut(&id.0) else {
            return Progress::idle();
        };
        if matches!(
            session.state,
            SessionState::InProgress | SessionState::Paused
        ) {
            session.state = SessionState::Cancelled;
            session.result = Some(Path::not_found(session.nodes_searched));
        }
        session.progress()
    }

    /// Releases the session; its numeric id becomes reusable
    pub fn cleanup(&mut self, id: SessionId) {
        if self.sessions.remove(&id.0).is_some() {
            self.free_ids.push(id.0);
        }
    }

    /// The session's result so far: the found path once Completed, a
    /// not-found otherwise. Unknown ids yield a neutral empty result.
    pub fn get_result(&self, id: SessionId) -> Path {
        match self.sessions.get(&id.0) {
            Some(session) => match &session.result {
                Some(path) => path.clone(),
                None => Path::not_found(session.nodes_searched),
            },
            None => Path::not_found(0),
        }
    }

    pub fn get_progress(&self, id: SessionId) -> Progress {
        self.sessions
            .get(&id.0)
            .map(|s| s.progress())
            .unwrap_or_else(Progress::idle)
    }

    /// Flags every live session whose start, end or explored region
    /// intersects the changed rectangle. Flagged sessions keep running;
    /// cancelling and re-requesting them is the caller's policy.
    pub fn notify_obstacle_change(&mut self, rect: GridRect) {
        for session in self.sessions.values_mut() {
            if session.state.is_terminal() {
                continue;
            }
            if rect.contains(session.start.x, session.start.y)
                || rect.contains(session.end.x, session.end.y)
                || rect.intersects(&session.explored)
            {
                session.affected = true;
            }
        }
    }

    pub fn is_affected_by_change(&self, id: SessionId) -> bool {
        self.sessions
            .get(&id.0)
            .map(|s| s.affected)
            .unwrap_or(false)
    }

    fn transition(&mut self, id: SessionId, from: SessionState, to: SessionState) -> Progress {
        let Some(session) = self.sessions.get_mut(&id.0) else {
            return Progress::idle();
        };
        if session.state == from {
            session.state = to;
        }
        session.progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_completion(
        pf: &mut IncrementalPathfinder,
        map: &GridMap,
        id: SessionId,
        budget: usize,
    ) -> Progress {
        let mut guard = 0;
        loop {
            let progress = pf.step(map, id, budget);
            if progress.state.is_terminal() {
                return progress;
            }
            guard += 1;
            assert!(guard < 100_000, "search did not terminate");
        }
    }

    #[test]
    fn test_fast_paths() {
        let mut map = GridMap::new(8, 8);
        map.set_walkable(7, 7, false);
        let mut pf = IncrementalPathfinder::new();

        let bad = pf.request_path(&map, Point::new(0, 0), Point::new(7, 7), Default::default());
        assert_eq!(pf.get_progress(bad).state, SessionState::Failed);

        let same = pf.request_path(&map, Point::new(2, 2), Point::new(2, 2), Default::default());
        assert_eq!(pf.get_progress(same).state, SessionState::Completed);
        assert_eq!(pf.get_result(same).points, vec![Point::new(2, 2)]);
    }

    #[test]
    fn test_step_completes_search() {
        let map = GridMap::new(10, 10);
        let mut pf = IncrementalPathfinder::new();
        let id = pf.request_path(&map, Point::new(0, 0), Point::new(9, 9), Default::default());
        let progress = run_to_completion(&mut pf, &map, id, 5);
        assert_eq!(progress.state, SessionState::Completed);
        let path = pf.get_result(id);
        assert!(path.found);
        assert!((path.cost - 9.0 * std::f32::consts::SQRT_2).abs() < 1e-3);
        assert!((progress.estimated_progress - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_pause_resume_preserves_state() {
        let map = GridMap::new(16, 16);
        let mut pf = IncrementalPathfinder::new();
        let id = pf.request_path(&map, Point::new(0, 0), Point::new(15, 15), Default::default());

        pf.step(&map, id, 3);
        let before = pf.get_progress(id);
        pf.pause(id);
        // Stepping a paused session is a no-op
        let paused = pf.step(&map, id, 100);
        assert_eq!(paused.state, SessionState::Paused);
        assert_eq!(paused.nodes_searched, before.nodes_searched);
        pf.resume(id);
        let done = run_to_completion(&mut pf, &map, id, 50);
        assert_eq!(done.state, SessionState::Completed);
    }

    #[test]
    fn test_cancel_and_cleanup_reuse_id() {
        let map = GridMap::new(8, 8);
        let mut pf = IncrementalPathfinder::new();
        let id = pf.request_path(&map, Point::new(0, 0), Point::new(7, 7), Default::default());
        let progress = pf.cancel(id);
        assert_eq!(progress.state, SessionState::Cancelled);
        assert!(!pf.get_result(id).found);
        // Cancel is terminal: resume must not revive it
        pf.resume(id);
        assert_eq!(pf.get_progress(id).state, SessionState::Cancelled);

        pf.cleanup(id);
        assert_eq!(pf.session_count(), 0);
        let id2 = pf.request_path(&map, Point::new(0, 0), Point::new(7, 7), Default::default());
        assert_eq!(id, id2);
    }

    #[test]
    fn test_unknown_id_is_neutral() {
        let map = GridMap::new(4, 4);
        let mut pf = IncrementalPathfinder::new();
        let ghost = SessionId(999);
        assert_eq!(pf.step(&map, ghost, 10), Progress::idle());
        assert!(!pf.get_result(ghost).found);
        assert!(!pf.is_affected_by_change(ghost));
        pf.cleanup(ghost); // must not panic
    }

    #[test]
    fn test_obstacle_change_flags_intersecting_sessions() {
        let map = GridMap::new(20, 20);
        let mut pf = IncrementalPathfinder::new();
        let near = pf.request_path(&map, Point::new(0, 0), Point::new(5, 5), Default::default());
        let far = pf.request_path(
            &map,
            Point::new(14, 14),
            Point::new(19, 19),
            Default::default(),
        );
        pf.step(&map, near, 4);
        pf.step(&map, far, 4);

        pf.notify_obstacle_change(GridRect::new(2, 2, 3, 3));
        assert!(pf.is_affected_by_change(near));
        assert!(!pf.is_affected_by_change(far));
    }

    #[test]
    fn test_budget_exhaustion_fails() {
        let map = GridMap::new(12, 12);
        let mut pf = IncrementalPathfinder::new();
        let id = pf.request_path(
            &map,
            Point::new(0, 0),
            Point::new(11, 11),
            SearchOptions {
                max_nodes: 4,
                ..Default::default()
            },
        );
        let progress = run_to_completion(&mut pf, &map, id, 2);
        assert_eq!(progress.state, SessionState::Failed);
        assert_eq!(progress.nodes_searched, 4);
    }

    #[test]
    fn test_priority_carried_on_session() {
        let map = GridMap::new(10, 10);
        let mut pf = IncrementalPathfinder::new();
        let urgent = pf.request_path_with_priority(
            &map,
            Point::new(0, 0),
            Point::new(9, 9),
            Default::default(),
            5,
        );
        let lazy = pf.request_path(&map, Point::new(9, 0), Point::new(0, 9), Default::default());

        assert_eq!(pf.get_progress(urgent).priority, 5);
        assert_eq!(pf.get_progress(lazy).priority, 0);

        // Priority survives stepping and termination
        let done = run_to_completion(&mut pf, &map, urgent, 10);
        assert_eq!(done.priority, 5);
        assert_eq!(pf.get_progress(SessionId(999)).priority, 0);
    }

    #[test]
    fn test_isolated_sessions_interleave() {
        let map = GridMap::new(12, 12);
        let mut pf = IncrementalPathfinder::new();
        let a = pf.request_path(&map, Point::new(0, 0), Point::new(11, 11), Default::default());
        let b = pf.request_path(&map, Point::new(11, 0), Point::new(0, 11), Default::default());

        // Interleave stepping; both must converge to their own results
        loop {
            let pa = pf.step(&map, a, 1);
            let pb = pf.step(&map, b, 3);
            if pa.state.is_terminal() && pb.state.is_terminal() {
                break;
            }
        }
        let ra = pf.get_result(a);
        let rb = pf.get_result(b);
        assert!(ra.found && rb.found);
        assert_eq!(ra.points.first(), Some(&Point::new(0, 0)));
        assert_eq!(rb.points.first(), Some(&Point::new(11, 0)));
    }
}
