//! Multi-agent local collision avoidance
//!
//! Answers "what velocity lets many agents move toward their goals this
//! instant without colliding" using Optimal Reciprocal Collision Avoidance
//! (ORCA). Each nearby agent and obstacle edge becomes a half-plane
//! constraint in velocity space; an incremental two-dimensional linear
//! program picks the feasible velocity closest to the agent's preferred
//! one, falling back to a bounded relaxation in dense crowds.
//!
//! - [`Simulator`]: owns agents and obstacles, advances whole ticks with
//!   simultaneous-update semantics
//! - [`compute_avoidance_velocity`]: one-shot solve for a single agent
//!   against an explicit neighbor snapshot
//! - [`AgentKdTree`]: per-tick spatial index for neighbor queries
//! - [`ObstacleSet`]: static polygonal obstacles as linked vertex rings
//!
//! All computation is synchronous and deterministic; a result is always
//! produced, with [`AvoidanceResult::feasible`] marking relaxed solutions.

mod agent;
mod kd_tree;
mod obstacle;
mod orca;
mod simulator;

pub use agent::{AgentParams, AgentState};
pub use kd_tree::AgentKdTree;
pub use obstacle::{ObstacleSet, ObstacleVertex};
pub use orca::{compute_avoidance_velocity, AvoidanceResult, Line};
pub use simulator::Simulator;

pub use pathcore_common::{Error, Result, Vec2};
