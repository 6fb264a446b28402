//! Agent parameters and per-tick state

use pathcore_common::Vec2;

/// Tunable avoidance parameters for one agent
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentParams {
    /// Physical radius
    pub radius: f32,
    /// Speed limit applied to every computed velocity
    pub max_speed: f32,
    /// Only agents within this distance are considered
    pub neighbor_dist: f32,
    /// Cap on how many nearby agents constrain the velocity
    pub max_neighbors: usize,
    /// How far ahead agent-agent collisions are anticipated, in seconds
    pub time_horizon: f32,
    /// How far ahead obstacle collisions are anticipated, in seconds
    pub time_horizon_obst: f32,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            radius: 0.5,
            max_speed: 2.0,
            neighbor_dist: 15.0,
            max_neighbors: 10,
            time_horizon: 2.0,
            time_horizon_obst: 2.0,
        }
    }
}

/// Snapshot of one agent for a single avoidance tick
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentState {
    pub id: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Where the agent wants to go this tick, typically along its path
    pub pref_velocity: Vec2,
    pub params: AgentParams,
}

impl AgentState {
    pub fn new(id: usize, position: Vec2, params: AgentParams) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            pref_velocity: Vec2::ZERO,
            params,
        }
    }
}
