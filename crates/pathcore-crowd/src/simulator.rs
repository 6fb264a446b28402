//! Crowd simulator: agent bookkeeping plus the per-tick avoidance batch

use pathcore_common::{Error, Result, Vec2};

use crate::agent::{AgentParams, AgentState};
use crate::kd_tree::AgentKdTree;
use crate::obstacle::ObstacleSet;
use crate::orca::{compute_avoidance_velocity, AvoidanceResult};

/// Owns all agents and obstacles and advances them tick by tick.
///
/// Velocity computation is simultaneous: every agent's constraints are
/// built from the same start-of-tick snapshot, so the outcome does not
/// depend on agent order.
#[derive(Debug, Default)]
pub struct Simulator {
    agents: Vec<AgentState>,
    obstacles: ObstacleSet,
    kd_tree: AgentKdTree,
    default_params: AgentParams,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(default_params: AgentParams) -> Self {
        Self {
            default_params,
            ..Self::default()
        }
    }

    /// Adds an agent at rest; the returned id indexes this simulator
    pub fn add_agent(&mut self, position: Vec2) -> usize {
        self.add_agent_with_params(position, self.default_params.clone())
    }

    pub fn add_agent_with_params(&mut self, position: Vec2, params: AgentParams) -> usize {
        let id = self.agents.len();
        self.agents.push(AgentState::new(id, position, params));
        id
    }

    pub fn add_obstacle(&mut self, vertices: &[Vec2]) -> Result<()> {
        self.obstacles.add(vertices)
    }

    pub fn agent(&self, id: usize) -> Option<&AgentState> {
        self.agents.get(id)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn set_pref_velocity(&mut self, id: usize, pref_velocity: Vec2) -> Result<()> {
        let agent = self
            .agents
            .get_mut(id)
            .ok_or(Error::UnknownAgent(id))?;
        agent.pref_velocity = pref_velocity;
        Ok(())
    }

    pub fn remove_agent(&mut self, id: usize) -> Result<()> {
        if id >= self.agents.len() {
            return Err(Error::UnknownAgent(id));
        }
        self.agents.remove(id);
        for (i, agent) in self.agents.iter_mut().enumerate() {
            agent.id = i;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.agents.clear();
        self.obstacles.clear();
    }

    /// Computes every agent's new velocity from the current snapshot
    /// without moving anyone. Result `i` belongs to agent id `i`.
    pub fn compute_all(&mut self, dt: f32) -> Vec<AvoidanceResult> {
        self.kd_tree.build(&self.agents);
        let mut results = Vec::with_capacity(self.agents.len());
        for (i, agent) in self.agents.iter().enumerate() {
            let found = self.kd_tree.query(
                agent.position,
                agent.params.neighbor_dist,
                // One extra slot since the query sees the agent itself
                agent.params.max_neighbors + 1,
            );
            let neighbors: Vec<&AgentState> = found
                .iter()
                .filter(|&&(j, _)| j != i)
                .take(agent.params.max_neighbors)
                .map(|&(j, _)| &self.agents[j])
                .collect();
            results.push(compute_avoidance_velocity(
                agent,
                &neighbors,
                &self.obstacles,
                dt,
            ));
        }
        results
    }

    /// One simulation tick: compute all velocities, then integrate
    pub fn step(&mut self, dt: f32) -> Vec<AvoidanceResult> {
        let results = self.compute_all(dt);
        for (agent, result) in self.agents.iter_mut().zip(&results) {
            agent.velocity = result.velocity;
            agent.position += agent.velocity * dt;
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_query_agents() {
        let mut sim = Simulator::new();
        assert_eq!(sim.agent_count(), 0);
        let id = sim.add_agent(Vec2::new(1.0, 2.0));
        assert_eq!(id, 0);
        assert_eq!(sim.agent(id).map(|a| a.position), Some(Vec2::new(1.0, 2.0)));
        assert!(sim.agent(7).is_none());
    }

    #[test]
    fn test_unknown_agent_id_errors() {
        let mut sim = Simulator::new();
        assert!(matches!(
            sim.set_pref_velocity(0, Vec2::X),
            Err(Error::UnknownAgent(0))
        ));
        assert!(matches!(sim.remove_agent(3), Err(Error::UnknownAgent(3))));
    }

    #[test]
    fn test_remove_agent_reindexes() {
        let mut sim = Simulator::new();
        sim.add_agent(Vec2::ZERO);
        sim.add_agent(Vec2::X);
        sim.remove_agent(0).unwrap();
        assert_eq!(sim.agent_count(), 1);
        let survivor = sim.agent(0).unwrap();
        assert_eq!(survivor.id, 0);
        assert_eq!(survivor.position, Vec2::X);
    }

    #[test]
    fn test_head_on_agents_never_collide_over_many_ticks() {
        let mut sim = Simulator::new();
        let a = sim.add_agent(Vec2::new(-5.0, 0.0));
        let b = sim.add_agent(Vec2::new(5.0, 0.0));
        sim.set_pref_velocity(a, Vec2::new(1.5, 0.0)).unwrap();
        sim.set_pref_velocity(b, Vec2::new(-1.5, 0.0)).unwrap();

        let combined = 1.0; // two default radii
        for _ in 0..200 {
            sim.step(0.05);
            let pa = sim.agent(a).unwrap().position;
            let pb = sim.agent(b).unwrap().position;
            assert!(
                pa.distance(pb) >= combined - 1e-2,
                "agents collided at {pa:?} / {pb:?}"
            );
        }
        // Both made forward progress past each other
        assert!(sim.agent(a).unwrap().position.x > sim.agent(b).unwrap().position.x);
    }

    #[test]
    fn test_agent_stops_before_wall() {
        let mut sim = Simulator::new();
        sim.add_obstacle(&[Vec2::new(3.0, -10.0), Vec2::new(3.0, 10.0)])
            .unwrap();
        let id = sim.add_agent(Vec2::new(0.0, 0.0));
        sim.set_pref_velocity(id, Vec2::new(2.0, 0.0)).unwrap();

        for _ in 0..100 {
            sim.step(0.05);
            let p = sim.agent(id).unwrap().position;
            assert!(
                p.x <= 3.0 - 0.5 + 1e-2,
                "agent at {p:?} penetrated the wall"
            );
        }
    }

    #[test]
    fn test_step_is_order_independent() {
        // Same crowd added in two different orders must produce matching
        // positions after a tick, agent for agent
        let positions = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.2, 0.3),
            Vec2::new(0.4, 1.1),
            Vec2::new(-0.8, 0.6),
        ];
        let mut forward = Simulator::new();
        for &p in &positions {
            let id = forward.add_agent(p);
            forward.set_pref_velocity(id, -p).unwrap();
        }
        let mut reverse = Simulator::new();
        for &p in positions.iter().rev() {
            let id = reverse.add_agent(p);
            reverse.set_pref_velocity(id, -p).unwrap();
        }

        forward.step(0.1);
        reverse.step(0.1);
        for (i, &p) in positions.iter().enumerate() {
            let fwd = forward.agent(i).unwrap().position;
            let rev = reverse.agent(positions.len() - 1 - i).unwrap().position;
            assert!(
                (fwd - rev).length() < 1e-5,
                "agent from {p:?} diverged: {fwd:?} vs {rev:?}"
            );
        }
    }
}
