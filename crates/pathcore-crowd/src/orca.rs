//! ORCA half-plane construction and the velocity linear program
//!
//! Each nearby agent and each obstacle edge contributes one half-plane
//! constraint in velocity space. The solver picks the velocity closest to
//! the agent's preferred velocity that satisfies every constraint and the
//! speed circle. When the agent constraints are mutually infeasible (dense
//! crowds) a relaxation pass minimizes the worst violation while keeping
//! obstacle constraints hard, and the result is flagged infeasible.
//!
//! Degenerate geometry (zero-length relative vectors, coincident agents)
//! drops the offending constraint instead of propagating NaN.

use pathcore_common::{det, safe_normalize, sq, Vec2, EPSILON};

use crate::agent::AgentState;
use crate::obstacle::ObstacleSet;

/// A directed line in velocity space; the allowed half-plane is to its left
#[derive(Debug, Clone, Copy)]
pub struct Line {
    pub point: Vec2,
    pub direction: Vec2,
}

/// Outcome of one avoidance computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvoidanceResult {
    /// New velocity, always within the agent's speed limit
    pub velocity: Vec2,
    /// False when the agent constraints were relaxed to find any velocity
    pub feasible: bool,
}

/// Computes a collision-free velocity for `agent` against a snapshot of
/// its neighbors and the static obstacles. Neighbors are taken as-is; the
/// caller is responsible for distance filtering (see `AgentKdTree`).
pub fn compute_avoidance_velocity(
    agent: &AgentState,
    neighbors: &[&AgentState],
    obstacles: &ObstacleSet,
    dt: f32,
) -> AvoidanceResult {
    let mut lines = Vec::new();
    add_obstacle_lines(agent, obstacles, &mut lines);
    let obstacle_line_count = lines.len();
    add_agent_lines(agent, neighbors, dt, &mut lines);

    let mut velocity = Vec2::ZERO;
    let fail_line = linear_program2(
        &lines,
        agent.params.max_speed,
        agent.pref_velocity,
        false,
        &mut velocity,
    );
    let feasible = fail_line == lines.len();
    if !feasible {
        log::debug!(
            "agent {}: relaxing {} avoidance constraints",
            agent.id,
            lines.len() - obstacle_line_count
        );
        linear_program3(
            &lines,
            obstacle_line_count,
            fail_line,
            agent.params.max_speed,
            &mut velocity,
        );
    }
    AvoidanceResult { velocity, feasible }
}

/// Half-planes induced by obstacle edges within the obstacle time horizon
pub(crate) fn add_obstacle_lines(agent: &AgentState, obstacles: &ObstacleSet, lines: &mut Vec<Line>) {
    if obstacles.is_empty() {
        return;
    }
    let inv_horizon = 1.0 / agent.params.time_horizon_obst;
    let radius = agent.params.radius;
    let radius_sq = sq(radius);
    let range = agent.params.time_horizon_obst * agent.params.max_speed + radius;
    let range_sq = sq(range);

    for start in 0..obstacles.vertices().len() {
        let mut v1 = start;
        let mut v2 = obstacles.vertex(v1).next;

        // Only edges the agent faces from their right side constrain it;
        // the reverse edge covers the other side
        if pathcore_common::left_of(
            obstacles.vertex(v1).point,
            obstacles.vertex(v2).point,
            agent.position,
        ) >= 0.0
        {
            continue;
        }
        let p1 = obstacles.vertex(v1).point - agent.position;
        let p2 = obstacles.vertex(v2).point - agent.position;
        if pathcore_common::dist_sq_point_segment(Vec2::ZERO, p1, p2) > range_sq {
            continue;
        }

        // A previously added line may already cover this edge's cone
        let covered = lines.iter().any(|line| {
            det(inv_horizon * p1 - line.point, line.direction) - inv_horizon * radius
                >= -EPSILON
                && det(inv_horizon * p2 - line.point, line.direction) - inv_horizon * radius
                    >= -EPSILON
        });
        if covered {
            continue;
        }

        let dist_sq1 = p1.length_squared();
        let dist_sq2 = p2.length_squared();
        let edge = p2 - p1;
        let s = (-p1).dot(edge) / edge.length_squared();
        let dist_sq_line = (-p1 - s * edge).length_squared();

        if s < 0.0 && dist_sq1 <= radius_sq {
            // Collision with the left vertex
            if obstacles.vertex(v1).convex {
                lines.push(Line {
                    point: Vec2::ZERO,
                    direction: safe_normalize(Vec2::new(-p1.y, p1.x)),
                });
            }
            continue;
        } else if s > 1.0 && dist_sq2 <= radius_sq {
            // Collision with the right vertex; only when it will not be
            // taken care of by the neighboring edge
            if obstacles.vertex(v2).convex && det(p2, obstacles.vertex(v2).unit_dir) >= 0.0 {
                lines.push(Line {
                    point: Vec2::ZERO,
                    direction: safe_normalize(Vec2::new(-p2.y, p2.x)),
                });
            }
            continue;
        } else if (0.0..=1.0).contains(&s) && dist_sq_line <= radius_sq {
            // Collision with the edge interior
            lines.push(Line {
                point: Vec2::ZERO,
                direction: -obstacles.vertex(v1).unit_dir,
            });
            continue;
        }

        // No collision: build the truncated cone's legs
        let mut left_leg;
        let mut right_leg;
        if s < 0.0 && dist_sq_line <= radius_sq {
            // Obstacle viewed obliquely, left vertex defines both legs
            if !obstacles.vertex(v1).convex {
                continue;
            }
            v2 = v1;
            let leg = (dist_sq1 - radius_sq).sqrt();
            left_leg = Vec2::new(p1.x * leg - p1.y * radius, p1.x * radius + p1.y * leg) / dist_sq1;
            right_leg =
                Vec2::new(p1.x * leg + p1.y * radius, -p1.x * radius + p1.y * leg) / dist_sq1;
        } else if s > 1.0 && dist_sq_line <= radius_sq {
            if !obstacles.vertex(v2).convex {
                continue;
            }
            v1 = v2;
            let leg = (dist_sq2 - radius_sq).sqrt();
            left_leg = Vec2::new(p2.x * leg - p2.y * radius, p2.x * radius + p2.y * leg) / dist_sq2;
            right_leg =
                Vec2::new(p2.x * leg + p2.y * radius, -p2.x * radius + p2.y * leg) / dist_sq2;
        } else {
            left_leg = if obstacles.vertex(v1).convex {
                let leg = (dist_sq1 - radius_sq).sqrt();
                Vec2::new(p1.x * leg - p1.y * radius, p1.x * radius + p1.y * leg) / dist_sq1
            } else {
                -obstacles.vertex(v1).unit_dir
            };
            right_leg = if obstacles.vertex(v2).convex {
                let leg = (dist_sq2 - radius_sq).sqrt();
                Vec2::new(p2.x * leg + p2.y * radius, -p2.x * radius + p2.y * leg) / dist_sq2
            } else {
                obstacles.vertex(start).unit_dir
            };
        }

        // Legs pointing into a neighboring edge belong to that edge's cone;
        // substitute the edge direction and remember not to project on them
        let left_neighbor = obstacles.vertex(v1).prev;
        let mut left_foreign = false;
        let mut right_foreign = false;
        if obstacles.vertex(v1).convex
            && det(left_leg, -obstacles.vertex(left_neighbor).unit_dir) >= 0.0
        {
            left_leg = -obstacles.vertex(left_neighbor).unit_dir;
            left_foreign = true;
        }
        if obstacles.vertex(v2).convex && det(right_leg, obstacles.vertex(v2).unit_dir) <= 0.0 {
            right_leg = obstacles.vertex(v2).unit_dir;
            right_foreign = true;
        }

        let left_cutoff = inv_horizon * (obstacles.vertex(v1).point - agent.position);
        let right_cutoff = inv_horizon * (obstacles.vertex(v2).point - agent.position);
        let cutoff_vec = right_cutoff - left_cutoff;

        // Project the current velocity onto the nearest boundary feature
        let t = if v1 == v2 {
            0.5
        } else {
            (agent.velocity - left_cutoff).dot(cutoff_vec) / cutoff_vec.length_squared()
        };
        let t_left = (agent.velocity - left_cutoff).dot(left_leg);
        let t_right = (agent.velocity - right_cutoff).dot(right_leg);

        if (t < 0.0 && t_left < 0.0) || (v1 == v2 && t_left < 0.0 && t_right < 0.0) {
            let unit_w = safe_normalize(agent.velocity - left_cutoff);
            if unit_w == Vec2::ZERO {
                continue;
            }
            lines.push(Line {
                point: left_cutoff + radius * inv_horizon * unit_w,
                direction: Vec2::new(unit_w.y, -unit_w.x),
            });
            continue;
        } else if t > 1.0 && t_right < 0.0 {
            let unit_w = safe_normalize(agent.velocity - right_cutoff);
            if unit_w == Vec2::ZERO {
                continue;
            }
            lines.push(Line {
                point: right_cutoff + radius * inv_horizon * unit_w,
                direction: Vec2::new(unit_w.y, -unit_w.x),
            });
            continue;
        }

        let dist_sq_cutoff = if t < 0.0 || t > 1.0 || v1 == v2 {
            f32::INFINITY
        } else {
            (agent.velocity - (left_cutoff + t * cutoff_vec)).length_squared()
        };
        let dist_sq_left = if t_left < 0.0 {
            f32::INFINITY
        } else {
            (agent.velocity - (left_cutoff + t_left * left_leg)).length_squared()
        };
        let dist_sq_right = if t_right < 0.0 {
            f32::INFINITY
        } else {
            (agent.velocity - (right_cutoff + t_right * right_leg)).length_squared()
        };

        if dist_sq_cutoff <= dist_sq_left && dist_sq_cutoff <= dist_sq_right {
            let direction = -obstacles.vertex(v1).unit_dir;
            lines.push(Line {
                point: left_cutoff + radius * inv_horizon * Vec2::new(-direction.y, direction.x),
                direction,
            });
        } else if dist_sq_left <= dist_sq_right {
            if left_foreign {
                continue;
            }
            lines.push(Line {
                point: left_cutoff + radius * inv_horizon * Vec2::new(-left_leg.y, left_leg.x),
                direction: left_leg,
            });
        } else {
            if right_foreign {
                continue;
            }
            let direction = -right_leg;
            lines.push(Line {
                point: right_cutoff + radius * inv_horizon * Vec2::new(-direction.y, direction.x),
                direction,
            });
        }
    }
}

/// Reciprocal half-planes against each neighboring agent, each side taking
/// half the responsibility for avoidance
pub(crate) fn add_agent_lines(
    agent: &AgentState,
    neighbors: &[&AgentState],
    dt: f32,
    lines: &mut Vec<Line>,
) {
    let inv_horizon = 1.0 / agent.params.time_horizon;

    for other in neighbors {
        let relative_position = other.position - agent.position;
        let relative_velocity = agent.velocity - other.velocity;
        let dist_sq = relative_position.length_squared();
        let combined_radius = agent.params.radius + other.params.radius;
        let combined_radius_sq = sq(combined_radius);

        let (direction, u) = if dist_sq > combined_radius_sq {
            let w = relative_velocity - inv_horizon * relative_position;
            let w_length_sq = w.length_squared();
            let dot1 = w.dot(relative_position);

            if dot1 < 0.0 && sq(dot1) > combined_radius_sq * w_length_sq {
                // Project on the cone's cutoff arc
                let w_length = w_length_sq.sqrt();
                if w_length <= EPSILON {
                    continue;
                }
                let unit_w = w / w_length;
                (
                    Vec2::new(unit_w.y, -unit_w.x),
                    (combined_radius * inv_horizon - w_length) * unit_w,
                )
            } else {
                // Project on the nearer leg
                let leg = (dist_sq - combined_radius_sq).sqrt();
                let direction = if det(relative_position, w) > 0.0 {
                    Vec2::new(
                        relative_position.x * leg - relative_position.y * combined_radius,
                        relative_position.x * combined_radius + relative_position.y * leg,
                    ) / dist_sq
                } else {
                    -Vec2::new(
                        relative_position.x * leg + relative_position.y * combined_radius,
                        -relative_position.x * combined_radius + relative_position.y * leg,
                    ) / dist_sq
                };
                let dot2 = relative_velocity.dot(direction);
                (direction, dot2 * direction - relative_velocity)
            }
        } else {
            // Already overlapping: resolve within one time step
            if dt <= EPSILON {
                continue;
            }
            let inv_time_step = 1.0 / dt;
            let w = relative_velocity - inv_time_step * relative_position;
            let w_length = w.length();
            if w_length <= EPSILON {
                continue;
            }
            let unit_w = w / w_length;
            (
                Vec2::new(unit_w.y, -unit_w.x),
                (combined_radius * inv_time_step - w_length) * unit_w,
            )
        };

        lines.push(Line {
            point: agent.velocity + 0.5 * u,
            direction,
        });
    }
}

/// Optimizes along one line under the speed circle and all earlier lines.
/// Returns false when the constraint set on that line is empty.
pub(crate) fn linear_program1(
    lines: &[Line],
    line_no: usize,
    radius: f32,
    opt_velocity: Vec2,
    direction_opt: bool,
    result: &mut Vec2,
) -> bool {
    let line = lines[line_no];
    let dot_product = line.point.dot(line.direction);
    let discriminant = sq(dot_product) + sq(radius) - line.point.length_squared();
    if discriminant < 0.0 {
        // The speed circle fully invalidates this line
        return false;
    }

    let sqrt_discriminant = discriminant.sqrt();
    let mut t_left = -dot_product - sqrt_discriminant;
    let mut t_right = -dot_product + sqrt_discriminant;

    for prev in &lines[..line_no] {
        let denominator = det(line.direction, prev.direction);
        let numerator = det(prev.direction, line.point - prev.point);
        if denominator.abs() <= EPSILON {
            // Parallel lines
            if numerator < 0.0 {
                return false;
            }
            continue;
        }
        let t = numerator / denominator;
        if denominator >= 0.0 {
            t_right = t_right.min(t);
        } else {
            t_left = t_left.max(t);
        }
        if t_left > t_right {
            return false;
        }
    }

    if direction_opt {
        // Optimize direction
        if opt_velocity.dot(line.direction) > 0.0 {
            *result = line.point + t_right * line.direction;
        } else {
            *result = line.point + t_left * line.direction;
        }
    } else {
        // Optimize closest point
        let t = line.direction.dot(opt_velocity - line.point);
        *result = line.point + t.clamp(t_left, t_right) * line.direction;
    }
    true
}

/// Incremental pass over all lines. Returns `lines.len()` on success, or
/// the index of the first line whose constraint set is infeasible.
pub(crate) fn linear_program2(
    lines: &[Line],
    radius: f32,
    opt_velocity: Vec2,
    direction_opt: bool,
    result: &mut Vec2,
) -> usize {
    if direction_opt {
        // opt_velocity is a unit direction in this mode
        *result = opt_velocity * radius;
    } else if opt_velocity.length_squared() > sq(radius) {
        *result = safe_normalize(opt_velocity) * radius;
    } else {
        *result = opt_velocity;
    }

    for (i, line) in lines.iter().enumerate() {
        if det(line.direction, line.point - *result) > 0.0 {
            let temp = *result;
            if !linear_program1(lines, i, radius, opt_velocity, direction_opt, result) {
                *result = temp;
                return i;
            }
        }
    }
    lines.len()
}

/// Relaxation pass: starting from the first failed line, minimize the
/// maximum violation of the agent constraints while keeping the obstacle
/// lines (the first `obstacle_line_count`) hard.
pub(crate) fn linear_program3(
    lines: &[Line],
    obstacle_line_count: usize,
    begin_line: usize,
    radius: f32,
    result: &mut Vec2,
) {
    let mut distance = 0.0f32;

    for i in begin_line..lines.len() {
        let line = lines[i];
        if det(line.direction, line.point - *result) <= distance {
            continue;
        }

        // Project each prior agent line onto the violation boundary
        let mut proj_lines: Vec<Line> = lines[..obstacle_line_count].to_vec();
        for prev in &lines[obstacle_line_count..i] {
            let denominator = det(line.direction, prev.direction);
            let point = if denominator.abs() <= EPSILON {
                if line.direction.dot(prev.direction) > 0.0 {
                    // Same direction: prev is redundant here
                    continue;
                }
                0.5 * (line.point + prev.point)
            } else {
                line.point
                    + (det(prev.direction, line.point - prev.point) / denominator)
                        * line.direction
            };
            let direction = safe_normalize(prev.direction - line.direction);
            if direction == Vec2::ZERO {
                continue;
            }
            proj_lines.push(Line { point, direction });
        }

        let temp = *result;
        if linear_program2(
            &proj_lines,
            radius,
            Vec2::new(-line.direction.y, line.direction.x),
            true,
            result,
        ) < proj_lines.len()
        {
            // Numerically rare; keep the previous best rather than an
            // undefined partial result
            *result = temp;
        }
        distance = det(line.direction, line.point - *result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentParams;

    fn agent(id: usize, pos: (f32, f32), vel: (f32, f32), pref: (f32, f32)) -> AgentState {
        let mut a = AgentState::new(id, Vec2::new(pos.0, pos.1), AgentParams::default());
        a.velocity = Vec2::new(vel.0, vel.1);
        a.pref_velocity = Vec2::new(pref.0, pref.1);
        a
    }

    #[test]
    fn test_unconstrained_returns_pref_velocity() {
        let a = agent(0, (0.0, 0.0), (0.0, 0.0), (1.0, 0.5));
        let result = compute_avoidance_velocity(&a, &[], &ObstacleSet::new(), 0.1);
        assert!(result.feasible);
        assert!((result.velocity - Vec2::new(1.0, 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_pref_velocity_clamped_to_max_speed() {
        let a = agent(0, (0.0, 0.0), (0.0, 0.0), (10.0, 0.0));
        let result = compute_avoidance_velocity(&a, &[], &ObstacleSet::new(), 0.1);
        assert!(result.feasible);
        assert!((result.velocity.length() - a.params.max_speed).abs() < 1e-4);
        assert!(result.velocity.x > 0.0);
    }

    #[test]
    fn test_head_on_agents_keep_separation() {
        // Two agents closing head-on at full speed; over the time horizon
        // their predicted separation must stay above the combined radius
        let a = agent(0, (-4.0, 0.0), (2.0, 0.0), (2.0, 0.0));
        let b = agent(1, (4.0, 0.0), (-2.0, 0.0), (-2.0, 0.0));
        let obstacles = ObstacleSet::new();
        let dt = 0.1;

        let ra = compute_avoidance_velocity(&a, &[&b], &obstacles, dt);
        let rb = compute_avoidance_velocity(&b, &[&a], &obstacles, dt);
        assert!(ra.feasible && rb.feasible);

        let combined = a.params.radius + b.params.radius;
        let horizon = a.params.time_horizon;
        let relative_position = b.position - a.position;
        let relative_velocity = ra.velocity - rb.velocity;
        let mut min_sep = f32::INFINITY;
        let steps = 100;
        for k in 0..=steps {
            let t = horizon * k as f32 / steps as f32;
            let sep = (relative_position - relative_velocity * t).length();
            min_sep = min_sep.min(sep);
        }
        assert!(
            min_sep >= combined - 1e-3,
            "predicted separation {min_sep} dips below combined radius {combined}"
        );
        // Symmetry breaking: both sidestep, in opposite lateral directions
        assert!(ra.velocity.y.abs() > 1e-6 || rb.velocity.y.abs() > 1e-6);
    }

    #[test]
    fn test_overlapping_agents_push_apart() {
        let a = agent(0, (0.0, 0.0), (0.0, 0.0), (0.0, 0.0));
        let b = agent(1, (0.3, 0.0), (0.0, 0.0), (0.0, 0.0));
        let result = compute_avoidance_velocity(&a, &[&b], &ObstacleSet::new(), 0.1);
        // Must move away from the overlap, not sit still
        assert!(result.velocity.x < -1e-4);
    }

    #[test]
    fn test_coincident_agents_are_skipped_not_nan() {
        let a = agent(0, (1.0, 1.0), (0.0, 0.0), (1.0, 0.0));
        let b = agent(1, (1.0, 1.0), (0.0, 0.0), (0.0, 0.0));
        let result = compute_avoidance_velocity(&a, &[&b], &ObstacleSet::new(), 0.1);
        assert!(result.velocity.x.is_finite() && result.velocity.y.is_finite());
        assert!((result.velocity - Vec2::new(1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_crowded_ring_relaxes_but_returns_velocity() {
        // Eight agents overlapping around the origin, all wanting inward:
        // the one-step constraints cannot all hold
        let center = agent(0, (0.0, 0.0), (0.0, 0.0), (1.0, 0.0));
        let ring: Vec<AgentState> = (0..8)
            .map(|i| {
                let theta = std::f32::consts::TAU * i as f32 / 8.0;
                let pos = Vec2::new(theta.cos(), theta.sin()) * 0.6;
                let mut other =
                    AgentState::new(i + 1, pos, AgentParams::default());
                other.pref_velocity = -pos;
                other
            })
            .collect();
        let refs: Vec<&AgentState> = ring.iter().collect();
        let result = compute_avoidance_velocity(&center, &refs, &ObstacleSet::new(), 0.05);
        assert!(!result.feasible);
        assert!(result.velocity.x.is_finite() && result.velocity.y.is_finite());
        assert!(result.velocity.length() <= center.params.max_speed + 1e-4);
    }

    #[test]
    fn test_wall_blocks_forward_velocity() {
        // A long wall ahead; driving straight at it must be cut back so the
        // agent cannot reach it within the obstacle horizon
        let mut obstacles = ObstacleSet::new();
        obstacles
            .add(&[Vec2::new(5.0, -10.0), Vec2::new(5.0, 10.0)])
            .unwrap();
        let a = agent(0, (4.0, 0.0), (2.0, 0.0), (2.0, 0.0));
        let result = compute_avoidance_velocity(&a, &[], &obstacles, 0.1);

        let gap = 5.0 - a.position.x - a.params.radius;
        let max_closing = gap / a.params.time_horizon_obst;
        assert!(
            result.velocity.x <= max_closing + 1e-3,
            "velocity {} closes a {} gap within the horizon",
            result.velocity.x,
            gap
        );
    }

    #[test]
    fn test_obstacle_lines_are_hard_under_relaxation() {
        let mut obstacles = ObstacleSet::new();
        obstacles
            .add(&[Vec2::new(1.0, -10.0), Vec2::new(1.0, 10.0)])
            .unwrap();
        let a = agent(0, (0.4, 0.0), (0.0, 0.0), (2.0, 0.0));
        // A crowd pressing from behind makes agent constraints infeasible
        let pushers: Vec<AgentState> = (0..6)
            .map(|i| {
                let mut p = AgentState::new(
                    i + 1,
                    Vec2::new(-0.1, (i as f32 - 2.5) * 0.2),
                    AgentParams::default(),
                );
                p.velocity = Vec2::new(2.0, 0.0);
                p.pref_velocity = Vec2::new(2.0, 0.0);
                p
            })
            .collect();
        let refs: Vec<&AgentState> = pushers.iter().collect();
        let result = compute_avoidance_velocity(&a, &refs, &obstacles, 0.1);

        let gap = 1.0 - a.position.x - a.params.radius;
        let max_closing = gap / a.params.time_horizon_obst;
        assert!(result.velocity.x <= max_closing + 1e-3);
    }

    #[test]
    fn test_determinism() {
        let a = agent(0, (-4.0, 0.1), (2.0, 0.0), (2.0, 0.0));
        let b = agent(1, (4.0, -0.1), (-2.0, 0.0), (-2.0, 0.0));
        let obstacles = ObstacleSet::new();
        let first = compute_avoidance_velocity(&a, &[&b], &obstacles, 0.1);
        for _ in 0..5 {
            assert_eq!(compute_avoidance_velocity(&a, &[&b], &obstacles, 0.1), first);
        }
    }

    #[test]
    fn test_linear_program1_clamps_to_circle() {
        let lines = [Line {
            point: Vec2::new(0.0, 1.0),
            direction: Vec2::new(1.0, 0.0),
        }];
        let mut result = Vec2::ZERO;
        // Want to go far right along the line; circle radius 2 caps it
        let ok = linear_program1(&lines, 0, 2.0, Vec2::new(100.0, 1.0), false, &mut result);
        assert!(ok);
        assert!((result.y - 1.0).abs() < 1e-5);
        assert!((result.length() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_linear_program2_projects_onto_violated_line() {
        // Direction (1,0) through (0,1) allows only y >= 1; preferred
        // velocity points straight down
        let lines = [Line {
            point: Vec2::new(0.0, 1.0),
            direction: Vec2::new(1.0, 0.0),
        }];
        let mut result = Vec2::ZERO;
        let fail = linear_program2(&lines, 2.0, Vec2::new(0.0, -2.0), false, &mut result);
        assert_eq!(fail, lines.len());
        assert!((result.y - 1.0).abs() < 1e-5);
    }
}
