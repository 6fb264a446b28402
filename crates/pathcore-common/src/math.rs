//! Scalar and 2D vector helpers shared by the search and avoidance crates

use glam::Vec2;

/// Tolerance used for geometric comparisons
pub const EPSILON: f32 = 1e-5;

/// Cost of a cardinal grid step
pub const CARDINAL_COST: f32 = 1.0;

/// Cost of a diagonal grid step
pub const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

/// Squares a value
#[inline]
pub fn sq(x: f32) -> f32 {
    x * x
}

/// 2D cross product (determinant) of two vectors
#[inline]
pub fn det(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Signed area test: positive when point `c` lies to the left of the
/// directed line from `a` to `b`
#[inline]
pub fn left_of(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    det(a - c, b - a)
}

/// Normalizes a vector, substituting the zero vector for degenerate input
/// instead of producing NaN components
#[inline]
pub fn safe_normalize(v: Vec2) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > EPSILON * EPSILON {
        v / len_sq.sqrt()
    } else {
        Vec2::ZERO
    }
}

/// Squared distance from point `p` to the segment `a`-`b`
pub fn dist_sq_point_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let ab_len_sq = ab.length_squared();
    if ab_len_sq <= EPSILON * EPSILON {
        return ap.length_squared();
    }
    let t = (ap.dot(ab) / ab_len_sq).clamp(0.0, 1.0);
    (a + ab * t - p).length_squared()
}
