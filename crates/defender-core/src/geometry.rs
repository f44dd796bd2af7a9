//! Geometry helpers shared by collision, guidance and AI code.

use std::f64::consts::{PI, TAU};

use glam::DVec2;

/// Parameter `t` of the projection of `p` onto the line through `a` and `b`.
///
/// `t = 0` is `a`, `t = 1` is `b`. Not clamped. A degenerate segment projects to 0.
pub fn segment_projection(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f64::EPSILON {
        return 0.0;
    }
    (p - a).dot(ab) / len_sq
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn point_to_segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let t = segment_projection(p, a, b).clamp(0.0, 1.0);
    p.distance(a + (b - a) * t)
}

/// Circle-circle overlap test.
pub fn circles_overlap(a: DVec2, ra: f64, b: DVec2, rb: f64) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Wrap an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Interpolate between two angles along the shortest arc.
pub fn lerp_angle(from: f64, to: f64, t: f64) -> f64 {
    let delta = normalize_angle(to - from);
    normalize_angle(from + delta * t.clamp(0.0, 1.0))
}

/// Turn `from` toward `to` by at most `max_step` radians.
pub fn turn_towards(from: f64, to: f64, max_step: f64) -> f64 {
    let delta = normalize_angle(to - from);
    if delta.abs() <= max_step {
        normalize_angle(to)
    } else {
        normalize_angle(from + max_step.copysign(delta))
    }
}
