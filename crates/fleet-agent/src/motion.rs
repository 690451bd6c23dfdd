//! Easing along an edge.

use fleet_core::Point;

/// `t²(3 − 2t)` on `t` clamped to `[0, 1]`.
///
/// Zero slope at both ends, so a robot eases out of one vertex and into the
/// next.
#[inline]
pub fn smooth_step(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Eased position `progress` of the way from `from` to `to`.
#[inline]
pub fn interpolate(from: Point, to: Point, progress: f64) -> Point {
    from.lerp(to, smooth_step(progress))
}
