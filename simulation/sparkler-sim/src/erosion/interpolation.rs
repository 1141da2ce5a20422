//! Angular interpolation primitives

use std::f32::consts::{PI, TAU};

/// Catmull-Rom interpolation between `p1` and `p2` that never dips below either
///
/// The plain spline overshoots below its control points when a neighbour
/// jumps ahead; flooring at `min(p1, p2)` removes that dip.
pub fn catmull_rom_clamped(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let result = 0.5
        * ((2.0 * p1)
            + (-p0 + p2) * t
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
            + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3);

    result.max(p1.min(p2))
}

/// Wrap an angle into `[0, 2π)`; non-finite angles map to 0
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shortest angular distance between two angles, in `[0, π]`
#[inline]
pub fn angular_distance(a: f32, b: f32) -> f32 {
    let diff = (wrap_angle(a) - wrap_angle(b)).abs();
    if diff > PI { TAU - diff } else { diff }
}

/// Gaussian weight at `distance` for standard deviation `sigma`, cut to zero past 3σ
#[inline]
pub fn gaussian_falloff(distance: f32, sigma: f32) -> f32 {
    if sigma <= 0.0 || distance >= sigma * 3.0 {
        return 0.0;
    }
    (-(distance * distance) / (2.0 * sigma * sigma)).exp()
}
