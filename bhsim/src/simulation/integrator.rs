//! Fixed-step time integration for a single body
//!
//! Semi-implicit Euler: the velocity change comes from the force
//! accumulated this step, and the position advances with the average of
//! the old and new velocity. The force accumulator is cleared afterwards
//! so the next force phase starts from zero.

use super::states::{Body, NVec2};

/// Advance `b` by one step of length `dt` and zero its force.
///
/// ```text
/// dv = (f / m) * dt
/// dp = (v + dv / 2) * dt
/// v += dv,  x += dp,  f = 0
/// ```
pub fn semi_implicit_euler(b: &mut Body, dt: f64) {
    let dv = (b.f / b.m) * dt;
    let dp = (b.v + dv / 2.0) * dt;

    b.v += dv;
    b.x += dp;
    b.f = NVec2::zeros();
}
