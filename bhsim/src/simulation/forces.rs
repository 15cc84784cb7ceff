//! Newtonian gravity between point masses
//!
//! `pairwise_force` is the single force law used by both the quadtree
//! traversal and the direct O(N^2) sum, so with theta = 0 the two only
//! differ by summation order.

use crate::simulation::states::{Body, NVec2};

/// Force exerted on a mass `m_i` at `x_i` by a mass `m_j` at `x_j`
///
/// `F = G * m_i * m_j / (d^2 + eps2)`, directed from `x_i` toward `x_j`.
/// With `eps2 = 0` two coincident masses give a non-finite result, which
/// is propagated as is.
#[inline]
pub fn pairwise_force(x_i: NVec2, m_i: f64, x_j: NVec2, m_j: f64, g: f64, eps2: f64) -> NVec2 {
    // r points from i to j, i is pulled along +r
    let r = x_j - x_i;
    let d2 = r.dot(&r) + eps2;
    let d = d2.sqrt();
    let magnitude = g * m_i * m_j / d2;

    r * (magnitude / d)
}

/// Exact force on every body, summed over each unordered pair once
pub fn direct_forces(bodies: &[Body], g: f64, eps2: f64) -> Vec<NVec2> {
    let n = bodies.len();
    let mut out = vec![NVec2::zeros(); n];

    for i in 0..n {
        let bi = &bodies[i];
        for j in (i + 1)..n {
            let bj = &bodies[j];
            let f = pairwise_force(bi.x, bi.m, bj.x, bj.m, g, eps2);

            // equal and opposite
            out[i] += f;
            out[j] -= f;
        }
    }

    out
}
