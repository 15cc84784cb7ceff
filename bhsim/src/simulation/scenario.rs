//! Initial conditions
//!
//! Two generators produce the body array a run starts from:
//! - `uniform_bodies`: bodies scattered uniformly over `[0, 2R)^2` with small random velocities
//! - `ring_bodies`:    a massive central body with the rest on a ring, orbiting clockwise
//!
//! `R` is `Settings::domain_radius`. Both are seeded from `Settings::seed`
//! when one is given so runs can be reproduced.

use std::f64::consts::PI;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::simulation::params::Settings;
use crate::simulation::states::{Body, NVec2};

/// Mass of the central body of the ring formation
pub const CENTRAL_MASS: f64 = 1e18;

/// Random velocity components are drawn from `[-MAX_SPEED, MAX_SPEED)`
const MAX_SPEED: f64 = 12.5;

/// Ring bodies sit between these fractions of the domain radius
const RING_INNER: f64 = 0.6;
const RING_OUTER: f64 = 0.8;

/// Orbital speed of ring bodies
const RING_SPEED: f64 = 15.0;

/// Generator chosen by `ring_formation_enabled`
pub fn build_bodies(settings: &Settings) -> Vec<Body> {
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if settings.ring_formation_enabled {
        debug!("generating {} bodies in ring formation", settings.num_bodies);
        ring_bodies(settings, &mut rng)
    } else {
        debug!("generating {} uniformly distributed bodies", settings.num_bodies);
        uniform_bodies(settings, &mut rng)
    }
}

pub fn uniform_bodies<R: Rng>(settings: &Settings, rng: &mut R) -> Vec<Body> {
    let diameter = 2.0 * settings.domain_radius;

    (0..settings.num_bodies).map(|_| {
        let x = NVec2::new(rng.gen::<f64>() * diameter, rng.gen::<f64>() * diameter);
        let v = NVec2::new(
            rng.gen_range(-MAX_SPEED..MAX_SPEED),
            rng.gen_range(-MAX_SPEED..MAX_SPEED),
        );
        Body::new(x, v, settings.mass)
    }).collect()
}

/// Body 0 is the central mass at rest in the middle of the domain.
pub fn ring_bodies<R: Rng>(settings: &Settings, rng: &mut R) -> Vec<Body> {
    let r = settings.domain_radius;
    let center = NVec2::new(r, r);

    let mut bodies = Vec::with_capacity(settings.num_bodies);
    if settings.num_bodies == 0 {
        return bodies;
    }
    bodies.push(Body::new(center, NVec2::zeros(), CENTRAL_MASS));

    for _ in 1..settings.num_bodies {
        let unit = random_unit_vector(rng);
        let distance = rng.gen_range(RING_INNER * r..RING_OUTER * r);
        let x = center + unit * distance;
        let v = orthogonal(&unit) * RING_SPEED;
        bodies.push(Body::new(x, v, settings.mass));
    }

    bodies
}

pub fn random_unit_vector<R: Rng>(rng: &mut R) -> NVec2 {
    let angle = rng.gen::<f64>() * 2.0 * PI;
    NVec2::new(angle.cos(), angle.sin())
}

/// `v` rotated a quarter turn clockwise
pub fn orthogonal(v: &NVec2) -> NVec2 {
    NVec2::new(v.y, -v.x)
}
