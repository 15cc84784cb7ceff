//! Core state types for the N-body simulation.
//!
//! - `Body`       value type using `NVec2` (position, velocity, accumulated force, mass)
//! - `BodyStore`  the shared body array the worker threads read and write
//! - `BodySource` read access to positions and masses, used by the quadtree
//!
//! Workers never hold `&mut` to the shared array. Each slot stores its
//! fields as atomic bit patterns, every write goes to a body owned by the
//! writing worker's partition, and the phase barrier orders the writes of
//! one phase before the reads of the next.

use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub f: NVec2, // accumulated force, zeroed after every move
    pub m: f64, // mass
}

impl Body {
    /// Body with the given position, velocity and mass and zero accumulated force
    pub fn new(x: NVec2, v: NVec2, m: f64) -> Self {
        Self { x, v, f: NVec2::zeros(), m }
    }

    /// Linear momentum `m * v`
    pub fn momentum(&self) -> NVec2 {
        self.v * self.m
    }
}

/// Read-only view of body positions and masses.
///
/// The quadtree stores body indices only and looks positions up through
/// this trait, so it works the same on a plain slice (tests, benchmarks)
/// and on the shared [`BodyStore`] (worker loop).
pub trait BodySource {
    fn len(&self) -> usize;
    fn position(&self, i: usize) -> NVec2;
    fn mass(&self, i: usize) -> f64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BodySource for [Body] {
    fn len(&self) -> usize {
        <[Body]>::len(self)
    }

    fn position(&self, i: usize) -> NVec2 {
        self[i].x
    }

    fn mass(&self, i: usize) -> f64 {
        self[i].m
    }
}

#[derive(Debug)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

#[derive(Debug)]
struct AtomicVec2([AtomicF64; 2]);

impl AtomicVec2 {
    fn new(v: NVec2) -> Self {
        Self([AtomicF64::new(v.x), AtomicF64::new(v.y)])
    }

    fn load(&self) -> NVec2 {
        NVec2::new(self.0[0].load(), self.0[1].load())
    }

    fn store(&self, v: NVec2) {
        self.0[0].store(v.x);
        self.0[1].store(v.y);
    }
}

#[derive(Debug)]
struct BodySlot {
    x: AtomicVec2,
    v: AtomicVec2,
    f: AtomicVec2,
    m: f64, // never changes during a run
}

/// The shared body array.
///
/// Relaxed loads and stores are enough here: the phase barrier
/// (a mutex/condvar rendezvous) provides the happens-before edge between
/// the phase that writes a slot and the phase that reads it.
#[derive(Debug)]
pub struct BodyStore {
    slots: Vec<BodySlot>,
}

impl BodyStore {
    pub fn from_bodies(bodies: &[Body]) -> Self {
        let slots = bodies.iter().map(|b| BodySlot {
            x: AtomicVec2::new(b.x),
            v: AtomicVec2::new(b.v),
            f: AtomicVec2::new(b.f),
            m: b.m,
        }).collect();

        Self { slots }
    }

    /// Copy of body `i`
    pub fn get(&self, i: usize) -> Body {
        let slot = &self.slots[i];
        Body {
            x: slot.x.load(),
            v: slot.v.load(),
            f: slot.f.load(),
            m: slot.m,
        }
    }

    /// Overwrite position, velocity and force of body `i` (mass is fixed)
    pub fn set(&self, i: usize, body: &Body) {
        let slot = &self.slots[i];
        slot.x.store(body.x);
        slot.v.store(body.v);
        slot.f.store(body.f);
    }

    pub fn force(&self, i: usize) -> NVec2 {
        self.slots[i].f.load()
    }

    pub fn set_force(&self, i: usize, f: NVec2) {
        self.slots[i].f.store(f);
    }

    /// Copy of every body, in index order
    pub fn snapshot(&self) -> Vec<Body> {
        (0..self.slots.len()).map(|i| self.get(i)).collect()
    }
}

impl BodySource for BodyStore {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn position(&self, i: usize) -> NVec2 {
        self.slots[i].x.load()
    }

    fn mass(&self, i: usize) -> f64 {
        self.slots[i].m
    }
}
