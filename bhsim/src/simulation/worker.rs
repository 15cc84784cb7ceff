//! One simulation worker thread
//!
//! Every worker runs the same three-phase step, separated by the shared
//! [`PhaseBarrier`]:
//!
//! 1. build  – worker 0 rebuilds the quadtree, the others wait
//! 2. force  – each worker accumulates the force on its own bodies
//! 3. move   – each worker integrates its own bodies
//!
//! after which worker 0 hands a snapshot to the optional [`SnapshotSink`].
//!
//! Worker `id` owns the bodies `{ i : i mod num_workers == id }`. Nobody
//! writes a body outside their partition, and the tree is only written
//! in the build phase, so no locking happens on the hot path.

use std::sync::RwLock;

use log::{debug, error};

use super::barnes_hut::QuadTree;
use super::barrier::{AbortOnPanic, PhaseBarrier};
use super::errors::SimError;
use super::integrator::semi_implicit_euler;
use super::params::Settings;
use super::states::{Body, BodyStore};

/// Receives a read-only copy of the bodies once per completed step.
pub trait SnapshotSink: Send {
    fn snapshot(&mut self, step: usize, bodies: &[Body]);
}

impl<F> SnapshotSink for F
where
    F: FnMut(usize, &[Body]) + Send,
{
    fn snapshot(&mut self, step: usize, bodies: &[Body]) {
        self(step, bodies)
    }
}

/// Indices owned by `worker_id`: `worker_id, worker_id + w, worker_id + 2w, ...`
pub fn partition(worker_id: usize, num_workers: usize, num_bodies: usize) -> impl Iterator<Item = usize> {
    (worker_id..num_bodies).step_by(num_workers.max(1))
}

/// Shared state borrowed by every worker for the duration of a run
pub struct WorkerContext<'a> {
    pub bodies: &'a BodyStore,
    pub tree: &'a RwLock<QuadTree>,
    pub barrier: &'a PhaseBarrier,
    pub settings: &'a Settings,
}

pub struct Worker<'a, 's> {
    id: usize,
    ctx: WorkerContext<'a>,
    sink: Option<&'a mut (dyn SnapshotSink + 's)>,
}

impl<'a, 's> Worker<'a, 's> {
    pub fn new(id: usize, ctx: WorkerContext<'a>, sink: Option<&'a mut (dyn SnapshotSink + 's)>) -> Self {
        Self { id, ctx, sink }
    }

    /// Run all steps. Any failure breaks the barrier so that the other
    /// workers stop at their next rendezvous instead of waiting forever.
    pub fn run(mut self) -> Result<(), SimError> {
        let barrier = self.ctx.barrier;
        let _guard = AbortOnPanic::new(barrier, self.id);

        debug!("worker {} started", self.id);
        let result = self.run_steps();
        match &result {
            Ok(()) => debug!("worker {} finished", self.id),
            Err(SimError::BarrierBroken) => debug!("worker {} stopped: barrier broken", self.id),
            Err(e) => {
                error!("worker {} failed: {}", self.id, e);
                barrier.abort();
            }
        }
        result
    }

    fn run_steps(&mut self) -> Result<(), SimError> {
        let barrier = self.ctx.barrier;

        for step in 0..self.ctx.settings.num_steps {
            if self.id == 0 {
                self.build()?;
            }
            barrier.wait()?;

            self.compute_forces()?;
            barrier.wait()?;

            self.move_bodies();
            barrier.wait()?;

            if let Some(sink) = self.sink.as_deref_mut() {
                sink.snapshot(step, &self.ctx.bodies.snapshot());
            }
        }

        Ok(())
    }

    /// Rebuild the shared tree from the current positions (worker 0 only).
    fn build(&self) -> Result<(), SimError> {
        let mut tree = self.ctx.tree.write().map_err(|_| SimError::TreePoisoned)?;
        tree.rebuild(self.ctx.bodies, self.ctx.settings.boundary_margin)
    }

    fn compute_forces(&self) -> Result<(), SimError> {
        let WorkerContext { bodies, tree, settings, .. } = &self.ctx;
        let tree = tree.read().map_err(|_| SimError::TreePoisoned)?;

        for i in self.owned() {
            let f = bodies.force(i) + tree.compute_force(i, *bodies, settings);
            bodies.set_force(i, f);
        }

        Ok(())
    }

    fn move_bodies(&self) {
        let bodies = self.ctx.bodies;
        let dt = self.ctx.settings.dt;

        for i in self.owned() {
            let mut b = bodies.get(i);
            semi_implicit_euler(&mut b, dt);
            bodies.set(i, &b);
        }
    }

    fn owned(&self) -> impl Iterator<Item = usize> {
        let s = self.ctx.settings;
        partition(self.id, s.num_workers, s.num_bodies)
    }
}
