//! Run driver
//!
//! `Simulation` validates the settings and the initial bodies, then runs
//! a fixed pool of `num_workers` scoped threads for `num_steps` steps and
//! returns a `RunReport` with the final bodies and the elapsed time.

use std::sync::RwLock;
use std::thread;
use std::time::Duration;

use log::{error, info};

use crate::simulation::barnes_hut::QuadTree;
use crate::simulation::barrier::PhaseBarrier;
use crate::simulation::errors::SimError;
use crate::simulation::params::Settings;
use crate::simulation::states::{Body, BodyStore};
use crate::simulation::timer::Timer;
use crate::simulation::worker::{SnapshotSink, Worker, WorkerContext};

#[derive(Debug)]
pub struct Simulation {
    settings: Settings,
    bodies: Vec<Body>,
}

/// What a finished run hands back to the caller
#[derive(Debug, Clone)]
pub struct RunReport {
    pub steps: usize,
    pub elapsed: Duration,
    pub bodies: Vec<Body>,
}

impl RunReport {
    pub fn log(&self) {
        info!("> execution time: {:.6} s", self.elapsed.as_secs_f64());
        info!("> steps: {}, bodies: {}", self.steps, self.bodies.len());
        if self.steps > 0 {
            info!("> average step time: {:.6} s", self.elapsed.as_secs_f64() / self.steps as f64);
        }
    }
}

impl Simulation {
    /// Check settings and bodies; nothing runs yet.
    pub fn new(settings: Settings, bodies: Vec<Body>) -> Result<Self, SimError> {
        settings.validate()?;

        if bodies.len() != settings.num_bodies {
            return Err(SimError::InvalidConfig(format!(
                "num_bodies is {} but {} bodies were supplied",
                settings.num_bodies,
                bodies.len()
            )));
        }

        for (index, b) in bodies.iter().enumerate() {
            let reason = if !(b.x.x.is_finite() && b.x.y.is_finite()) {
                "position is not finite"
            } else if !(b.v.x.is_finite() && b.v.y.is_finite()) {
                "velocity is not finite"
            } else if !(b.m.is_finite() && b.m > 0.0) {
                "mass must be finite and > 0"
            } else {
                continue;
            };
            return Err(SimError::InvalidBody { index, reason: reason.to_string() });
        }

        Ok(Self { settings, bodies })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Run every step on the worker pool.
    ///
    /// `sink`, when given, is called by worker 0 after every step.
    /// The first real failure of any worker aborts the run and is returned;
    /// the `BarrierBroken` errors it causes in the other workers are not.
    pub fn run(self, mut sink: Option<&mut dyn SnapshotSink>) -> Result<RunReport, SimError> {
        let Simulation { settings, bodies } = self;
        let num_workers = settings.num_workers;

        info!(
            "starting run: {} bodies, {} steps, {} workers",
            settings.num_bodies, settings.num_steps, num_workers
        );

        let store = BodyStore::from_bodies(&bodies);
        let tree = RwLock::new(QuadTree::default());
        let barrier = PhaseBarrier::new(num_workers);

        let mut timer = Timer::start();

        let outcome = thread::scope(|s| {
            let mut handles = Vec::with_capacity(num_workers);
            let mut failure = None;

            for id in 0..num_workers {
                let ctx = WorkerContext {
                    bodies: &store,
                    tree: &tree,
                    barrier: &barrier,
                    settings: &settings,
                };
                let worker_sink = if id == 0 { sink.take() } else { None };

                let spawned = thread::Builder::new()
                    .name(format!("bhsim-worker-{id}"))
                    .spawn_scoped(s, move || Worker::new(id, ctx, worker_sink).run());

                match spawned {
                    Ok(handle) => handles.push((id, handle)),
                    Err(e) => {
                        error!("failed to spawn worker {id}: {e}");
                        barrier.abort();
                        failure = Some(SimError::Spawn(e));
                        break;
                    }
                }
            }

            for (id, handle) in handles {
                let result = handle.join().unwrap_or(Err(SimError::WorkerPanicked { id }));
                if let Err(e) = result {
                    failure = match failure {
                        None | Some(SimError::BarrierBroken) => Some(e),
                        kept => kept,
                    };
                }
            }

            match failure {
                Some(e) => Err(e),
                None => Ok(()),
            }
        });

        let elapsed = timer.stop();
        outcome?;

        Ok(RunReport {
            steps: settings.num_steps,
            elapsed,
            bodies: store.snapshot(),
        })
    }
}
