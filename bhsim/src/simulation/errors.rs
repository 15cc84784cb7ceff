//! Error type shared by the simulation engine.

use thiserror::Error;

/// Everything that can stop a run.
///
/// Configuration and body errors are raised before any worker starts.
/// The remaining variants are raised during the run and are always fatal:
/// a phase that did not complete leaves the tree or the force
/// accumulators inconsistent for the next phase.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("body {index} is invalid: {reason}")]
    InvalidBody { index: usize, reason: String },

    #[error("body {index} lies outside the root quadrant")]
    BodyOutsideDomain { index: usize },

    #[error("bodies {first} and {second} occupy the same position, the quadtree cannot separate them")]
    CoincidentBodies { first: usize, second: usize },

    #[error("phase barrier broken, run aborted")]
    BarrierBroken,

    #[error("worker {id} panicked")]
    WorkerPanicked { id: usize },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("shared quadtree lock poisoned")]
    TreePoisoned,
}
