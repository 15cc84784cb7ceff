pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use simulation::states::{Body, BodySource, BodyStore, NVec2};
pub use simulation::params::Settings;
pub use simulation::errors::SimError;
pub use simulation::quadrant::Quadrant;
pub use simulation::barnes_hut::{NodeKind, QuadNode, QuadTree};
pub use simulation::forces::{direct_forces, pairwise_force};
pub use simulation::integrator::semi_implicit_euler;
pub use simulation::worker::{partition, SnapshotSink};
pub use simulation::engine::{RunReport, Simulation};
pub use simulation::scenario::build_bodies;

pub use configuration::config::SettingsConfig;

#[cfg(feature = "vis")]
pub use visualization::bhsim_vis2d::{run_2d, snapshot_channel, ChannelSink, SnapshotFeed};

pub use benchmark::benchmark::{bench_forces, bench_workers};
