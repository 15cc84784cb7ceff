pub mod states;
pub mod params;
pub mod errors;
pub mod quadrant;
pub mod barnes_hut;
pub mod forces;
pub mod integrator;
pub mod barrier;
pub mod worker;
pub mod engine;
pub mod scenario;
pub mod timer;
