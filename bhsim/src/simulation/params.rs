//! Numerical and physical settings for a run
//!
//! `Settings` holds everything the engine reads:
//! - body, step and worker counts,
//! - approximation threshold `theta`,
//! - gravitational constant, time step and softening,
//! - domain radius and body mass used by the generators,
//! - viewer / ring-formation toggles and the random seed
//!
//! Built once (see `configuration::config`) and only borrowed afterwards.

use std::fmt;

use super::errors::SimError;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub num_bodies: usize,
    pub num_steps: usize,
    pub num_workers: usize,
    pub theta: f64, // opening threshold, 0 = exact pairwise sum
    pub g: f64, // gravitational constant
    pub dt: f64, // time step
    pub softening: f64, // eps^2 added to d^2, 0 = no softening
    pub domain_radius: f64, // half side of the initial domain
    pub mass: f64, // mass of generated bodies
    pub boundary_margin: f64, // slack added around the root quadrant
    pub gui_enabled: bool,
    pub ring_formation_enabled: bool,
    pub seed: Option<u64>,
}

pub const DEFAULT_NUM_BODIES: usize = 1000;
pub const DEFAULT_NUM_STEPS: usize = 1000;
pub const DEFAULT_THETA: f64 = 0.5;
pub const DEFAULT_G: f64 = 6.67e-11;
pub const DEFAULT_DT: f64 = 1.0;
pub const DEFAULT_DOMAIN_RADIUS: f64 = 500_000.0;
pub const DEFAULT_MASS: f64 = 100.0;
pub const DEFAULT_BOUNDARY_MARGIN: f64 = 1.0;

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_bodies: DEFAULT_NUM_BODIES,
            num_steps: DEFAULT_NUM_STEPS,
            num_workers: num_cpus::get(),
            theta: DEFAULT_THETA,
            g: DEFAULT_G,
            dt: DEFAULT_DT,
            softening: 0.0,
            domain_radius: DEFAULT_DOMAIN_RADIUS,
            mass: DEFAULT_MASS,
            boundary_margin: DEFAULT_BOUNDARY_MARGIN,
            gui_enabled: false,
            ring_formation_enabled: false,
            seed: None,
        }
    }
}

impl Settings {
    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_bodies == 0 {
            return Err(invalid("num_bodies must be at least 1"));
        }
        if self.num_steps == 0 {
            return Err(invalid("num_steps must be at least 1"));
        }
        if self.num_workers == 0 {
            return Err(invalid("num_workers must be at least 1"));
        }

        non_negative("theta", self.theta)?;
        non_negative("g", self.g)?;
        non_negative("softening", self.softening)?;
        positive("dt", self.dt)?;
        positive("domain_radius", self.domain_radius)?;
        positive("mass", self.mass)?;
        positive("boundary_margin", self.boundary_margin)?;

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> SimError {
    SimError::InvalidConfig(msg.into())
}

fn positive(name: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be finite and > 0, got {value}")))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be finite and >= 0, got {value}")))
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "\t- num_bodies={}", self.num_bodies)?;
        writeln!(f, "\t- num_steps={}", self.num_steps)?;
        writeln!(f, "\t- num_workers={}", self.num_workers)?;
        writeln!(f, "\t- theta={}", self.theta)?;
        writeln!(f, "\t- g={:e}", self.g)?;
        writeln!(f, "\t- dt={}", self.dt)?;
        writeln!(f, "\t- softening={}", self.softening)?;
        writeln!(f, "\t- domain_radius={}", self.domain_radius)?;
        writeln!(f, "\t- mass={}", self.mass)?;
        writeln!(f, "\t- boundary_margin={}", self.boundary_margin)?;
        writeln!(f, "\t- gui_enabled={}", self.gui_enabled)?;
        writeln!(f, "\t- ring_formation_enabled={}", self.ring_formation_enabled)?;
        match self.seed {
            Some(seed) => write!(f, "\t- seed={seed}"),
            None => write!(f, "\t- seed=<entropy>"),
        }
    }
}
