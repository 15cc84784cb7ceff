//! Configuration types for loading run settings from YAML.
//!
//! [`SettingsConfig`] is a thin, `serde`-deserializable mirror of
//! [`Settings`] in which every field is optional. Layers are merged in the
//! order defaults < YAML file < command line, and the result is turned into
//! the immutable runtime [`Settings`].
//!
//! # YAML format
//!
//! ```yaml
//! num_bodies: 2000
//! num_steps: 500
//! num_workers: 8
//! theta: 0.5              # 0 -> exact pairwise sum
//! g: 6.67e-11             # gravitational constant
//! dt: 1.0                 # time step
//! softening: 0.0          # eps^2 added to d^2
//! domain_radius: 500000.0
//! mass: 100.0             # mass of generated bodies
//! boundary_margin: 1.0    # slack around the root quadrant
//! gui_enabled: false
//! ring_formation_enabled: true
//! seed: 42
//! ```
//!
//! Omitted keys keep their default (see [`Settings::default`]); unknown
//! keys are rejected.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::simulation::params::Settings;

/// Optional overrides for every [`Settings`] field
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsConfig {
    pub num_bodies: Option<usize>,
    pub num_steps: Option<usize>,
    pub num_workers: Option<usize>,
    pub theta: Option<f64>,
    pub g: Option<f64>,
    pub dt: Option<f64>,
    pub softening: Option<f64>,
    pub domain_radius: Option<f64>,
    pub mass: Option<f64>,
    pub boundary_margin: Option<f64>,
    pub gui_enabled: Option<bool>,
    pub ring_formation_enabled: Option<bool>,
    pub seed: Option<u64>,
}

impl SettingsConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("invalid settings YAML")
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_yaml::from_reader(reader).context("invalid settings YAML")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("cannot open settings file {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("while reading {}", path.display()))
    }

    /// Layer `over` on top of `self`; fields set in `over` win.
    pub fn merge(self, over: SettingsConfig) -> SettingsConfig {
        SettingsConfig {
            num_bodies: over.num_bodies.or(self.num_bodies),
            num_steps: over.num_steps.or(self.num_steps),
            num_workers: over.num_workers.or(self.num_workers),
            theta: over.theta.or(self.theta),
            g: over.g.or(self.g),
            dt: over.dt.or(self.dt),
            softening: over.softening.or(self.softening),
            domain_radius: over.domain_radius.or(self.domain_radius),
            mass: over.mass.or(self.mass),
            boundary_margin: over.boundary_margin.or(self.boundary_margin),
            gui_enabled: over.gui_enabled.or(self.gui_enabled),
            ring_formation_enabled: over.ring_formation_enabled.or(self.ring_formation_enabled),
            seed: over.seed.or(self.seed),
        }
    }

    /// Fill unset fields from [`Settings::default`]. Validation happens when
    /// the settings reach the engine.
    pub fn into_settings(self) -> Settings {
        let d = Settings::default();
        Settings {
            num_bodies: self.num_bodies.unwrap_or(d.num_bodies),
            num_steps: self.num_steps.unwrap_or(d.num_steps),
            num_workers: self.num_workers.unwrap_or(d.num_workers),
            theta: self.theta.unwrap_or(d.theta),
            g: self.g.unwrap_or(d.g),
            dt: self.dt.unwrap_or(d.dt),
            softening: self.softening.unwrap_or(d.softening),
            domain_radius: self.domain_radius.unwrap_or(d.domain_radius),
            mass: self.mass.unwrap_or(d.mass),
            boundary_margin: self.boundary_margin.unwrap_or(d.boundary_margin),
            gui_enabled: self.gui_enabled.unwrap_or(d.gui_enabled),
            ring_formation_enabled: self.ring_formation_enabled.unwrap_or(d.ring_formation_enabled),
            seed: self.seed.or(d.seed),
        }
    }
}
