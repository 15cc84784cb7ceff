//! Timing tables, printed as CSV so they can be pasted into a spreadsheet.
//!
//! - `bench_forces`:  one full force evaluation, direct sum vs quadtree
//! - `bench_workers`: whole runs of the worker pool for growing worker counts

use std::time::Instant;

use anyhow::Result;

use crate::simulation::barnes_hut::QuadTree;
use crate::simulation::engine::Simulation;
use crate::simulation::forces::direct_forces;
use crate::simulation::params::Settings;
use crate::simulation::states::{Body, NVec2};

/// Deterministic spread of `n` unit masses, no rng needed
fn make_bodies(n: usize) -> Vec<Body> {
    (0..n).map(|i| {
        let i_f = i as f64;
        let x = NVec2::new(
            (i_f * 0.37).sin() * 500.0 + i_f * 1e-3,
            (i_f * 0.13).cos() * 500.0 + i_f * 2e-3,
        );
        Body::new(x, NVec2::zeros(), 1.0)
    }).collect()
}

fn make_settings(n: usize) -> Settings {
    Settings {
        num_bodies: n,
        num_steps: 5,
        g: 0.1,
        softening: 1e-4,
        theta: 0.7,
        seed: Some(42),
        ..Settings::default()
    }
}

pub fn bench_forces() -> Result<()> {
    println!("N,direct_ms,bh_ms");

    for n in [200, 400, 800, 1600, 3200, 6400, 12800] {
        let bodies = make_bodies(n);
        let settings = make_settings(n);

        let t0 = Instant::now();
        let direct = direct_forces(&bodies, settings.g, settings.softening);
        let ms_direct = t0.elapsed().as_secs_f64() * 1000.0;

        // build included, it is part of every step
        let t1 = Instant::now();
        let mut tree = QuadTree::default();
        tree.rebuild(&bodies[..], settings.boundary_margin)?;
        let approx: Vec<NVec2> = (0..n).map(|i| tree.compute_force(i, &bodies[..], &settings)).collect();
        let ms_bh = t1.elapsed().as_secs_f64() * 1000.0;

        // keep both results alive so neither loop is optimized out
        assert_eq!(direct.len(), approx.len());
        println!("{},{:.6},{:.6}", n, ms_direct, ms_bh);
    }

    Ok(())
}

pub fn bench_workers() -> Result<()> {
    let n = 6400;
    let max_workers = num_cpus::get().max(1);

    println!("workers,run_ms,step_ms");

    let mut workers = 1;
    while workers <= max_workers {
        let settings = Settings { num_workers: workers, ..make_settings(n) };
        let report = Simulation::new(settings, make_bodies(n))?.run(None)?;

        let ms = report.elapsed.as_secs_f64() * 1000.0;
        println!("{},{:.6},{:.6}", workers, ms, ms / report.steps as f64);
        workers *= 2;
    }

    Ok(())
}
