use bhsim::{build_bodies, Settings, SettingsConfig, Simulation};
use bhsim::{bench_forces, bench_workers};

use anyhow::Result;
use clap::Parser;
use log::info;

use std::path::PathBuf;

/// Multithreaded 2D Barnes-Hut n-body simulation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of bodies
    #[arg(short = 'n', long = "bodies")]
    num_bodies: Option<usize>,

    /// Number of steps
    #[arg(short = 's', long = "steps")]
    num_steps: Option<usize>,

    /// Number of worker threads (default: number of CPUs)
    #[arg(short = 'w', long = "workers")]
    num_workers: Option<usize>,

    /// Approximation threshold, 0 for the exact pairwise sum
    #[arg(short, long)]
    theta: Option<f64>,

    /// Seed for the initial conditions
    #[arg(long)]
    seed: Option<u64>,

    /// Show the simulation in a window (needs the `vis` feature)
    #[arg(short, long, default_value_t = false)]
    gui: bool,

    /// Ring formation around a massive central body
    #[arg(short, long, default_value_t = false)]
    ring: bool,

    /// YAML settings file, overridden by the flags above
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print timing tables instead of running a simulation
    #[arg(long, default_value_t = false)]
    bench: bool,
}

impl Args {
    fn overrides(&self) -> SettingsConfig {
        SettingsConfig {
            num_bodies: self.num_bodies,
            num_steps: self.num_steps,
            num_workers: self.num_workers,
            theta: self.theta,
            seed: self.seed,
            gui_enabled: self.gui.then_some(true),
            ring_formation_enabled: self.ring.then_some(true),
            ..SettingsConfig::default()
        }
    }
}

// load here to keep main clean
fn load_settings(args: &Args) -> Result<Settings> {
    let file_cfg = match &args.config {
        Some(path) => SettingsConfig::from_path(path)?,
        None => SettingsConfig::default(),
    };

    Ok(file_cfg.merge(args.overrides()).into_settings())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_forces()?;
        bench_workers()?;
        return Ok(());
    }

    let settings = load_settings(&args)?;
    settings.validate()?;
    info!("> simulating the gravitational n-body problem with the following settings:\n{settings}");

    let bodies = build_bodies(&settings);

    if settings.gui_enabled {
        #[cfg(feature = "vis")]
        return viewer::run_with_viewer(settings, bodies);

        #[cfg(not(feature = "vis"))]
        log::warn!("built without the `vis` feature, running headless");
    }

    let report = Simulation::new(settings, bodies)?.run(None)?;
    report.log();

    Ok(())
}

#[cfg(feature = "vis")]
mod viewer {
    use anyhow::{bail, Result};
    use log::info;

    use bhsim::{run_2d, snapshot_channel, Body, Settings, Simulation};

    /// Simulation on a background thread, window on the main thread.
    pub fn run_with_viewer(settings: Settings, bodies: Vec<Body>) -> Result<()> {
        let (mut sink, feed) = snapshot_channel(&settings, &bodies);
        let simulation = Simulation::new(settings, bodies)?;

        let runner = std::thread::Builder::new()
            .name("bhsim-driver".into())
            .spawn(move || simulation.run(Some(&mut sink)))?;

        run_2d(feed);

        if !runner.is_finished() {
            info!("viewer closed before the run finished, exiting");
            return Ok(());
        }

        match runner.join() {
            Ok(Ok(report)) => report.log(),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => bail!("simulation thread panicked"),
        }

        Ok(())
    }
}
