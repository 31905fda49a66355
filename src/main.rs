use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use gravsim::{space, DVec2, Params, Position, Scenario, ScenarioConfig, Simulation};

/// Headless runner: loads a scenario and advances it frame by frame.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Scenario YAML file; the built-in Sun/Earth/Moon system when omitted
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 1000)]
    frames: u64,

    /// Override the scenario's ticks per frame
    #[arg(long)]
    substeps: Option<u32>,

    /// Override the scenario's simulated seconds per frame
    #[arg(long)]
    timestep: Option<f64>,

    /// Override the scenario's gravitational constant
    #[arg(long)]
    gravity: Option<f64>,

    /// Log a summary every N frames (0 disables)
    #[arg(long, default_value_t = 100)]
    report_every: u64,
}

fn load_scenario(args: &Args) -> Result<ScenarioConfig> {
    match &args.scenario {
        Some(path) => ScenarioConfig::load(path)
            .with_context(|| format!("failed to load scenario {}", path.display())),
        None => Ok(ScenarioConfig::solar_system()),
    }
}

fn params_with_overrides(args: &Args, params: &Params) -> Result<Params> {
    Params::new(
        args.timestep.unwrap_or(params.timestep()),
        args.gravity.unwrap_or(params.gravity()),
        args.substeps.unwrap_or(params.substeps()),
    )
    .context("invalid simulation parameters")
}

fn report(sim: &Simulation, params: &Params) {
    let bodies = sim.bodies();
    let extent = space::aabb(bodies.iter().map(|body| body.pos()))
        .map_or(DVec2::zero(), |(_, size)| size);
    let momentum = space::total_momentum(bodies);
    let energy = space::kinetic_energy(bodies) + space::potential_energy(bodies, params.gravity());

    info!(
        frame = sim.frames(),
        elapsed = format_args!("{:.3e} s", sim.elapsed()),
        bodies = bodies.len(),
        mass = format_args!("{:.4e}", space::total_mass(bodies)),
        momentum = format_args!("({:.4e}, {:.4e})", momentum.x, momentum.y),
        energy = format_args!("{energy:.4e}"),
        extent = format_args!("{:.3e} x {:.3e}", extent.x, extent.y),
        "summary"
    );
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let cfg = load_scenario(&args)?;
    let Scenario { params, mut simulation } = Scenario::build(&cfg)?;
    let params = params_with_overrides(&args, &params)?;

    debug!(?params, "starting");

    for _ in 0..args.frames {
        let collision = simulation
            .update(&params)
            .with_context(|| format!("frame {} failed", simulation.frames() + 1))?;

        if let Some(collision) = collision {
            info!(
                frame = simulation.frames(),
                first = %collision.first.id(),
                second = %collision.second.id(),
                merged = %collision.merged,
                mass = format_args!("{:.4e}", collision.first.mass() + collision.second.mass()),
                "collision"
            );
        }

        if args.report_every > 0 && simulation.frames() % args.report_every == 0 {
            report(&simulation, &params);
        }
    }

    report(&simulation, &params);

    for body in simulation.bodies() {
        info!(
            id = %body.id(),
            pos = format_args!("({:.4e}, {:.4e})", body.pos().x, body.pos().y),
            vel = format_args!("({:.4e}, {:.4e})", body.vel().x, body.vel().y),
            mass = format_args!("{:.4e}", body.mass()),
            radius = format_args!("{:.4e}", body.radius()),
            "final state"
        );
    }

    Ok(())
}
