use core::f64::consts::{FRAC_PI_2, PI, TAU};

use fastrand::Rng;
use tracing::info;
use ultraviolet::{DRotor2, DVec2};

use crate::{
    config::{BodyConfig, ScenarioConfig, SwarmConfig},
    error::{GravsimError, Result},
    physics::{Body, Position},
    simulation::{Params, Simulation},
    space,
};

/// A runnable scenario: the per-frame parameters and the live bodies.
#[derive(Debug)]
pub struct Scenario {
    pub params: Params,
    pub simulation: Simulation,
}

impl Scenario {
    pub fn build(cfg: &ScenarioConfig) -> Result<Self> {
        let params = cfg.params.to_params()?;

        let mut bodies = cfg
            .bodies
            .iter()
            .map(build_body)
            .collect::<Result<Vec<_>>>()?;

        if let Some(swarm) = &cfg.swarm {
            let center = space::heaviest(&bodies).ok_or_else(|| {
                GravsimError::InvalidParameter("a swarm needs at least one body".to_string())
            })?;

            let mut rng = Rng::with_seed(swarm.seed);
            let orbiting = orbiting_system(center, swarm, params.gravity(), &mut rng)?;
            bodies.extend(orbiting);
        }

        info!(
            bodies = bodies.len(),
            timestep = params.timestep(),
            gravity = params.gravity(),
            substeps = params.substeps(),
            "scenario built"
        );

        Ok(Self {
            params,
            simulation: Simulation::new(bodies)?,
        })
    }
}

fn build_body(cfg: &BodyConfig) -> Result<Body> {
    let [x, y] = cfg.position;
    let [vx, vy] = cfg.velocity;

    let mut body = Body::new(DVec2::new(x, y), cfg.mass, cfg.radius, DVec2::new(vx, vy))?;

    if let Some(every) = cfg.trail_every {
        body = body.with_trail_every(every)?;
    }

    if let Some(max_trail) = cfg.max_trail {
        body = body.with_max_trail(max_trail);
    }

    Ok(body)
}

fn remap(x: f64, lo: f64, hi: f64) -> f64 {
    lo + x * (hi - lo)
}

/// Smallest squared orbit distance as a fraction of the swarm radius.
const MIN_ORBIT_FRACTION: f64 = 1e-6;

/// Orbit distance for a uniform draw `u` in `[0, 1)`. Uniform in area between
/// twice the center radius and `swarm_radius`, and never zero.
fn orbit_distance(u: f64, center_radius: f64, swarm_radius: f64) -> f64 {
    let inner = (center_radius * 2.0 / swarm_radius).max(MIN_ORBIT_FRACTION);
    remap(u, inner, 1.0).sqrt() * swarm_radius
}

/// Bodies on near-circular orbits around `center`, innermost first. Each orbit
/// speed accounts for the center plus every body placed inside it.
pub fn orbiting_system(
    center: &Body,
    swarm: &SwarmConfig,
    gravity: f64,
    rng: &mut Rng,
) -> Result<Vec<Body>> {
    let [min_mass, max_mass] = swarm.mass_range;

    if !(swarm.radius > 0.0) || !swarm.radius.is_finite() {
        return Err(GravsimError::InvalidParameter(format!(
            "swarm radius must be positive, got {}",
            swarm.radius
        )));
    }

    if !(swarm.density > 0.0) || !swarm.density.is_finite() {
        return Err(GravsimError::InvalidParameter(format!(
            "swarm density must be positive, got {}",
            swarm.density
        )));
    }

    if !(min_mass > 0.0 && min_mass <= max_mass) {
        return Err(GravsimError::InvalidParameter(format!(
            "swarm mass range [{min_mass}, {max_mass}] is empty or non-positive"
        )));
    }

    let mut distances = Vec::with_capacity(swarm.count);

    distances.resize_with(swarm.count, || {
        orbit_distance(rng.f64(), center.radius(), swarm.radius)
    });

    distances.sort_unstable_by(f64::total_cmp);

    let mut inner_mass = center.mass();
    let system_rotation = DRotor2::from_angle(if swarm.clockwise { 1.0 } else { -1.0 } * FRAC_PI_2);

    distances
        .into_iter()
        .map(|distance| {
            let mass = remap(rng.f64(), min_mass, max_mass);
            let radius = (mass / (PI * swarm.density)).sqrt();

            let angle = rng.f64() * TAU;
            let dir = DVec2::unit_x().rotated_by(DRotor2::from_angle(angle));
            let vel = dir.rotated_by(system_rotation) * (gravity * inner_mass / distance).sqrt();

            inner_mass += mass;

            Body::new(center.pos() + dir * distance, mass, radius, center.vel() + vel)
        })
        .collect()
}
