//! Trajectory lookahead for a body that is about to be launched.
//!
//! The live bodies are deep-copied into a private collection and stepped
//! forward without collisions. Nothing done here touches the running
//! simulation.

use ultraviolet::DVec2;

use crate::{
    error::{GravsimError, Result},
    physics::{Body, BodyId},
    simulation::{step_with, Params},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewSettings {
    /// Number of lookahead ticks.
    pub steps: usize,
    /// Lookahead tick length as a multiple of the frame timestep.
    pub dt_scale: f64,
    /// Store a point every N ticks.
    pub trail_every: u32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            steps: 40,
            dt_scale: 10.0,
            trail_every: 4,
        }
    }
}

/// Predicted paths, most recent point first.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    pub path: Vec<DVec2>,
    pub reference: Option<Vec<DVec2>>,
}

impl Trajectory {
    /// The candidate's path in the frame of the reference body, or the raw
    /// path when there is no reference.
    pub fn relative(&self) -> Vec<DVec2> {
        match &self.reference {
            Some(reference) => self
                .path
                .iter()
                .zip(reference)
                .map(|(&pos, &origin)| pos - origin)
                .collect(),
            None => self.path.clone(),
        }
    }
}

/// Samples a tracked copy can take over the whole lookahead.
fn trail_capacity(settings: &PreviewSettings) -> usize {
    (settings.steps / settings.trail_every.max(1) as usize).saturating_add(1)
}

pub fn preview(
    bodies: &[Body],
    candidate: &Body,
    reference: Option<BodyId>,
    params: &Params,
    settings: &PreviewSettings,
) -> Result<Trajectory> {
    let capacity = trail_capacity(settings);

    let reference_copy = reference
        .map(|id| {
            bodies
                .iter()
                .find(|body| body.id() == id)
                .map(Body::snapshot)
                .ok_or(GravsimError::UnknownBody(id))
        })
        .transpose()?;

    let track = |body: &Body| -> Result<Body> {
        let mut copy = body.snapshot();
        copy.reset_trail(settings.trail_every)?;
        Ok(copy.with_max_trail(capacity))
    };

    let mut dummies: Vec<Body> = bodies
        .iter()
        .filter(|body| Some(body.id()) != reference)
        .map(Body::snapshot)
        .collect();

    let launched_at = dummies.len();
    dummies.push(track(candidate)?);

    if let Some(copy) = &reference_copy {
        dummies.push(track(copy)?);
    }

    let dt = params.timestep() * settings.dt_scale;
    let mut field = Vec::with_capacity(dummies.len());

    for _ in 0..settings.steps {
        step_with(&mut dummies, &mut field, dt, params.gravity());
    }

    Ok(Trajectory {
        path: dummies[launched_at].trail().to_vec(),
        reference: reference_copy.map(|_| dummies[launched_at + 1].trail().to_vec()),
    })
}
