use itertools::Itertools;
use tracing::{debug, trace};
use ultraviolet::DVec2;

use crate::{
    error::{GravsimError, Result},
    physics::{Body, BodyId, Position},
    preview::{self, PreviewSettings, Trajectory},
    space,
};

/// Newton's gravitational constant in m³·kg⁻¹·s⁻².
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67408e-11;

/// Per-frame inputs supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    timestep: f64,
    gravity: f64,
    substeps: u32,
}

impl Params {
    pub fn new(timestep: f64, gravity: f64, substeps: u32) -> Result<Self> {
        if !timestep.is_finite() {
            return Err(GravsimError::InvalidParameter(format!(
                "timestep must be finite, got {timestep}"
            )));
        }

        if !gravity.is_finite() {
            return Err(GravsimError::InvalidParameter(format!(
                "gravity must be finite, got {gravity}"
            )));
        }

        if substeps == 0 {
            return Err(GravsimError::InvalidParameter(
                "substeps must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            timestep,
            gravity,
            substeps,
        })
    }

    /// Simulated seconds per frame.
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    pub fn substeps(&self) -> u32 {
        self.substeps
    }

    pub fn substep_dt(&self) -> f64 {
        self.timestep / f64::from(self.substeps)
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            timestep: 3.0e4,
            gravity: GRAVITATIONAL_CONSTANT,
            substeps: 1,
        }
    }
}

/// Outcome of a merge: the two consumed bodies and the id of their union.
#[derive(Debug)]
pub struct Collision {
    pub first: Body,
    pub second: Body,
    pub merged: BodyId,
}

impl Collision {
    pub fn involves(&self, id: BodyId) -> bool {
        self.first.id() == id || self.second.id() == id
    }
}

pub(crate) fn step_with(bodies: &mut [Body], field: &mut Vec<DVec2>, dt: f64, gravity: f64) {
    for body in bodies.iter_mut() {
        body.move_body(dt);
    }

    // Forces only depend on positions, so collecting them first matches
    // updating velocities one body at a time
    space::fill_field(bodies, gravity, field);

    for (body, &force) in bodies.iter_mut().zip(field.iter()) {
        body.apply_force(force, dt);
    }
}

/// Advance every body by one tick: all positions first, then all velocities
/// from the forces at the moved positions.
pub fn step(bodies: &mut [Body], dt: f64, gravity: f64) {
    let mut field = Vec::with_capacity(bodies.len());
    step_with(bodies, &mut field, dt, gravity);
}

/// Merge the first overlapping pair found, if any. At most one merge happens
/// per call; the merged body is appended and the rest keep their order.
pub fn collide(bodies: &mut Vec<Body>) -> Option<Collision> {
    let scan: &[Body] = bodies;
    let (i, j) = scan
        .iter()
        .enumerate()
        .find_map(|(i, body)| body.collision_partner(scan).map(|j| (i, j)))?;

    let merged = bodies[i].merge(&bodies[j]);
    let id = merged.id();

    let (first, second) = if i < j {
        let second = bodies.remove(j);
        (bodies.remove(i), second)
    } else {
        let first = bodies.remove(i);
        (first, bodies.remove(j))
    };

    bodies.push(merged);

    Some(Collision {
        first,
        second,
        merged: id,
    })
}

fn duplicate(id: BodyId) -> GravsimError {
    GravsimError::InvalidParameter(format!("body {id} is already in the simulation"))
}

fn is_finite(v: DVec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// Live body collection driven frame by frame.
#[derive(Debug, Default)]
pub struct Simulation {
    bodies: Vec<Body>,
    field: Vec<DVec2>,
    elapsed: f64,
    frames: u64,
}

impl Simulation {
    /// Fails if two of `bodies` share an id.
    pub fn new(bodies: Vec<Body>) -> Result<Self> {
        if let Some((_, dup)) = bodies
            .iter()
            .tuple_combinations()
            .find(|(a, b)| a.id() == b.id())
        {
            return Err(duplicate(dup.id()));
        }

        let field = Vec::with_capacity(bodies.len());

        Ok(Self {
            bodies,
            field,
            elapsed: 0.0,
            frames: 0,
        })
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Simulated seconds since construction.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|body| body.id() == id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|body| body.id() == id)
    }

    /// Add `body` to the live set. Fails if a body with the same id is
    /// already live.
    pub fn launch(&mut self, body: Body) -> Result<BodyId> {
        let id = body.id();
        if self.get(id).is_some() {
            return Err(duplicate(id));
        }

        debug!(%id, mass = body.mass(), "launched body");
        self.bodies.push(body);
        Ok(id)
    }

    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let index = self.bodies.iter().position(|body| body.id() == id)?;
        debug!(%id, "removed body");
        Some(self.bodies.remove(index))
    }

    /// First body of maximal mass.
    pub fn heaviest(&self) -> Option<BodyId> {
        space::heaviest(&self.bodies).map(Body::id)
    }

    /// Run one frame: `substeps` ticks of `timestep / substeps`, then a single
    /// collision pass.
    pub fn update(&mut self, params: &Params) -> Result<Option<Collision>> {
        let dt = params.substep_dt();

        for _ in 0..params.substeps() {
            step_with(&mut self.bodies, &mut self.field, dt, params.gravity());
        }

        self.elapsed += params.timestep();
        self.frames += 1;

        if let Some(body) = self
            .bodies
            .iter()
            .find(|body| !is_finite(body.pos()) || !is_finite(body.vel()))
        {
            return Err(GravsimError::NonFiniteState(body.id()));
        }

        let collision = collide(&mut self.bodies);

        match &collision {
            Some(collision) => debug!(
                first = %collision.first.id(),
                second = %collision.second.id(),
                merged = %collision.merged,
                "merged bodies"
            ),
            None => trace!(frame = self.frames, bodies = self.bodies.len(), "frame"),
        }

        Ok(collision)
    }

    /// Lookahead for `candidate` against private copies of the live bodies.
    pub fn preview(
        &self,
        candidate: &Body,
        reference: Option<BodyId>,
        params: &Params,
        settings: &PreviewSettings,
    ) -> Result<Trajectory> {
        preview::preview(&self.bodies, candidate, reference, params, settings)
    }
}
