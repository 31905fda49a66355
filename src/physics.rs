use core::fmt;
use core::ops::Deref;
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::VecDeque;

use ultraviolet::DVec2;

use crate::error::{GravsimError, Result};

pub const DEFAULT_MAX_TRAIL: usize = 50;
pub const DEFAULT_TRAIL_EVERY: u32 = 25;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Stable handle for a body. Copies made with `clone` keep the id of their
/// original; merges always allocate a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u64);

impl BodyId {
    fn fresh() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub trait Position {
    fn pos(&self) -> DVec2;
}

pub trait Affect {
    type Subject;

    /// Force exerted by `self` on `other`.
    fn effect_on(&self, other: &Self::Subject, gravity: f64) -> DVec2;
}

pub trait Combine {
    fn combine(&mut self, other: &Self);
}

#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub pos: DVec2,
    pub mass: f64,
    pub radius: f64,
}

impl Sphere {
    pub fn new(pos: DVec2, mass: f64, radius: f64) -> Self {
        Self { pos, mass, radius }
    }
}

impl Combine for Sphere {
    /// Perfectly inelastic union: masses add, position moves to the
    /// mass-weighted centroid and cross-sectional area is conserved.
    fn combine(&mut self, other: &Self) {
        let mass = self.mass + other.mass;

        self.pos = (self.pos * self.mass + other.pos * other.mass) / mass;
        self.mass = mass;
        self.radius = (self.radius * self.radius + other.radius * other.radius).sqrt();
    }
}

impl Position for Sphere {
    fn pos(&self) -> DVec2 {
        self.pos
    }
}

impl Affect for Sphere {
    type Subject = Self;

    fn effect_on(&self, other: &Self::Subject, gravity: f64) -> DVec2 {
        let displacement = self.pos - other.pos;
        let mag_sq = displacement.mag_sq();
        let mag_cubed = mag_sq * mag_sq.sqrt();

        // Coincident (or underflowing) pairs contribute nothing
        if mag_cubed == 0.0 {
            return DVec2::zero();
        }

        displacement * (gravity * self.mass * other.mass / mag_cubed)
    }
}

/// Bounded position history, most recent first.
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<DVec2>,
    max_len: usize,
    every: u32,
    ticks: u64,
}

impl Trail {
    fn tick(&mut self, pos: DVec2) {
        self.ticks += 1;

        if self.ticks % u64::from(self.every) == 0 {
            self.points.push_front(pos);
            self.points.truncate(self.max_len);
        }
    }

    fn reset(&mut self, every: u32) -> Result<()> {
        if every == 0 {
            return Err(GravsimError::InvalidTrailInterval);
        }

        self.points.clear();
        self.every = every;
        self.ticks = 0;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.points.iter().copied()
    }

    pub fn latest(&self) -> Option<DVec2> {
        self.points.front().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn every(&self) -> u32 {
        self.every
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn to_vec(&self) -> Vec<DVec2> {
        self.points.iter().copied().collect()
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self {
            points: VecDeque::with_capacity(DEFAULT_MAX_TRAIL),
            max_len: DEFAULT_MAX_TRAIL,
            every: DEFAULT_TRAIL_EVERY,
            ticks: 0,
        }
    }
}

fn checked_mass(mass: f64) -> Result<f64> {
    if mass.is_finite() && mass > 0.0 {
        Ok(mass)
    } else {
        Err(GravsimError::InvalidMass(mass))
    }
}

fn checked_radius(radius: f64) -> Result<f64> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(radius)
    } else {
        Err(GravsimError::InvalidRadius(radius))
    }
}

/// A simulated mass. Bodies have no value equality; compare [`Body::id`].
///
/// Cloning produces a distinct body with a fresh id and its own trail.
#[derive(Debug)]
pub struct Body {
    id: BodyId,
    body: Sphere,
    vel: DVec2,
    trail: Trail,
}

impl Clone for Body {
    fn clone(&self) -> Self {
        Self {
            id: BodyId::fresh(),
            ..self.snapshot()
        }
    }
}

impl Body {
    pub fn new(pos: DVec2, mass: f64, radius: f64, vel: DVec2) -> Result<Self> {
        Ok(Self {
            id: BodyId::fresh(),
            body: Sphere::new(pos, checked_mass(mass)?, checked_radius(radius)?),
            vel,
            trail: Trail::default(),
        })
    }

    /// Deep copy that keeps the id, for lookahead runs that must map back
    /// to their originals.
    pub(crate) fn snapshot(&self) -> Body {
        Body {
            id: self.id,
            body: self.body,
            vel: self.vel,
            trail: self.trail.clone(),
        }
    }

    pub fn with_trail_every(mut self, every: u32) -> Result<Self> {
        self.set_trail_every(every)?;
        Ok(self)
    }

    pub fn with_max_trail(mut self, max_len: usize) -> Self {
        self.trail.max_len = max_len;
        self.trail.points.truncate(max_len);
        self
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn vel(&self) -> DVec2 {
        self.vel
    }

    pub fn mass(&self) -> f64 {
        self.body.mass
    }

    pub fn radius(&self) -> f64 {
        self.body.radius
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn ticks(&self) -> u64 {
        self.trail.ticks
    }

    pub fn momentum(&self) -> DVec2 {
        self.vel * self.body.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.body.mass * self.vel.mag_sq()
    }

    pub fn set_pos(&mut self, pos: DVec2) {
        self.body.pos = pos;
    }

    pub fn set_vel(&mut self, vel: DVec2) {
        self.vel = vel;
    }

    pub fn set_mass(&mut self, mass: f64) -> Result<()> {
        self.body.mass = checked_mass(mass)?;
        Ok(())
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        self.body.radius = checked_radius(radius)?;
        Ok(())
    }

    pub fn set_trail_every(&mut self, every: u32) -> Result<()> {
        if every == 0 {
            return Err(GravsimError::InvalidTrailInterval);
        }

        self.trail.every = every;
        Ok(())
    }

    /// Drops the trail history and restarts sampling with a new interval.
    pub fn reset_trail(&mut self, every: u32) -> Result<()> {
        self.trail.reset(every)
    }

    /// Drift by the current velocity, sampling the new position into the
    /// trail every `trail_every` ticks.
    pub fn move_body(&mut self, dt: f64) {
        self.body.pos += self.vel * dt;
        self.trail.tick(self.body.pos);
    }

    /// Net gravitational force from `others`. Bodies sharing this body's exact
    /// position, including this body itself, are skipped.
    pub fn net_force(&self, others: &[Body], gravity: f64) -> DVec2 {
        others
            .iter()
            .filter(|other| other.body.pos != self.body.pos)
            .fold(DVec2::zero(), |net, other| {
                net + other.body.effect_on(&self.body, gravity)
            })
    }

    pub fn apply_force(&mut self, force: DVec2, dt: f64) {
        self.vel += force / self.body.mass * dt;
    }

    pub fn update_velocity(&mut self, others: &[Body], gravity: f64, dt: f64) {
        let force = self.net_force(others, gravity);
        self.apply_force(force, dt);
    }

    pub(crate) fn collision_partner(&self, others: &[Body]) -> Option<usize> {
        others.iter().position(|other| {
            other.id != self.id
                && (other.body.pos - self.body.pos).mag() < self.body.radius + other.body.radius
        })
    }

    /// First body in `others` overlapping this one, in iteration order.
    pub fn detect_collision<'a>(&self, others: &'a [Body]) -> Option<&'a Body> {
        self.collision_partner(others).map(|i| &others[i])
    }

    /// Perfectly inelastic merge into a new body with a fresh id and an empty
    /// trail.
    pub fn merge(&self, other: &Body) -> Body {
        let mut body = self.body;
        body.combine(&other.body);

        Body {
            id: BodyId::fresh(),
            vel: (self.momentum() + other.momentum()) / body.mass,
            body,
            trail: Trail::default(),
        }
    }
}

impl Deref for Body {
    type Target = Sphere;

    fn deref(&self) -> &Self::Target {
        &self.body
    }
}

impl Position for Body {
    fn pos(&self) -> DVec2 {
        self.body.pos
    }
}
