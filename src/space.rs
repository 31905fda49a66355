//! Aggregate quantities over a body collection.

use itertools::Itertools;
use ultraviolet::DVec2;

use crate::physics::{Affect, Body, Position};

/// Bounding box of `points` as `(min, size)`, or `None` when there are no
/// points.
pub fn aabb<I: IntoIterator<Item = DVec2>>(points: I) -> Option<(DVec2, DVec2)> {
    let mut points = points.into_iter();
    let first = points.next()?;
    let (min, max) = points.fold((first, first), |(min, max), point| {
        (min.min_by_component(point), max.max_by_component(point))
    });

    Some((min, max - min))
}

/// First body of maximal mass.
pub fn heaviest(bodies: &[Body]) -> Option<&Body> {
    bodies.iter().fold(None, |best: Option<&Body>, body| match best {
        Some(best) if best.mass() >= body.mass() => Some(best),
        _ => Some(body),
    })
}

pub fn total_mass(bodies: &[Body]) -> f64 {
    bodies.iter().map(Body::mass).sum()
}

pub fn total_momentum(bodies: &[Body]) -> DVec2 {
    bodies
        .iter()
        .fold(DVec2::zero(), |sum, body| sum + body.momentum())
}

/// Mass-weighted center of the collection.
pub fn centroid(bodies: &[Body]) -> Option<DVec2> {
    if bodies.is_empty() {
        return None;
    }

    let weighted = bodies
        .iter()
        .fold(DVec2::zero(), |sum, body| sum + body.pos() * body.mass());

    Some(weighted / total_mass(bodies))
}

pub fn kinetic_energy(bodies: &[Body]) -> f64 {
    bodies.iter().map(Body::kinetic_energy).sum()
}

/// Pairwise gravitational potential energy. Coincident pairs are skipped, the
/// same as in the force computation.
pub fn potential_energy(bodies: &[Body], gravity: f64) -> f64 {
    bodies
        .iter()
        .tuple_combinations()
        .filter_map(|(a, b)| {
            let distance = (b.pos() - a.pos()).mag();
            (distance > 0.0).then(|| -gravity * a.mass() * b.mass() / distance)
        })
        .sum()
}

/// Fill `field` with the net force on every body, in collection order. Each
/// pair is evaluated once and coincident pairs are skipped.
pub fn fill_field(bodies: &[Body], gravity: f64, field: &mut Vec<DVec2>) {
    field.clear();
    field.resize(bodies.len(), DVec2::zero());

    for ((i, a), (j, b)) in bodies.iter().enumerate().tuple_combinations() {
        if a.pos() == b.pos() {
            continue;
        }

        field[i] += b.effect_on(a, gravity);
        field[j] += a.effect_on(b, gravity);
    }
}
