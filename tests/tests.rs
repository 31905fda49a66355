use std::path::PathBuf;

use fastrand::Rng;
use gravsim::{
    collide, space, step, Body, DVec2, Params, Position, PreviewSettings, Scenario,
    ScenarioConfig, Simulation,
};

fn body(pos: (f64, f64), mass: f64, radius: f64, vel: (f64, f64)) -> Body {
    Body::new(DVec2::new(pos.0, pos.1), mass, radius, DVec2::new(vel.0, vel.1)).unwrap()
}

fn random_body(rng: &mut Rng, spread: f64, radius: f64) -> Body {
    body(
        (rng.f64() * spread, rng.f64() * spread),
        0.1 + rng.f64() * 10.0,
        radius,
        (rng.f64() - 0.5, rng.f64() - 0.5),
    )
}

fn assert_close(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

fn assert_vec_close(a: DVec2, b: DVec2, tol: f64) {
    assert!((a - b).mag() <= tol, "expected {b:?}, got {a:?}");
}

// ==================================================================================
// Merge tests
// ==================================================================================

#[test]
fn merge_two_equal_bodies() {
    let a = body((0.0, 0.0), 10.0, 1.0, (0.0, 0.0));
    let b = body((1.0, 0.0), 10.0, 1.0, (0.0, 0.0));
    let (a_id, b_id) = (a.id(), b.id());
    let mut bodies = vec![a, b];

    let collision = collide(&mut bodies).expect("bodies overlap");

    assert_eq!(collision.first.id(), a_id);
    assert_eq!(collision.second.id(), b_id);
    assert!(collision.involves(a_id) && collision.involves(b_id));

    assert_eq!(bodies.len(), 1);
    let merged = &bodies[0];
    assert_eq!(merged.id(), collision.merged);
    assert_eq!(merged.mass(), 20.0);
    assert_close(merged.radius(), 2.0_f64.sqrt(), 1e-12);
    assert_vec_close(merged.pos(), DVec2::new(0.5, 0.0), 1e-12);
    assert_vec_close(merged.vel(), DVec2::zero(), 1e-12);
    assert!(merged.trail().is_empty());
}

#[test]
fn merge_conserves_mass_and_momentum() {
    let mut rng = Rng::with_seed(17);

    for _ in 0..100 {
        let (ra, rb) = (1.0 + rng.f64(), 1.0 + rng.f64());
        let a = random_body(&mut rng, 1.0, ra);
        let b = random_body(&mut rng, 1.0, rb);

        let mass = a.mass() + b.mass();
        let momentum = a.momentum() + b.momentum();
        let radius = (a.radius().powi(2) + b.radius().powi(2)).sqrt();

        let mut bodies = vec![a, b];
        collide(&mut bodies).expect("bodies overlap");
        let merged = &bodies[0];

        assert_eq!(merged.mass(), mass);
        assert_vec_close(merged.vel(), momentum / mass, 1e-12);
        assert_vec_close(merged.momentum(), momentum, 1e-9);
        assert_close(merged.radius(), radius, 1e-12);
    }
}

#[test]
fn at_most_one_merge_per_call() {
    let mut bodies = vec![
        body((0.0, 0.0), 1.0, 1.0, (0.0, 0.0)),
        body((0.5, 0.0), 1.0, 1.0, (0.0, 0.0)),
        body((0.0, 0.5), 1.0, 1.0, (0.0, 0.0)),
    ];

    assert!(collide(&mut bodies).is_some());
    assert_eq!(bodies.len(), 2);

    assert!(collide(&mut bodies).is_some());
    assert_eq!(bodies.len(), 1);

    assert!(collide(&mut bodies).is_none());
    assert_close(bodies[0].mass(), 3.0, 1e-12);
}

#[test]
fn collide_on_small_collections() {
    let mut empty: Vec<Body> = Vec::new();
    assert!(collide(&mut empty).is_none());

    let mut single = vec![body((0.0, 0.0), 1.0, 10.0, (0.0, 0.0))];
    assert!(collide(&mut single).is_none());
    assert_eq!(single.len(), 1);
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let mut rng = Rng::with_seed(5);

    for _ in 0..100 {
        let a = random_body(&mut rng, 10.0, 0.0);
        let b = random_body(&mut rng, 10.0, 0.0);

        let on_a = a.net_force(std::slice::from_ref(&b), 0.3);
        let on_b = b.net_force(std::slice::from_ref(&a), 0.3);

        assert_vec_close(on_a + on_b, DVec2::zero(), 1e-9 * on_a.mag().max(1.0));
    }
}

#[test]
fn gravity_points_toward_other_body() {
    let a = body((0.0, 0.0), 1.0, 0.0, (0.0, 0.0));
    let b = body((3.0, 4.0), 2.0, 0.0, (0.0, 0.0));

    let f = a.net_force(std::slice::from_ref(&b), 1.0);

    assert!(f.dot(b.pos() - a.pos()) > 0.0);
    assert_close(f.mag(), 2.0 / 25.0, 1e-12);
}

#[test]
fn zero_gravity_leaves_velocity() {
    let mut rng = Rng::with_seed(9);
    let mut bodies: Vec<Body> = (0..20).map(|_| random_body(&mut rng, 5.0, 0.0)).collect();
    let before: Vec<DVec2> = bodies.iter().map(Body::vel).collect();

    let others = bodies.clone();
    for body in bodies.iter_mut() {
        body.update_velocity(&others, 0.0, 1.0);
    }
    assert_eq!(bodies.iter().map(Body::vel).collect::<Vec<_>>(), before);

    step(&mut bodies, 1.0, 0.0);
    assert_eq!(bodies.iter().map(Body::vel).collect::<Vec<_>>(), before);
}

#[test]
fn field_is_symmetric() {
    let mut rng = Rng::with_seed(23);
    let bodies: Vec<Body> = (0..12).map(|_| random_body(&mut rng, 10.0, 0.0)).collect();

    let mut field = Vec::new();
    space::fill_field(&bodies, 2.0, &mut field);
    let net = field.iter().fold(DVec2::zero(), |sum, &force| sum + force);
    let scale: f64 = field.iter().map(|force| force.mag()).sum();

    assert_vec_close(net, DVec2::zero(), 1e-12 * scale);
}

// ==================================================================================
// Step tests
// ==================================================================================

#[test]
fn single_body_drifts() {
    let mut bodies = vec![body((1.0, 2.0), 5.0, 1.0, (3.0, -1.0))];

    step(&mut bodies, 1.0, 1.0);

    assert_eq!(bodies[0].pos(), DVec2::new(4.0, 1.0));
    assert_eq!(bodies[0].vel(), DVec2::new(3.0, -1.0));
}

#[test]
fn step_moves_before_accelerating() {
    // a moves from 0 to 1 before forces are evaluated, so it feels b at
    // distance 1 rather than 2
    let a = body((0.0, 0.0), 1.0, 0.0, (1.0, 0.0));
    let b = body((2.0, 0.0), 1.0, 0.0, (0.0, 0.0));
    let mut bodies = vec![a, b];

    step(&mut bodies, 1.0, 1.0);

    assert_eq!(bodies[0].pos(), DVec2::new(1.0, 0.0));
    assert_close(bodies[0].vel().x, 2.0, 1e-12);
    assert_close(bodies[1].vel().x, -1.0, 1e-12);
}

#[test]
fn step_conserves_momentum() {
    let mut rng = Rng::with_seed(31);
    let mut bodies: Vec<Body> = (0..10).map(|_| random_body(&mut rng, 100.0, 0.0)).collect();
    let initial = space::total_momentum(&bodies);

    for _ in 0..200 {
        step(&mut bodies, 0.01, 1.0);
    }

    assert_vec_close(space::total_momentum(&bodies), initial, 1e-6);
}

#[test]
fn trail_is_bounded() {
    let mut bodies = vec![body((0.0, 0.0), 1.0, 0.0, (1.0, 0.0))];
    let (max_len, every) = (
        bodies[0].trail().max_len(),
        bodies[0].trail().every() as usize,
    );

    for _ in 0..max_len * every + every {
        step(&mut bodies, 1.0, 1.0);
    }

    let trail = bodies[0].trail();
    assert_eq!(trail.len(), max_len);
    assert_eq!(trail.latest(), Some(bodies[0].pos()));

    let points = trail.to_vec();
    assert!(points.windows(2).all(|w| w[0].x > w[1].x));
}

// ==================================================================================
// Simulation tests
// ==================================================================================

#[test]
fn simulation_merges_and_refocuses() {
    let focus = body((0.0, 0.0), 1.0, 1.0, (0.0, 0.0));
    let heavy = body((1.0, 0.0), 5.0, 1.0, (0.0, 0.0));
    let far = body((100.0, 0.0), 2.0, 1.0, (0.0, 0.0));
    let focus_id = focus.id();

    let mut sim = Simulation::new(vec![focus, heavy, far]).unwrap();
    let params = Params::new(1e-3, 0.0, 1).unwrap();

    let collision = sim.update(&params).unwrap().expect("focus collides");
    assert!(collision.involves(focus_id));
    assert!(sim.get(focus_id).is_none());
    assert_eq!(sim.heaviest(), Some(collision.merged));
    assert_eq!(sim.len(), 2);
}

#[test]
fn launched_copies_of_one_body_merge() {
    let proto = body((0.0, 0.0), 3.0, 1.0, (0.0, 0.0));
    let mut sim = Simulation::default();

    let first = sim.launch(proto.clone()).unwrap();
    let mut copy = proto.clone();
    copy.set_pos(DVec2::new(0.5, 0.0));
    let second = sim.launch(copy).unwrap();

    assert_ne!(first, second);
    assert_ne!(first, proto.id());

    let params = Params::new(1e-3, 1.0, 1).unwrap();
    let collision = sim.update(&params).unwrap().expect("copies overlap");

    assert!(collision.involves(first) && collision.involves(second));
    assert_eq!(sim.len(), 1);
    assert_close(sim.bodies()[0].mass(), 6.0, 1e-12);
}

#[test]
fn preview_leaves_live_bodies_untouched() {
    let sun = body((0.0, 0.0), 1000.0, 1.0, (0.0, 0.0));
    let sun_id = sun.id();
    let mut sim = Simulation::new(vec![sun, body((50.0, 0.0), 1.0, 0.5, (0.0, 4.0))]).unwrap();
    let params = Params::new(0.1, 1.0, 1).unwrap();

    sim.update(&params).unwrap();
    let before: Vec<(DVec2, DVec2, usize, u64)> = sim
        .bodies()
        .iter()
        .map(|b| (b.pos(), b.vel(), b.trail().len(), b.ticks()))
        .collect();

    let candidate = body((0.0, 20.0), 1.0, 0.5, (7.0, 0.0));
    let trajectory = sim
        .preview(&candidate, Some(sun_id), &params, &PreviewSettings::default())
        .unwrap();

    let after: Vec<(DVec2, DVec2, usize, u64)> = sim
        .bodies()
        .iter()
        .map(|b| (b.pos(), b.vel(), b.trail().len(), b.ticks()))
        .collect();

    assert_eq!(before, after);
    assert!(candidate.trail().is_empty());
    assert_eq!(trajectory.path.len(), 10);
    assert_eq!(trajectory.reference.as_ref().map(Vec::len), Some(10));
    assert_eq!(trajectory.relative().len(), 10);
}

#[test]
fn runs_shipped_scenarios() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios");

    for name in ["solar_system.yaml", "accretion.yaml"] {
        let cfg = ScenarioConfig::load(dir.join(name)).unwrap();
        let Scenario { params, mut simulation } = Scenario::build(&cfg).unwrap();
        let mass = space::total_mass(simulation.bodies());

        for _ in 0..20 {
            simulation.update(&params).unwrap();
        }

        assert!(!simulation.is_empty());
        assert_close(space::total_mass(simulation.bodies()), mass, 1e-9 * mass);
    }
}

#[test]
fn earth_stays_near_one_au() {
    let Scenario { params, mut simulation } =
        Scenario::build(&ScenarioConfig::solar_system()).unwrap();
    let sun = simulation.bodies()[0].id();
    let earth = simulation.bodies()[1].id();

    // Roughly 35 days
    for _ in 0..100 {
        assert!(simulation.update(&params).unwrap().is_none());
    }

    let distance = (simulation.get(earth).unwrap().pos() - simulation.get(sun).unwrap().pos()).mag();
    assert_close(distance / 1.496e11, 1.0, 0.02);
}
