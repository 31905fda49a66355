//! Two-dimensional gravitational N-body simulation with perfectly inelastic
//! merging.
//!
//! Bodies attract each other by direct pairwise Newtonian gravity. Each tick
//! moves every body by its velocity, then updates every velocity from the net
//! force at the moved positions. A separate collision pass merges at most one
//! overlapping pair, conserving mass, momentum and cross-sectional area.
//!
//! ```
//! use gravsim::{collide, step, Body, DVec2};
//!
//! let mut bodies = vec![
//!     Body::new(DVec2::new(0.0, 0.0), 10.0, 1.0, DVec2::zero())?,
//!     Body::new(DVec2::new(1.0, 0.0), 10.0, 1.0, DVec2::zero())?,
//! ];
//!
//! step(&mut bodies, 0.0, 1.0);
//! let collision = collide(&mut bodies).expect("bodies overlap");
//!
//! assert_eq!(bodies.len(), 1);
//! assert_eq!(bodies[0].id(), collision.merged);
//! assert_eq!(bodies[0].mass(), 20.0);
//! # Ok::<(), gravsim::GravsimError>(())
//! ```

pub mod config;
pub mod error;
pub mod physics;
pub mod preview;
pub mod scenario;
pub mod simulation;
pub mod space;

pub use ultraviolet::DVec2;

pub use config::{BodyConfig, ParamsConfig, ScenarioConfig, SwarmConfig};
pub use error::{GravsimError, Result};
pub use physics::{Affect, Body, BodyId, Combine, Position, Sphere, Trail};
pub use preview::{preview, PreviewSettings, Trajectory};
pub use scenario::{orbiting_system, Scenario};
pub use simulation::{collide, step, Collision, Params, Simulation, GRAVITATIONAL_CONSTANT};
