//! Scenario files.
//!
//! A scenario is a YAML document with three sections:
//!
//! ```yaml
//! params:
//!   timestep: 3.0e4        # simulated seconds per frame
//!   gravity: 6.67408e-11   # gravitational constant
//!   substeps: 1            # ticks per frame
//!
//! bodies:
//!   - position: [0.0, 0.0]
//!     velocity: [1.0e5, 0.0]
//!     mass: 1.989e30
//!     radius: 6.9551e8
//!     trail_every: 25      # optional
//!     max_trail: 50        # optional
//!
//! swarm:                   # optional, orbits the heaviest body
//!   count: 200
//!   radius: 5.0e11
//!   clockwise: true
//!   density: 1.0e10        # kg/m², sets body radius from mass
//!   mass_range: [1.0e22, 1.0e24]
//!   seed: 7
//! ```
//!
//! Missing `params` fall back to [`Params::default`].

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::simulation::{Params, GRAVITATIONAL_CONSTANT};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ParamsConfig {
    pub timestep: f64,
    pub gravity: f64,
    pub substeps: u32,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        let params = Params::default();

        Self {
            timestep: params.timestep(),
            gravity: params.gravity(),
            substeps: params.substeps(),
        }
    }
}

impl ParamsConfig {
    pub fn to_params(&self) -> Result<Params> {
        Params::new(self.timestep, self.gravity, self.substeps)
    }
}

/// Initial state for a single body.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BodyConfig {
    pub position: [f64; 2],
    #[serde(default)]
    pub velocity: [f64; 2],
    pub mass: f64,
    #[serde(default)]
    pub radius: f64,
    pub trail_every: Option<u32>,
    pub max_trail: Option<usize>,
}

/// Procedurally placed bodies on near-circular orbits.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SwarmConfig {
    pub count: usize,
    /// Outer orbit radius (m).
    pub radius: f64,
    #[serde(default)]
    pub clockwise: bool,
    /// Areal density (kg/m²).
    pub density: f64,
    pub mass_range: [f64; 2],
    #[serde(default)]
    pub seed: u64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub params: ParamsConfig,
    pub bodies: Vec<BodyConfig>,
    pub swarm: Option<SwarmConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Sun, Earth and Moon, the whole system drifting at 100 km/s along x.
    pub fn solar_system() -> Self {
        const DRIFT: f64 = 1.0e5;

        Self {
            params: ParamsConfig {
                timestep: 3.0e4,
                gravity: GRAVITATIONAL_CONSTANT,
                substeps: 1,
            },
            bodies: vec![
                BodyConfig {
                    position: [0.0, 0.0],
                    velocity: [DRIFT, 0.0],
                    mass: 1.989e30,
                    radius: 6.9551e8,
                    trail_every: None,
                    max_trail: None,
                },
                BodyConfig {
                    position: [1.496e11, 0.0],
                    velocity: [DRIFT, 2.9786e4],
                    mass: 5.972e24,
                    radius: 6.371e6,
                    trail_every: None,
                    max_trail: None,
                },
                BodyConfig {
                    position: [1.496e11 + 3.844e8, 0.0],
                    velocity: [DRIFT, 2.9786e4 + 1.023e3],
                    mass: 7.347e22,
                    radius: 1.7371e6,
                    trail_every: None,
                    max_trail: None,
                },
            ],
            swarm: None,
        }
    }
}
