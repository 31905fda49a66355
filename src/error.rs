//! Error types for gravsim.

use thiserror::Error;

use crate::physics::BodyId;

#[derive(Debug, Error)]
pub enum GravsimError {
    #[error("invalid mass {0}: must be finite and positive")]
    InvalidMass(f64),

    #[error("invalid radius {0}: must be finite and non-negative")]
    InvalidRadius(f64),

    #[error("invalid trail sampling interval: must be at least 1")]
    InvalidTrailInterval,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unknown body: {0}")]
    UnknownBody(BodyId),

    #[error("body {0} reached a non-finite state")]
    NonFiniteState(BodyId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, GravsimError>;
