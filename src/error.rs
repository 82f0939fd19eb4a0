//! Simulator error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised while configuring or feeding a simulation.
///
/// A job that finds no eligible node is not an error; it stays queued.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid job: {}", join(.0))]
    InvalidJob(Vec<ValidationError>),

    #[error("invalid cluster: {}", join(.0))]
    InvalidCluster(Vec<ValidationError>),

    #[error("invalid workload: {}", join(.0))]
    InvalidWorkload(Vec<ValidationError>),

    #[error("unknown queueing policy: {0}")]
    UnknownQueuePolicy(String),

    #[error("unknown placement policy: {0}")]
    UnknownPlacementPolicy(String),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
