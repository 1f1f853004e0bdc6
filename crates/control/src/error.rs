use simcore::{ConfigurationError, ModelError};
use thiserror::Error;

/// Anything that aborts a controller run. Safety events are not errors; they
/// are recorded in the fault log.
#[derive(Debug, Error)]
pub enum BmsError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("could not parse simulation config: {0}")]
    Parse(#[from] serde_json::Error),
}
