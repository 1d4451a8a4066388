use cascade_mesh::{ConfigError, MeshError};
use thiserror::Error;

use crate::SignalError;

/// Errors raised by the blocks in this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),

    #[error("block `{block}` was stepped before it was initialized")]
    NotInitialized { block: String },

    #[error("block `{block}` has no mesh; call `build_mesh` first")]
    MeshNotBuilt { block: String },

    #[error("invalid signal: {0}")]
    Signal(#[from] SignalError),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Mesh(MeshError::Config(err))
    }
}
