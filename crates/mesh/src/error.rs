use thiserror::Error;

/// Errors raised while validating a mesh configuration.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("exactly one of `m` (node count) or `h` (time step) must be given")]
    Resolution,

    #[error("node count `m` must be at least 1")]
    NodeCount,

    #[error("time step `h` must be finite and positive, got {0}")]
    TimeStep(f64),

    #[error("wave speeds must be finite and positive, got [{0}, {1}]")]
    WaveSpeed(f64, f64),

    #[error("the spatial extent must be positive to derive a step from `m`")]
    DegenerateFrame,
}

/// Errors that can occur when building a characteristic mesh.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    #[error("rectangle bounds must be finite")]
    NonFiniteBounds,

    #[error("{axis} bounds are reversed: {lower} > {upper}")]
    ReversedBounds {
        axis: &'static str,
        lower: f64,
        upper: f64,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
