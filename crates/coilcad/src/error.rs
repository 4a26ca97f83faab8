//! Error types for coil construction.

use coilcad_kernel::coilcad_kernel_geom::GeomError;
use coilcad_kernel::KernelError;
use thiserror::Error;

/// Errors returned while building a coil geometry.
#[derive(Error, Debug)]
pub enum CoilError {
    /// A parameter is outside its documented range.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A mesh-size hint is not a positive finite length.
    #[error("invalid mesh size for {target}: {value}")]
    InvalidMeshSize {
        /// What the hint was set on.
        target: String,
        /// The rejected value.
        value: f64,
    },

    /// The coil solid has no face in the requested direction.
    #[error("coil has no {0} face")]
    MissingFace(&'static str),

    /// The geometry kernel rejected a construction step.
    #[error("geometry construction failed: {0}")]
    Kernel(#[from] KernelError),

    /// A parameter file could not be parsed.
    #[error("invalid parameter file: {0}")]
    Config(#[from] toml::de::Error),
}

impl From<GeomError> for CoilError {
    fn from(err: GeomError) -> Self {
        CoilError::Kernel(KernelError::Geometry(err))
    }
}
