//! Error types for kernel operations.

use coilcad_kernel_geom::GeomError;
use thiserror::Error;

use crate::topology::{FaceId, SolidId};

/// Errors that can occur while constructing or combining solids.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Primitive dimensions are non-positive or non-finite.
    #[error("invalid primitive: {0}")]
    InvalidPrimitive(String),

    /// The sweep spine or profile has no extent.
    #[error("degenerate sweep: {0}")]
    DegenerateSweep(String),

    /// The swept profile would overlap itself.
    #[error("self-intersecting sweep: profile radius {profile_radius} reaches limit {limit}")]
    SelfIntersectingSweep {
        /// Radius of the swept profile.
        profile_radius: f64,
        /// Largest radius the spine admits at this point.
        limit: f64,
    },

    /// The operands of a boolean are arranged in a way the kernel cannot resolve.
    #[error("unsupported boolean configuration: {0}")]
    UnsupportedBoolean(String),

    /// The boolean removed all material.
    #[error("boolean result is empty")]
    EmptyResult,

    /// Two glue operands share interior volume.
    #[error("glue operands {first} and {second} overlap")]
    OverlappingGlue {
        /// First operand.
        first: SolidId,
        /// Second operand.
        second: SolidId,
    },

    /// A face shared between glue operands does not separate them.
    #[error("face {0} is shared with matching orientation")]
    NonConformingInterface(FaceId),

    /// Curve or surface construction failed.
    #[error(transparent)]
    Geometry(#[from] GeomError),
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
