#![warn(missing_docs)]

//! Solid modelling kernel for coilcad.
//!
//! A [`Kernel`] is a modelling session: it hands out identifiers for solids,
//! faces and edges and holds the tessellation settings used when primitives
//! and sweeps are built. Identifiers are assigned in call order, so the same
//! sequence of operations always yields the same ids.
//!
//! # Example
//!
//! ```
//! use coilcad_kernel::Kernel;
//! use coilcad_kernel::coilcad_kernel_math::{Point3, Vec3};
//!
//! let kernel = Kernel::new();
//! let outer = kernel.make_cylinder(Point3::origin(), Vec3::z(), 2.0, 1.0).unwrap();
//! let inner = kernel.make_cylinder(Point3::origin(), Vec3::z(), 1.0, 1.0).unwrap();
//! let tube = kernel.difference(&outer, &inner).unwrap();
//! assert_eq!(tube.faces().count(), 4);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

pub use coilcad_kernel_geom;
pub use coilcad_kernel_math;

mod boolean;
mod classify;
mod error;
mod frenet;
mod mesh;
mod primitives;
mod sweep;
mod topology;

pub use classify::PointClass;
pub use error::{KernelError, Result};
pub use frenet::{rotation_minimizing_frames, FrenetFrame};
pub use mesh::TriangleMesh;
pub use topology::{
    Compound, CylinderFaces, Edge, EdgeCurve, EdgeId, Face, FaceId, FacePatch, FaceSurface,
    Orientation, ShapeKind, Shell, ShellKind, Solid, SolidId,
};

use coilcad_kernel_geom::{Circle3d, Curve3d};
use coilcad_kernel_math::{Point3, Tolerance, Vec3};

/// Tessellation parameters controlling patch resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TessellationParams {
    /// Number of segments around circular features.
    pub circle_segments: u32,
    /// Number of segments around a swept profile.
    pub profile_segments: u32,
    /// Number of segments along a sweep path (0 = chosen from the curve).
    pub path_segments: u32,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            circle_segments: 64,
            profile_segments: 16,
            path_segments: 0,
        }
    }
}

/// A modelling session.
#[derive(Debug)]
pub struct Kernel {
    tolerance: Tolerance,
    params: TessellationParams,
    next_solid: AtomicU64,
    next_face: AtomicU64,
    next_edge: AtomicU64,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    /// A session with default tolerance and tessellation.
    pub fn new() -> Self {
        Self::with_params(TessellationParams::default())
    }

    /// A session with custom tessellation parameters.
    pub fn with_params(params: TessellationParams) -> Self {
        Self {
            tolerance: Tolerance::DEFAULT,
            params,
            next_solid: AtomicU64::new(0),
            next_face: AtomicU64::new(0),
            next_edge: AtomicU64::new(0),
        }
    }

    /// Geometric tolerance used by classification and booleans.
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Tessellation parameters.
    pub fn params(&self) -> TessellationParams {
        self.params
    }

    pub(crate) fn solid_id(&self) -> SolidId {
        SolidId(self.next_solid.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn face_id(&self) -> FaceId {
        FaceId(self.next_face.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn edge_id(&self) -> EdgeId {
        EdgeId(self.next_edge.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// Axis-aligned box spanning `min` to `max`.
    pub fn make_box(&self, min: Point3, max: Point3) -> Result<Solid> {
        let solid = primitives::make_box(self, min, max)?;
        tracing::trace!(id = %solid.id(), "box");
        Ok(solid)
    }

    /// Axis-aligned box of edge lengths `size` centered at `center`.
    pub fn make_centered_box(&self, center: Point3, size: Vec3) -> Result<Solid> {
        self.make_box(center - size / 2.0, center + size / 2.0)
    }

    /// Right circular cylinder from `base` along `axis`.
    pub fn make_cylinder(
        &self,
        base: Point3,
        axis: Vec3,
        radius: f64,
        height: f64,
    ) -> Result<Solid> {
        let solid = primitives::make_cylinder(self, base, axis, radius, height)?;
        tracing::trace!(id = %solid.id(), radius, height, "cylinder");
        Ok(solid)
    }

    /// Sweep a circular profile along a spine curve.
    pub fn make_pipe(&self, spine: &dyn Curve3d, profile: &Circle3d) -> Result<Solid> {
        let solid = sweep::make_pipe(self, spine, profile)?;
        tracing::trace!(id = %solid.id(), faces = solid.faces().count(), "pipe");
        Ok(solid)
    }

    // =========================================================================
    // Booleans
    // =========================================================================

    /// Boolean difference (`target − tool`).
    pub fn difference(&self, target: &Solid, tool: &Solid) -> Result<Solid> {
        let solid = boolean::difference(self, target, tool)?;
        tracing::trace!(
            target = %target.id(),
            tool = %tool.id(),
            result = %solid.id(),
            "difference"
        );
        Ok(solid)
    }

    /// Glue solids into a compound that shares coincident faces.
    pub fn glue(&self, solids: &[Solid]) -> Result<Compound> {
        let compound = boolean::glue(self, solids)?;
        tracing::trace!(
            solids = compound.solids().len(),
            interfaces = compound.interfaces().len(),
            "glue"
        );
        Ok(compound)
    }
}
