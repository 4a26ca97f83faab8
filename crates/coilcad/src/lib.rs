#![warn(missing_docs)]

//! coilcad: parametric coil geometries for finite-element simulation.
//!
//! Builds a conductor (a helically wound wire or an annular tube), an
//! optional marker cube and the surrounding air box, tags regions and
//! boundaries for a downstream mesher, and glues everything into one
//! conforming geometry. The build also returns the coil's cross-section
//! area, which solvers use to normalize current density.
//!
//! # Example
//!
//! ```rust,no_run
//! use coilcad::{tubular_coil_with_marker, MarkerCube};
//!
//! let (geo, cross_section) =
//!     tubular_coil_with_marker(6, 0.001, 0.01, MarkerCube::at(0.005, 0.0, 0.0)).unwrap();
//! assert_eq!(geo.materials().len(), 3);
//! assert!(cross_section > 0.0);
//! ```

pub mod air;
pub mod coil;
mod error;
mod geometry;
pub mod marker;
mod params;
mod part;

pub use error::CoilError;
pub use geometry::CoilGeometry;
pub use params::{
    CoilParams, CoilShape, MarkerCube, TessellationOverrides, AIR_SIZE_FACTOR,
    WINDING_PITCH_FACTOR,
};
pub use part::{Part, RegionTags};

pub use coilcad_ir;
pub use coilcad_kernel;

use coilcad_kernel::Kernel;

/// Build the coil, marker and air regions and glue them together.
///
/// Returns the geometry and the coil's cross-section area. Each call uses a
/// fresh kernel session, so identical parameters give identical ids.
pub fn build_coil_geometry(params: &CoilParams) -> Result<(CoilGeometry, f64), CoilError> {
    params.validate()?;
    let kernel = Kernel::with_params(params.tessellation_params());

    let (coil, cross_section) = coil::build(&kernel, params)?;
    let marker = params
        .marker
        .as_ref()
        .map(|m| marker::build(&kernel, m))
        .transpose()?;
    let air = air::build(&kernel, params, &coil, marker.as_ref())?;

    let mut parts = vec![coil, air];
    parts.extend(marker);
    let geometry = CoilGeometry::assemble(&kernel, parts, cross_section)?;

    tracing::info!(
        shape = ?params.shape,
        regions = geometry.parts().len(),
        interfaces = geometry.interfaces().len(),
        cross_section,
        "coil geometry built"
    );
    Ok((geometry, cross_section))
}

/// Wire of radius `wire_radius` wound `winding_count` times around a
/// cylinder of radius `coil_radius`.
pub fn helical_coil(
    winding_count: u32,
    wire_radius: f64,
    coil_radius: f64,
) -> Result<(CoilGeometry, f64), CoilError> {
    build_coil_geometry(&CoilParams::new(
        CoilShape::Helical,
        winding_count,
        wire_radius,
        coil_radius,
    ))
}

/// Annular tube standing in for the winding pack.
pub fn tubular_coil(
    winding_count: u32,
    wire_radius: f64,
    coil_radius: f64,
) -> Result<(CoilGeometry, f64), CoilError> {
    build_coil_geometry(&CoilParams::new(
        CoilShape::Tubular,
        winding_count,
        wire_radius,
        coil_radius,
    ))
}

/// Annular tube plus a marker cube.
pub fn tubular_coil_with_marker(
    winding_count: u32,
    wire_radius: f64,
    coil_radius: f64,
    marker: MarkerCube,
) -> Result<(CoilGeometry, f64), CoilError> {
    build_coil_geometry(
        &CoilParams::new(CoilShape::Tubular, winding_count, wire_radius, coil_radius)
            .with_marker(marker),
    )
}
