//! Air domain.

use coilcad_ir::CsgOp;
use coilcad_kernel::coilcad_kernel_math::{Point3, Vec3};
use coilcad_kernel::Kernel;

use crate::params::CoilParams;
use crate::part::{ir_point, Part};
use crate::CoilError;

/// Cube of side `air_size()` around the origin with the coil and the
/// optional marker carved out.
///
/// The outer faces are named `"outer"`. Cavity walls keep the names of the
/// solids that were removed.
pub fn build(
    kernel: &Kernel,
    params: &CoilParams,
    coil: &Part,
    marker: Option<&Part>,
) -> Result<Part, CoilError> {
    let side = params.air_size();
    let solid = kernel.make_centered_box(Point3::origin(), Vec3::repeat(side))?;
    let mut bbox = Part::leaf(
        "air_box",
        solid,
        CsgOp::Cube {
            center: ir_point(&Point3::origin()),
            size: side,
        },
    );
    bbox.name_all_faces("outer");

    let mut air = bbox.difference(kernel, "air", coil)?;
    if let Some(marker) = marker {
        air = air.difference(kernel, "air", marker)?;
    }
    air.set_material("air");
    tracing::debug!(id = %air.solid().id(), volume = air.solid().volume(), "built air");
    Ok(air)
}
