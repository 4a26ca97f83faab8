//! Marker cube.

use coilcad_ir::CsgOp;
use coilcad_kernel::coilcad_kernel_math::{Point3, Vec3};
use coilcad_kernel::Kernel;

use crate::params::MarkerCube;
use crate::part::{ir_point, Part};
use crate::CoilError;

/// Build the probe cube.
///
/// The cube's material is `"cube"` but its solid-group name is `"coil"`:
/// material assignment treats it as its own region while named-region
/// lookup groups it with the conductor.
pub fn build(kernel: &Kernel, marker: &MarkerCube) -> Result<Part, CoilError> {
    let [x, y, z] = marker.center;
    let center = Point3::new(x, y, z);
    let edge = MarkerCube::EDGE;
    let solid = kernel.make_centered_box(center, Vec3::repeat(edge))?;

    let mut cube = Part::leaf(
        "marker",
        solid,
        CsgOp::Cube {
            center: ir_point(&center),
            size: edge,
        },
    );
    cube.set_material("cube")
        .set_solid_name("coil")
        .name_all_faces("cubebnd");
    tracing::debug!(id = %cube.solid().id(), ?center, "built marker");
    Ok(cube)
}
