//! Coil solid builders.
//!
//! Both shapes are centered on the origin with the winding axis along Z and
//! span `coil_height()` axially. The returned cross-section is the area of
//! the topmost face of the freshly built coil.

use std::f64::consts::PI;

use coilcad_ir::{CsgOp, HelixPath};
use coilcad_kernel::coilcad_kernel_geom::{Circle3d, Curve3d, CylinderSurface};
use coilcad_kernel::coilcad_kernel_math::{Point2, Point3, Vec3};
use coilcad_kernel::Kernel;

use crate::params::{CoilParams, CoilShape};
use crate::part::{ir_point, ir_vec, Part};
use crate::CoilError;

/// Face mesh-size hint on the swept wire.
pub const HELICAL_FACE_MAX_H: f64 = 0.2;

/// Build the coil for `params.shape` and measure its cross-section.
pub fn build(kernel: &Kernel, params: &CoilParams) -> Result<(Part, f64), CoilError> {
    let coil = match params.shape {
        CoilShape::Helical => helical(kernel, params)?,
        CoilShape::Tubular => tubular(kernel, params)?,
    };
    let cross_section = top_face_area(&coil)?;
    tracing::debug!(
        shape = ?params.shape,
        id = %coil.solid().id(),
        volume = coil.solid().volume(),
        cross_section,
        "built coil"
    );
    Ok((coil, cross_section))
}

/// Area of the face whose centroid is highest.
pub fn top_face_area(coil: &Part) -> Result<f64, CoilError> {
    coil.solid()
        .extreme_face(Vec3::z())
        .map(|f| f.area())
        .ok_or(CoilError::MissingFace("top"))
}

/// Circular wire swept along a helix wound on the coil cylinder.
///
/// The wire profile lies in the plane normal to `params.profile_axis` at
/// the helix start, whatever the tangent there.
fn helical(kernel: &Kernel, params: &CoilParams) -> Result<Part, CoilError> {
    let height = params.coil_height();
    let base = Point3::new(0.0, 0.0, -height / 2.0);
    let turns = f64::from(params.winding_count);

    let surface = CylinderSurface::with_axis(base, Vec3::z(), params.coil_radius);
    let helix = surface.embed_segment(Point2::origin(), Point2::new(turns * 2.0 * PI, height))?;

    let [ax, ay, az] = params.profile_axis;
    let profile_axis = Vec3::new(ax, ay, az);
    let profile = Circle3d::new(helix.start(), profile_axis, params.wire_radius);
    let solid = kernel.make_pipe(&helix, &profile)?;

    let op = CsgOp::Pipe {
        path: HelixPath {
            center: ir_point(&helix.center),
            axis: ir_vec(helix.axis.as_ref()),
            radius: helix.radius,
            turns: helix.turns,
            height: helix.height,
        },
        profile_radius: params.wire_radius,
        profile_axis: ir_vec(&profile_axis),
    };
    let mut coil = Part::leaf("coil", solid, op);
    coil.set_face_max_h(HELICAL_FACE_MAX_H)?;
    coil.name_all_faces("coilbnd");
    coil.name_extreme_face(Vec3::z(), "in")?;
    coil.name_extreme_face(-Vec3::z(), "out")?;
    coil.set_material("coil");
    Ok(coil)
}

/// Annular tube between `coil_radius ± wire_radius`.
fn tubular(kernel: &Kernel, params: &CoilParams) -> Result<Part, CoilError> {
    let height = params.coil_height();
    let base = Point3::new(0.0, 0.0, -height / 2.0);
    let r_w = params.wire_radius;

    let cylinder = |name: &str, radius: f64| -> Result<Part, CoilError> {
        let solid = kernel.make_cylinder(base, Vec3::z(), radius, height)?;
        let op = CsgOp::Cylinder {
            base: ir_point(&base),
            axis: ir_vec(&Vec3::z()),
            radius,
            height,
        };
        Ok(Part::leaf(name, solid, op))
    };
    let outer = cylinder("coil_outer", params.coil_radius + r_w)?;
    let inner = cylinder("coil_inner", params.coil_radius - r_w)?;

    let mut coil = outer.difference(kernel, "coil", &inner)?;
    coil.set_max_h(r_w)?.set_edge_max_h(r_w)?.set_face_max_h(r_w)?;
    coil.set_material("coil").set_solid_name("coil");
    Ok(coil)
}
