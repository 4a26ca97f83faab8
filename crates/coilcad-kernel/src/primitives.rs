//! Boxes, cylinders and coaxial tubes.

use std::f64::consts::PI;

use coilcad_kernel_math::{perpendicular_basis, Dir3, Point3, Vec3};

use crate::error::{KernelError, Result};
use crate::topology::{
    CylinderFaces, Edge, EdgeCurve, Face, FaceId, FacePatch, FaceSurface, Orientation, ShapeKind,
    Shell, ShellKind, Solid,
};
use crate::Kernel;

fn check_length(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(KernelError::InvalidPrimitive(format!(
            "{what} must be positive and finite, got {value}"
        )))
    }
}

/// Planar quad `o, o+e1, o+e1+e2, o+e2` with outward normal `e1 × e2`.
fn quad_face(kernel: &Kernel, o: Point3, e1: Vec3, e2: Vec3) -> Face {
    let normal = Dir3::new_normalize(e1.cross(&e2));
    Face {
        id: kernel.face_id(),
        surface: FaceSurface::Plane { origin: o, normal },
        orientation: Orientation::Forward,
        patch: FacePatch {
            positions: vec![o, o + e1, o + e1 + e2, o + e2],
            triangles: vec![[0, 1, 2], [0, 2, 3]],
        },
        exact_area: Some(e1.norm() * e2.norm()),
    }
}

/// Build an axis-aligned box.
pub(crate) fn make_box(kernel: &Kernel, min: Point3, max: Point3) -> Result<Solid> {
    let size = max - min;
    for (axis, len) in ["x", "y", "z"].iter().zip(size.iter()) {
        check_length(&format!("box extent along {axis}"), *len)?;
    }
    let (dx, dy, dz) = (
        Vec3::x() * size.x,
        Vec3::y() * size.y,
        Vec3::z() * size.z,
    );

    let faces = vec![
        quad_face(kernel, min, dy, dx),
        quad_face(kernel, min + dz, dx, dy),
        quad_face(kernel, min, dx, dz),
        quad_face(kernel, min + dy, dz, dx),
        quad_face(kernel, min, dz, dy),
        quad_face(kernel, min + dx, dy, dz),
    ];

    let corner = |i: usize| {
        let step = |bit: usize, d: Vec3| if i & bit != 0 { d } else { Vec3::zeros() };
        min + step(1, dx) + step(2, dy) + step(4, dz)
    };
    let edges = (0..8usize)
        .flat_map(|i| [1usize, 2, 4].into_iter().map(move |bit| (i, bit)))
        .filter(|(i, bit)| i & bit == 0)
        .map(|(i, bit)| Edge {
            id: kernel.edge_id(),
            curve: EdgeCurve::Line {
                start: corner(i),
                end: corner(i | bit),
            },
        })
        .collect();

    Ok(Solid {
        id: kernel.solid_id(),
        shape: ShapeKind::Box { min, max },
        shells: vec![Shell {
            kind: ShellKind::Outer,
            faces,
        }],
        edges,
    })
}

/// Points on a circle of `radius` about `center` in the plane spanned by `u, v`.
fn ring(center: Point3, u: &Vec3, v: &Vec3, radius: f64, n: usize) -> Vec<Point3> {
    (0..n)
        .map(|k| {
            let (s, c) = (2.0 * PI * k as f64 / n as f64).sin_cos();
            center + radius * (c * u + s * v)
        })
        .collect()
}

/// Wall between two rings, wound outward from the axis.
fn wall_patch(bottom: &[Point3], top: &[Point3]) -> FacePatch {
    let n = bottom.len() as u32;
    let mut positions = bottom.to_vec();
    positions.extend_from_slice(top);
    let triangles = (0..n)
        .flat_map(|k| {
            let k1 = (k + 1) % n;
            [[k, k1, n + k1], [k, n + k1, n + k]]
        })
        .collect();
    FacePatch {
        positions,
        triangles,
    }
}

/// Disk fan, wound counter-clockwise around the ring direction.
pub(crate) fn disk_patch(center: Point3, rim: &[Point3]) -> FacePatch {
    let n = rim.len() as u32;
    let mut positions = vec![center];
    positions.extend_from_slice(rim);
    let triangles = (0..n).map(|k| [0, 1 + k, 1 + (k + 1) % n]).collect();
    FacePatch {
        positions,
        triangles,
    }
}

/// Annulus between an inner and outer ring, wound counter-clockwise.
fn annulus_patch(inner: &[Point3], outer: &[Point3]) -> FacePatch {
    let n = inner.len() as u32;
    let mut positions = inner.to_vec();
    positions.extend_from_slice(outer);
    let triangles = (0..n)
        .flat_map(|k| {
            let k1 = (k + 1) % n;
            [[k, n + k, n + k1], [k, n + k1, k1]]
        })
        .collect();
    FacePatch {
        positions,
        triangles,
    }
}

fn cap_face(id: FaceId, origin: Point3, normal: Dir3, mut patch: FacePatch, area: f64) -> Face {
    // patches come wound around +axis; the bottom cap faces -axis
    if patch.normal_sum().dot(normal.as_ref()) < 0.0 {
        patch.flip_winding();
    }
    Face {
        id,
        surface: FaceSurface::Plane { origin, normal },
        orientation: Orientation::Forward,
        patch,
        exact_area: Some(area),
    }
}

fn wall_face(
    id: FaceId,
    base: Point3,
    axis: Dir3,
    radius: f64,
    height: f64,
    patch: FacePatch,
    orientation: Orientation,
) -> Face {
    Face {
        id,
        surface: FaceSurface::Cylinder {
            center: base,
            axis,
            radius,
        },
        orientation,
        patch,
        exact_area: Some(2.0 * PI * radius * height),
    }
}

fn circle_edge(kernel: &Kernel, center: Point3, normal: Dir3, radius: f64) -> Edge {
    Edge {
        id: kernel.edge_id(),
        curve: EdgeCurve::Circle {
            center,
            normal,
            radius,
        },
    }
}

fn segments(kernel: &Kernel) -> usize {
    kernel.params().circle_segments.max(3) as usize
}

/// Build a right circular cylinder.
pub(crate) fn make_cylinder(
    kernel: &Kernel,
    base: Point3,
    axis: Vec3,
    radius: f64,
    height: f64,
) -> Result<Solid> {
    check_length("cylinder radius", radius)?;
    check_length("cylinder height", height)?;
    if !(axis.norm() > 0.0) || !axis.iter().all(|c| c.is_finite()) {
        return Err(KernelError::InvalidPrimitive(format!(
            "cylinder axis must be a finite non-zero vector, got {axis:?}"
        )));
    }
    let axis = Dir3::new_normalize(axis);
    let (u, v) = perpendicular_basis(&axis);
    let n = segments(kernel);
    let top_center = base + height * axis.as_ref();
    let bottom = ring(base, &u, &v, radius, n);
    let top = ring(top_center, &u, &v, radius, n);

    let faces = CylinderFaces {
        lateral: kernel.face_id(),
        bottom: kernel.face_id(),
        top: kernel.face_id(),
    };
    let disk_area = PI * radius * radius;
    let shell = Shell {
        kind: ShellKind::Outer,
        faces: vec![
            wall_face(
                faces.lateral,
                base,
                axis,
                radius,
                height,
                wall_patch(&bottom, &top),
                Orientation::Forward,
            ),
            cap_face(faces.bottom, base, -axis, disk_patch(base, &bottom), disk_area),
            cap_face(faces.top, top_center, axis, disk_patch(top_center, &top), disk_area),
        ],
    };
    let edges = vec![
        circle_edge(kernel, base, axis, radius),
        circle_edge(kernel, top_center, axis, radius),
        Edge {
            id: kernel.edge_id(),
            curve: EdgeCurve::Line {
                start: bottom[0],
                end: top[0],
            },
        },
    ];

    Ok(Solid {
        id: kernel.solid_id(),
        shape: ShapeKind::Cylinder {
            base,
            axis,
            radius,
            height,
            faces,
        },
        shells: vec![shell],
        edges,
    })
}

/// Face ids assigned to the walls and caps of a tube.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TubeFaces {
    pub outer: FaceId,
    pub inner: FaceId,
    pub bottom: FaceId,
    pub top: FaceId,
}

/// Geometry of a tube between two coaxial walls.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TubeSpec {
    pub base: Point3,
    pub axis: Dir3,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub height: f64,
}

/// Build the annular solid between two coaxial cylinder walls.
///
/// The inner wall keeps the outward winding of a cylinder of the inner
/// radius and is marked reversed, so it faces into the bore.
pub(crate) fn make_tube(kernel: &Kernel, spec: TubeSpec, ids: TubeFaces) -> Result<Solid> {
    let TubeSpec {
        base,
        axis,
        inner_radius,
        outer_radius,
        height,
    } = spec;
    check_length("tube inner radius", inner_radius)?;
    check_length("tube height", height)?;
    if outer_radius <= inner_radius {
        return Err(KernelError::EmptyResult);
    }

    let (u, v) = perpendicular_basis(&axis);
    let n = segments(kernel);
    let top_center = base + height * axis.as_ref();
    let ob = ring(base, &u, &v, outer_radius, n);
    let ot = ring(top_center, &u, &v, outer_radius, n);
    let ib = ring(base, &u, &v, inner_radius, n);
    let it = ring(top_center, &u, &v, inner_radius, n);
    let ring_area = PI * (outer_radius * outer_radius - inner_radius * inner_radius);

    let shell = Shell {
        kind: ShellKind::Outer,
        faces: vec![
            wall_face(
                ids.outer,
                base,
                axis,
                outer_radius,
                height,
                wall_patch(&ob, &ot),
                Orientation::Forward,
            ),
            cap_face(ids.bottom, base, -axis, annulus_patch(&ib, &ob), ring_area),
            cap_face(ids.top, top_center, axis, annulus_patch(&it, &ot), ring_area),
            wall_face(
                ids.inner,
                base,
                axis,
                inner_radius,
                height,
                wall_patch(&ib, &it),
                Orientation::Reversed,
            ),
        ],
    };
    let edges = vec![
        circle_edge(kernel, base, axis, outer_radius),
        circle_edge(kernel, top_center, axis, outer_radius),
        circle_edge(kernel, base, axis, inner_radius),
        circle_edge(kernel, top_center, axis, inner_radius),
    ];

    Ok(Solid {
        id: kernel.solid_id(),
        shape: ShapeKind::Tube {
            base,
            axis,
            inner_radius,
            outer_radius,
            height,
        },
        shells: vec![shell],
        edges,
    })
}
