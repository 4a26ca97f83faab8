//! Boolean difference and glue.
//!
//! Difference resolves the configurations that arise when carving a
//! conductor out of its surroundings:
//!
//! 1. disjoint operands leave the target as it is,
//! 2. a coaxial cylinder spanning the target cylinder's height bores it
//!    into a tube,
//! 3. a tool nested strictly inside the target becomes a void shell,
//! 4. operands whose boundaries neither touch nor cross leave the target as
//!    it is.
//!
//! Anything else is reported as [`KernelError::UnsupportedBoolean`] rather
//! than approximated. The void in case 3 reuses the tool's faces with
//! flipped orientation, so the cavity and the removed solid share face ids
//! and glue together without a seam.

use std::collections::BTreeMap;

use coilcad_kernel_math::{Aabb3, Point3};

use crate::classify::{segment_hits_triangle, PointClass};
use crate::error::{KernelError, Result};
use crate::primitives::{make_tube, TubeFaces, TubeSpec};
use crate::topology::{Compound, FaceId, Orientation, ShapeKind, Shell, ShellKind, Solid};
use crate::Kernel;

pub(crate) fn difference(kernel: &Kernel, target: &Solid, tool: &Solid) -> Result<Solid> {
    let tol = kernel.tolerance().linear;
    if !target.bounding_box().overlaps(&tool.bounding_box()) {
        return Ok(target.with_id(kernel.solid_id()));
    }

    if let Some(tube) = coaxial_bore(kernel, target, tool)? {
        return Ok(tube);
    }

    let tool_in_target = classify_all(tool.vertices(), target, tol);
    let target_in_tool = classify_all(target.vertices(), tool, tol);

    let crossing = || boundaries_cross(target, tool, tol);

    if tool_in_target.all_inside() && target_in_tool.none_inside() && !crossing() {
        if tool.shells.iter().any(|s| s.kind == ShellKind::Void) {
            return Err(KernelError::UnsupportedBoolean(format!(
                "tool {} already has cavities",
                tool.id
            )));
        }
        let mut shells = target.shells.clone();
        shells.extend(tool.shells.iter().map(|s| Shell {
            kind: ShellKind::Void,
            faces: s.faces.iter().map(|f| f.reversed()).collect(),
        }));
        let mut edges = target.edges.clone();
        edges.extend(tool.edges.iter().cloned());
        tracing::debug!(target = %target.id, tool = %tool.id, "carved cavity");
        return Ok(Solid {
            id: kernel.solid_id(),
            shape: ShapeKind::Derived,
            shells,
            edges,
        });
    }

    if tool_in_target.none_touching() && target_in_tool.none_touching() && !crossing() {
        return Ok(target.with_id(kernel.solid_id()));
    }

    Err(KernelError::UnsupportedBoolean(format!(
        "{} and {} intersect along faces the kernel cannot trim",
        target.id, tool.id
    )))
}

/// Tube produced by boring a cylinder with a coaxial cylinder that spans
/// its whole height. `None` when the operands are not in that arrangement.
fn coaxial_bore(kernel: &Kernel, target: &Solid, tool: &Solid) -> Result<Option<Solid>> {
    let (
        ShapeKind::Cylinder {
            base: tb,
            axis: ta,
            radius: outer_radius,
            height: th,
            faces: target_faces,
        },
        ShapeKind::Cylinder {
            base: cb,
            axis: ca,
            radius: inner_radius,
            height: ch,
            faces: tool_faces,
        },
    ) = (&target.shape, &tool.shape)
    else {
        return Ok(None);
    };

    let tol = kernel.tolerance();
    if !tol.parallel(ta, ca) {
        return Ok(None);
    }
    let offset = cb - tb;
    let along = offset.dot(ta.as_ref());
    if (offset - along * ta.as_ref()).norm() > tol.linear {
        return Ok(None);
    }
    // tool interval along the target axis
    let sense = ca.dot(ta.as_ref()).signum();
    let (lo, hi) = {
        let a = along;
        let b = along + sense * ch;
        (a.min(b), a.max(b))
    };
    if lo > tol.linear || hi < th - tol.linear {
        return Ok(None);
    }
    if inner_radius >= outer_radius {
        return Err(KernelError::EmptyResult);
    }

    let tube = make_tube(
        kernel,
        TubeSpec {
            base: *tb,
            axis: *ta,
            inner_radius: *inner_radius,
            outer_radius: *outer_radius,
            height: *th,
        },
        TubeFaces {
            outer: target_faces.lateral,
            inner: tool_faces.lateral,
            bottom: target_faces.bottom,
            top: target_faces.top,
        },
    )?;
    tracing::debug!(target = %target.id, tool = %tool.id, "bored coaxial tube");
    Ok(Some(tube))
}

struct Census {
    inside: usize,
    boundary: usize,
    total: usize,
}

impl Census {
    fn all_inside(&self) -> bool {
        self.total > 0 && self.inside == self.total
    }

    fn none_inside(&self) -> bool {
        self.inside == 0
    }

    fn none_touching(&self) -> bool {
        self.inside == 0 && self.boundary == 0
    }
}

fn classify_all<'a>(points: impl Iterator<Item = &'a Point3>, solid: &Solid, tol: f64) -> Census {
    let mut census = Census {
        inside: 0,
        boundary: 0,
        total: 0,
    };
    for p in points {
        census.total += 1;
        match solid.classify_point(p, tol) {
            PointClass::Inside => census.inside += 1,
            PointClass::OnBoundary => census.boundary += 1,
            PointClass::Outside => {}
        }
    }
    census
}

/// True if the boundary surfaces of `a` and `b` pass through each other.
fn boundaries_cross(a: &Solid, b: &Solid, tol: f64) -> bool {
    edges_pierce(a, b, tol) || edges_pierce(b, a, tol)
}

/// True if a triangle edge of `a` passes through a triangle of `b`.
fn edges_pierce(a: &Solid, b: &Solid, tol: f64) -> bool {
    let mut reach = b.bounding_box();
    reach.expand(tol);
    let targets: Vec<([Point3; 3], Aabb3)> = b
        .faces()
        .flat_map(|f| f.triangles())
        .map(|t| (t, Aabb3::from_points(&t)))
        .collect();

    a.faces().flat_map(|f| f.triangles()).any(|[p0, p1, p2]| {
        [(p0, p1), (p1, p2), (p2, p0)].iter().any(|(p, q)| {
            let span = Aabb3::from_points([p, q]);
            span.overlaps(&reach)
                && targets
                    .iter()
                    .any(|(tri, bb)| span.overlaps(bb) && segment_hits_triangle(p, q, tri))
        })
    })
}

pub(crate) fn glue(kernel: &Kernel, solids: &[Solid]) -> Result<Compound> {
    let tol = kernel.tolerance().linear;

    // every face id with the orientations it appears with
    let mut owners: BTreeMap<FaceId, Vec<(usize, Orientation)>> = BTreeMap::new();
    for (i, solid) in solids.iter().enumerate() {
        for face in solid.faces() {
            owners.entry(face.id).or_default().push((i, face.orientation));
        }
    }

    let mut interfaces = Vec::new();
    for (&face, uses) in &owners {
        match uses.as_slice() {
            [_] => {}
            [(i, a), (j, b)] if i != j && *a == b.flipped() => interfaces.push(face),
            _ => return Err(KernelError::NonConformingInterface(face)),
        }
    }

    for (i, a) in solids.iter().enumerate() {
        for b in &solids[i + 1..] {
            if !a.bounding_box().overlaps(&b.bounding_box()) {
                continue;
            }
            if penetrates(a, b, tol) || penetrates(b, a, tol) {
                return Err(KernelError::OverlappingGlue {
                    first: a.id,
                    second: b.id,
                });
            }
        }
    }

    tracing::debug!(
        solids = solids.len(),
        interfaces = interfaces.len(),
        "glued compound"
    );
    Ok(Compound {
        solids: solids.to_vec(),
        interfaces,
    })
}

/// True if a vertex of `a` off the faces `a` shares with `b` lies inside `b`.
fn penetrates(a: &Solid, b: &Solid, tol: f64) -> bool {
    let mut reach = b.bounding_box();
    reach.expand(tol);
    a.faces()
        .filter(|f| !b.has_face(f.id))
        .flat_map(|f| f.vertices().iter())
        .filter(|p| reach.contains_point(p))
        .any(|p| b.classify_point(p, tol) == PointClass::Inside)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use coilcad_kernel_math::Vec3;
    use std::f64::consts::PI;

    fn unit_box(kernel: &Kernel, center: Point3, size: f64) -> Solid {
        kernel
            .make_centered_box(center, Vec3::new(size, size, size))
            .unwrap()
    }

    #[test]
    fn test_coaxial_bore_keeps_face_ids() {
        let kernel = Kernel::new();
        let outer = kernel
            .make_cylinder(Point3::new(0.0, 0.0, -0.5), Vec3::z(), 2.0, 1.0)
            .unwrap();
        let inner = kernel
            .make_cylinder(Point3::new(0.0, 0.0, -0.5), Vec3::z(), 1.0, 1.0)
            .unwrap();
        let tube = kernel.difference(&outer, &inner).unwrap();

        let ShapeKind::Cylinder { faces: of, .. } = outer.shape() else {
            panic!("outer is a cylinder");
        };
        let ShapeKind::Cylinder { faces: inf, .. } = inner.shape() else {
            panic!("inner is a cylinder");
        };
        let ids = tube.face_ids();
        assert!(ids.contains(&of.lateral));
        assert!(ids.contains(&of.top));
        assert!(ids.contains(&of.bottom));
        assert!(ids.contains(&inf.lateral));

        let top = tube.extreme_face(Vec3::z()).unwrap();
        assert_eq!(top.id(), of.top);
        assert_relative_eq!(top.area(), PI * 3.0, epsilon = 1e-12);
        assert_eq!(tube.face(inf.lateral).unwrap().orientation(), Orientation::Reversed);

        let polygon = |r: f64| 32.0 * r * r * (2.0 * PI / 64.0).sin();
        assert_relative_eq!(tube.volume(), polygon(2.0) - polygon(1.0), max_relative = 1e-9);
    }

    #[test]
    fn test_bore_wider_than_target_is_empty() {
        let kernel = Kernel::new();
        let outer = kernel.make_cylinder(Point3::origin(), Vec3::z(), 1.0, 1.0).unwrap();
        let inner = kernel.make_cylinder(Point3::origin(), Vec3::z(), 1.5, 1.0).unwrap();
        assert_eq!(kernel.difference(&outer, &inner), Err(KernelError::EmptyResult));
    }

    #[test]
    fn test_short_coaxial_tool_is_unsupported() {
        let kernel = Kernel::new();
        let outer = kernel.make_cylinder(Point3::origin(), Vec3::z(), 2.0, 2.0).unwrap();
        let inner = kernel
            .make_cylinder(Point3::new(0.0, 0.0, 1.0), Vec3::z(), 1.0, 2.0)
            .unwrap();
        let result = kernel.difference(&outer, &inner);
        assert!(matches!(result, Err(KernelError::UnsupportedBoolean(_))));
    }

    #[test]
    fn test_nested_tool_becomes_void() {
        let kernel = Kernel::new();
        let outer = unit_box(&kernel, Point3::origin(), 4.0);
        let inner = unit_box(&kernel, Point3::new(0.5, 0.0, 0.0), 1.0);
        let carved = kernel.difference(&outer, &inner).unwrap();

        assert_eq!(carved.shells().len(), 2);
        assert_eq!(carved.shells()[1].kind, ShellKind::Void);
        assert_relative_eq!(carved.volume(), 63.0, epsilon = 1e-9);
        assert_relative_eq!(carved.volume() + inner.volume(), outer.volume(), epsilon = 1e-9);
        assert_eq!(
            carved.classify_point(&Point3::new(0.5, 0.0, 0.0), 1e-9),
            PointClass::Outside
        );
        for id in inner.face_ids() {
            assert_eq!(carved.face(id).unwrap().orientation(), Orientation::Reversed);
        }
    }

    #[test]
    fn test_disjoint_and_overlapping() {
        let kernel = Kernel::new();
        let a = unit_box(&kernel, Point3::origin(), 1.0);
        let far = unit_box(&kernel, Point3::new(5.0, 0.0, 0.0), 1.0);
        let same = kernel.difference(&a, &far).unwrap();
        assert_ne!(same.id(), a.id());
        assert_eq!(same.face_ids(), a.face_ids());

        let straddling = unit_box(&kernel, Point3::new(0.5, 0.0, 0.0), 1.0);
        assert!(matches!(
            kernel.difference(&a, &straddling),
            Err(KernelError::UnsupportedBoolean(_))
        ));
    }

    #[test]
    fn test_glue_records_interfaces() {
        let kernel = Kernel::new();
        let outer = unit_box(&kernel, Point3::origin(), 4.0);
        let inner = unit_box(&kernel, Point3::origin(), 1.0);
        let carved = kernel.difference(&outer, &inner).unwrap();
        let compound = kernel.glue(&[inner.clone(), carved.clone()]).unwrap();

        assert_eq!(compound.solids().len(), 2);
        assert_eq!(compound.interfaces().len(), 6);
        for id in inner.face_ids() {
            assert!(compound.interfaces().contains(&id));
            assert_eq!(compound.face_owners(id), vec![inner.id(), carved.id()]);
        }
        assert_relative_eq!(compound.volume(), 64.0, epsilon = 1e-9);
    }

    #[test]
    fn test_glue_rejects_overlap() {
        let kernel = Kernel::new();
        let a = unit_box(&kernel, Point3::origin(), 2.0);
        let b = unit_box(&kernel, Point3::new(0.5, 0.5, 0.5), 0.5);
        let err = kernel.glue(&[a.clone(), b.clone()]).unwrap_err();
        assert_eq!(
            err,
            KernelError::OverlappingGlue {
                first: a.id(),
                second: b.id()
            }
        );
    }

    #[test]
    fn test_glue_rejects_same_orientation() {
        let kernel = Kernel::new();
        let a = unit_box(&kernel, Point3::origin(), 1.0);
        let copy = a.with_id(kernel.solid_id());
        let err = kernel.glue(&[a, copy]).unwrap_err();
        assert!(matches!(err, KernelError::NonConformingInterface(_)));
    }

    #[test]
    fn test_crossing_bars_are_unsupported() {
        let kernel = Kernel::new();
        let along_x = kernel
            .make_box(Point3::new(-2.0, -0.5, -0.5), Point3::new(2.0, 0.5, 0.5))
            .unwrap();
        let along_y = kernel
            .make_box(Point3::new(-0.25, -2.0, -0.25), Point3::new(0.25, 2.0, 0.25))
            .unwrap();
        assert!(matches!(
            kernel.difference(&along_x, &along_y),
            Err(KernelError::UnsupportedBoolean(_))
        ));
    }
}
