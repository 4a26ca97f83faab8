//! Pipe sweeps: a circular profile carried rigidly along a spine curve.

use std::f64::consts::PI;

use coilcad_kernel_geom::{Circle3d, Curve3d};
use coilcad_kernel_math::{Dir3, Point3, Vec3};

use crate::error::{KernelError, Result};
use crate::frenet::rotation_minimizing_frames;
use crate::primitives::disk_patch;
use crate::topology::{
    Edge, EdgeCurve, Face, FaceId, FacePatch, FaceSurface, Orientation, ShapeKind, Shell,
    ShellKind, Solid,
};
use crate::Kernel;

/// Check that a circular profile of `radius` can follow `spine` without
/// the swept surface running into itself.
fn check_clearance(spine: &dyn Curve3d, radius: f64) -> Result<()> {
    if let Some(limit) = spine.min_curvature_radius() {
        if radius >= limit {
            return Err(KernelError::SelfIntersectingSweep {
                profile_radius: radius,
                limit,
            });
        }
    }
    if let Some(clearance) = spine.turn_clearance() {
        // neighbouring turns each take up one radius
        let limit = clearance / 2.0;
        if radius >= limit {
            return Err(KernelError::SelfIntersectingSweep {
                profile_radius: radius,
                limit,
            });
        }
    }
    Ok(())
}

fn planar_cap(id: FaceId, center: Point3, rim: &[Point3], outward: &Vec3) -> Face {
    let mut patch = disk_patch(center, rim);
    if patch.normal_sum().dot(outward) < 0.0 {
        patch.flip_winding();
    }
    let normal = Dir3::new_normalize(patch.normal_sum());
    let radius = rim.first().map(|p| (p - center).norm()).unwrap_or(0.0);
    Face {
        id,
        surface: FaceSurface::Plane {
            origin: center,
            normal,
        },
        orientation: Orientation::Forward,
        patch,
        exact_area: Some(PI * radius * radius),
    }
}

/// Sweep `profile` along `spine`.
///
/// The profile keeps its position relative to the moving frame it starts
/// in, so a profile centered on the spine start stays centered on the
/// spine. The result has three faces: the lateral surface and the caps at
/// the start and end of the spine.
pub(crate) fn make_pipe(kernel: &Kernel, spine: &dyn Curve3d, profile: &Circle3d) -> Result<Solid> {
    let radius = profile.radius;
    if !(radius.is_finite() && radius > 0.0) {
        return Err(KernelError::DegenerateSweep(format!(
            "profile radius must be positive and finite, got {radius}"
        )));
    }
    let length = spine.length();
    if !(length.is_finite() && length > kernel.tolerance().linear) {
        return Err(KernelError::DegenerateSweep(format!(
            "spine length {length} is too small"
        )));
    }
    check_clearance(spine, radius)?;

    let params = kernel.params();
    let path_segments = match params.path_segments {
        0 => spine.suggested_segments(),
        n => n as usize,
    }
    .max(1);
    let frames = rotation_minimizing_frames(spine, path_segments + 1);
    let (Some(first), Some(last)) = (frames.first(), frames.last()) else {
        return Err(KernelError::DegenerateSweep(
            "spine has no tangent at its start".into(),
        ));
    };
    if profile.normal.dot(first.tangent.as_ref()).abs() < 1e-6 {
        return Err(KernelError::DegenerateSweep(
            "profile plane contains the spine tangent".into(),
        ));
    }

    let k = params.profile_segments.max(3) as usize;
    let local_rim: Vec<Vec3> = profile
        .sample(k)
        .iter()
        .map(|q| first.local_coords(q))
        .collect();
    let local_center = first.local_coords(&profile.center);

    let rings: Vec<Vec<Point3>> = frames
        .iter()
        .map(|f| local_rim.iter().map(|l| f.world_point(l)).collect())
        .collect();
    let centers: Vec<Point3> = frames.iter().map(|f| f.world_point(&local_center)).collect();

    let k32 = k as u32;
    let mut lateral = FacePatch {
        positions: rings.iter().flatten().copied().collect(),
        triangles: Vec::with_capacity(2 * path_segments * k),
    };
    for i in 0..path_segments as u32 {
        for j in 0..k32 {
            let j1 = (j + 1) % k32;
            let (a, b) = (i * k32 + j, i * k32 + j1);
            let (c, d) = ((i + 1) * k32 + j1, (i + 1) * k32 + j);
            lateral.triangles.push([a, b, c]);
            lateral.triangles.push([a, c, d]);
        }
    }
    if let Some(&[a, b, c]) = lateral.triangles.first() {
        let [pa, pb, pc] = [a, b, c].map(|i| lateral.positions[i as usize]);
        let n = (pb - pa).cross(&(pc - pa));
        let outward = Point3::from((pa.coords + pb.coords + pc.coords) / 3.0) - centers[0];
        if n.dot(&outward) < 0.0 {
            lateral.flip_winding();
        }
    }

    let start_rim = &rings[0];
    let end_rim = &rings[rings.len() - 1];
    let start_center = centers[0];
    let end_center = centers[centers.len() - 1];

    let lateral_face = Face {
        id: kernel.face_id(),
        surface: FaceSurface::Swept {
            profile_radius: radius,
        },
        orientation: Orientation::Forward,
        patch: lateral,
        exact_area: None,
    };
    let backward = -first.tangent.into_inner();
    let start_cap = planar_cap(kernel.face_id(), start_center, start_rim, &backward);
    let end_cap = planar_cap(kernel.face_id(), end_center, end_rim, &last.tangent);

    let end_normal = match end_cap.surface() {
        FaceSurface::Plane { normal, .. } => *normal,
        _ => last.tangent,
    };
    let edges = vec![
        Edge {
            id: kernel.edge_id(),
            curve: EdgeCurve::Circle {
                center: start_center,
                normal: profile.normal,
                radius,
            },
        },
        Edge {
            id: kernel.edge_id(),
            curve: EdgeCurve::Circle {
                center: end_center,
                normal: end_normal,
                radius,
            },
        },
        Edge {
            id: kernel.edge_id(),
            curve: EdgeCurve::Polyline {
                points: rings.iter().map(|r| r[0]).collect(),
            },
        },
    ];

    tracing::debug!(
        path_segments,
        profile_segments = k,
        length,
        "swept pipe profile"
    );

    Ok(Solid {
        id: kernel.solid_id(),
        shape: ShapeKind::Pipe,
        shells: vec![Shell {
            kind: ShellKind::Outer,
            faces: vec![lateral_face, start_cap, end_cap],
        }],
        edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TessellationParams;
    use approx::assert_relative_eq;
    use coilcad_kernel_geom::{CylinderSurface, Helix, Line3d};
    use coilcad_kernel_math::Point2;

    fn polygon_area(r: f64, k: usize) -> f64 {
        0.5 * k as f64 * r * r * (2.0 * PI / k as f64).sin()
    }

    #[test]
    fn test_straight_pipe_is_a_prism() {
        let kernel = Kernel::new();
        let spine = Line3d::from_points(Point3::origin(), Point3::new(0.0, 0.0, 2.0));
        let profile = Circle3d::new(Point3::origin(), Vec3::z(), 0.5);
        let pipe = kernel.make_pipe(&spine, &profile).unwrap();

        assert_eq!(pipe.faces().count(), 3);
        assert_relative_eq!(pipe.volume(), polygon_area(0.5, 16) * 2.0, max_relative = 1e-9);

        let top = pipe.extreme_face(Vec3::z()).unwrap();
        assert_relative_eq!(top.centroid().z, 2.0, epsilon = 1e-12);
        assert_relative_eq!(top.area(), PI * 0.25, epsilon = 1e-15);
        let bottom = pipe.extreme_face(-Vec3::z()).unwrap();
        assert_relative_eq!(bottom.centroid().z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_helical_pipe_volume() {
        let kernel = Kernel::new();
        let (rc, rw, turns, h) = (0.01, 0.001, 6.0, 0.0144);
        let cyl = CylinderSurface::with_axis(Point3::new(0.0, 0.0, -h / 2.0), Vec3::z(), rc);
        let spine = cyl
            .embed_segment(Point2::origin(), Point2::new(2.0 * PI * turns, h))
            .unwrap();
        let profile = Circle3d::new(spine.start(), Vec3::y(), rw);
        let pipe = kernel.make_pipe(&spine, &profile).unwrap();

        let expected = PI * rw * rw * spine.length();
        assert_relative_eq!(pipe.volume(), expected, max_relative = 0.04);

        // caps at either end of the winding
        let top = pipe.extreme_face(Vec3::z()).unwrap();
        let bottom = pipe.extreme_face(-Vec3::z()).unwrap();
        assert!(top.centroid().z > 0.0071);
        assert!(bottom.centroid().z < -0.0071);
        assert_relative_eq!(top.area(), PI * rw * rw, max_relative = 1e-12);

        let bb = pipe.bounding_box();
        assert!(bb.max.x <= rc + rw + 1e-9);
        assert!(bb.max.z <= h / 2.0 + rw + 1e-9);
    }

    #[test]
    fn test_lateral_faces_outward() {
        let kernel = Kernel::new();
        let spine = Helix::new(1.0, 2.0, 2.0);
        let profile = Circle3d::new(spine.start(), spine.start_tangent(), 0.2);
        let pipe = kernel.make_pipe(&spine, &profile).unwrap();
        assert!(pipe.volume() > 0.0);
        assert!(pipe.to_mesh().signed_volume() > 0.0);
    }

    #[test]
    fn test_tight_pitch_rejected() {
        let kernel = Kernel::new();
        let spine = Helix::new(0.01, 6.0, 0.0114);
        let profile = Circle3d::new(spine.start(), Vec3::y(), 0.001);
        let err = kernel.make_pipe(&spine, &profile).unwrap_err();
        assert!(matches!(err, KernelError::SelfIntersectingSweep { .. }));
    }

    #[test]
    fn test_profile_wider_than_bend_rejected() {
        let kernel = Kernel::new();
        let spine = Helix::new(0.5, 0.5, 0.0);
        let profile = Circle3d::new(spine.start(), spine.start_tangent(), 0.6);
        let err = kernel.make_pipe(&spine, &profile).unwrap_err();
        assert!(matches!(
            err,
            KernelError::SelfIntersectingSweep { limit, .. } if (limit - 0.5).abs() < 1e-12
        ));
    }

    #[test]
    fn test_degenerate_inputs() {
        let kernel = Kernel::new();
        let point = Line3d::from_points(Point3::origin(), Point3::origin());
        let profile = Circle3d::new(Point3::origin(), Vec3::z(), 0.1);
        assert!(matches!(
            kernel.make_pipe(&point, &profile),
            Err(KernelError::DegenerateSweep(_))
        ));

        let spine = Line3d::from_points(Point3::origin(), Point3::new(0.0, 0.0, 1.0));
        let flat = Circle3d::new(Point3::origin(), Vec3::z(), 0.0);
        assert!(matches!(
            kernel.make_pipe(&spine, &flat),
            Err(KernelError::DegenerateSweep(_))
        ));

        let edge_on = Circle3d::new(Point3::origin(), Vec3::x(), 0.1);
        assert!(matches!(
            kernel.make_pipe(&spine, &edge_on),
            Err(KernelError::DegenerateSweep(_))
        ));
    }

    #[test]
    fn test_path_segments_override() {
        let kernel = Kernel::with_params(TessellationParams {
            path_segments: 10,
            profile_segments: 8,
            ..TessellationParams::default()
        });
        let spine = Line3d::from_points(Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let profile = Circle3d::new(Point3::origin(), Vec3::x(), 0.1);
        let pipe = kernel.make_pipe(&spine, &profile).unwrap();
        let lateral = pipe.faces().next().unwrap();
        assert_eq!(lateral.patch().triangles.len(), 2 * 10 * 8);
        assert_eq!(lateral.vertices().len(), 11 * 8);
    }
}
