//! Moving frames for carrying a profile along a spine.

use coilcad_kernel_geom::Curve3d;
use coilcad_kernel_math::{perpendicular_basis, Dir3, Point3, Vec3};

/// An orthonormal frame attached to a point on a curve.
#[derive(Debug, Clone)]
pub struct FrenetFrame {
    /// Position on the curve.
    pub position: Point3,
    /// Unit tangent vector (along the curve).
    pub tangent: Dir3,
    /// Unit normal vector.
    pub normal: Dir3,
    /// Unit binormal vector (tangent × normal).
    pub binormal: Dir3,
}

impl FrenetFrame {
    /// Frame at parameter `t` with an arbitrary but repeatable normal.
    pub fn at(curve: &dyn Curve3d, t: f64) -> Option<Self> {
        let position = curve.evaluate(t);
        let tangent = curve.tangent(t);
        if tangent.norm() < 1e-12 {
            return None;
        }
        let tangent = Dir3::new_normalize(tangent);
        let (normal, binormal) = perpendicular_basis(&tangent);
        Some(Self {
            position,
            tangent,
            normal,
            binormal,
        })
    }

    /// Express `p` in this frame as `(along tangent, along normal, along binormal)`.
    pub fn local_coords(&self, p: &Point3) -> Vec3 {
        let d = p - self.position;
        Vec3::new(
            d.dot(self.tangent.as_ref()),
            d.dot(self.normal.as_ref()),
            d.dot(self.binormal.as_ref()),
        )
    }

    /// Map local coordinates back to a world point.
    pub fn world_point(&self, local: &Vec3) -> Point3 {
        self.position
            + local.x * self.tangent.as_ref()
            + local.y * self.normal.as_ref()
            + local.z * self.binormal.as_ref()
    }
}

/// Compute a sequence of rotation-minimizing frames along a curve.
///
/// Frames are propagated with the double reflection method, so the profile
/// does not twist about the tangent beyond what the curve's torsion forces.
/// Returns an empty vector when fewer than two samples are requested or the
/// curve has no tangent at its start.
pub fn rotation_minimizing_frames(curve: &dyn Curve3d, n_samples: usize) -> Vec<FrenetFrame> {
    if n_samples < 2 {
        return vec![];
    }
    let (t_min, t_max) = curve.domain();
    let Some(first) = FrenetFrame::at(curve, t_min) else {
        return vec![];
    };
    let dt = (t_max - t_min) / (n_samples - 1) as f64;

    let mut frames = Vec::with_capacity(n_samples);
    frames.push(first);

    for i in 1..n_samples {
        let t = t_min + i as f64 * dt;
        let prev = &frames[i - 1];
        let xi = curve.evaluate(t);

        let v1 = xi - prev.position;
        let c1 = v1.dot(&v1);
        let ti = curve.tangent(t);
        if c1 < 1e-24 || ti.norm() < 1e-12 {
            let frame = FrenetFrame {
                position: xi,
                ..prev.clone()
            };
            frames.push(frame);
            continue;
        }

        let ri_l = prev.normal.as_ref() - (2.0 / c1) * v1.dot(prev.normal.as_ref()) * v1;
        let ti_l = prev.tangent.as_ref() - (2.0 / c1) * v1.dot(prev.tangent.as_ref()) * v1;

        let ti = Dir3::new_normalize(ti);
        let v2 = ti.as_ref() - ti_l;
        let c2 = v2.dot(&v2);
        let ri = if c2 < 1e-24 {
            ri_l
        } else {
            ri_l - (2.0 / c2) * v2.dot(&ri_l) * v2
        };

        // re-orthogonalize against the analytic tangent
        let ri = ri - ri.dot(ti.as_ref()) * ti.as_ref();
        let normal = Dir3::new_normalize(ri);
        let binormal = Dir3::new_normalize(ti.as_ref().cross(normal.as_ref()));
        frames.push(FrenetFrame {
            position: xi,
            tangent: ti,
            normal,
            binormal,
        });
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use coilcad_kernel_geom::{Helix, Line3d};

    #[test]
    fn test_frames_along_line_do_not_rotate() {
        let line = Line3d::from_points(Point3::origin(), Point3::new(0.0, 0.0, 10.0));
        let frames = rotation_minimizing_frames(&line, 5);
        assert_eq!(frames.len(), 5);
        for f in &frames {
            assert!((f.tangent.as_ref().z - 1.0).abs() < 1e-12);
            assert!(f.normal.as_ref().dot(frames[0].normal.as_ref()) > 1.0 - 1e-12);
        }
        assert!((frames[4].position.z - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_frames_stay_orthonormal_on_helix() {
        let helix = Helix::new(0.01, 6.0, 0.0144);
        let frames = rotation_minimizing_frames(&helix, 289);
        for f in &frames {
            let (t, n, b) = (f.tangent.as_ref(), f.normal.as_ref(), f.binormal.as_ref());
            assert!(t.dot(n).abs() < 1e-9);
            assert!(t.dot(b).abs() < 1e-9);
            assert!(n.dot(b).abs() < 1e-9);
            assert!((t.cross(n) - b).norm() < 1e-9);
        }
    }

    #[test]
    fn test_local_coords_roundtrip_through_frame() {
        let frame = FrenetFrame {
            position: Point3::new(1.0, 2.0, 3.0),
            tangent: Dir3::new_normalize(Vec3::y()),
            normal: Dir3::new_normalize(Vec3::z()),
            binormal: Dir3::new_normalize(Vec3::x()),
        };
        let p = Point3::new(1.5, 2.25, 2.0);
        let local = frame.local_coords(&p);
        assert!((local - Vec3::new(0.25, -1.0, 0.5)).norm() < 1e-12);
        assert!((frame.world_point(&local) - p).norm() < 1e-12);
    }

    #[test]
    fn test_too_few_samples() {
        let line = Line3d::from_points(Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        assert!(rotation_minimizing_frames(&line, 1).is_empty());
    }
}
