//! Point-in-solid classification.
//!
//! Points are classified by casting rays against the oriented triangles of
//! every shell and counting crossings. Three skewed ray directions vote, so
//! a ray grazing an edge or vertex cannot flip the answer on its own.

use coilcad_kernel_math::{Point3, Vec3};

use crate::topology::Solid;

/// Position of a point relative to a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClass {
    /// Strictly inside the material.
    Inside,
    /// Strictly outside the material (including inside a void).
    Outside,
    /// Within tolerance of a face.
    OnBoundary,
}

const RAY_DIRECTIONS: [[f64; 3]; 3] = [
    [0.577_215_664_9, 0.318_309_886_2, 0.751_988_482_1],
    [-0.267_949_192_4, 0.858_407_346_4, -0.437_016_024_4],
    [0.141_592_653_6, -0.693_147_180_6, 0.706_858_347_1],
];

pub(crate) fn classify_point(solid: &Solid, p: &Point3, tol: f64) -> PointClass {
    let mut bbox = solid.bounding_box();
    bbox.expand(tol);
    if !bbox.contains_point(p) {
        return PointClass::Outside;
    }

    let dirs = RAY_DIRECTIONS.map(|d| Vec3::new(d[0], d[1], d[2]).normalize());
    let mut crossings = [0usize; 3];
    for [a, b, c] in solid.faces().flat_map(|f| f.triangles()) {
        if distance_to_triangle(p, &a, &b, &c) <= tol {
            return PointClass::OnBoundary;
        }
        for (dir, count) in dirs.iter().zip(crossings.iter_mut()) {
            if ray_hits_triangle(p, dir, &a, &b, &c) {
                *count += 1;
            }
        }
    }

    let odd = crossings.iter().filter(|&&n| n % 2 == 1).count();
    if odd >= 2 {
        PointClass::Inside
    } else {
        PointClass::Outside
    }
}

/// Möller–Trumbore intersection of the line `origin + t·dir` with triangle
/// `abc`, returning `t`.
fn intersect_line(origin: &Point3, dir: &Vec3, a: &Point3, b: &Point3, c: &Point3) -> Option<f64> {
    let e1 = b - a;
    let e2 = c - a;
    let h = dir.cross(&e2);
    let det = e1.dot(&h);
    if det.abs() < 1e-300 {
        return None;
    }
    let inv = 1.0 / det;
    let s = origin - a;
    let u = inv * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(&e1);
    let v = inv * dir.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    Some(inv * e2.dot(&q))
}

fn ray_hits_triangle(origin: &Point3, dir: &Vec3, a: &Point3, b: &Point3, c: &Point3) -> bool {
    intersect_line(origin, dir, a, b, c).is_some_and(|t| t > 0.0)
}

/// True if the open segment `pq` passes through triangle `abc`.
pub(crate) fn segment_hits_triangle(p: &Point3, q: &Point3, tri: &[Point3; 3]) -> bool {
    const EPS: f64 = 1e-9;
    intersect_line(p, &(q - p), &tri[0], &tri[1], &tri[2]).is_some_and(|t| t > EPS && t < 1.0 - EPS)
}

/// Distance from `p` to the closest point of triangle `abc`.
fn distance_to_triangle(p: &Point3, a: &Point3, b: &Point3, c: &Point3) -> f64 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return ap.norm();
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return bp.norm();
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (p - (a + v * ab)).norm();
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return cp.norm();
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (p - (a + w * ac)).norm();
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (p - (b + w * (c - b))).norm();
    }

    let denom = va + vb + vc;
    if denom.abs() < 1e-300 {
        // collinear triangle
        return ap.norm().min(bp.norm()).min(cp.norm());
    }
    let v = vb / denom;
    let w = vc / denom;
    (p - (a + v * ab + w * ac)).norm()
}
