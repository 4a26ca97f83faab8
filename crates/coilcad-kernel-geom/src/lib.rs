#![warn(missing_docs)]

//! Analytic surface and curve types for the coilcad kernel.
//!
//! Provides the [`Curve3d`] abstraction used as a sweep spine, with concrete
//! lines, circles and helices, and the [`CylinderSurface`] whose parameter
//! space is used to embed helical winding paths.

use std::f64::consts::PI;
use coilcad_kernel_math::{perpendicular_basis, Dir3, Point2, Point3, Vec3};
use thiserror::Error;

/// Errors raised while constructing curves and surfaces.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    /// The curve would have zero length.
    #[error("degenerate curve: {0}")]
    DegenerateCurve(String),
    /// The surface parameters are invalid (e.g. non-positive radius).
    #[error("invalid surface: {0}")]
    InvalidSurface(String),
}

// =============================================================================
// Curve types
// =============================================================================

/// A parametric curve in 3D space.
pub trait Curve3d: Send + Sync + std::fmt::Debug {
    /// Evaluate the curve at parameter `t` to get a 3D point.
    fn evaluate(&self, t: f64) -> Point3;

    /// Tangent vector at parameter `t`.
    fn tangent(&self, t: f64) -> Vec3;

    /// Parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64);

    /// Suggested number of segments for smooth tessellation.
    ///
    /// Override this for curves with high curvature (like helices).
    /// Default returns 32.
    fn suggested_segments(&self) -> usize {
        32
    }

    /// Smallest radius of curvature along the curve, `None` for straight curves.
    fn min_curvature_radius(&self) -> Option<f64> {
        None
    }

    /// Distance between neighbouring passes of the curve, for curves that
    /// wind back on themselves (helices with more than one turn).
    fn turn_clearance(&self) -> Option<f64> {
        None
    }

    /// Start point of the curve.
    fn start(&self) -> Point3 {
        self.evaluate(self.domain().0)
    }

    /// End point of the curve.
    fn end(&self) -> Point3 {
        self.evaluate(self.domain().1)
    }

    /// Tangent at the start of the curve.
    fn start_tangent(&self) -> Vec3 {
        self.tangent(self.domain().0)
    }

    /// Approximate arc length by sampling.
    fn length(&self) -> f64 {
        let (t_min, t_max) = self.domain();
        let n_samples = self.suggested_segments().max(20);
        let dt = (t_max - t_min) / n_samples as f64;

        let mut length = 0.0;
        let mut prev = self.evaluate(t_min);
        for i in 1..=n_samples {
            let curr = self.evaluate(t_min + i as f64 * dt);
            length += (curr - prev).norm();
            prev = curr;
        }
        length
    }
}

// =============================================================================
// Line3d
// =============================================================================

/// A straight line segment.
#[derive(Debug, Clone)]
pub struct Line3d {
    /// Starting point.
    pub origin: Point3,
    /// Direction. Its length sets the parameter speed.
    pub direction: Vec3,
}

impl Line3d {
    /// Create a line from two endpoints, parameterized so `t=0` gives `start` and `t=1` gives `end`.
    pub fn from_points(start: Point3, end: Point3) -> Self {
        Self {
            origin: start,
            direction: end - start,
        }
    }
}

impl Curve3d for Line3d {
    fn evaluate(&self, t: f64) -> Point3 {
        self.origin + t * self.direction
    }

    fn tangent(&self, _t: f64) -> Vec3 {
        self.direction
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn suggested_segments(&self) -> usize {
        2
    }
}

// =============================================================================
// Circle3d
// =============================================================================

/// A full circle lying in the plane normal to `normal`.
///
/// Parameterization: `P(t) = center + radius * (cos(t) * ref_dir + sin(t) * (normal × ref_dir))`
/// for `t ∈ [0, 2π)`.
#[derive(Debug, Clone)]
pub struct Circle3d {
    /// Center of the circle.
    pub center: Point3,
    /// Unit normal of the circle's plane.
    pub normal: Dir3,
    /// Direction of the `t = 0` point from the center.
    pub ref_dir: Dir3,
    /// Radius.
    pub radius: f64,
}

impl Circle3d {
    /// Create a circle with the given center, plane normal and radius.
    pub fn new(center: Point3, normal: Vec3, radius: f64) -> Self {
        let normal = Dir3::new_normalize(normal);
        let (ref_dir, _) = perpendicular_basis(&normal);
        Self {
            center,
            normal,
            ref_dir,
            radius,
        }
    }

    fn y_dir(&self) -> Vec3 {
        self.normal.as_ref().cross(self.ref_dir.as_ref())
    }

    /// `n` evenly spaced points around the circle, starting at `t = 0`.
    pub fn sample(&self, n: usize) -> Vec<Point3> {
        (0..n)
            .map(|i| self.evaluate(2.0 * PI * i as f64 / n as f64))
            .collect()
    }

    /// Enclosed disk area.
    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }
}

impl Curve3d for Circle3d {
    fn evaluate(&self, t: f64) -> Point3 {
        let (s, c) = t.sin_cos();
        self.center + self.radius * (c * self.ref_dir.as_ref() + s * self.y_dir())
    }

    fn tangent(&self, t: f64) -> Vec3 {
        let (s, c) = t.sin_cos();
        self.radius * (-s * self.ref_dir.as_ref() + c * self.y_dir())
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 2.0 * PI)
    }

    fn min_curvature_radius(&self) -> Option<f64> {
        Some(self.radius)
    }
}

// =============================================================================
// Helix
// =============================================================================

/// A circular helix.
///
/// The helix is parameterized as:
/// ```text
/// angle(t) = phase + 2π * turns * t
/// P(t)     = center + radius * (cos(angle) * ref_dir + sin(angle) * (axis × ref_dir)) + height * t * axis
/// ```
///
/// Where `t ∈ [0, 1]`.
#[derive(Debug, Clone)]
pub struct Helix {
    /// Point on the axis at the height of `t = 0`.
    pub center: Point3,
    /// Unit direction of the helix axis.
    pub axis: Dir3,
    /// Reference direction for angle zero (perpendicular to axis).
    pub ref_dir: Dir3,
    /// Radius of the helix.
    pub radius: f64,
    /// Angle at `t = 0` in radians.
    pub phase: f64,
    /// Number of turns (negative for left-handed winding).
    pub turns: f64,
    /// Total rise along the axis.
    pub height: f64,
}

impl Helix {
    /// Create a helix about the Z axis starting at `(radius, 0, 0)`.
    pub fn new(radius: f64, turns: f64, height: f64) -> Self {
        Self {
            center: Point3::origin(),
            axis: Dir3::new_normalize(Vec3::z()),
            ref_dir: Dir3::new_normalize(Vec3::x()),
            radius,
            phase: 0.0,
            turns,
            height,
        }
    }

    fn y_dir(&self) -> Vec3 {
        self.axis.as_ref().cross(self.ref_dir.as_ref())
    }

    /// Axial rise per full turn.
    pub fn pitch(&self) -> Option<f64> {
        (self.turns.abs() > 1e-12).then(|| (self.height / self.turns).abs())
    }
}

impl Curve3d for Helix {
    fn evaluate(&self, t: f64) -> Point3 {
        let (s, c) = (self.phase + 2.0 * PI * self.turns * t).sin_cos();
        self.center
            + self.radius * (c * self.ref_dir.as_ref() + s * self.y_dir())
            + self.height * t * self.axis.as_ref()
    }

    fn tangent(&self, t: f64) -> Vec3 {
        let (s, c) = (self.phase + 2.0 * PI * self.turns * t).sin_cos();
        let d_angle = 2.0 * PI * self.turns;
        self.radius * d_angle * (-s * self.ref_dir.as_ref() + c * self.y_dir())
            + self.height * self.axis.as_ref()
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn suggested_segments(&self) -> usize {
        // 48 segments per turn for smooth helix, minimum 64
        ((self.turns.abs() * 48.0).ceil() as usize).max(64)
    }

    fn min_curvature_radius(&self) -> Option<f64> {
        if self.turns.abs() < 1e-12 || self.radius <= 0.0 {
            return None;
        }
        // constant curvature r / (r² + c²), with c the rise per radian
        let c = self.height / (2.0 * PI * self.turns);
        Some((self.radius * self.radius + c * c) / self.radius)
    }

    fn turn_clearance(&self) -> Option<f64> {
        if self.turns.abs() > 1.0 {
            self.pitch()
        } else {
            None
        }
    }
}

// =============================================================================
// CylinderSurface
// =============================================================================

/// A cylindrical surface defined by axis and radius.
///
/// Parameterization: `P(u, v) = center + radius * (cos(u) * ref_dir + sin(u) * (axis × ref_dir)) + v * axis`
///
/// Where `u ∈ [0, 2π)` is the angular parameter and `v` is the height along the axis.
#[derive(Debug, Clone)]
pub struct CylinderSurface {
    /// Center point at the base of the cylinder axis.
    pub center: Point3,
    /// Unit direction along the cylinder axis.
    pub axis: Dir3,
    /// Reference direction for u=0 (perpendicular to axis).
    pub ref_dir: Dir3,
    /// Radius of the cylinder.
    pub radius: f64,
}

impl CylinderSurface {
    /// Create a cylinder with axis along Z, centered at origin.
    pub fn new(radius: f64) -> Self {
        Self {
            center: Point3::origin(),
            axis: Dir3::new_normalize(Vec3::z()),
            ref_dir: Dir3::new_normalize(Vec3::x()),
            radius,
        }
    }

    /// Create a cylinder with a custom center and axis.
    pub fn with_axis(center: Point3, axis: Vec3, radius: f64) -> Self {
        let axis = Dir3::new_normalize(axis);
        let (ref_dir, _) = perpendicular_basis(&axis);
        Self {
            center,
            axis,
            ref_dir,
            radius,
        }
    }

    fn y_dir(&self) -> Vec3 {
        self.axis.as_ref().cross(self.ref_dir.as_ref())
    }

    /// Evaluate the surface at parameter `(u, v)`.
    pub fn evaluate(&self, uv: Point2) -> Point3 {
        let (sin_u, cos_u) = uv.x.sin_cos();
        self.center
            + self.radius * (cos_u * self.ref_dir.as_ref() + sin_u * self.y_dir())
            + uv.y * self.axis.as_ref()
    }

    /// Outward unit normal at parameter `(u, v)`.
    pub fn normal(&self, uv: Point2) -> Dir3 {
        let (sin_u, cos_u) = uv.x.sin_cos();
        Dir3::new_normalize(cos_u * self.ref_dir.as_ref() + sin_u * self.y_dir())
    }

    /// Map a straight segment of the `(u, v)` parameter plane onto the surface.
    ///
    /// A segment from `(u0, v0)` to `(u0 + 2πn, v0 + h)` becomes a helix of
    /// `n` turns rising by `h`.
    pub fn embed_segment(&self, start: Point2, end: Point2) -> Result<Helix, GeomError> {
        if !(self.radius > 0.0) || !self.radius.is_finite() {
            return Err(GeomError::InvalidSurface(format!(
                "cylinder radius must be positive, got {}",
                self.radius
            )));
        }
        let delta = end - start;
        if !(delta.x.is_finite() && delta.y.is_finite()) || delta.norm() < 1e-15 {
            return Err(GeomError::DegenerateCurve(format!(
                "parameter segment from {start} to {end} has no length"
            )));
        }
        Ok(Helix {
            center: self.center + start.y * self.axis.as_ref(),
            axis: self.axis,
            ref_dir: self.ref_dir,
            radius: self.radius,
            phase: start.x,
            turns: delta.x / (2.0 * PI),
            height: delta.y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_line_evaluate() {
        let line = Line3d::from_points(Point3::origin(), Point3::new(0.0, 0.0, 10.0));
        let mid = line.evaluate(0.5);
        assert!((mid.z - 5.0).abs() < 1e-12);
        assert!(line.min_curvature_radius().is_none());
        assert_relative_eq!(line.length(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circle_plane() {
        let circle = Circle3d::new(Point3::new(1.0, 2.0, 3.0), Vec3::y(), 0.5);
        for p in circle.sample(16) {
            // every point stays in the plane y = 2 at distance 0.5 from the center
            assert!((p.y - 2.0).abs() < 1e-12);
            assert_relative_eq!((p - circle.center).norm(), 0.5, epsilon = 1e-12);
        }
        assert_relative_eq!(circle.area(), PI * 0.25, epsilon = 1e-15);
    }

    #[test]
    fn test_helix_evaluate() {
        let helix = Helix::new(10.0, 2.0, 10.0);

        // At t=0, should be at (10, 0, 0)
        let p0 = helix.evaluate(0.0);
        assert!((p0.x - 10.0).abs() < 1e-9);
        assert!(p0.y.abs() < 1e-9);
        assert!(p0.z.abs() < 1e-9);

        // At t=1, should be at (10, 0, 10) (full 2 turns back to x-axis)
        let p1 = helix.evaluate(1.0);
        assert!((p1.x - 10.0).abs() < 1e-9);
        assert!(p1.y.abs() < 1e-9);
        assert!((p1.z - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_helix_tangent_matches_finite_difference() {
        let helix = Helix::new(0.01, 6.0, 0.0144);
        let t = 0.37;
        let h = 1e-7;
        let fd = (helix.evaluate(t + h) - helix.evaluate(t - h)) / (2.0 * h);
        let analytic = helix.tangent(t);
        assert!((fd - analytic).norm() / analytic.norm() < 1e-6);
    }

    #[test]
    fn test_helix_pitch_and_clearance() {
        let helix = Helix::new(0.01, 6.0, 0.0144);
        assert_relative_eq!(helix.pitch().unwrap(), 0.0024, epsilon = 1e-15);
        assert_relative_eq!(helix.turn_clearance().unwrap(), 0.0024, epsilon = 1e-15);

        let single = Helix::new(0.01, 0.5, 0.0144);
        assert!(single.turn_clearance().is_none());
    }

    #[test]
    fn test_helix_curvature_radius() {
        // flat helix degenerates to a circle
        let flat = Helix::new(2.0, 3.0, 0.0);
        assert_relative_eq!(flat.min_curvature_radius().unwrap(), 2.0, epsilon = 1e-12);

        // pitched helix curves less tightly than its radius
        let steep = Helix::new(2.0, 1.0, 20.0);
        assert!(steep.min_curvature_radius().unwrap() > 2.0);

        let straight = Helix::new(2.0, 0.0, 5.0);
        assert!(straight.min_curvature_radius().is_none());
    }

    #[test]
    fn test_helix_length() {
        let helix = Helix::new(1.0, 3.0, 4.0);
        let expected = ((2.0 * PI * 3.0_f64).powi(2) + 16.0).sqrt();
        assert_relative_eq!(helix.length(), expected, max_relative = 1e-3);
    }

    #[test]
    fn test_cylinder_evaluate() {
        let c = CylinderSurface::new(5.0);
        // u=0, v=0 should give (5, 0, 0)
        let pt = c.evaluate(Point2::new(0.0, 0.0));
        assert!((pt.x - 5.0).abs() < 1e-12);
        assert!(pt.y.abs() < 1e-12);
        assert!(pt.z.abs() < 1e-12);
        // u=PI/2, v=3 should give (0, 5, 3)
        let pt2 = c.evaluate(Point2::new(PI / 2.0, 3.0));
        assert!(pt2.x.abs() < 1e-12);
        assert!((pt2.y - 5.0).abs() < 1e-12);
        assert!((pt2.z - 3.0).abs() < 1e-12);

        let n = c.normal(Point2::new(PI / 2.0, 3.0));
        assert!((n.as_ref().y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_embed_segment_gives_helix() {
        let cyl = CylinderSurface::with_axis(Point3::new(0.0, 0.0, -0.0072), Vec3::z(), 0.01);
        let helix = cyl
            .embed_segment(Point2::origin(), Point2::new(6.0 * 2.0 * PI, 0.0144))
            .unwrap();

        assert_relative_eq!(helix.turns, 6.0, epsilon = 1e-12);
        assert_relative_eq!(helix.height, 0.0144, epsilon = 1e-15);

        let start = helix.start();
        assert_relative_eq!(start.x, 0.01, epsilon = 1e-12);
        assert_relative_eq!(start.z, -0.0072, epsilon = 1e-12);

        let end = helix.end();
        assert_relative_eq!(end.x, 0.01, epsilon = 1e-12);
        assert!(end.y.abs() < 1e-12);
        assert_relative_eq!(end.z, 0.0072, epsilon = 1e-12);

        // every sample lies on the cylinder
        for i in 0..=20 {
            let p = helix.evaluate(i as f64 / 20.0);
            assert_relative_eq!((p.x * p.x + p.y * p.y).sqrt(), 0.01, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_embed_degenerate_segment() {
        let cyl = CylinderSurface::new(1.0);
        let result = cyl.embed_segment(Point2::new(1.0, 1.0), Point2::new(1.0, 1.0));
        assert!(matches!(result, Err(GeomError::DegenerateCurve(_))));

        let bad = CylinderSurface::new(0.0);
        let result = bad.embed_segment(Point2::origin(), Point2::new(1.0, 1.0));
        assert!(matches!(result, Err(GeomError::InvalidSurface(_))));
    }
}
