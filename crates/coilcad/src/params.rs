//! Coil parameters.
//!
//! Parameters can be built in code or read from a TOML file:
//!
//! ```toml
//! winding_count = 6
//! wire_radius = 0.001
//! coil_radius = 0.01
//! shape = "tubular"
//!
//! [marker]
//! center = [0.005, 0.0, 0.0]
//! ```

use coilcad_kernel::TessellationParams;
use serde::{Deserialize, Serialize};

use crate::CoilError;

/// Axial rise of one winding in units of the wire diameter.
///
/// Adjacent windings keep a 20% gap so the swept wire never touches itself.
pub const WINDING_PITCH_FACTOR: f64 = 1.2;

/// Air-box side length in units of the coil radius.
pub const AIR_SIZE_FACTOR: f64 = 10.0;

/// How the conductor is modelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoilShape {
    /// A circular wire swept along a helix.
    #[default]
    Helical,
    /// An annular tube standing in for the winding pack.
    Tubular,
}

/// A small probe cube placed in the air domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerCube {
    /// Cube center in meters.
    pub center: [f64; 3],
}

impl MarkerCube {
    /// Edge length of every marker cube, in meters.
    pub const EDGE: f64 = 0.001;

    /// A marker centered at `(x, y, z)`.
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self { center: [x, y, z] }
    }
}

/// Per-build overrides of the kernel's tessellation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TessellationOverrides {
    /// Segments around cylinders.
    pub circle_segments: Option<u32>,
    /// Segments around the swept wire profile.
    pub profile_segments: Option<u32>,
    /// Segments along the helix (0 or unset = 48 per turn).
    pub path_segments: Option<u32>,
}

/// Parameters of a coil geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoilParams {
    /// Number of full turns.
    pub winding_count: u32,
    /// Wire radius in meters.
    pub wire_radius: f64,
    /// Mean coil radius in meters.
    pub coil_radius: f64,
    /// Conductor model.
    pub shape: CoilShape,
    /// Optional probe cube.
    pub marker: Option<MarkerCube>,
    /// Normal of the wire profile at the start of the helix.
    ///
    /// The profile is not aligned with the helix tangent; the default Y axis
    /// is close to the tangent at the start point `(coil_radius, 0, z)`. An
    /// axis perpendicular to that tangent puts the tangent in the profile
    /// plane, and the pipe sweep rejects it as degenerate.
    pub profile_axis: [f64; 3],
    /// Tessellation overrides.
    pub tessellation: TessellationOverrides,
}

impl Default for CoilParams {
    fn default() -> Self {
        Self {
            winding_count: 6,
            wire_radius: 0.001,
            coil_radius: 0.01,
            shape: CoilShape::Helical,
            marker: None,
            profile_axis: [0.0, 1.0, 0.0],
            tessellation: TessellationOverrides::default(),
        }
    }
}

impl CoilParams {
    /// Parameters with the given winding count and radii and defaults otherwise.
    pub fn new(shape: CoilShape, winding_count: u32, wire_radius: f64, coil_radius: f64) -> Self {
        Self {
            winding_count,
            wire_radius,
            coil_radius,
            shape,
            ..Self::default()
        }
    }

    /// Add a marker cube.
    pub fn with_marker(mut self, marker: MarkerCube) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Parse parameters from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, CoilError> {
        Ok(toml::from_str(s)?)
    }

    /// Axial extent of the winding.
    pub fn coil_height(&self) -> f64 {
        self.winding_count as f64 * 2.0 * self.wire_radius * WINDING_PITCH_FACTOR
    }

    /// Side length of the air box.
    pub fn air_size(&self) -> f64 {
        AIR_SIZE_FACTOR * self.coil_radius
    }

    /// Half-extents of the coil's bounding box as `(radial, axial)`.
    ///
    /// The swept wire reaches one wire radius past the ends of its helix.
    pub fn coil_half_extents(&self) -> (f64, f64) {
        let radial = self.coil_radius + self.wire_radius;
        let axial = match self.shape {
            CoilShape::Tubular => self.coil_height() / 2.0,
            CoilShape::Helical => self.coil_height() / 2.0 + self.wire_radius,
        };
        (radial, axial)
    }

    /// Kernel tessellation with the overrides applied.
    pub fn tessellation_params(&self) -> TessellationParams {
        let base = TessellationParams::default();
        let t = &self.tessellation;
        TessellationParams {
            circle_segments: t.circle_segments.unwrap_or(base.circle_segments),
            profile_segments: t.profile_segments.unwrap_or(base.profile_segments),
            path_segments: t.path_segments.unwrap_or(base.path_segments),
        }
    }

    /// Check the documented parameter ranges.
    ///
    /// Within `wire_radius < coil_radius` the coil must also fit strictly
    /// inside the air box, since the box never trims it. Geometric
    /// feasibility (an inner tube radius of zero, a wire too thick for its
    /// pitch) is left to the kernel.
    pub fn validate(&self) -> Result<(), CoilError> {
        if self.winding_count < 1 {
            return Err(CoilError::InvalidParameters(
                "winding_count must be at least 1".into(),
            ));
        }
        for (name, value) in [
            ("wire_radius", self.wire_radius),
            ("coil_radius", self.coil_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CoilError::InvalidParameters(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        let [ax, ay, az] = self.profile_axis;
        let norm = (ax * ax + ay * ay + az * az).sqrt();
        if !(norm.is_finite() && norm > 0.0) {
            return Err(CoilError::InvalidParameters(format!(
                "profile_axis must be a non-zero vector, got {:?}",
                self.profile_axis
            )));
        }
        let half = self.air_size() / 2.0;
        let (radial, axial) = self.coil_half_extents();
        if self.wire_radius < self.coil_radius && (radial >= half || axial >= half) {
            return Err(CoilError::InvalidParameters(format!(
                "coil of height {} with {} windings does not fit inside the air box of side {}",
                self.coil_height(),
                self.winding_count,
                self.air_size()
            )));
        }
        if let Some(marker) = &self.marker {
            let reach = self.air_size() / 2.0 - MarkerCube::EDGE / 2.0;
            if marker.center.iter().any(|c| !(c.abs() < reach)) {
                return Err(CoilError::InvalidParameters(format!(
                    "marker at {:?} does not fit inside the air box of side {}",
                    marker.center,
                    self.air_size()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = CoilParams::default();
        assert_eq!(p.winding_count, 6);
        assert_eq!(p.shape, CoilShape::Helical);
        assert!((p.coil_height() - 0.0144).abs() < 1e-15);
        assert!((p.air_size() - 0.1).abs() < 1e-15);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_height_is_monotonic() {
        let base = CoilParams::default();
        let mut more_turns = base.clone();
        more_turns.winding_count += 1;
        let mut thicker = base.clone();
        thicker.wire_radius *= 1.5;
        assert!(more_turns.coil_height() > base.coil_height());
        assert!(thicker.coil_height() > base.coil_height());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut p = CoilParams::default();
        p.winding_count = 0;
        assert!(matches!(p.validate(), Err(CoilError::InvalidParameters(_))));

        let mut p = CoilParams::default();
        p.wire_radius = -0.001;
        assert!(matches!(p.validate(), Err(CoilError::InvalidParameters(_))));

        let mut p = CoilParams::default();
        p.coil_radius = f64::INFINITY;
        assert!(matches!(p.validate(), Err(CoilError::InvalidParameters(_))));

        let mut p = CoilParams::default();
        p.profile_axis = [0.0; 3];
        assert!(matches!(p.validate(), Err(CoilError::InvalidParameters(_))));

        let p = CoilParams::default().with_marker(MarkerCube::at(0.2, 0.0, 0.0));
        assert!(matches!(p.validate(), Err(CoilError::InvalidParameters(_))));
    }

    #[test]
    fn test_coil_radius_not_checked_against_wire() {
        // left for the kernel to reject, even when the tube is also too tall
        let p = CoilParams::new(CoilShape::Tubular, 6, 0.01, 0.01);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_coil_must_fit_air_box() {
        // 34 windings: height 0.0816, box side 0.1
        let p = CoilParams::new(CoilShape::Tubular, 34, 0.001, 0.01);
        assert!(p.validate().is_ok());
        // the wire reaches 0.0408 + 0.001 < 0.05
        let p = CoilParams::new(CoilShape::Helical, 34, 0.001, 0.01);
        assert!(p.validate().is_ok());

        for shape in [CoilShape::Tubular, CoilShape::Helical] {
            let p = CoilParams::new(shape, 50, 0.001, 0.01);
            assert!(p.coil_height() > p.air_size());
            assert!(matches!(p.validate(), Err(CoilError::InvalidParameters(_))));
        }

        // 41 windings: the tube ends at 0.0492 but the wire reaches 0.0502
        let p = CoilParams::new(CoilShape::Tubular, 41, 0.001, 0.01);
        assert!(p.validate().is_ok());
        let p = CoilParams::new(CoilShape::Helical, 41, 0.001, 0.01);
        assert!(matches!(p.validate(), Err(CoilError::InvalidParameters(_))));
    }

    #[test]
    fn test_from_toml() {
        let p = CoilParams::from_toml_str(
            r#"
            winding_count = 3
            shape = "tubular"

            [marker]
            center = [0.005, 0.0, 0.0]

            [tessellation]
            circle_segments = 32
            "#,
        )
        .unwrap();
        assert_eq!(p.winding_count, 3);
        assert_eq!(p.wire_radius, 0.001);
        assert_eq!(p.shape, CoilShape::Tubular);
        assert_eq!(p.marker, Some(MarkerCube::at(0.005, 0.0, 0.0)));
        let t = p.tessellation_params();
        assert_eq!(t.circle_segments, 32);
        assert_eq!(t.profile_segments, TessellationParams::default().profile_segments);
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        let err = CoilParams::from_toml_str("windings = 3").unwrap_err();
        assert!(matches!(err, CoilError::Config(_)));
    }
}
