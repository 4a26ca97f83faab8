//! Export document for coilcad geometries.
//!
//! A [`Document`] records how a geometry was constructed (a DAG of
//! [`CsgOp`] nodes) together with everything a downstream mesher or solver
//! needs to consume it: one [`RegionEntry`] per material region, one
//! [`BoundaryEntry`] per named or mesh-hinted face, and the coil's
//! cross-section area. It carries no mesh data.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Unique identifier for a node in the construction graph.
pub type NodeId = u64;

/// 3D vector with f64 components (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Helical sweep path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelixPath {
    /// Point on the axis at the start of the helix.
    pub center: Vec3,
    /// Axis direction.
    pub axis: Vec3,
    /// Helix radius.
    pub radius: f64,
    /// Number of turns.
    pub turns: f64,
    /// Rise along the axis.
    pub height: f64,
}

/// Construction operation. Leaves build solids, the rest combine children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CsgOp {
    /// Axis-aligned box between two corners.
    Box {
        /// Minimum corner.
        min: Vec3,
        /// Maximum corner.
        max: Vec3,
    },
    /// Axis-aligned cube of the given edge length.
    Cube {
        /// Cube center.
        center: Vec3,
        /// Edge length.
        size: f64,
    },
    /// Right circular cylinder.
    Cylinder {
        /// Base center.
        base: Vec3,
        /// Axis direction.
        axis: Vec3,
        /// Radius.
        radius: f64,
        /// Extent along the axis.
        height: f64,
    },
    /// Circular profile swept along a helix.
    Pipe {
        /// Sweep path.
        path: HelixPath,
        /// Profile radius.
        profile_radius: f64,
        /// Normal of the profile plane at the path start.
        profile_axis: Vec3,
    },
    /// Boolean difference (left minus right).
    Difference {
        /// Left operand (base).
        left: NodeId,
        /// Right operand (subtracted).
        right: NodeId,
    },
    /// Glued compound sharing coincident faces.
    Glue {
        /// Operands in order.
        children: Vec<NodeId>,
    },
}

impl CsgOp {
    /// Nodes this operation refers to.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            CsgOp::Difference { left, right } => vec![*left, *right],
            CsgOp::Glue { children } => children.clone(),
            _ => Vec::new(),
        }
    }
}

/// A node in the construction graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// The operation this node represents.
    pub op: CsgOp,
}

/// A material region of the glued geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    /// Node that produced the region's solid.
    pub root: NodeId,
    /// Material name (`"coil"`, `"air"`, `"cube"`).
    pub material: String,
    /// Solid-group name, when set separately from the material.
    pub solid_name: Option<String>,
    /// Enclosed volume in m³.
    pub volume: f64,
    /// Mesh-size hint for the region's volume elements.
    pub max_h: Option<f64>,
    /// Mesh-size hint for the region's edges.
    pub edge_max_h: Option<f64>,
}

/// A boundary face carrying a name or a mesh-size hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryEntry {
    /// Kernel face id.
    pub face: u64,
    /// Boundary name.
    pub name: Option<String>,
    /// Face area in m².
    pub area: f64,
    /// Mesh-size hint for the face.
    pub max_h: Option<f64>,
    /// Materials of the regions on either side (one entry for outer faces).
    pub materials: Vec<String>,
}

/// A coilcad document, serialized as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version string.
    pub version: String,
    /// All nodes in the graph, keyed by [`NodeId`].
    pub nodes: BTreeMap<NodeId, Node>,
    /// Material regions.
    pub regions: Vec<RegionEntry>,
    /// Named or hinted boundary faces.
    pub boundaries: Vec<BoundaryEntry>,
    /// Coil cross-section area in m².
    pub cross_section: f64,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            nodes: BTreeMap::new(),
            regions: Vec::new(),
            boundaries: Vec::new(),
            cross_section: 0.0,
        }
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Regions with the given material.
    pub fn regions_with_material<'a>(
        &'a self,
        material: &'a str,
    ) -> impl Iterator<Item = &'a RegionEntry> + 'a {
        self.regions.iter().filter(move |r| r.material == material)
    }

    /// Sum of all region volumes.
    pub fn total_volume(&self) -> f64 {
        self.regions.iter().map(|r| r.volume).sum()
    }

    /// Distinct boundary names.
    pub fn boundary_names(&self) -> BTreeSet<&str> {
        self.boundaries
            .iter()
            .filter_map(|b| b.name.as_deref())
            .collect()
    }

    /// Node ids referenced by an operation or a region but missing from `nodes`.
    pub fn dangling_references(&self) -> Vec<NodeId> {
        let referenced = self
            .nodes
            .values()
            .flat_map(|n| n.op.children())
            .chain(self.regions.iter().map(|r| r.root));
        let mut missing: Vec<NodeId> = referenced
            .filter(|id| !self.nodes.contains_key(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tube_document() -> Document {
        let mut doc = Document::new();
        let axis = Vec3::new(0.0, 0.0, 1.0);
        let base = Vec3::new(0.0, 0.0, -0.0072);
        for (id, radius) in [(1, 0.011), (2, 0.009)] {
            doc.nodes.insert(
                id,
                Node {
                    id,
                    name: None,
                    op: CsgOp::Cylinder {
                        base,
                        axis,
                        radius,
                        height: 0.0144,
                    },
                },
            );
        }
        doc.nodes.insert(
            3,
            Node {
                id: 3,
                name: Some("coil".to_string()),
                op: CsgOp::Difference { left: 1, right: 2 },
            },
        );
        doc.regions.push(RegionEntry {
            root: 3,
            material: "coil".to_string(),
            solid_name: Some("coil".to_string()),
            volume: 1.8e-6,
            max_h: Some(0.001),
            edge_max_h: Some(0.001),
        });
        doc.boundaries.push(BoundaryEntry {
            face: 0,
            name: Some("outer".to_string()),
            area: 0.01,
            max_h: None,
            materials: vec!["air".to_string()],
        });
        doc.cross_section = 1.2566e-4;
        doc
    }

    #[test]
    fn roundtrip_document() {
        let doc = tube_document();
        let json = doc.to_json().unwrap();
        let restored = Document::from_json(&json).unwrap();
        assert_eq!(doc, restored);
    }

    #[test]
    fn csg_op_is_tagged() {
        let op = CsgOp::Glue {
            children: vec![3, 7],
        };
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains("\"type\":\"Glue\""));
        assert_eq!(op.children(), vec![3, 7]);
    }

    #[test]
    fn queries() {
        let doc = tube_document();
        assert_eq!(doc.regions_with_material("coil").count(), 1);
        assert_eq!(doc.regions_with_material("air").count(), 0);
        assert!((doc.total_volume() - 1.8e-6).abs() < 1e-18);
        assert_eq!(doc.boundary_names().into_iter().collect::<Vec<_>>(), ["outer"]);
        assert!(doc.dangling_references().is_empty());
    }

    #[test]
    fn detects_dangling_references() {
        let mut doc = tube_document();
        doc.nodes.insert(
            4,
            Node {
                id: 4,
                name: None,
                op: CsgOp::Glue {
                    children: vec![3, 9],
                },
            },
        );
        doc.regions[0].root = 12;
        assert_eq!(doc.dangling_references(), vec![9, 12]);
    }
}
