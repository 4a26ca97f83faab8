//! Solids paired with their region tags and construction history.

use std::collections::BTreeMap;

use coilcad_ir::{CsgOp, Node, NodeId, Vec3 as IrVec3};
use coilcad_kernel::coilcad_kernel_math::{Point3, Vec3};
use coilcad_kernel::{FaceId, Kernel, Solid};

use crate::CoilError;

/// Names and mesh-size hints attached to one region.
///
/// The kernel stores no names; everything a downstream mesher needs to find
/// a region or boundary lives here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionTags {
    /// Material name.
    pub material: Option<String>,
    /// Solid-group name, kept separate from the material.
    pub solid_name: Option<String>,
    /// Boundary names by face.
    pub face_names: BTreeMap<FaceId, String>,
    /// Mesh-size hint for volume elements.
    pub max_h: Option<f64>,
    /// Mesh-size hint along edges.
    pub edge_max_h: Option<f64>,
    /// Mesh-size hints by face.
    pub face_max_h: BTreeMap<FaceId, f64>,
}

fn check_mesh_size(target: &str, h: f64) -> Result<f64, CoilError> {
    if h.is_finite() && h > 0.0 {
        Ok(h)
    } else {
        Err(CoilError::InvalidMeshSize {
            target: target.to_string(),
            value: h,
        })
    }
}

/// A named solid with its tags.
///
/// Each part carries the subtree of the construction graph that produced
/// it. Node ids are the kernel's solid ids, so they are unique within a
/// build and repeat across identical builds.
#[derive(Debug, Clone)]
pub struct Part {
    /// Human-readable name.
    pub name: String,
    solid: Solid,
    tags: RegionTags,
    ir_nodes: BTreeMap<NodeId, Node>,
}

impl Part {
    /// Wrap a freshly built primitive.
    pub(crate) fn leaf(name: &str, solid: Solid, op: CsgOp) -> Self {
        let id = solid.id().0;
        let mut ir_nodes = BTreeMap::new();
        ir_nodes.insert(
            id,
            Node {
                id,
                name: Some(name.to_string()),
                op,
            },
        );
        Self {
            name: name.to_string(),
            solid,
            tags: RegionTags::default(),
            ir_nodes,
        }
    }

    /// `self − tool`.
    ///
    /// The result keeps this part's tags. Faces the result inherits from the
    /// tool (cavity walls, bore walls) keep the tool's names and hints.
    pub(crate) fn difference(
        &self,
        kernel: &Kernel,
        name: &str,
        tool: &Part,
    ) -> Result<Part, CoilError> {
        let solid = kernel.difference(&self.solid, &tool.solid)?;
        let id = solid.id().0;

        let mut tags = self.tags.clone();
        for face in solid.faces() {
            if let Some(n) = tool.tags.face_names.get(&face.id()) {
                tags.face_names.insert(face.id(), n.clone());
            }
            if let Some(&h) = tool.tags.face_max_h.get(&face.id()) {
                tags.face_max_h.insert(face.id(), h);
            }
        }

        let mut ir_nodes = self.ir_nodes.clone();
        ir_nodes.extend(tool.ir_nodes.iter().map(|(&k, v)| (k, v.clone())));
        ir_nodes.insert(
            id,
            Node {
                id,
                name: Some(name.to_string()),
                op: CsgOp::Difference {
                    left: self.node_id(),
                    right: tool.node_id(),
                },
            },
        );

        Ok(Part {
            name: name.to_string(),
            solid,
            tags,
            ir_nodes,
        })
    }

    /// The kernel solid.
    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    /// Region tags.
    pub fn tags(&self) -> &RegionTags {
        &self.tags
    }

    /// Root node of this part's construction graph.
    pub fn node_id(&self) -> NodeId {
        self.solid.id().0
    }

    /// Construction graph nodes.
    pub fn ir_nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.ir_nodes
    }

    /// Material name, if set.
    pub fn material(&self) -> Option<&str> {
        self.tags.material.as_deref()
    }

    // =========================================================================
    // Tagging
    // =========================================================================

    /// Set the material name.
    pub fn set_material(&mut self, material: &str) -> &mut Self {
        self.tags.material = Some(material.to_string());
        self
    }

    /// Set the solid-group name.
    pub fn set_solid_name(&mut self, name: &str) -> &mut Self {
        self.tags.solid_name = Some(name.to_string());
        self
    }

    /// Name every face of the solid.
    pub fn name_all_faces(&mut self, name: &str) -> &mut Self {
        for id in self.solid.face_ids() {
            self.tags.face_names.insert(id, name.to_string());
        }
        self
    }

    /// Name the face whose centroid lies furthest along `direction`.
    pub fn name_extreme_face(
        &mut self,
        direction: Vec3,
        name: &str,
    ) -> Result<&mut Self, CoilError> {
        let id = self
            .solid
            .extreme_face(direction)
            .map(|f| f.id())
            .ok_or(CoilError::MissingFace("extreme"))?;
        self.tags.face_names.insert(id, name.to_string());
        Ok(self)
    }

    /// Mesh-size hint for the region's volume elements.
    pub fn set_max_h(&mut self, h: f64) -> Result<&mut Self, CoilError> {
        self.tags.max_h = Some(check_mesh_size(&format!("solid of {}", self.name), h)?);
        Ok(self)
    }

    /// Mesh-size hint for all edges.
    pub fn set_edge_max_h(&mut self, h: f64) -> Result<&mut Self, CoilError> {
        self.tags.edge_max_h = Some(check_mesh_size(&format!("edges of {}", self.name), h)?);
        Ok(self)
    }

    /// Mesh-size hint for all faces.
    pub fn set_face_max_h(&mut self, h: f64) -> Result<&mut Self, CoilError> {
        let h = check_mesh_size(&format!("faces of {}", self.name), h)?;
        for id in self.solid.face_ids() {
            self.tags.face_max_h.insert(id, h);
        }
        Ok(self)
    }
}

pub(crate) fn ir_point(p: &Point3) -> IrVec3 {
    IrVec3::new(p.x, p.y, p.z)
}

pub(crate) fn ir_vec(v: &Vec3) -> IrVec3 {
    IrVec3::new(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_part(kernel: &Kernel, center: Point3, size: f64) -> Part {
        let solid = kernel
            .make_centered_box(center, Vec3::new(size, size, size))
            .unwrap();
        Part::leaf(
            "cube",
            solid,
            CsgOp::Cube {
                center: ir_point(&center),
                size,
            },
        )
    }

    #[test]
    fn test_tagging() {
        let kernel = Kernel::new();
        let mut part = cube_part(&kernel, Point3::origin(), 1.0);
        part.set_material("cube")
            .set_solid_name("coil")
            .name_all_faces("cubebnd");
        part.name_extreme_face(Vec3::z(), "lid").unwrap();

        let tags = part.tags();
        assert_eq!(tags.material.as_deref(), Some("cube"));
        assert_eq!(tags.solid_name.as_deref(), Some("coil"));
        assert_eq!(tags.face_names.len(), 6);
        assert_eq!(tags.face_names.values().filter(|n| *n == "lid").count(), 1);
    }

    #[test]
    fn test_mesh_size_rejected() {
        let kernel = Kernel::new();
        let mut part = cube_part(&kernel, Point3::origin(), 1.0);
        for bad in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                part.set_max_h(bad),
                Err(CoilError::InvalidMeshSize { .. })
            ));
            assert!(part.set_edge_max_h(bad).is_err());
            assert!(part.set_face_max_h(bad).is_err());
        }
        part.set_face_max_h(0.2).unwrap();
        assert_eq!(part.tags().face_max_h.len(), 6);
        assert!(part.tags().max_h.is_none());
    }

    #[test]
    fn test_difference_inherits_tool_names() {
        let kernel = Kernel::new();
        let mut outer = cube_part(&kernel, Point3::origin(), 4.0);
        outer.name_all_faces("outer");
        let mut inner = cube_part(&kernel, Point3::origin(), 1.0);
        inner.name_all_faces("inner");
        inner.set_face_max_h(0.1).unwrap();

        let carved = outer.difference(&kernel, "carved", &inner).unwrap();
        let names = &carved.tags().face_names;
        assert_eq!(names.values().filter(|n| *n == "outer").count(), 6);
        assert_eq!(names.values().filter(|n| *n == "inner").count(), 6);
        assert_eq!(carved.tags().face_max_h.len(), 6);

        let nodes = carved.ir_nodes();
        assert_eq!(nodes.len(), 3);
        assert_eq!(
            nodes[&carved.node_id()].op,
            CsgOp::Difference {
                left: outer.node_id(),
                right: inner.node_id()
            }
        );
    }
}
