//! The glued coil geometry and its queries.

use std::collections::{BTreeMap, BTreeSet};

use coilcad_ir::{BoundaryEntry, CsgOp, Document, Node, NodeId, RegionEntry};
use coilcad_kernel::coilcad_kernel_math::Aabb3;
use coilcad_kernel::{Compound, FaceId, Kernel, TriangleMesh};

use crate::part::Part;
use crate::CoilError;

/// Tagged regions glued into one compound, ready for meshing.
///
/// Regions appear in glue order: coil, air, then the marker when present.
#[derive(Debug, Clone)]
pub struct CoilGeometry {
    compound: Compound,
    parts: Vec<Part>,
    cross_section: f64,
}

impl CoilGeometry {
    /// Glue `parts` into one geometry.
    pub(crate) fn assemble(
        kernel: &Kernel,
        parts: Vec<Part>,
        cross_section: f64,
    ) -> Result<Self, CoilError> {
        let solids: Vec<_> = parts.iter().map(|p| p.solid().clone()).collect();
        let compound = kernel.glue(&solids)?;
        Ok(Self {
            compound,
            parts,
            cross_section,
        })
    }

    /// The glued compound.
    pub fn compound(&self) -> &Compound {
        &self.compound
    }

    /// Regions in glue order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Area of the coil's top face, measured before any boolean.
    pub fn cross_section(&self) -> f64 {
        self.cross_section
    }

    /// Faces shared by two regions.
    pub fn interfaces(&self) -> &[FaceId] {
        self.compound.interfaces()
    }

    /// Distinct material names.
    pub fn materials(&self) -> BTreeSet<&str> {
        self.parts.iter().filter_map(Part::material).collect()
    }

    /// Distinct solid-group names.
    pub fn solid_names(&self) -> BTreeSet<&str> {
        self.parts
            .iter()
            .filter_map(|p| p.tags().solid_name.as_deref())
            .collect()
    }

    fn regions<'a, 'm>(&'a self, material: &'m str) -> impl Iterator<Item = &'a Part> + 'm
    where
        'a: 'm,
    {
        self.parts
            .iter()
            .filter(move |p| p.material() == Some(material))
    }

    /// First region with the given material.
    pub fn region(&self, material: &str) -> Option<&Part> {
        self.regions(material).next()
    }

    /// Total volume of the regions with the given material.
    pub fn region_volume(&self, material: &str) -> Option<f64> {
        let mut regions = self.regions(material).peekable();
        regions.peek()?;
        Some(regions.map(|p| p.solid().volume()).sum())
    }

    /// Bounding box of the regions with the given material.
    pub fn region_bounding_box(&self, material: &str) -> Option<Aabb3> {
        let mut bbox = Aabb3::empty();
        for part in self.regions(material) {
            bbox.include_box(&part.solid().bounding_box());
        }
        (!bbox.is_empty()).then_some(bbox)
    }

    /// Boundary name of a face.
    pub fn face_name(&self, face: FaceId) -> Option<&str> {
        self.parts
            .iter()
            .find_map(|p| p.tags().face_names.get(&face))
            .map(String::as_str)
    }

    /// Face mesh-size hint, the finest one when both sides carry a hint.
    pub fn face_max_h(&self, face: FaceId) -> Option<f64> {
        self.parts
            .iter()
            .filter_map(|p| p.tags().face_max_h.get(&face).copied())
            .reduce(f64::min)
    }

    /// Faces carrying the given boundary name.
    pub fn faces_named(&self, name: &str) -> BTreeSet<FaceId> {
        self.parts
            .iter()
            .flat_map(|p| p.tags().face_names.iter())
            .filter(|(_, n)| *n == name)
            .map(|(&id, _)| id)
            .collect()
    }

    /// Distinct boundary names.
    pub fn boundary_names(&self) -> BTreeSet<&str> {
        self.parts
            .iter()
            .flat_map(|p| p.tags().face_names.values())
            .map(String::as_str)
            .collect()
    }

    /// Sum of all region volumes.
    pub fn total_volume(&self) -> f64 {
        self.compound.volume()
    }

    /// One triangle mesh per region, labelled with its material.
    pub fn region_meshes(&self) -> Vec<(String, TriangleMesh)> {
        self.parts
            .iter()
            .map(|p| {
                let label = p.material().unwrap_or(&p.name).to_string();
                (label, p.solid().to_mesh())
            })
            .collect()
    }

    /// Export document with the construction graph, regions and boundaries.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for part in &self.parts {
            doc.nodes
                .extend(part.ir_nodes().iter().map(|(&id, n)| (id, n.clone())));
        }
        let glue_id: NodeId = doc.nodes.keys().next_back().map_or(0, |id| id + 1);
        doc.nodes.insert(
            glue_id,
            Node {
                id: glue_id,
                name: Some("geometry".to_string()),
                op: CsgOp::Glue {
                    children: self.parts.iter().map(Part::node_id).collect(),
                },
            },
        );

        for part in &self.parts {
            let tags = part.tags();
            doc.regions.push(RegionEntry {
                root: part.node_id(),
                material: part.material().unwrap_or(&part.name).to_string(),
                solid_name: tags.solid_name.clone(),
                volume: part.solid().volume(),
                max_h: tags.max_h,
                edge_max_h: tags.edge_max_h,
            });
        }

        // every named or hinted face once, with the regions on both sides
        let mut boundaries: BTreeMap<FaceId, BoundaryEntry> = BTreeMap::new();
        for part in &self.parts {
            for face in part.solid().faces() {
                let id = face.id();
                if !boundaries.contains_key(&id) {
                    let name = self.face_name(id);
                    let max_h = self.face_max_h(id);
                    if name.is_none() && max_h.is_none() {
                        continue;
                    }
                    boundaries.insert(
                        id,
                        BoundaryEntry {
                            face: id.0,
                            name: name.map(str::to_string),
                            area: face.area(),
                            max_h,
                            materials: Vec::new(),
                        },
                    );
                }
                if let (Some(entry), Some(m)) = (boundaries.get_mut(&id), part.material()) {
                    entry.materials.push(m.to_string());
                }
            }
        }
        doc.boundaries = boundaries.into_values().collect();
        doc.cross_section = self.cross_section;
        doc
    }
}
