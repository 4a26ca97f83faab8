//! Boundary representation of kernel solids.
//!
//! A [`Solid`] is a set of closed [`Shell`]s (one outer shell plus optional
//! voids). Each [`Face`] carries its analytic surface description and a
//! triangulated patch of its trimmed extent. Faces keep their [`FaceId`]
//! through boolean operations, which is how glued solids recognise the
//! boundaries they share.

use std::fmt;

use coilcad_kernel_math::{Aabb3, Dir3, Point3, Vec3};

use crate::classify::{classify_point, PointClass};
use crate::mesh::TriangleMesh;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a solid, unique within a [`crate::Kernel`] session.
    SolidId,
    "solid#"
);
entity_id!(
    /// Identifier of a face, unique within a [`crate::Kernel`] session.
    FaceId,
    "face#"
);
entity_id!(
    /// Identifier of an edge, unique within a [`crate::Kernel`] session.
    EdgeId,
    "edge#"
);

/// Orientation of a face relative to its patch winding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Patch winding gives the outward normal.
    Forward,
    /// Patch winding gives the inward normal.
    Reversed,
}

impl Orientation {
    /// The opposite orientation.
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reversed,
            Orientation::Reversed => Orientation::Forward,
        }
    }
}

/// Analytic description of the surface underlying a face.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceSurface {
    /// Planar face. `normal` is the outward normal of the forward face.
    Plane {
        /// A point on the plane.
        origin: Point3,
        /// Unit normal.
        normal: Dir3,
    },
    /// Portion of a cylinder wall.
    Cylinder {
        /// Base center on the axis.
        center: Point3,
        /// Unit axis direction.
        axis: Dir3,
        /// Cylinder radius.
        radius: f64,
    },
    /// Lateral surface of a pipe sweep.
    Swept {
        /// Radius of the swept circular profile.
        profile_radius: f64,
    },
}

/// Triangulated extent of a face.
///
/// Triangles are wound counter-clockwise around the outward normal of the
/// forward face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacePatch {
    /// Vertex positions.
    pub positions: Vec<Point3>,
    /// Triangles as indices into `positions`.
    pub triangles: Vec<[u32; 3]>,
}

impl FacePatch {
    /// Flip the winding of every triangle.
    pub(crate) fn flip_winding(&mut self) {
        for tri in &mut self.triangles {
            tri.swap(1, 2);
        }
    }

    /// Sum of the normals (area-weighted, doubled) of all triangles.
    pub(crate) fn normal_sum(&self) -> Vec3 {
        self.triangles.iter().fold(Vec3::zeros(), |acc, t| {
            let [a, b, c] = t.map(|i| self.positions[i as usize]);
            acc + (b - a).cross(&(c - a))
        })
    }
}

/// A bounded piece of surface on a solid's boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub(crate) id: FaceId,
    pub(crate) surface: FaceSurface,
    pub(crate) orientation: Orientation,
    pub(crate) patch: FacePatch,
    pub(crate) exact_area: Option<f64>,
}

impl Face {
    /// The face identifier.
    pub fn id(&self) -> FaceId {
        self.id
    }

    /// The underlying analytic surface.
    pub fn surface(&self) -> &FaceSurface {
        &self.surface
    }

    /// Orientation of the face within its solid.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The triangulated patch.
    pub fn patch(&self) -> &FacePatch {
        &self.patch
    }

    /// Face area: closed form when the face admits one, tessellated otherwise.
    pub fn area(&self) -> f64 {
        self.exact_area.unwrap_or_else(|| self.tessellated_area())
    }

    /// Area of the triangulated patch.
    pub fn tessellated_area(&self) -> f64 {
        self.triangles().map(|[a, b, c]| 0.5 * (b - a).cross(&(c - a)).norm()).sum()
    }

    /// Area-weighted centroid of the triangulated patch.
    pub fn centroid(&self) -> Point3 {
        let mut weighted = Vec3::zeros();
        let mut total = 0.0;
        for [a, b, c] in self.triangles() {
            let area = 0.5 * (b - a).cross(&(c - a)).norm();
            weighted += area * (a.coords + b.coords + c.coords) / 3.0;
            total += area;
        }
        if total > 0.0 {
            Point3::from(weighted / total)
        } else {
            Point3::from(
                self.patch.positions.iter().fold(Vec3::zeros(), |acc, p| acc + p.coords)
                    / self.patch.positions.len().max(1) as f64,
            )
        }
    }

    /// Triangles with their winding adjusted to the face orientation, so the
    /// right-hand normal always points out of the owning solid.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        let reversed = self.orientation == Orientation::Reversed;
        self.patch.triangles.iter().map(move |t| {
            let [a, b, c] = t.map(|i| self.patch.positions[i as usize]);
            if reversed {
                [a, c, b]
            } else {
                [a, b, c]
            }
        })
    }

    /// Vertex positions of the patch.
    pub fn vertices(&self) -> &[Point3] {
        &self.patch.positions
    }

    /// Bounding box of the patch.
    pub fn bounding_box(&self) -> Aabb3 {
        Aabb3::from_points(&self.patch.positions)
    }

    /// The same face seen from the other side.
    pub fn reversed(&self) -> Face {
        Face {
            orientation: self.orientation.flipped(),
            ..self.clone()
        }
    }
}

/// Role of a shell within its solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    /// The outer boundary.
    Outer,
    /// The boundary of an internal cavity.
    Void,
}

/// A closed set of faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    /// Outer boundary or cavity.
    pub kind: ShellKind,
    /// Faces of the shell.
    pub faces: Vec<Face>,
}

/// Geometry carried by an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeCurve {
    /// Straight segment.
    Line {
        /// Start point.
        start: Point3,
        /// End point.
        end: Point3,
    },
    /// Full circle.
    Circle {
        /// Center.
        center: Point3,
        /// Unit normal of the circle's plane.
        normal: Dir3,
        /// Radius.
        radius: f64,
    },
    /// Sampled polyline (seams of swept faces).
    Polyline {
        /// Sample points in order.
        points: Vec<Point3>,
    },
}

/// An edge of a solid.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub(crate) curve: EdgeCurve,
}

impl Edge {
    /// The edge identifier.
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// The edge geometry.
    pub fn curve(&self) -> &EdgeCurve {
        &self.curve
    }

    /// Edge length.
    pub fn length(&self) -> f64 {
        match &self.curve {
            EdgeCurve::Line { start, end } => (end - start).norm(),
            EdgeCurve::Circle { radius, .. } => 2.0 * std::f64::consts::PI * radius,
            EdgeCurve::Polyline { points } => {
                points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
            }
        }
    }
}

/// Face ids of a cylinder by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CylinderFaces {
    /// Lateral wall.
    pub lateral: FaceId,
    /// Cap at the base.
    pub bottom: FaceId,
    /// Cap at the far end of the axis.
    pub top: FaceId,
}

/// How a solid was produced, kept for operations with closed-form results.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// Axis-aligned box.
    Box {
        /// Minimum corner.
        min: Point3,
        /// Maximum corner.
        max: Point3,
    },
    /// Right circular cylinder.
    Cylinder {
        /// Base center.
        base: Point3,
        /// Unit axis.
        axis: Dir3,
        /// Radius.
        radius: f64,
        /// Extent along the axis.
        height: f64,
        /// Face ids by role.
        faces: CylinderFaces,
    },
    /// Annular tube between two coaxial cylinder walls.
    Tube {
        /// Base center.
        base: Point3,
        /// Unit axis.
        axis: Dir3,
        /// Inner wall radius.
        inner_radius: f64,
        /// Outer wall radius.
        outer_radius: f64,
        /// Extent along the axis.
        height: f64,
    },
    /// Circular profile swept along a spine.
    Pipe,
    /// Result of a boolean without a closed form.
    Derived,
}

/// A solid bounded by one outer shell and any number of void shells.
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    pub(crate) id: SolidId,
    pub(crate) shape: ShapeKind,
    pub(crate) shells: Vec<Shell>,
    pub(crate) edges: Vec<Edge>,
}

impl Solid {
    /// The solid identifier.
    pub fn id(&self) -> SolidId {
        self.id
    }

    /// How the solid was produced.
    pub fn shape(&self) -> &ShapeKind {
        &self.shape
    }

    /// All shells, outer shell first.
    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    /// All edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All faces of all shells.
    pub fn faces(&self) -> impl Iterator<Item = &Face> + '_ {
        self.shells.iter().flat_map(|s| s.faces.iter())
    }

    /// Ids of all faces.
    pub fn face_ids(&self) -> Vec<FaceId> {
        self.faces().map(Face::id).collect()
    }

    /// Look up a face by id.
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces().find(|f| f.id == id)
    }

    /// True if the solid has a face with this id.
    pub fn has_face(&self, id: FaceId) -> bool {
        self.face(id).is_some()
    }

    /// All patch vertices (shared boundary vertices appear once per face).
    pub fn vertices(&self) -> impl Iterator<Item = &Point3> + '_ {
        self.faces().flat_map(|f| f.patch.positions.iter())
    }

    /// Bounding box of all faces.
    pub fn bounding_box(&self) -> Aabb3 {
        Aabb3::from_points(self.vertices())
    }

    /// Enclosed volume, by the divergence theorem over the oriented shells.
    ///
    /// Void shells contribute negatively through their reversed faces.
    pub fn volume(&self) -> f64 {
        let c = self.bounding_box().center();
        let six_v: f64 = self
            .faces()
            .flat_map(|f| f.triangles())
            .map(|[a, b, c2]| (a - c).dot(&(b - c).cross(&(c2 - c))))
            .sum();
        six_v / 6.0
    }

    /// Total boundary area (outer and void shells).
    pub fn surface_area(&self) -> f64 {
        self.faces().map(Face::area).sum()
    }

    /// The face whose centroid lies furthest along `direction`.
    ///
    /// `extreme_face(Vec3::z())` selects the topmost face, `-Vec3::z()` the
    /// bottommost.
    pub fn extreme_face(&self, direction: Vec3) -> Option<&Face> {
        self.faces()
            .map(|f| (f.centroid().coords.dot(&direction), f))
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, f)| f)
    }

    /// Classify a point against the solid.
    pub fn classify_point(&self, p: &Point3, tol: f64) -> PointClass {
        classify_point(self, p, tol)
    }

    /// Triangulate all faces into one mesh.
    pub fn to_mesh(&self) -> TriangleMesh {
        TriangleMesh::from_faces(self.faces())
    }

    pub(crate) fn with_id(&self, id: SolidId) -> Solid {
        Solid {
            id,
            ..self.clone()
        }
    }
}

/// A set of glued solids whose shared faces are identified.
#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub(crate) solids: Vec<Solid>,
    pub(crate) interfaces: Vec<FaceId>,
}

impl Compound {
    /// The glued solids in operand order.
    pub fn solids(&self) -> &[Solid] {
        &self.solids
    }

    /// Look up a member solid.
    pub fn solid(&self, id: SolidId) -> Option<&Solid> {
        self.solids.iter().find(|s| s.id == id)
    }

    /// Faces shared by two member solids.
    pub fn interfaces(&self) -> &[FaceId] {
        &self.interfaces
    }

    /// Solids having a face with this id.
    pub fn face_owners(&self, face: FaceId) -> Vec<SolidId> {
        self.solids
            .iter()
            .filter(|s| s.has_face(face))
            .map(|s| s.id)
            .collect()
    }

    /// Sum of member volumes.
    pub fn volume(&self) -> f64 {
        self.solids.iter().map(Solid::volume).sum()
    }

    /// Bounding box of all members.
    pub fn bounding_box(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for s in &self.solids {
            aabb.include_box(&s.bounding_box());
        }
        aabb
    }
}
