use crate::mesh::Mesh;
use glam::{Vec3, Vec4};
use slotmap::new_key_type;

new_key_type! {
    /**
     * Vertex handle.
     */
    pub struct VH;

    /**
     * Halfedge handle.
     */
    pub struct HH;

    /**
     * Edge handle.
     */
    pub struct EH;

    /**
     * Triangle handle.
     */
    pub struct TH;
}

/// Number of attribute slots carried by every vertex.
pub const NUM_ATTRIBUTES: usize = 9;

/**
 * The kinds of per-vertex attributes. Every attribute is stored as a 4
 * component vector, the number of meaningful components is given by
 * [`Attribute::components`].
 */
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    Position = 0,
    Color = 1,
    Normal = 2,
    Tangent = 3,
    TexCoord = 4,
    /// Secondary position, used for morphing between two shapes.
    Position1 = 5,
    /// Secondary normal, paired with [`Attribute::Position1`].
    Normal1 = 6,
    BoneIds = 7,
    BoneWeights = 8,
}

impl Attribute {
    pub const ALL: [Attribute; NUM_ATTRIBUTES] = [
        Attribute::Position,
        Attribute::Color,
        Attribute::Normal,
        Attribute::Tangent,
        Attribute::TexCoord,
        Attribute::Position1,
        Attribute::Normal1,
        Attribute::BoneIds,
        Attribute::BoneWeights,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Number of components written to vertex buffers for this attribute.
    pub fn components(self) -> usize {
        match self {
            Attribute::Position
            | Attribute::Normal
            | Attribute::Tangent
            | Attribute::Position1
            | Attribute::Normal1 => 3,
            Attribute::TexCoord => 2,
            Attribute::Color | Attribute::BoneIds | Attribute::BoneWeights => 4,
        }
    }

    /// Attributes holding unit directions, renormalized after interpolation.
    pub(crate) fn is_direction(self) -> bool {
        matches!(
            self,
            Attribute::Normal | Attribute::Tangent | Attribute::Normal1
        )
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Vertex {
    pub name: String,
    pub number: usize,
    pub attributes: [Vec4; NUM_ATTRIBUTES],
    /// Head of the sibling chain of outgoing halfedges.
    pub halfedge: Option<HH>,
}

impl Vertex {
    pub fn new(name: String, number: usize) -> Self {
        let mut attributes = [Vec4::ZERO; NUM_ATTRIBUTES];
        attributes[Attribute::Position.index()] = Vec4::W;
        Vertex {
            name,
            number,
            attributes,
            halfedge: None,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Halfedge {
    pub origin: VH,
    pub triangle: TH,
    pub edge: EH,
    pub next: HH,
    pub opposite: Option<HH>,
    /// Next outgoing halfedge of the same origin vertex.
    pub sibling: Option<HH>,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Edge {
    pub v1: VH,
    pub v2: VH,
}

#[derive(Clone, Debug)]
pub(crate) struct Triangle {
    pub halfedge: HH,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub center: Vec3,
    pub surface: f32,
    pub w: f32,
}

impl Triangle {
    pub fn new(halfedge: HH) -> Self {
        Triangle {
            halfedge,
            normal: Vec3::ZERO,
            tangent: Vec3::ZERO,
            center: Vec3::ZERO,
            surface: 0.0,
            w: 0.0,
        }
    }
}

impl VH {
    /// First outgoing halfedge of this vertex, if any. `None` for a deleted
    /// vertex.
    pub fn halfedge(self, mesh: &Mesh) -> Option<HH> {
        mesh.vertices.get(self).and_then(|v| v.halfedge)
    }

    pub fn is_valid(self, mesh: &Mesh) -> bool {
        mesh.vertices.contains_key(self)
    }

    pub fn name(self, mesh: &Mesh) -> &str {
        &mesh.vertices[self].name
    }

    pub fn number(self, mesh: &Mesh) -> usize {
        mesh.vertices[self].number
    }

    pub fn position(self, mesh: &Mesh) -> Vec3 {
        mesh.vertices[self].attributes[Attribute::Position.index()].truncate()
    }

    pub fn normal(self, mesh: &Mesh) -> Vec3 {
        mesh.vertices[self].attributes[Attribute::Normal.index()].truncate()
    }
}

impl HH {
    pub fn origin(self, mesh: &Mesh) -> VH {
        mesh.halfedges[self].origin
    }

    /// The vertex this halfedge points to.
    pub fn target(self, mesh: &Mesh) -> VH {
        self.next(mesh).origin(mesh)
    }

    pub fn triangle(self, mesh: &Mesh) -> TH {
        mesh.halfedges[self].triangle
    }

    pub fn edge(self, mesh: &Mesh) -> EH {
        mesh.halfedges[self].edge
    }

    pub fn next(self, mesh: &Mesh) -> HH {
        mesh.halfedges[self].next
    }

    /// Previous halfedge in the triangle, i.e. `next.next`.
    pub fn prev(self, mesh: &Mesh) -> HH {
        self.next(mesh).next(mesh)
    }

    pub fn opposite(self, mesh: &Mesh) -> Option<HH> {
        mesh.halfedges[self].opposite
    }

    pub fn sibling(self, mesh: &Mesh) -> Option<HH> {
        mesh.halfedges[self].sibling
    }

    pub fn is_boundary(self, mesh: &Mesh) -> bool {
        self.opposite(mesh).is_none()
    }

    pub fn is_valid(self, mesh: &Mesh) -> bool {
        mesh.halfedges.contains_key(self)
    }
}

impl EH {
    pub fn vertices(self, mesh: &Mesh) -> (VH, VH) {
        let edge = &mesh.edges[self];
        (edge.v1, edge.v2)
    }

    pub fn is_valid(self, mesh: &Mesh) -> bool {
        mesh.edges.contains_key(self)
    }
}

impl TH {
    pub fn halfedge(self, mesh: &Mesh) -> HH {
        mesh.triangles[self].halfedge
    }

    pub fn normal(self, mesh: &Mesh) -> Vec3 {
        mesh.triangles[self].normal
    }

    pub fn tangent(self, mesh: &Mesh) -> Vec3 {
        mesh.triangles[self].tangent
    }

    pub fn center(self, mesh: &Mesh) -> Vec3 {
        mesh.triangles[self].center
    }

    /// Area of the triangle.
    pub fn surface(self, mesh: &Mesh) -> f32 {
        mesh.triangles[self].surface
    }

    /// Plane offset, such that `normal.dot(p) == -w` for points `p` on the
    /// triangle.
    pub fn w(self, mesh: &Mesh) -> f32 {
        mesh.triangles[self].w
    }

    pub fn is_valid(self, mesh: &Mesh) -> bool {
        mesh.triangles.contains_key(self)
    }
}
