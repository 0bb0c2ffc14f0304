use crate::element::{EH, HH, TH, VH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Handles.
    #[error("{0:?} is not a vertex of this mesh")]
    InvalidVertex(VH),
    #[error("{0:?} is not a halfedge of this mesh")]
    InvalidHalfedge(HH),
    #[error("{0:?} is not an edge of this mesh")]
    InvalidEdge(EH),
    #[error("{0:?} is not a triangle of this mesh")]
    InvalidTriangle(TH),
    #[error("No vertex at position {0} in the vertex list")]
    VertexIndexOutOfBounds(usize),
    // Topology.
    /// A halfedge between these two vertices already exists.
    #[error("There is already a halfedge from {0:?} to {1:?}")]
    DuplicateHalfedge(VH, VH),
    /// The reverse halfedge already has an opposite, a third triangle cannot
    /// share that edge.
    #[error("The edge between {0:?} and {1:?} already joins two triangles")]
    NonManifoldEdge(VH, VH),
    #[error("A triangle needs three distinct vertices: {0:?}, {1:?}, {2:?}")]
    DegenerateTriangle(VH, VH, VH),
    #[error("{1:?} is not a vertex of {0:?}")]
    VertexNotInTriangle(TH, VH),
    #[error("Cannot find a convex ear among the {0} remaining polygon vertices")]
    PolygonTriangulationFailed(usize),
    #[error("Cannot close a surface on itself with {0} vertices around, it needs {1}")]
    FoldTooSmall(usize, usize),
    #[error("No halfedge from {0:?} to {1:?} along the border")]
    MissingBorderHalfedge(VH, VH),
    /// Collapsing the halfedge would create a non-manifold configuration.
    #[error("Collapsing {0:?} would break the mesh topology")]
    CollapseNotAllowed(HH),
    #[error("Flipping {0:?} would create a duplicate edge")]
    FlipNotAllowed(HH),
    #[error("The bevel direction is perpendicular to an edge leaving {0:?}")]
    BevelDirectionPerpendicular(VH),
    // Validation.
    #[error("{0:?} references a halfedge that is not part of the mesh")]
    DanglingTriangleHalfedge(TH),
    #[error("The halfedge of {0:?} belongs to another triangle")]
    InconsistentTriangleHalfedge(TH),
    #[error("{0:?} does not have three distinct vertices")]
    DegenerateTriangleVertices(TH),
    #[error("{0:?} references a halfedge that is not part of the mesh")]
    DanglingVertexHalfedge(VH),
    #[error("Halfedge {1:?} is chained to {0:?} but does not originate there")]
    InvalidOutgoingHalfedge(VH, HH),
    #[error("The sibling chain of {0:?} contains a cycle")]
    SiblingCycle(VH),
    #[error("{0:?} has a dangling origin, edge, next or triangle")]
    DanglingHalfedgeLink(HH),
    #[error("The opposite of the opposite of {0:?} is not itself")]
    InvalidOpposite(HH),
    #[error("{0:?} and its opposite do not share the same edge")]
    UnsharedEdge(HH),
    #[error("The next chain of {0:?} is not a cycle of three")]
    InvalidTriangleCycle(HH),
    #[error("{0:?} does not connect two distinct live vertices")]
    InvalidEdgeVertices(EH),
    #[error("{0:?} is not used by any halfedge")]
    OrphanEdge(EH),
    // Obj.
    #[error("Cannot load obj file: {0}")]
    ObjLoadFailed(String),
    #[error("Obj file has {0} coordinates, not a multiple of three")]
    IncorrectNumberOfCoordinates(usize),
}
