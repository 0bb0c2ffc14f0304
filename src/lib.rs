/*!
A halfedge based triangle mesh library for building and editing meshes that
are then drawn by a renderer.

# Overview

+ Vertices, halfedges, edges and triangles live in generation checked arenas
  and are addressed by the handles [`VH`], [`HH`], [`EH`] and [`TH`]. A handle
  to a deleted element is detected instead of silently pointing to another
  element.

+ Every vertex carries a fixed set of [`Attribute`]s: position, color, normal,
  tangent, texture coordinates, a secondary position and normal, bone ids and
  bone weights. Interpolated vertices interpolate all of them.

+ Each triangle owns three halfedges linked in a cycle. Halfedges leaving the
  same vertex are chained as siblings, and two halfedges running in opposite
  directions between the same vertices are each other's opposite, sharing one
  edge. A directed halfedge between two vertices can only exist once, and an
  edge joins at most two triangles. Operations that would break this are
  refused with an [`Error`].

+ Editing operations: bevel, split, extrude and subdivide, edge collapse and
  flip, homothety and affine transforms.

+ Parametric surfaces: rectangular and hexagonal grids, optionally folded into
  cylinders and tori, and discs of revolution. Their triangles are created in
  an order that packs well into triangle strips.

+ [`DrawBuffers`] pack the vertex attributes, interleaved or not, along with
  triangle lists, triangle strips or line lists, ready to be uploaded.

+ Volume, mass, center of gravity and inertia of closed meshes, see
  [`MassProperties`].

+ Meshes can be loaded from obj files with the `obj` feature, and simplified
  using quadric error metrics with the `redux` feature.
*/

mod check;
mod drawing;
mod element;
mod error;
mod halfedge;
mod iterator;
mod macros;
mod mesh;
mod physics;
mod processing;
mod strip;
mod topology;
mod triangle;
mod utils;
mod vertex;

#[cfg(feature = "obj")]
mod obj;

#[cfg(feature = "redux")]
pub mod redux;

pub use drawing::{BufferLayout, DrawBuffers, Primitive};
pub use element::{Attribute, EH, HH, NUM_ATTRIBUTES, TH, VH};
pub use error::Error;
pub use mesh::Mesh;
pub use physics::MassProperties;
pub use strip::{decode_strip, TriangleStrip};

#[cfg(feature = "obj")]
pub use obj::ObjOptions;

#[cfg(feature = "redux")]
pub use redux::{Quadric, Redux};
