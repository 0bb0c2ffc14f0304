use crate::{
    element::{Attribute, VH},
    mesh::Mesh,
    strip::TriangleStrip,
};
use glam::{Vec3, Vec4};
use std::collections::VecDeque;

/// How the vertices of a [`DrawBuffers`] are assembled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    /// Strips joined by degenerate triangles.
    TriangleStrip,
    Lines,
}

/// Arrangement of the vertex attributes in [`DrawBuffers::vertex_data`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferLayout {
    /// All the attributes of a vertex, then the next vertex.
    Interleaved,
    /// One block per attribute, each holding that attribute for every vertex.
    Separate,
}

/**
 * Vertex and index data ready to be handed to a renderer. Vertices appear in
 * the order of their numbers. An empty index list means the vertices are
 * drawn in order.
 */
#[derive(Clone, Debug)]
pub struct DrawBuffers {
    pub layout: BufferLayout,
    /// Attributes of each vertex, with the number of floats they take.
    pub components: Vec<(Attribute, usize)>,
    pub vertex_data: Vec<f32>,
    pub indices: Vec<u32>,
    pub primitive: Primitive,
    pub num_vertices: usize,
}

impl DrawBuffers {
    fn new(attrs: &[Attribute], layout: BufferLayout, primitive: Primitive) -> Self {
        DrawBuffers {
            layout,
            components: attrs.iter().map(|a| (*a, a.components())).collect(),
            vertex_data: Vec::new(),
            indices: Vec::new(),
            primitive,
            num_vertices: 0,
        }
    }

    /// Number of floats per vertex.
    pub fn stride(&self) -> usize {
        self.components.iter().map(|(_, n)| n).sum()
    }

    /**
     * Where the attribute starts in [`DrawBuffers::vertex_data`]: the offset
     * within each vertex when interleaved, the start of its block otherwise.
     */
    pub fn offset(&self, attr: Attribute) -> Option<usize> {
        let mut offset = 0;
        for (a, n) in &self.components {
            if *a == attr {
                return Some(match self.layout {
                    BufferLayout::Interleaved => offset,
                    BufferLayout::Separate => offset * self.num_vertices,
                });
            }
            offset += n;
        }
        None
    }

    /// Number of vertices the renderer has to process.
    pub fn count(&self) -> usize {
        match self.indices.is_empty() {
            true => self.num_vertices,
            false => self.indices.len(),
        }
    }

    fn push(&mut self, values: &[Vec4]) {
        for ((_, n), value) in self.components.iter().zip(values) {
            self.vertex_data.extend_from_slice(&value.to_array()[..*n]);
        }
        self.num_vertices += 1;
    }
}

impl Mesh {
    fn pack_attributes(
        &self,
        attrs: &[Attribute],
        layout: BufferLayout,
        primitive: Primitive,
    ) -> DrawBuffers {
        let mut buffers = DrawBuffers::new(attrs, layout, primitive);
        buffers
            .vertex_data
            .reserve(buffers.stride() * self.num_vertices());
        match layout {
            BufferLayout::Interleaved => {
                let mut values = Vec::with_capacity(attrs.len());
                for v in self.vertices() {
                    values.clear();
                    values.extend(attrs.iter().map(|a| self.attribute(v, *a)));
                    buffers.push(&values);
                }
            }
            BufferLayout::Separate => {
                for attr in attrs {
                    let n = attr.components();
                    for v in self.vertices() {
                        buffers
                            .vertex_data
                            .extend_from_slice(&self.attribute(v, *attr).to_array()[..n]);
                    }
                }
                buffers.num_vertices = self.num_vertices();
            }
        }
        buffers
    }

    fn vertex_index(&self, v: VH) -> u32 {
        v.number(self) as u32
    }

    fn triangle_indices(&self) -> impl Iterator<Item = [u32; 3]> + use<'_> {
        self.triangles().map(|t| {
            let [a, b, c] = self.triangle_vertices(t);
            [self.vertex_index(a), self.vertex_index(b), self.vertex_index(c)]
        })
    }

    /**
     * Packs the requested vertex attributes and the triangles as an indexed
     * triangle list. Vertices are renumbered first.
     */
    pub fn create_vbo_set(&mut self, attrs: &[Attribute], layout: BufferLayout) -> DrawBuffers {
        self.renumber_vertices();
        let mut buffers = self.pack_attributes(attrs, layout, Primitive::Triangles);
        buffers.indices = self.triangle_indices().flatten().collect();
        log::debug!(
            "{}: {} indices with triangles",
            self.name(),
            buffers.indices.len()
        );
        buffers
    }

    /**
     * Same as [`Mesh::create_vbo_set`], with the triangles packed into strips.
     *
     * Each triangle is appended to the first strip that accepts it, after
     * which the first later strip that can be spliced onto that one is merged
     * into it. A triangle no strip accepts starts a new strip, placed first.
     * The strips are then joined with repeated indices, keeping every strip
     * on an even position so that all triangles keep their winding. This is
     * a greedy packing that depends on the order of the triangles: the
     * topology generators add them in an order that makes long strips.
     */
    pub fn create_strip_vbo_set(
        &mut self,
        attrs: &[Attribute],
        layout: BufferLayout,
    ) -> DrawBuffers {
        self.renumber_vertices();
        let mut buffers = self.pack_attributes(attrs, layout, Primitive::TriangleStrip);
        let mut strips: VecDeque<TriangleStrip<u32>> = VecDeque::new();
        for tri in self.triangle_indices() {
            let Some(i) = strips.iter_mut().position(|s| s.append_triangle(tri)) else {
                strips.push_front(TriangleStrip::new(tri));
                continue;
            };
            let mut current = std::mem::take(&mut strips[i]);
            let merged = (i + 1..strips.len()).find(|j| current.concat(&strips[*j]));
            strips[i] = current;
            if let Some(j) = merged {
                strips.remove(j);
            }
        }
        let mut indices: Vec<u32> = Vec::with_capacity(self.num_triangles() + 4 * strips.len());
        let mut prev: Option<u32> = None;
        for strip in &strips {
            if let (Some(last), Some(first)) = (prev, strip.first()) {
                if indices.len() % 2 == 1 {
                    indices.push(last);
                }
                indices.push(last);
                indices.push(first);
            }
            indices.extend_from_slice(strip.items());
            prev = strip.last();
        }
        log::debug!(
            "{}: {} indices with {} strips, instead of {}",
            self.name(),
            indices.len(),
            strips.len(),
            self.num_triangles() * 3
        );
        buffers.indices = indices;
        buffers
    }

    /// Packs the requested vertex attributes and the edges as an indexed line list.
    pub fn create_edges_vbo_set(
        &mut self,
        attrs: &[Attribute],
        layout: BufferLayout,
    ) -> DrawBuffers {
        self.renumber_vertices();
        let mut buffers = self.pack_attributes(attrs, layout, Primitive::Lines);
        buffers.indices = self
            .edges()
            .flat_map(|e| {
                let (a, b) = e.vertices(self);
                [self.vertex_index(a), self.vertex_index(b)]
            })
            .collect();
        buffers
    }

    /**
     * One line per triangle, from its center along its normal, `length` long.
     * Both ends carry the position and the triangle normal, and are drawn in
     * order.
     */
    pub fn create_faces_normals_vbo_set(&self, length: f32) -> DrawBuffers {
        let mut buffers = DrawBuffers::new(
            &[Attribute::Position, Attribute::Normal],
            BufferLayout::Interleaved,
            Primitive::Lines,
        );
        for t in self.triangles() {
            let [a, b, c] = self.triangle_vertices(t);
            let center = (a.position(self) + b.position(self) + c.position(self)) / 3.0;
            let normal = t.normal(self);
            push_line(&mut buffers, center, center + normal * length, normal);
        }
        buffers
    }

    /// One line per vertex, along its normal, `length` long.
    pub fn create_vertex_normals_vbo_set(&self, length: f32) -> DrawBuffers {
        let mut buffers = DrawBuffers::new(
            &[Attribute::Position, Attribute::Normal],
            BufferLayout::Interleaved,
            Primitive::Lines,
        );
        for v in self.vertices() {
            let (p, n) = (v.position(self), v.normal(self));
            push_line(&mut buffers, p, p + n * length, n);
        }
        buffers
    }
}

fn push_line(buffers: &mut DrawBuffers, from: Vec3, to: Vec3, normal: Vec3) {
    let normal = normal.extend(0.0);
    buffers.push(&[from.extend(1.0), normal]);
    buffers.push(&[to.extend(1.0), normal]);
}
