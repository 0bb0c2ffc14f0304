use crate::{
    element::{Edge, Halfedge, Triangle, Vertex, EH, HH, TH, VH},
    error::Error,
};
use glam::Vec3;
use slotmap::SlotMap;

/**
 * Triangle mesh using a halfedge data structure.
 *
 * All elements live in generation checked arenas, so handles to deleted
 * elements are detected instead of aliasing newer elements. Vertices and
 * triangles additionally remember the order in which they were created, which
 * is the order used for numbering vertices and packing draw buffers.
 */
#[derive(Clone)]
pub struct Mesh {
    name: String,
    pub(crate) vertices: SlotMap<VH, Vertex>,
    pub(crate) halfedges: SlotMap<HH, Halfedge>,
    pub(crate) edges: SlotMap<EH, Edge>,
    pub(crate) triangles: SlotMap<TH, Triangle>,
    vorder: Vec<VH>,
    // Deleted triangles are dropped from this list lazily.
    torder: Vec<TH>,
    stale_triangles: usize,
    next_number: usize,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Mesh {
            name: name.to_string(),
            vertices: SlotMap::with_key(),
            halfedges: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            triangles: SlotMap::with_key(),
            vorder: Vec::new(),
            torder: Vec::new(),
            stale_triangles: 0,
            next_number: 0,
        }
    }

    pub fn with_capacity(name: &str, nverts: usize, ntris: usize) -> Self {
        Mesh {
            name: name.to_string(),
            vertices: SlotMap::with_capacity_and_key(nverts),
            halfedges: SlotMap::with_capacity_and_key(ntris * 3),
            edges: SlotMap::with_capacity_and_key(ntris * 3 / 2),
            triangles: SlotMap::with_capacity_and_key(ntris),
            vorder: Vec::with_capacity(nverts),
            torder: Vec::with_capacity(ntris),
            stale_triangles: 0,
            next_number: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Vertices in creation order.
    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<'_> {
        self.vorder.iter().copied()
    }

    /// Triangles in creation order.
    pub fn triangles(&self) -> impl Iterator<Item = TH> + use<'_> {
        self.torder
            .iter()
            .copied()
            .filter(|t| self.triangles.contains_key(*t))
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> + use<'_> {
        self.edges.keys()
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> + use<'_> {
        self.halfedges.keys()
    }

    /// The vertex at position `i` of the vertex list.
    pub fn vertex_at(&self, i: usize) -> Result<VH, Error> {
        self.vorder
            .get(i)
            .copied()
            .ok_or(Error::VertexIndexOutOfBounds(i))
    }

    /// First vertex with the given name. This is a linear search.
    pub fn vertex_by_name(&self, name: &str) -> Option<VH> {
        self.vorder
            .iter()
            .copied()
            .find(|v| self.vertices[*v].name == name)
    }

    /**
     * Adds a vertex that is not connected to anything. Numbers are unique
     * among live vertices, but only contiguous until a vertex is deleted, see
     * [`Mesh::renumber_vertices`].
     */
    pub fn add_vertex(&mut self, name: &str) -> VH {
        let number = self.next_number;
        self.next_number += 1;
        let v = self.vertices.insert(Vertex::new(name.to_string(), number));
        self.vorder.push(v);
        v
    }

    pub(crate) fn check_vertex(&self, v: VH) -> Result<(), Error> {
        match self.vertices.contains_key(v) {
            true => Ok(()),
            false => Err(Error::InvalidVertex(v)),
        }
    }

    pub(crate) fn check_triangle(&self, t: TH) -> Result<(), Error> {
        match self.triangles.contains_key(t) {
            true => Ok(()),
            false => Err(Error::InvalidTriangle(t)),
        }
    }

    /// Verifies a halfedge `from -> to` can be created, and returns the
    /// halfedge that will become its opposite.
    pub(crate) fn check_new_halfedge(&self, from: VH, to: VH) -> Result<Option<HH>, Error> {
        match (self.halfedge_to(from, to), self.halfedge_to(to, from)) {
            (Some(_), Some(_)) => Err(Error::NonManifoldEdge(from, to)),
            (Some(_), None) => Err(Error::DuplicateHalfedge(from, to)),
            (None, Some(h)) if h.opposite(self).is_some() => Err(Error::NonManifoldEdge(from, to)),
            (None, opp) => Ok(opp),
        }
    }

    /**
     * Adds the triangle `(a, b, c)`. The winding order defines the normal by
     * the right hand rule. Fails without modifying the mesh if the vertices
     * are not distinct, or if any of the three directed edges already exists.
     */
    pub fn add_triangle(&mut self, a: VH, b: VH, c: VH) -> Result<TH, Error> {
        for v in [a, b, c] {
            self.check_vertex(v)?;
        }
        if a == b || b == c || c == a {
            return Err(Error::DegenerateTriangle(a, b, c));
        }
        let opp_ab = self.check_new_halfedge(a, b)?;
        let opp_bc = self.check_new_halfedge(b, c)?;
        let opp_ca = self.check_new_halfedge(c, a)?;
        let t = self.triangles.insert(Triangle::new(HH::default()));
        let hab = self.new_halfedge(a, b, t, opp_ab);
        let hbc = self.new_halfedge(b, c, t, opp_bc);
        let hca = self.new_halfedge(c, a, t, opp_ca);
        self.link_triangle(t, [hab, hbc, hca]);
        self.torder.push(t);
        Ok(t)
    }

    pub(crate) fn link_triangle(&mut self, t: TH, hs: [HH; 3]) {
        for i in 0..3 {
            self.halfedges[hs[i]].next = hs[(i + 1) % 3];
        }
        self.triangles[t].halfedge = hs[0];
    }

    /// Adds the quad `(a, b, c, d)` as the two triangles `(a, b, d)` and `(d,
    /// b, c)`, sharing the diagonal `b-d`.
    pub fn add_quad(&mut self, a: VH, b: VH, c: VH, d: VH) -> Result<[TH; 2], Error> {
        let t1 = self.add_triangle(a, b, d)?;
        match self.add_triangle(d, b, c) {
            Ok(t2) => Ok([t1, t2]),
            Err(e) => {
                self.del_triangle(t1)?;
                Err(e)
            }
        }
    }

    /// Adds a fan of triangles around the first vertex. The polygon must be
    /// convex and its vertices ordered counter-clockwise.
    pub fn add_polygon_convex(&mut self, vertices: &[VH]) -> Result<Vec<TH>, Error> {
        let mut out = Vec::with_capacity(vertices.len().saturating_sub(2));
        if let Some((&pivot, rest)) = vertices.split_first() {
            for pair in rest.windows(2) {
                match self.add_triangle(pivot, pair[0], pair[1]) {
                    Ok(t) => out.push(t),
                    Err(e) => {
                        self.rollback(&out)?;
                        return Err(e);
                    }
                }
            }
        }
        Ok(out)
    }

    /**
     * Triangulates a possibly concave polygon by clipping ears.
     *
     * Each pass walks the remaining vertices and clips every convex corner
     * (with respect to `normal`) whose triangle contains no other remaining
     * vertex. The first such corner found is clipped, the walk then continues
     * from the next corner. Fails if a full pass clips nothing, in which case
     * the triangles added so far are removed again.
     */
    pub fn add_polygon(&mut self, vertices: &[VH], normal: Vec3) -> Result<Vec<TH>, Error> {
        for v in vertices {
            self.check_vertex(*v)?;
        }
        let mut remaining = vertices.to_vec();
        let mut out = Vec::with_capacity(vertices.len().saturating_sub(2));
        while remaining.len() >= 3 {
            let mut clipped = false;
            let mut i = 0;
            while i + 2 < remaining.len() {
                let (a, b, c) = (remaining[i], remaining[i + 1], remaining[i + 2]);
                if self.is_ear(&remaining, i, normal) {
                    match self.add_triangle(a, b, c) {
                        Ok(t) => out.push(t),
                        Err(e) => {
                            self.rollback(&out)?;
                            return Err(e);
                        }
                    }
                    remaining.remove(i + 1);
                    clipped = true;
                }
                i += 1;
            }
            if !clipped {
                self.rollback(&out)?;
                return Err(Error::PolygonTriangulationFailed(remaining.len()));
            }
        }
        Ok(out)
    }

    fn is_ear(&self, polygon: &[VH], i: usize, normal: Vec3) -> bool {
        let pa = polygon[i].position(self);
        let pb = polygon[i + 1].position(self);
        let pc = polygon[i + 2].position(self);
        let (ab, bc, ca) = (pb - pa, pc - pb, pa - pc);
        let n = ab.cross(bc);
        if n.dot(normal) < 0.0 {
            return false;
        }
        // Points on the sides block the ear as well.
        !polygon
            .iter()
            .enumerate()
            .filter(|(j, _)| *j < i || *j > i + 2)
            .map(|(_, v)| v.position(self))
            .any(|p| {
                n.cross(ab).dot(p - pa) >= 0.0
                    && n.cross(bc).dot(p - pb) >= 0.0
                    && n.cross(ca).dot(p - pc) >= 0.0
            })
    }

    fn rollback(&mut self, added: &[TH]) -> Result<(), Error> {
        for t in added.iter().rev() {
            self.del_triangle(*t)?;
        }
        Ok(())
    }

    /// Runs `edit` on the mesh, restoring the mesh as it was before if `edit`
    /// fails. Handles stay valid across the restore.
    pub(crate) fn undo_on_error<T>(
        &mut self,
        edit: impl FnOnce(&mut Mesh) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let backup = self.clone();
        edit(self).inspect_err(|_| *self = backup)
    }

    /// Deletes the triangle and its three halfedges. Edges left without
    /// halfedges are deleted as well. The vertices are kept.
    pub fn del_triangle(&mut self, t: TH) -> Result<(), Error> {
        self.check_triangle(t)?;
        for h in self.triangle_halfedges(t) {
            self.del_halfedge(h);
        }
        self.triangles.remove(t);
        self.stale_triangles += 1;
        if self.stale_triangles * 2 > self.torder.len() {
            let triangles = &self.triangles;
            self.torder.retain(|t| triangles.contains_key(*t));
            self.stale_triangles = 0;
        }
        Ok(())
    }

    /// Deletes the vertex along with every triangle that uses it.
    pub fn del_vertex(&mut self, v: VH) -> Result<(), Error> {
        self.check_vertex(v)?;
        let triangles: Vec<TH> = self.triangles_around(v).collect();
        for t in triangles {
            self.del_triangle(t)?;
        }
        self.vertices.remove(v);
        if let Some(pos) = self.vorder.iter().position(|w| *w == v) {
            self.vorder.remove(pos);
        }
        Ok(())
    }

    /// Assigns `number = 0, 1, ..` to the vertices in list order.
    pub fn renumber_vertices(&mut self) {
        for (i, v) in self.vorder.iter().enumerate() {
            self.vertices[*v].number = i;
        }
        self.next_number = self.vorder.len();
    }

    /**
     * Recomputes the geometry of every triangle, renumbers the vertices, then
     * recomputes every vertex normal as the area weighted average of the
     * normals of the incident triangles.
     */
    pub fn compute_normals(&mut self) {
        for i in 0..self.torder.len() {
            let t = self.torder[i];
            if self.triangles.contains_key(t) {
                self.update_triangle_normal(t);
            }
        }
        self.renumber_vertices();
        for i in 0..self.vorder.len() {
            self.update_vertex_normal(self.vorder[i]);
        }
    }

    /// Same as [`Mesh::compute_normals`] for tangents, without renumbering.
    pub fn compute_tangents(&mut self) {
        for i in 0..self.torder.len() {
            let t = self.torder[i];
            if self.triangles.contains_key(t) {
                self.update_triangle_tangent(t);
            }
        }
        for i in 0..self.vorder.len() {
            self.update_vertex_tangent(self.vorder[i]);
        }
    }

    /// Logs the element counts.
    pub fn info(&self) {
        log::info!(
            "Mesh {}: {} vertices, {} triangles, {} edges, {} halfedges",
            self.name,
            self.num_vertices(),
            self.num_triangles(),
            self.num_edges(),
            self.num_halfedges()
        );
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.halfedges.clear();
        self.edges.clear();
        self.triangles.clear();
        self.vorder.clear();
        self.torder.clear();
        self.stale_triangles = 0;
        self.next_number = 0;
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new("mesh")
    }
}
