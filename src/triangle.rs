use crate::{
    element::{HH, TH, VH},
    error::Error,
    mesh::Mesh,
};
use glam::Vec3;

impl Mesh {
    /// The three halfedges of the triangle, starting with its first halfedge.
    pub fn triangle_halfedges(&self, t: TH) -> [HH; 3] {
        let h0 = t.halfedge(self);
        let h1 = h0.next(self);
        [h0, h1, h1.next(self)]
    }

    /// The three vertices of the triangle, in winding order.
    pub fn triangle_vertices(&self, t: TH) -> [VH; 3] {
        self.triangle_halfedges(t).map(|h| h.origin(self))
    }

    pub fn contains_vertex(&self, t: TH, v: VH) -> bool {
        self.triangle_vertices(t).contains(&v)
    }

    /// Whether the triangle has the directed side `a -> b`.
    pub fn contains_edge(&self, t: TH, a: VH, b: VH) -> bool {
        self.triangle_halfedges(t)
            .into_iter()
            .any(|h| h.origin(self) == a && h.target(self) == b)
    }

    /// The vertex of the triangle that is neither `a` nor `b`.
    pub fn third_vertex(&self, t: TH, a: VH, b: VH) -> Option<VH> {
        let verts = self.triangle_vertices(t);
        if a == b || !verts.contains(&a) || !verts.contains(&b) {
            return None;
        }
        verts.into_iter().find(|v| *v != a && *v != b)
    }

    /**
     * Rotates the triangle so that `v` becomes its first vertex, and returns
     * the vertices in the new order. The winding is unchanged.
     */
    pub fn cycle_vertex_first(&mut self, t: TH, v: VH) -> Result<[VH; 3], Error> {
        self.check_triangle(t)?;
        let h = self
            .triangle_halfedges(t)
            .into_iter()
            .find(|h| h.origin(self) == v)
            .ok_or(Error::VertexNotInTriangle(t, v))?;
        self.triangles[t].halfedge = h;
        Ok(self.triangle_vertices(t))
    }

    /**
     * Replaces the vertex `old` of the triangle with `new`. The two halfedges
     * touching `old` are rebuilt, so `old` no longer references this triangle
     * and `new` gets its outgoing halfedge. Fails without modifying the mesh if
     * the result would be degenerate or non-manifold.
     */
    pub fn replace_triangle_vertex(&mut self, t: TH, old: VH, new: VH) -> Result<(), Error> {
        self.check_triangle(t)?;
        self.check_vertex(new)?;
        if old == new {
            return Ok(());
        }
        let [hab, hbc, hca] = self
            .triangle_halfedges(t)
            .into_iter()
            .find(|h| h.origin(self) == old)
            .map(|h| self.loop_halfedges(h).collect::<Vec<_>>())
            .and_then(|hs| <[HH; 3]>::try_from(hs).ok())
            .ok_or(Error::VertexNotInTriangle(t, old))?;
        let b = hbc.origin(self);
        let c = hca.origin(self);
        if new == b || new == c {
            return Err(Error::DegenerateTriangle(new, b, c));
        }
        let opp_ab = self.check_new_halfedge(new, b)?;
        let opp_ca = self.check_new_halfedge(c, new)?;
        self.del_halfedge(hab);
        self.del_halfedge(hca);
        let hab = self.new_halfedge(new, b, t, opp_ab);
        let hca = self.new_halfedge(c, new, t, opp_ca);
        self.link_triangle(t, [hab, hbc, hca]);
        Ok(())
    }

    /// Recomputes the normal, area, center and plane offset of the triangle.
    pub(crate) fn update_triangle_normal(&mut self, t: TH) {
        let [a, b, c] = self.triangle_vertices(t).map(|v| v.position(self));
        let cross = (b - a).cross(c - a);
        let normal = cross.normalize_or_zero();
        let tri = &mut self.triangles[t];
        tri.center = (a + b + c) / 3.0;
        tri.surface = 0.5 * cross.length();
        tri.normal = normal;
        tri.w = -normal.dot(a);
    }

    /**
     * Recomputes the tangent of the triangle from the second texture
     * coordinate of its vertices. Without texture coordinates, the first side
     * is used as tangent.
     */
    pub(crate) fn update_triangle_tangent(&mut self, t: TH) {
        let verts = self.triangle_vertices(t);
        let [a, b, c] = verts.map(|v| v.position(self));
        let [ta, tb, tc] = verts.map(|v| self.texcoord(v).y);
        let (ab, ac) = (b - a, c - a);
        let tangent = (ab * (tc - ta) - ac * (tb - ta)).normalize_or_zero();
        self.triangles[t].tangent = match tangent == Vec3::ZERO {
            true => ab.normalize_or_zero(),
            false => tangent,
        };
    }

    pub fn compute_triangle_normal(&mut self, t: TH) -> Result<Vec3, Error> {
        self.check_triangle(t)?;
        self.update_triangle_normal(t);
        Ok(t.normal(self))
    }

    pub fn compute_triangle_tangent(&mut self, t: TH) -> Result<Vec3, Error> {
        self.check_triangle(t)?;
        self.update_triangle_tangent(t);
        Ok(t.tangent(self))
    }
}
