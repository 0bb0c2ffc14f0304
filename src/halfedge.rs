use crate::{
    element::{Edge, Halfedge, EH, HH, TH, VH},
    error::Error,
    mesh::Mesh,
};

impl Mesh {
    /// Creates an edge between the two vertices, ordered by vertex number.
    fn new_edge(&mut self, a: VH, b: VH) -> EH {
        let (v1, v2) = match self.vertices[a].number <= self.vertices[b].number {
            true => (a, b),
            false => (b, a),
        };
        self.edges.insert(Edge { v1, v2 })
    }

    /// Replaces `old` with `new` in the edge, keeping the endpoints ordered by
    /// vertex number. Does nothing if the edge doesn't touch `old`.
    pub(crate) fn replace_edge_vertex(&mut self, e: EH, old: VH, new: VH) {
        let Edge { v1, v2 } = self.edges[e];
        let other = if v1 == old {
            v2
        } else if v2 == old {
            v1
        } else {
            return;
        };
        let ordered = self.vertices[new].number <= self.vertices[other].number;
        let edge = &mut self.edges[e];
        (edge.v1, edge.v2) = match ordered {
            true => (new, other),
            false => (other, new),
        };
    }

    /**
     * Creates the halfedge `origin -> target` inside triangle `t` and prepends
     * it to the sibling chain of `origin`. If `opposite` is given, both
     * halfedges become mutual opposites sharing its edge, otherwise a new edge
     * is created. The `next` link is left for the caller to set.
     */
    pub(crate) fn new_halfedge(
        &mut self,
        origin: VH,
        target: VH,
        t: TH,
        opposite: Option<HH>,
    ) -> HH {
        let edge = match opposite {
            Some(o) => self.halfedges[o].edge,
            None => self.new_edge(origin, target),
        };
        let h = self.halfedges.insert(Halfedge {
            origin,
            triangle: t,
            edge,
            next: HH::default(),
            opposite,
            sibling: None,
        });
        if let Some(o) = opposite {
            self.halfedges[o].opposite = Some(h);
        }
        self.link_sibling(origin, h);
        h
    }

    /// Removes the halfedge. Its edge is deleted unless the opposite halfedge
    /// still uses it.
    pub(crate) fn del_halfedge(&mut self, h: HH) {
        let Halfedge {
            origin,
            edge,
            opposite,
            ..
        } = self.halfedges[h];
        match opposite {
            Some(o) => self.halfedges[o].opposite = None,
            None => {
                self.edges.remove(edge);
            }
        }
        self.unlink_sibling(origin, h);
        self.halfedges.remove(h);
    }

    pub(crate) fn link_sibling(&mut self, v: VH, h: HH) {
        self.halfedges[h].sibling = self.vertices[v].halfedge;
        self.vertices[v].halfedge = Some(h);
    }

    pub(crate) fn unlink_sibling(&mut self, v: VH, h: HH) {
        let after = self.halfedges[h].sibling.take();
        if self.vertices[v].halfedge == Some(h) {
            self.vertices[v].halfedge = after;
            return;
        }
        let mut current = self.vertices[v].halfedge;
        while let Some(c) = current {
            if self.halfedges[c].sibling == Some(h) {
                self.halfedges[c].sibling = after;
                return;
            }
            current = self.halfedges[c].sibling;
        }
    }

    /**
     * Deletes the triangle on the left of `h`, then joins the two halfedges
     * that were opposite to its other two sides, so they become mutual
     * opposites on a single edge.
     *
     * This is one step of [`Mesh::collapse`]. On its own it leaves the target
     * of `h` connected through the joined halfedges, until the collapse moves
     * that vertex onto the origin of `h`.
     */
    pub fn collapse_triangle(&mut self, h: HH) -> Result<(), Error> {
        if !h.is_valid(self) {
            return Err(Error::InvalidHalfedge(h));
        }
        let origin = h.origin(self);
        let apex = h.prev(self).origin(self);
        let opp_next = h.next(self).opposite(self);
        let opp_prev = h.prev(self).opposite(self);
        self.del_triangle(h.triangle(self))?;
        let opp_next = opp_next.filter(|o| o.is_valid(self));
        let opp_prev = opp_prev.filter(|o| o.is_valid(self));
        match (opp_next, opp_prev) {
            (Some(a), Some(b)) => {
                let keep = self.halfedges[b].edge;
                let drop = std::mem::replace(&mut self.halfedges[a].edge, keep);
                self.edges.remove(drop);
                self.halfedges[a].opposite = Some(b);
                self.halfedges[b].opposite = Some(a);
            }
            (Some(a), None) => {
                let e = self.new_edge(origin, apex);
                let drop = std::mem::replace(&mut self.halfedges[a].edge, e);
                self.edges.remove(drop);
            }
            (None, Some(_)) | (None, None) => {}
        }
        Ok(())
    }

    fn is_boundary_vertex(&self, v: VH) -> bool {
        self.outgoing_halfedges(v)
            .any(|h| h.is_boundary(self) || h.prev(self).is_boundary(self))
    }

    /**
     * Checks that collapsing `h` keeps the mesh manifold.
     *
     * The vertices adjacent to both ends of `h` must be exactly the apexes of
     * the triangles on either side of `h`, and these apexes must be distinct.
     * An interior edge must not join two boundary vertices, and a tetrahedron
     * cannot be collapsed any further.
     */
    pub fn check_collapse(&self, h: HH) -> Result<(), Error> {
        if !h.is_valid(self) {
            return Err(Error::InvalidHalfedge(h));
        }
        let (a, b) = (h.origin(self), h.target(self));
        let left = h.prev(self).origin(self);
        let right = h.opposite(self).map(|o| o.prev(self).origin(self));
        if let Some(right) = right {
            if right == left
                || (self.halfedge_to(left, right).is_some()
                    && self.halfedge_to(right, left).is_some()
                    && self.neighbor_vertices(left).len() == 3
                    && self.neighbor_vertices(right).len() == 3)
            {
                return Err(Error::CollapseNotAllowed(h));
            }
        }
        let nb = self.neighbor_vertices(b);
        let link_ok = self
            .neighbor_vertices(a)
            .into_iter()
            .filter(|v| nb.contains(v))
            .all(|v| v == left || Some(v) == right);
        if !link_ok {
            return Err(Error::CollapseNotAllowed(h));
        }
        if right.is_some() && self.is_boundary_vertex(a) && self.is_boundary_vertex(b) {
            return Err(Error::CollapseNotAllowed(h));
        }
        Ok(())
    }

    /**
     * Merges the target of `h` into its origin.
     *
     * The triangles on both sides of `h` are removed, and every halfedge
     * leaving the target is moved to leave the origin instead. Afterwards the
     * target vertex has no halfedges left, and the caller may delete it. The
     * collapse is refused if it would break the topology, see
     * [`Mesh::check_collapse`].
     */
    pub fn collapse(&mut self, h: HH) -> Result<(), Error> {
        self.check_collapse(h)?;
        let (a, b) = (h.origin(self), h.target(self));
        if let Some(o) = h.opposite(self) {
            self.collapse_triangle(o)?;
        }
        self.collapse_triangle(h)?;
        while let Some(hb) = self.vertices[b].halfedge {
            self.vertices[b].halfedge = self.halfedges[hb].sibling;
            self.halfedges[hb].origin = a;
            self.link_sibling(a, hb);
            let outgoing = hb.edge(self);
            let incoming = hb.prev(self).edge(self);
            self.replace_edge_vertex(outgoing, b, a);
            self.replace_edge_vertex(incoming, b, a);
        }
        Ok(())
    }

    /**
     * Flips the diagonal shared by the two triangles on either side of `h`.
     * ```text
     *
     *        z                 z
     *       / \               /|\
     *      / h \             / | \
     *     x-----y    =>     x  h  y
     *      \   /             \ | /
     *       \ /               \|/
     *        w                 w
     * ```
     * Triangles `(x, y, z)` and `(y, x, w)` become `(w, z, x)` and `(z, w,
     * y)`; `h` now runs from `w` to `z`. Does nothing if `h` is a boundary
     * halfedge.
     */
    pub fn flip(&mut self, h: HH) -> Result<(), Error> {
        if !h.is_valid(self) {
            return Err(Error::InvalidHalfedge(h));
        }
        let Some(o) = h.opposite(self) else {
            return Ok(());
        };
        let (hn, hp) = (h.next(self), h.prev(self));
        let (on, op) = (o.next(self), o.prev(self));
        let (x, y) = (h.origin(self), o.origin(self));
        let (z, w) = (hp.origin(self), op.origin(self));
        if z == w || self.halfedge_to(z, w).is_some() || self.halfedge_to(w, z).is_some() {
            return Err(Error::FlipNotAllowed(h));
        }
        let (t1, t2) = (h.triangle(self), o.triangle(self));
        self.unlink_sibling(x, h);
        self.unlink_sibling(y, o);
        self.halfedges[h].origin = w;
        self.halfedges[o].origin = z;
        self.link_sibling(w, h);
        self.link_sibling(z, o);
        self.link_triangle(t1, [h, hp, on]);
        self.link_triangle(t2, [o, op, hn]);
        self.halfedges[on].triangle = t1;
        self.halfedges[hn].triangle = t2;
        let old = h.edge(self);
        self.edges.remove(old);
        let e = self.new_edge(w, z);
        self.halfedges[h].edge = e;
        self.halfedges[o].edge = e;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        mesh::test::{grid, quad_box, single_triangle},
        Error, Mesh, HH, TH, VH,
    };
    use std::collections::BTreeSet;

    fn assert_invariants(mesh: &Mesh) {
        for h in mesh.halfedges() {
            if let Some(o) = h.opposite(mesh) {
                assert_eq!(o.opposite(mesh), Some(h));
                assert_eq!(o.edge(mesh), h.edge(mesh));
            }
            assert_eq!(h.next(mesh).next(mesh).next(mesh), h);
        }
        for t in mesh.triangles() {
            let h = t.halfedge(mesh);
            assert_eq!(h.next(mesh).next(mesh).next(mesh), h);
        }
        let mut pairs = BTreeSet::new();
        for h in mesh.halfedges() {
            assert!(pairs.insert((h.origin(mesh), h.target(mesh))));
        }
        mesh.validate().expect("Mesh is not valid");
    }

    fn vertex_sets(mesh: &Mesh, tris: &[TH]) -> BTreeSet<BTreeSet<VH>> {
        tris.iter()
            .map(|t| mesh.triangle_vertices(*t).into_iter().collect())
            .collect()
    }

    #[test]
    fn t_collapse_single_triangle() {
        let (mut mesh, verts) = single_triangle();
        let h = mesh
            .halfedge_to(verts[0], verts[1])
            .expect("Cannot find halfedge");
        mesh.collapse(h).expect("Cannot collapse");
        assert_eq!(mesh.num_triangles(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_edges(), 0);
        assert_eq!(verts[1].halfedge(&mesh), None);
        mesh.del_vertex(verts[1]).expect("Cannot delete vertex");
        assert_eq!(mesh.num_vertices(), 2);
    }

    #[test]
    fn t_collapse_interior_edge() {
        let mut mesh = grid(4, 4);
        // Diagonal between (1, 2) and (2, 1), away from the border.
        let a = mesh.vertex_at(1 + 2 * 4).expect("Cannot find vertex");
        let b = mesh.vertex_at(2 + 4).expect("Cannot find vertex");
        let h = mesh.halfedge_to(a, b).expect("Cannot find halfedge");
        let ntris = mesh.num_triangles();
        mesh.collapse(h).expect("Cannot collapse");
        assert_eq!(mesh.num_triangles(), ntris - 2);
        assert!(mesh.halfedges().all(|h| h.origin(&mesh) != b));
        assert!(mesh.edges().all(|e| {
            let (v1, v2) = e.vertices(&mesh);
            v1 != b && v2 != b
        }));
        mesh.del_vertex(b).expect("Cannot delete vertex");
        assert_invariants(&mesh);
    }

    #[test]
    fn t_collapse_boundary_edge() {
        let mut mesh = grid(4, 4);
        // Bottom row, between (1, 0) and (2, 0).
        let a = mesh.vertex_at(1).expect("Cannot find vertex");
        let b = mesh.vertex_at(2).expect("Cannot find vertex");
        let h = mesh
            .halfedge_to(a, b)
            .or(mesh.halfedge_to(b, a))
            .expect("Cannot find halfedge");
        assert!(h.is_boundary(&mesh));
        let (a, b) = (h.origin(&mesh), h.target(&mesh));
        let ntris = mesh.num_triangles();
        mesh.collapse(h).expect("Cannot collapse");
        assert_eq!(mesh.num_triangles(), ntris - 1);
        assert!(mesh.halfedges().all(|h| h.origin(&mesh) != b));
        assert!(a.halfedge(&mesh).is_some());
        mesh.del_vertex(b).expect("Cannot delete vertex");
        assert_invariants(&mesh);
    }

    #[test]
    fn t_collapse_refused() {
        let mut mesh = grid(3, 3);
        // Interior diagonal whose ends are both on the border.
        let a = mesh.vertex_at(3).expect("Cannot find vertex");
        let b = mesh.vertex_at(1).expect("Cannot find vertex");
        let h = mesh.halfedge_to(a, b).expect("Cannot find halfedge");
        assert!(!h.is_boundary(&mesh));
        assert!(matches!(mesh.collapse(h), Err(Error::CollapseNotAllowed(_))));
        assert_eq!(mesh.num_triangles(), 8);
        assert_invariants(&mesh);
    }

    #[test]
    fn t_collapse_box() {
        let mut mesh = quad_box();
        let hs: Vec<HH> = mesh.halfedges().collect();
        let mut collapsed = 0;
        for h in hs {
            if !h.is_valid(&mesh) {
                continue;
            }
            let b = h.target(&mesh);
            if mesh.collapse(h).is_ok() {
                mesh.del_vertex(b).expect("Cannot delete vertex");
                collapsed += 1;
                assert_invariants(&mesh);
                assert_eq!(mesh.num_triangles(), 12 - 2 * collapsed);
            }
        }
        assert!(collapsed > 0);
    }

    #[test]
    fn t_flip() {
        let mut mesh = grid(3, 3);
        let a = mesh.vertex_at(3).expect("Cannot find vertex");
        let b = mesh.vertex_at(1).expect("Cannot find vertex");
        let h = mesh.halfedge_to(a, b).expect("Cannot find halfedge");
        let o = h.opposite(&mesh).expect("Must have an opposite");
        let tris = [h.triangle(&mesh), o.triangle(&mesh)];
        let before = vertex_sets(&mesh, &tris);
        mesh.flip(h).expect("Cannot flip");
        assert_invariants(&mesh);
        // The new diagonal joins (0, 0) and (1, 1).
        let (p, q) = (
            mesh.vertex_at(0).expect("Cannot find vertex"),
            mesh.vertex_at(4).expect("Cannot find vertex"),
        );
        assert!(mesh.halfedge_to(a, b).is_none());
        assert!(mesh.halfedge_to(p, q).is_some());
        assert!(mesh.halfedge_to(q, p).is_some());
        assert_ne!(vertex_sets(&mesh, &tris), before);
        mesh.compute_normals();
        for t in tris {
            assert!(t.normal(&mesh).y > 0.99);
        }
        mesh.flip(h).expect("Cannot flip");
        assert_invariants(&mesh);
        assert_eq!(vertex_sets(&mesh, &tris), before);
    }

    #[test]
    fn t_flip_refused() {
        let mut mesh = Mesh::default();
        let [a, b, c, d, e] = ["a", "b", "c", "d", "e"].map(|n| mesh.add_vertex(n));
        let t1 = mesh.add_triangle(a, b, c).expect("Cannot add triangle");
        let t2 = mesh.add_triangle(b, a, d).expect("Cannot add triangle");
        // The diagonal c-d already exists.
        mesh.add_triangle(d, c, e).expect("Cannot add triangle");
        let h = mesh.halfedge_to(a, b).expect("Cannot find halfedge");
        let counts = (mesh.num_halfedges(), mesh.num_edges());
        assert!(matches!(mesh.flip(h), Err(Error::FlipNotAllowed(f)) if f == h));
        assert_eq!((mesh.num_halfedges(), mesh.num_edges()), counts);
        assert_eq!(mesh.triangle_vertices(t1), [a, b, c]);
        assert_eq!(mesh.triangle_vertices(t2), [b, a, d]);
        assert_eq!(h.origin(&mesh), a);
        assert_eq!(mesh.halfedge_to(d, c).map(|h| h.triangle(&mesh)), mesh.triangles().nth(2));
        assert_invariants(&mesh);
    }

    #[test]
    fn t_flip_boundary() {
        let (mut mesh, verts) = single_triangle();
        let h = mesh
            .halfedge_to(verts[0], verts[1])
            .expect("Cannot find halfedge");
        mesh.flip(h).expect("Boundary flip is a no-op");
        assert_eq!(mesh.triangle_vertices(h.triangle(&mesh)), verts);
    }
}
