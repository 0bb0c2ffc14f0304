use crate::{
    element::{EH, HH, VH},
    error::Error,
    mesh::Mesh,
};
use slotmap::SecondaryMap;

fn check_triangles(mesh: &Mesh) -> Result<(), Error> {
    for (t, tri) in mesh.triangles.iter() {
        let h = tri.halfedge;
        if !h.is_valid(mesh) {
            return Err(Error::DanglingTriangleHalfedge(t));
        }
        if h.triangle(mesh) != t {
            return Err(Error::InconsistentTriangleHalfedge(t));
        }
    }
    Ok(())
}

fn check_vertices(mesh: &Mesh, hvisited: &mut SecondaryMap<HH, ()>) -> Result<(), Error> {
    for (v, vert) in mesh.vertices.iter() {
        let mut current = vert.halfedge;
        while let Some(h) = current {
            if !h.is_valid(mesh) {
                return Err(Error::DanglingVertexHalfedge(v));
            }
            if h.origin(mesh) != v {
                return Err(Error::InvalidOutgoingHalfedge(v, h));
            }
            // Seeing a halfedge twice means the chain loops.
            if hvisited.insert(h, ()).is_some() {
                return Err(Error::SiblingCycle(v));
            }
            current = h.sibling(mesh);
        }
    }
    Ok(())
}

fn check_halfedges(mesh: &Mesh, hvisited: &SecondaryMap<HH, ()>) -> Result<(), Error> {
    for (h, hedge) in mesh.halfedges.iter() {
        if !hedge.origin.is_valid(mesh)
            || !hedge.edge.is_valid(mesh)
            || !hedge.next.is_valid(mesh)
            || !hedge.triangle.is_valid(mesh)
        {
            return Err(Error::DanglingHalfedgeLink(h));
        }
        if !hvisited.contains_key(h) {
            return Err(Error::InvalidOutgoingHalfedge(hedge.origin, h));
        }
        // Loop of exactly three halfedges, all in the same triangle.
        let (n1, n2) = (hedge.next, hedge.next.next(mesh));
        if !n2.is_valid(mesh) || n2.next(mesh) != h {
            return Err(Error::InvalidTriangleCycle(h));
        }
        if [n1, n2].iter().any(|n| n.triangle(mesh) != hedge.triangle) {
            return Err(Error::InvalidTriangleCycle(h));
        }
        let (origin, target) = (hedge.origin, n1.origin(mesh));
        if origin == target || n2.origin(mesh) == origin || n2.origin(mesh) == target {
            return Err(Error::DegenerateTriangleVertices(hedge.triangle));
        }
        let (v1, v2) = hedge.edge.vertices(mesh);
        if !((v1 == origin && v2 == target) || (v1 == target && v2 == origin)) {
            return Err(Error::InvalidEdgeVertices(hedge.edge));
        }
        if let Some(o) = hedge.opposite {
            if !o.is_valid(mesh)
                || o.opposite(mesh) != Some(h)
                || o.origin(mesh) != target
                || o.target(mesh) != origin
            {
                return Err(Error::InvalidOpposite(h));
            }
            if o.edge(mesh) != hedge.edge {
                return Err(Error::UnsharedEdge(h));
            }
        }
    }
    Ok(())
}

fn check_edges(mesh: &Mesh) -> Result<(), Error> {
    let mut used: SecondaryMap<EH, ()> = SecondaryMap::with_capacity(mesh.num_edges());
    for h in mesh.halfedges() {
        used.insert(h.edge(mesh), ());
    }
    for (e, edge) in mesh.edges.iter() {
        if !edge.v1.is_valid(mesh) || !edge.v2.is_valid(mesh) || edge.v1 == edge.v2 {
            return Err(Error::InvalidEdgeVertices(e));
        }
        if !used.contains_key(e) {
            return Err(Error::OrphanEdge(e));
        }
    }
    Ok(())
}

impl Mesh {
    /**
     * Checks every link of the mesh: triangles point to their own halfedges,
     * sibling chains only hold halfedges leaving their vertex and hold all of
     * them, `next` loops have length three, opposites are symmetric and share
     * their edge, and edges join the endpoints of their halfedges. Returns
     * the first violation found.
     */
    pub fn validate(&self) -> Result<(), Error> {
        let mut hvisited = SecondaryMap::with_capacity(self.num_halfedges());
        check_triangles(self)?;
        check_vertices(self, &mut hvisited)?;
        check_halfedges(self, &hvisited)?;
        check_edges(self)?;
        Ok(())
    }

    /// Vertices that belong to no triangle.
    pub fn orphan_vertices(&self) -> Vec<VH> {
        self.vertices()
            .filter(|v| v.halfedge(self).is_none())
            .collect()
    }

    /**
     * Validates the mesh, then looks for vertices that belong to no triangle.
     * With `repair` they are deleted, otherwise they are only reported in the
     * log.
     */
    pub fn check_mesh(&mut self, repair: bool) -> Result<(), Error> {
        self.validate()?;
        let orphans = self.orphan_vertices();
        if orphans.is_empty() {
            return Ok(());
        }
        if !repair {
            for v in &orphans {
                log::warn!(
                    "Vertex {} does not belong to any triangle of mesh {}",
                    v.name(self),
                    self.name()
                );
            }
            return Ok(());
        }
        log::warn!(
            "Mesh {}: deleting {} vertices that belong to no triangle",
            self.name(),
            orphans.len()
        );
        for v in orphans {
            self.del_vertex(v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        mesh::test::{grid, quad_box},
        Error,
    };

    #[test]
    fn t_validate_fixtures() {
        quad_box().validate().expect("Invalid box");
        grid(4, 3).validate().expect("Invalid grid");
        let mut mesh = grid(3, 3);
        mesh.check_mesh(false).expect("Invalid grid");
    }

    #[test]
    fn t_validate_broken_opposite() {
        let mut mesh = grid(3, 3);
        let h = mesh
            .halfedges()
            .find(|h| !h.is_boundary(&mesh))
            .expect("Cannot find interior halfedge");
        mesh.halfedges[h].opposite = None;
        assert!(matches!(mesh.validate(), Err(Error::InvalidOpposite(_))));
    }

    #[test]
    fn t_validate_broken_sibling() {
        let mut mesh = quad_box();
        let v = mesh.vertex_at(0).expect("Cannot find vertex");
        let h = v.halfedge(&mesh).expect("No outgoing halfedge");
        // Drop the rest of the chain.
        mesh.halfedges[h].sibling = None;
        assert!(matches!(
            mesh.validate(),
            Err(Error::InvalidOutgoingHalfedge(_, _))
        ));
    }

    #[test]
    fn t_check_mesh_repair() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut mesh = grid(2, 2);
        let lonely = mesh.add_vertex("lonely");
        assert_eq!(mesh.orphan_vertices(), vec![lonely]);
        // Only reported.
        mesh.check_mesh(false).expect("Invalid mesh");
        assert_eq!(mesh.num_vertices(), 5);
        mesh.check_mesh(true).expect("Cannot repair mesh");
        assert_eq!(mesh.num_vertices(), 4);
        assert!(mesh.orphan_vertices().is_empty());
    }
}
