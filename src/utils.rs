use crate::{
    element::{HH, TH, VH},
    error::Error,
    mesh::Mesh,
};
use glam::Vec3;
use std::{collections::HashSet, fmt::Write};

impl Mesh {
    /**
     * Name of the midpoint between two vertices: `m` followed by both names
     * in lexicographic order, so the result doesn't depend on the order of the
     * arguments.
     */
    pub fn mid_name(&self, a: VH, b: VH) -> Result<String, Error> {
        self.check_vertex(a)?;
        self.check_vertex(b)?;
        let (na, nb) = (a.name(self), b.name(self));
        Ok(match na < nb {
            true => format!("m{}{}", na, nb),
            false => format!("m{}{}", nb, na),
        })
    }

    /// Area weighted average of the triangle normals, normalized.
    pub fn average_normals(&self, triangles: &[TH]) -> Vec3 {
        triangles
            .iter()
            .fold(Vec3::ZERO, |acc, t| acc + t.normal(self) * t.surface(self))
            .normalize_or_zero()
    }

    /// Area weighted average of the triangle tangents, normalized.
    pub fn average_tangents(&self, triangles: &[TH]) -> Vec3 {
        triangles
            .iter()
            .fold(Vec3::ZERO, |acc, t| acc + t.tangent(self) * t.surface(self))
            .normalize_or_zero()
    }

    /// Distinct vertices of the triangles, in order of appearance.
    pub fn vertices_from_triangles(&self, triangles: &[TH]) -> Vec<VH> {
        let mut seen = HashSet::new();
        triangles
            .iter()
            .flat_map(|t| self.triangle_vertices(*t))
            .filter(|v| seen.insert(*v))
            .collect()
    }

    /**
     * Flood fills the triangles enclosed by `border`, starting from the
     * triangle on the left of its first halfedge and never crossing a border
     * halfedge. The border must be closed, or run from one side of the mesh to
     * the other, otherwise every connected triangle is returned. Borders with
     * fewer than three halfedges enclose nothing.
     */
    pub fn triangles_inside_border(&self, border: &[HH]) -> Vec<TH> {
        let Some(&first) = border.first() else {
            return Vec::new();
        };
        if border.len() < 3 {
            return Vec::new();
        }
        let border: HashSet<HH> = border.iter().copied().collect();
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![first];
        while let Some(h) = stack.pop() {
            let t = h.triangle(self);
            if !visited.insert(t) {
                continue;
            }
            out.push(t);
            let (hn, hp) = (h.next(self), h.prev(self));
            for side in [hp, hn] {
                if border.contains(&side) {
                    continue;
                }
                if let Some(o) = side.opposite(self) {
                    stack.push(o);
                }
            }
        }
        out
    }

    /**
     * The halfedges joining consecutive vertices of a closed border, the last
     * vertex being joined back to the first.
     */
    pub fn halfedges_along_border(&self, border: &[VH]) -> Result<Vec<HH>, Error> {
        for v in border {
            self.check_vertex(*v)?;
        }
        let n = border.len();
        if n < 2 {
            return Ok(Vec::new());
        }
        (0..n)
            .map(|i| {
                let (a, b) = (border[i], border[(i + 1) % n]);
                self.halfedge_to(a, b)
                    .ok_or(Error::MissingBorderHalfedge(a, b))
            })
            .collect()
    }

    /// Component wise minimum of the vertex positions.
    pub fn min_aabb(&self) -> Option<Vec3> {
        self.vertices().map(|v| v.position(self)).reduce(Vec3::min)
    }

    /// Component wise maximum of the vertex positions.
    pub fn max_aabb(&self) -> Option<Vec3> {
        self.vertices().map(|v| v.position(self)).reduce(Vec3::max)
    }

    /**
     * Makes a closed box between `min` and `max`, as a mesh named `AABB` of
     * 8 vertices and 12 outward facing triangles. Corners are named after the
     * bound they use on each axis, lower case for `min` and upper case for
     * `max`, e.g. `xYz`.
     */
    pub fn create_aabb(min: Vec3, max: Vec3) -> Result<Mesh, Error> {
        let mut aabb = Mesh::with_capacity("AABB", 8, 12);
        let mut corners = [VH::default(); 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let (bx, by, bz) = (i & 1 != 0, i & 2 != 0, i & 4 != 0);
            let name = [(bx, 'x'), (by, 'y'), (bz, 'z')]
                .iter()
                .map(|(upper, c)| match upper {
                    true => c.to_ascii_uppercase(),
                    false => *c,
                })
                .collect::<String>();
            *corner = aabb.add_vertex(&name);
            aabb.set_position(
                *corner,
                Vec3::new(
                    if bx { max.x } else { min.x },
                    if by { max.y } else { min.y },
                    if bz { max.z } else { min.z },
                ),
            );
        }
        // Bits of the index, x first, select the upper bound.
        let [c000, c100, c010, c110, c001, c101, c011, c111] = corners;
        for [a, b, c, d] in [
            [c101, c100, c110, c111],
            [c100, c000, c010, c110],
            [c000, c001, c011, c010],
            [c001, c101, c111, c011],
            [c111, c110, c010, c011],
            [c100, c101, c001, c000],
        ] {
            aabb.add_quad(a, b, c, d)?;
        }
        aabb.compute_normals();
        Ok(aabb)
    }

    /**
     * Multi-line description of every vertex, triangle and halfedge, also
     * written to the log at debug level.
     */
    pub fn dump(&self) -> String {
        let mut out = String::new();
        // Infallible for String.
        let _ = writeln!(
            out,
            "Mesh {}: {} vertices, {} triangles, {} halfedges",
            self.name(),
            self.num_vertices(),
            self.num_triangles(),
            self.num_halfedges()
        );
        for v in self.vertices() {
            let p = v.position(self);
            let n = v.normal(self);
            let _ = writeln!(
                out,
                "Vertex {} #{} pos=({}, {}, {}) nor=({}, {}, {}) halfedge={:?}",
                v.name(self),
                v.number(self),
                p.x,
                p.y,
                p.z,
                n.x,
                n.y,
                n.z,
                v.halfedge(self)
            );
        }
        for t in self.triangles() {
            let [a, b, c] = self.triangle_vertices(t);
            let n = t.normal(self);
            let _ = writeln!(
                out,
                "Triangle {:?} ({}, {}, {}) nor=({}, {}, {}) surface={}",
                t,
                a.name(self),
                b.name(self),
                c.name(self),
                n.x,
                n.y,
                n.z,
                t.surface(self)
            );
        }
        for h in self.halfedges() {
            let _ = writeln!(
                out,
                "Halfedge {:?} {}->{} triangle={:?} opposite={:?} sibling={:?}",
                h,
                h.origin(self).name(self),
                h.target(self).name(self),
                h.triangle(self),
                h.opposite(self),
                h.sibling(self)
            );
        }
        log::debug!("{}", out);
        out
    }
}

#[cfg(test)]
mod test {
    use crate::{
        macros::assert_f32_eq,
        mesh::test::{grid, quad_box},
        Error, Mesh,
    };
    use glam::Vec3;

    #[test]
    fn t_mid_name() {
        let mesh = grid(2, 2);
        let a = mesh.vertex_by_name("g0-0").expect("Cannot find vertex");
        let b = mesh.vertex_by_name("g1-1").expect("Cannot find vertex");
        let name = mesh.mid_name(a, b).expect("Cannot name midpoint");
        assert_eq!(name, "mg0-0g1-1");
        assert_eq!(mesh.mid_name(b, a).expect("Cannot name midpoint"), name);
    }

    #[test]
    fn t_deleted_vertex_handles() {
        let mut mesh = grid(3, 3);
        let a = mesh.vertex_by_name("g0-0").expect("Cannot find vertex");
        let b = mesh.vertex_by_name("g1-1").expect("Cannot find vertex");
        let c = mesh.vertex_by_name("g1-0").expect("Cannot find vertex");
        mesh.del_vertex(b).expect("Cannot delete vertex");
        assert!(matches!(mesh.mid_name(a, b), Err(Error::InvalidVertex(v)) if v == b));
        assert_eq!(mesh.halfedge_to(b, a), None);
        assert_eq!(mesh.halfedge_to(a, b), None);
        assert!(mesh.triangles_ordered_around(b).is_empty());
        assert!(matches!(
            mesh.halfedges_along_border(&[a, c, b]),
            Err(Error::InvalidVertex(v)) if v == b
        ));
    }

    #[test]
    fn t_average_normals() {
        let mut mesh = quad_box();
        mesh.compute_normals();
        let top: Vec<_> = mesh
            .triangles()
            .filter(|t| t.normal(&mesh).z > 0.5)
            .collect();
        assert_eq!(top.len(), 2);
        assert_eq!(mesh.average_normals(&top), Vec3::Z);
        // Opposite faces cancel out.
        let all: Vec<_> = mesh.triangles().collect();
        assert_eq!(mesh.average_normals(&all), Vec3::ZERO);
        assert_eq!(mesh.vertices_from_triangles(&top).len(), 4);
        assert_eq!(mesh.vertices_from_triangles(&all).len(), 8);
    }

    #[test]
    fn t_halfedges_along_border() {
        let mesh = grid(3, 3);
        let v = |i| mesh.vertex_at(i).expect("Cannot find vertex");
        // Counter-clockwise around +Y, the triangles are on the left.
        let border = [v(0), v(3), v(6), v(7), v(8), v(5), v(2), v(1)];
        let hs = mesh
            .halfedges_along_border(&border)
            .expect("Cannot find border");
        assert_eq!(hs.len(), 8);
        for (i, h) in hs.iter().enumerate() {
            assert_eq!(h.origin(&mesh), border[i]);
            assert_eq!(h.target(&mesh), border[(i + 1) % 8]);
        }
        assert!(matches!(
            mesh.halfedges_along_border(&[v(0), v(2), v(8)]),
            Err(Error::MissingBorderHalfedge(_, _))
        ));
    }

    #[test]
    fn t_triangles_inside_border() {
        let mesh = grid(4, 4);
        let v = |i| mesh.vertex_at(i).expect("Cannot find vertex");
        // Ring around vertices 5 and 6.
        let border = [v(4), v(8), v(9), v(10), v(7), v(3), v(2), v(1)];
        let hs = mesh
            .halfedges_along_border(&border)
            .expect("Cannot find border");
        let inside = mesh.triangles_inside_border(&hs);
        let verts = mesh.vertices_from_triangles(&inside);
        assert!(verts.contains(&v(5)));
        assert!(verts.contains(&v(6)));
        assert!(verts.iter().all(|w| border.contains(w) || *w == v(5) || *w == v(6)));
        // Every triangle around 5 and 6 is inside.
        for w in [v(5), v(6)] {
            for t in mesh.triangles_around(w) {
                assert!(inside.contains(&t));
            }
        }
        assert_eq!(inside.len(), 10);
        assert!(mesh.triangles_inside_border(&hs[..2]).is_empty());
    }

    #[test]
    fn t_aabb() {
        let mut mesh = grid(3, 2);
        let lifted = mesh.vertex_at(4).expect("Cannot find vertex");
        mesh.set_position(lifted, Vec3::new(1.0, 2.5, 1.0));
        let min = mesh.min_aabb().expect("Empty mesh");
        let max = mesh.max_aabb().expect("Empty mesh");
        assert_eq!(min, Vec3::ZERO);
        assert_eq!(max, Vec3::new(2.0, 2.5, 1.0));
        let aabb = Mesh::create_aabb(min, max).expect("Cannot create box");
        assert_eq!(aabb.num_vertices(), 8);
        assert_eq!(aabb.num_triangles(), 12);
        aabb.validate().expect("Invalid box");
        assert!(aabb.halfedges().all(|h| !h.is_boundary(&aabb)));
        let corner = aabb.vertex_by_name("XyZ").expect("Cannot find corner");
        assert_eq!(corner.position(&aabb), Vec3::new(2.0, 0.0, 1.0));
        // Outward normals.
        let center = (min + max) * 0.5;
        for t in aabb.triangles() {
            assert!(t.normal(&aabb).dot(t.center(&aabb) - center) > 0.0);
        }
        let area: f32 = aabb.triangles().map(|t| t.surface(&aabb)).sum();
        assert_f32_eq!(area, 19.0, 1e-4);
        assert_eq!(Mesh::default().min_aabb(), None);
    }

    #[test]
    fn t_dump() {
        let mesh = grid(2, 2);
        let text = mesh.dump();
        assert_eq!(text.lines().count(), 1 + 4 + 2 + 6);
        assert!(text.contains("Vertex g1-1 #3"));
    }
}
