use crate::{
    element::{Attribute, NUM_ATTRIBUTES, HH, TH, VH},
    error::Error,
    mesh::Mesh,
};
use glam::{Vec2, Vec3, Vec4};

impl Mesh {
    pub fn attribute(&self, v: VH, attr: Attribute) -> Vec4 {
        self.vertices[v].attributes[attr.index()]
    }

    pub fn set_attribute(&mut self, v: VH, attr: Attribute, value: Vec4) {
        self.vertices[v].attributes[attr.index()] = value;
    }

    pub(crate) fn attributes(&self, v: VH) -> &[Vec4; NUM_ATTRIBUTES] {
        &self.vertices[v].attributes
    }

    pub fn set_position(&mut self, v: VH, pos: Vec3) {
        self.set_attribute(v, Attribute::Position, pos.extend(1.0));
    }

    pub fn set_normal(&mut self, v: VH, normal: Vec3) {
        self.set_attribute(v, Attribute::Normal, normal.extend(0.0));
    }

    pub fn tangent(&self, v: VH) -> Vec3 {
        self.attribute(v, Attribute::Tangent).truncate()
    }

    pub fn set_tangent(&mut self, v: VH, tangent: Vec3) {
        self.set_attribute(v, Attribute::Tangent, tangent.extend(0.0));
    }

    pub fn color(&self, v: VH) -> Vec4 {
        self.attribute(v, Attribute::Color)
    }

    pub fn set_color(&mut self, v: VH, color: Vec4) {
        self.set_attribute(v, Attribute::Color, color);
    }

    pub fn texcoord(&self, v: VH) -> Vec2 {
        self.attribute(v, Attribute::TexCoord).truncate().truncate()
    }

    pub fn set_texcoord(&mut self, v: VH, uv: Vec2) {
        self.set_attribute(v, Attribute::TexCoord, uv.extend(0.0).extend(0.0));
    }

    /// The halfedge going from `from` to `to`, if it exists. Deleted vertices
    /// have no halfedges.
    pub fn halfedge_to(&self, from: VH, to: VH) -> Option<HH> {
        self.outgoing_halfedges(from).find(|h| h.target(self) == to)
    }

    /// The triangle on the left of the directed edge `from -> to`.
    pub fn triangle_left_to(&self, from: VH, to: VH) -> Option<TH> {
        self.halfedge_to(from, to).map(|h| h.triangle(self))
    }

    /// The triangle on the right of the directed edge `from -> to`.
    pub fn triangle_right_to(&self, from: VH, to: VH) -> Option<TH> {
        self.halfedge_to(to, from).map(|h| h.triangle(self))
    }

    /**
     * Triangles around `v` in fan order, counter-clockwise with respect to
     * their normals. If `v` is on the border, the fan starts at the border
     * and runs to the other side of it.
     */
    pub fn triangles_ordered_around(&self, v: VH) -> Vec<TH> {
        let Some(hstart) = v.halfedge(self) else {
            return Vec::new();
        };
        // Rewind clockwise to the border, or all the way around.
        let mut first = hstart;
        while let Some(o) = first.opposite(self) {
            let prev = o.next(self);
            if prev == hstart {
                break;
            }
            first = prev;
        }
        let mut out = Vec::new();
        let mut h = first;
        loop {
            out.push(h.triangle(self));
            match h.prev(self).opposite(self) {
                Some(next) if next != first => h = next,
                _ => break,
            }
        }
        out
    }

    /// Distinct vertices sharing a triangle with `v`.
    pub fn neighbor_vertices(&self, v: VH) -> Vec<VH> {
        let mut out = Vec::new();
        for t in self.triangles_around(v) {
            for w in self.triangle_vertices(t) {
                if w != v && !out.contains(&w) {
                    out.push(w);
                }
            }
        }
        out
    }

    /// Adds a free vertex named `name + suffix` with the same attributes as
    /// `v`.
    pub fn clone_vertex(&mut self, v: VH, suffix: &str) -> Result<VH, Error> {
        self.check_vertex(v)?;
        let name = format!("{}{}", self.vertices[v].name, suffix);
        let attributes = self.vertices[v].attributes;
        let out = self.add_vertex(&name);
        self.vertices[out].attributes = attributes;
        Ok(out)
    }

    /**
     * Adds a vertex with every attribute linearly interpolated between `v0`
     * (at `k = 0`) and `v1` (at `k = 1`). Directions are renormalized.
     */
    pub fn lerp_vertex(&mut self, v0: VH, v1: VH, k: f32, name: &str) -> Result<VH, Error> {
        self.check_vertex(v0)?;
        self.check_vertex(v1)?;
        let (a0, a1) = (*self.attributes(v0), *self.attributes(v1));
        let out = self.add_vertex(name);
        let attrs = &mut self.vertices[out].attributes;
        for attr in Attribute::ALL {
            let i = attr.index();
            attrs[i] = a0[i].lerp(a1[i], k);
        }
        normalize_directions(attrs);
        Ok(out)
    }

    /**
     * Adds a vertex whose position follows the cubic Hermite curve from `v0`
     * with tangent `t0` to `v1` with tangent `t1`, evaluated at `k`. The other
     * attributes are interpolated linearly.
     */
    pub fn hermite_vertex(
        &mut self,
        v0: VH,
        t0: Vec3,
        v1: VH,
        t1: Vec3,
        k: f32,
        name: &str,
    ) -> Result<VH, Error> {
        let out = self.lerp_vertex(v0, v1, k, name)?;
        let (p0, p1) = (v0.position(self), v1.position(self));
        self.set_position(out, hermite(p0, t0, p1, t1, k));
        Ok(out)
    }

    pub(crate) fn update_vertex_normal(&mut self, v: VH) {
        let n = self
            .triangles_around(v)
            .fold(Vec3::ZERO, |acc, t| acc + t.normal(self) * t.surface(self))
            .normalize_or_zero();
        self.set_normal(v, n);
    }

    pub(crate) fn update_vertex_tangent(&mut self, v: VH) {
        let tangent = self
            .triangles_around(v)
            .fold(Vec3::ZERO, |acc, t| acc + t.tangent(self) * t.surface(self))
            .normalize_or_zero();
        self.set_tangent(v, tangent);
    }

    /// Area weighted average of the normals of the incident triangles. The
    /// triangle normals must be up to date.
    pub fn compute_vertex_normal(&mut self, v: VH) -> Result<Vec3, Error> {
        self.check_vertex(v)?;
        self.update_vertex_normal(v);
        Ok(v.normal(self))
    }

    /// Area weighted average of the tangents of the incident triangles.
    pub fn compute_vertex_tangent(&mut self, v: VH) -> Result<Vec3, Error> {
        self.check_vertex(v)?;
        self.update_vertex_tangent(v);
        Ok(self.tangent(v))
    }
}

fn normalize_directions(attrs: &mut [Vec4; NUM_ATTRIBUTES]) {
    for attr in Attribute::ALL.into_iter().filter(|a| a.is_direction()) {
        let i = attr.index();
        attrs[i] = attrs[i].truncate().normalize_or_zero().extend(attrs[i].w);
    }
}

/// Cubic Hermite interpolation.
pub(crate) fn hermite(p0: Vec3, t0: Vec3, p1: Vec3, t1: Vec3, k: f32) -> Vec3 {
    let k2 = k * k;
    let h00 = (2.0 * k - 3.0) * k2 + 1.0;
    let h10 = ((k - 2.0) * k + 1.0) * k;
    let h01 = (3.0 - 2.0 * k) * k2;
    let h11 = (k - 1.0) * k2;
    p0 * h00 + t0 * h10 + p1 * h01 + t1 * h11
}

#[cfg(test)]
mod test {
    use super::hermite;
    use crate::{
        element::{Attribute, TH},
        macros::assert_f32_eq,
        mesh::test::{grid, quad_box},
        Mesh,
    };
    use glam::{Vec2, Vec3, Vec4};

    #[test]
    fn t_halfedge_to() {
        let mesh = grid(3, 3);
        let (a, b) = (
            mesh.vertex_at(0).expect("Cannot find vertex"),
            mesh.vertex_at(3).expect("Cannot find vertex"),
        );
        let h = mesh.halfedge_to(a, b).expect("Cannot find halfedge");
        assert_eq!(mesh.triangle_left_to(a, b), Some(h.triangle(&mesh)));
        // Border edge, nothing on the other side.
        assert_eq!(mesh.triangle_right_to(a, b), None);
        assert_eq!(mesh.halfedge_to(a, mesh.vertex_at(8).expect("No vertex")), None);
    }

    #[test]
    fn t_neighbors() {
        let mesh = grid(3, 3);
        let center = mesh.vertex_at(4).expect("Cannot find vertex");
        let mut nbs: Vec<_> = mesh
            .neighbor_vertices(center)
            .iter()
            .map(|v| v.number(&mesh))
            .collect();
        nbs.sort();
        assert_eq!(nbs, vec![1, 2, 3, 5, 6, 7]);
        let corner = mesh.vertex_at(0).expect("Cannot find vertex");
        assert_eq!(mesh.neighbor_vertices(corner).len(), 2);
    }

    #[test]
    fn t_triangles_ordered_around_interior() {
        let mut mesh = grid(3, 3);
        mesh.compute_normals();
        let center = mesh.vertex_at(4).expect("Cannot find vertex");
        let tris = mesh.triangles_ordered_around(center);
        assert_eq!(tris.len(), 6);
        // Consecutive triangles share an edge through the center.
        for i in 0..tris.len() {
            let (t0, t1) = (tris[i], tris[(i + 1) % tris.len()]);
            let shared = mesh
                .triangle_vertices(t0)
                .into_iter()
                .filter(|v| mesh.triangle_vertices(t1).contains(v))
                .count();
            assert_eq!(shared, 2);
        }
        // Counter-clockwise around +Y.
        let p = center.position(&mesh);
        let angle = |t: TH| {
            let d = t.center(&mesh) - p;
            (-d.z).atan2(d.x)
        };
        let mut turns = 0.0;
        for i in 0..tris.len() {
            let mut da = angle(tris[(i + 1) % tris.len()]) - angle(tris[i]);
            if da < -std::f32::consts::PI {
                da += 2.0 * std::f32::consts::PI;
            } else if da > std::f32::consts::PI {
                da -= 2.0 * std::f32::consts::PI;
            }
            turns += da;
        }
        assert_f32_eq!(turns, 2.0 * std::f32::consts::PI, 1e-4);
    }

    #[test]
    fn t_triangles_ordered_around_border() {
        let mesh = grid(3, 3);
        // Middle of the bottom row.
        let v = mesh.vertex_at(1).expect("Cannot find vertex");
        let tris = mesh.triangles_ordered_around(v);
        assert_eq!(tris.len(), 3);
        assert_eq!(mesh.triangles_around(v).count(), 3);
        for pair in tris.windows(2) {
            let shared = mesh
                .triangle_vertices(pair[0])
                .into_iter()
                .filter(|w| mesh.triangle_vertices(pair[1]).contains(w))
                .count();
            assert_eq!(shared, 2);
        }
        let first = mesh.triangle_vertices(tris[0]);
        let last = mesh.triangle_vertices(tris[2]);
        assert_eq!(
            first.iter().filter(|w| last.contains(w)).count(),
            1,
            "The fan must not wrap around on a border"
        );
    }

    #[test]
    fn t_closed_fan() {
        let mesh = quad_box();
        for v in mesh.vertices() {
            assert_eq!(
                mesh.triangles_ordered_around(v).len(),
                mesh.triangles_around(v).count()
            );
        }
    }

    #[test]
    fn t_clone_vertex() {
        let mut mesh = Mesh::default();
        let v = mesh.add_vertex("v");
        mesh.set_position(v, Vec3::new(1.0, 2.0, 3.0));
        mesh.set_color(v, Vec4::new(0.1, 0.2, 0.3, 1.0));
        let c = mesh.clone_vertex(v, "clone").expect("Cannot clone vertex");
        assert_eq!(c.name(&mesh), "vclone");
        assert_eq!(c.position(&mesh), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.color(c), Vec4::new(0.1, 0.2, 0.3, 1.0));
        assert_eq!(c.number(&mesh), 1);
        assert_eq!(c.halfedge(&mesh), None);
    }

    #[test]
    fn t_lerp_vertex() {
        let mut mesh = Mesh::default();
        let v0 = mesh.add_vertex("a");
        let v1 = mesh.add_vertex("b");
        mesh.set_position(v0, Vec3::ZERO);
        mesh.set_position(v1, Vec3::new(2.0, 0.0, 0.0));
        mesh.set_normal(v0, Vec3::X);
        mesh.set_normal(v1, Vec3::Y);
        mesh.set_texcoord(v0, Vec2::new(0.0, 0.0));
        mesh.set_texcoord(v1, Vec2::new(1.0, 0.5));
        let m = mesh.lerp_vertex(v0, v1, 0.5, "m").expect("Cannot lerp");
        assert_eq!(m.position(&mesh), Vec3::new(1.0, 0.0, 0.0));
        assert_f32_eq!(m.normal(&mesh).length(), 1.0, 1e-6);
        assert_f32_eq!(m.normal(&mesh).x, m.normal(&mesh).y, 1e-6);
        assert_eq!(mesh.texcoord(m), Vec2::new(0.5, 0.25));
        assert_eq!(mesh.attribute(m, Attribute::Position).w, 1.0);
    }

    #[test]
    fn t_hermite() {
        let (p0, p1) = (Vec3::ZERO, Vec3::X);
        // Zero tangents, the curve is a smoothstep along the segment.
        assert_eq!(hermite(p0, Vec3::ZERO, p1, Vec3::ZERO, 0.0), p0);
        assert_eq!(hermite(p0, Vec3::ZERO, p1, Vec3::ZERO, 1.0), p1);
        let mid = hermite(p0, Vec3::ZERO, p1, Vec3::ZERO, 0.5);
        assert_f32_eq!(mid.x, 0.5, 1e-6);
        // Tangents pointing up bulge the midpoint upwards.
        let mid = hermite(p0, Vec3::Y, p1, -Vec3::Y, 0.5);
        assert_f32_eq!(mid.y, 0.25, 1e-6);
    }
}
