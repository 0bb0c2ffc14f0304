use crate::{
    element::{TH, VH},
    error::Error,
    mesh::Mesh,
};
use glam::{Mat4, Vec3};
use std::collections::HashMap;

/// Midpoint vertices by name, shared by every step of one editing pass.
type MidpointCache = HashMap<String, VH>;

impl Mesh {
    fn midpoint_cache(&self) -> MidpointCache {
        let mut cache = MidpointCache::with_capacity(self.num_vertices());
        for v in self.vertices() {
            cache.entry(v.name(self).to_string()).or_insert(v);
        }
        cache
    }

    /// Scales the three vertices of the triangle about its centroid. Vertices
    /// are shared, so the neighbouring triangles move as well.
    pub fn homothety(&mut self, t: TH, scale: f32) -> Result<TH, Error> {
        self.check_triangle(t)?;
        let verts = self.triangle_vertices(t);
        let center = verts
            .iter()
            .fold(Vec3::ZERO, |acc, v| acc + v.position(self))
            / 3.0;
        for v in verts {
            let p = v.position(self);
            self.set_position(v, center + (p - center) * scale);
        }
        Ok(t)
    }

    /**
     * Cuts the corner at `v`. Every edge leaving `v` gets a new vertex placed
     * `distance` away from `v` along `direction`, each triangle around `v` is
     * split into a quad and a small triangle, then `v` and the small triangles
     * are removed and the hole is filled with a polygon facing `direction`.
     * Normals are recomputed. Returns the vertices around the hole.
     *
     * Fails if `direction` is perpendicular to one of the edges, or if the
     * hole cannot be filled. The mesh is left unchanged in that case.
     */
    pub fn bevel_vertex(
        &mut self,
        v: VH,
        distance: f32,
        direction: Vec3,
    ) -> Result<Vec<VH>, Error> {
        self.check_vertex(v)?;
        let direction = direction.normalize_or_zero();
        let origin = v.position(self);
        for w in self.neighbor_vertices(v) {
            let edge = origin - w.position(self);
            if direction.dot(edge).abs() <= f32::EPSILON * edge.length() {
                return Err(Error::BevelDirectionPerpendicular(v));
            }
        }
        self.undo_on_error(|mesh| mesh.bevel_around(v, distance, direction))
    }

    fn bevel_around(&mut self, v: VH, distance: f32, direction: Vec3) -> Result<Vec<VH>, Error> {
        let mut cache = self.midpoint_cache();
        let mut border = Vec::new();
        for t in self.triangles_ordered_around(v) {
            let [_, s1, s2] = self.cycle_vertex_first(t, v)?;
            let mut mids = [v; 2];
            for (mid, other) in mids.iter_mut().zip([s1, s2]) {
                let name = self.mid_name(v, other)?;
                *mid = match cache.get(&name) {
                    Some(m) => *m,
                    None => {
                        let edge = v.position(self) - other.position(self);
                        let k = distance / direction.dot(edge);
                        let m = self.lerp_vertex(v, other, k, &name)?;
                        cache.insert(name, m);
                        border.push(m);
                        m
                    }
                };
            }
            let [m1, m2] = mids;
            self.del_triangle(t)?;
            self.add_quad(s1, s2, m2, m1)?;
            self.add_triangle(v, m1, m2)?;
        }
        self.del_vertex(v)?;
        self.add_polygon(&border, direction)?;
        self.compute_normals();
        Ok(border)
    }

    /**
     * Makes a hard edge along `border`, a closed loop of vertices. The
     * triangles on the left of the border are given clones of the border
     * vertices, named with a `clone` suffix, so the two sides no longer share
     * vertices. The geometry is unchanged. On failure, so is the topology.
     */
    pub fn split_border(&mut self, border: &[VH]) -> Result<(), Error> {
        if border.len() < 2 {
            return Ok(());
        }
        let halfedges = self.halfedges_along_border(border)?;
        let triangles = self.triangles_inside_border(&halfedges);
        self.undo_on_error(|mesh| {
            let mut clones: Vec<Option<VH>> = vec![None; border.len()];
            for t in triangles {
                for (v, clone) in border.iter().zip(clones.iter_mut()) {
                    if !mesh.contains_vertex(t, *v) {
                        continue;
                    }
                    let c = match *clone {
                        Some(c) => c,
                        None => {
                            let c = mesh.clone_vertex(*v, "clone")?;
                            *clone = Some(c);
                            c
                        }
                    };
                    mesh.replace_triangle_vertex(t, *v, c)?;
                }
            }
            Ok(())
        })
    }

    /**
     * Extrudes the triangles on the left of the closed loop `border` by
     * `distance`, along the area weighted average of their normals. The
     * triangles get clones of the border vertices, their vertices are moved,
     * and the gap is closed with one quad per border side. Triangle normals
     * must be up to date. Returns the clones, in border order, or nothing if
     * the border encloses no triangle. On failure the mesh is left unchanged.
     */
    pub fn extrude_polygon(&mut self, border: &[VH], distance: f32) -> Result<Vec<VH>, Error> {
        let halfedges = self.halfedges_along_border(border)?;
        let triangles = self.triangles_inside_border(&halfedges);
        if triangles.is_empty() {
            return Ok(Vec::new());
        }
        let offset = self.average_normals(&triangles) * distance;
        self.undo_on_error(|mesh| {
            let clones = border
                .iter()
                .map(|v| mesh.clone_vertex(*v, "clone"))
                .collect::<Result<Vec<_>, _>>()?;
            for t in triangles.iter() {
                for (v, c) in border.iter().zip(clones.iter()) {
                    if mesh.contains_vertex(*t, *v) {
                        mesh.replace_triangle_vertex(*t, *v, *c)?;
                    }
                }
            }
            for v in mesh.vertices_from_triangles(&triangles) {
                let p = v.position(mesh);
                mesh.set_position(v, p + offset);
            }
            let n = border.len();
            for i in 0..n {
                let (a, b) = (border[i], border[(i + 1) % n]);
                let (a1, b1) = (clones[i], clones[(i + 1) % n]);
                mesh.add_quad(a, b, b1, a1)?;
            }
            Ok(clones)
        })
    }

    /**
     * Moves the triangle `distance` along its normal and joins it to its old
     * place with three quads. The triangle keeps its handle and gets clones of
     * its vertices.
     */
    pub fn extrude_triangle(&mut self, t: TH, distance: f32) -> Result<TH, Error> {
        // Nothing below can fail once `t` is known to be valid.
        let offset = self.compute_triangle_normal(t)? * distance;
        let verts = self.triangle_vertices(t);
        let mut clones = verts;
        for (v, c) in verts.iter().zip(clones.iter_mut()) {
            *c = self.clone_vertex(*v, "clone")?;
            self.set_position(*c, v.position(self) + offset);
        }
        for (v, c) in verts.iter().zip(clones.iter()) {
            self.replace_triangle_vertex(t, *v, *c)?;
        }
        let ([a, b, c], [a1, b1, c1]) = (verts, clones);
        self.add_quad(a, b, b1, a1)?;
        self.add_quad(b, c, c1, b1)?;
        self.add_quad(c, a, a1, c1)?;
        Ok(t)
    }

    fn midpoint(
        &mut self,
        s0: VH,
        s1: VH,
        smooth: f32,
        cache: &mut MidpointCache,
    ) -> Result<VH, Error> {
        let name = self.mid_name(s0, s1)?;
        if let Some(m) = cache.get(&name) {
            return Ok(*m);
        }
        let m = if smooth > 0.0 {
            // Tangents of the curve in the planes of the vertex normals.
            let s0s1 = (s1.position(self) - s0.position(self)) * smooth;
            let (n0, n1) = (s0.normal(self), s1.normal(self));
            let t0 = n0.cross(s0s1.cross(n0));
            let t1 = n1.cross(s0s1.cross(n1));
            self.hermite_vertex(s0, t0, s1, t1, 0.5, &name)?
        } else {
            self.lerp_vertex(s0, s1, 0.5, &name)?
        };
        cache.insert(name, m);
        Ok(m)
    }

    fn subdivide_with(
        &mut self,
        t: TH,
        steps: i32,
        smooth: f32,
        cache: &mut MidpointCache,
    ) -> Result<Vec<TH>, Error> {
        if steps <= 0 {
            return Ok(vec![t]);
        }
        self.check_triangle(t)?;
        let verts = self.triangle_vertices(t);
        let mut mids = verts;
        for i in 0..3 {
            mids[i] = self.midpoint(verts[i], verts[(i + 1) % 3], smooth, cache)?;
        }
        self.del_triangle(t)?;
        let mut out = Vec::new();
        for i in 0..3 {
            let corner = self.add_triangle(verts[i], mids[i], mids[(i + 2) % 3])?;
            out.extend(self.subdivide_with(corner, steps - 1, smooth, cache)?);
        }
        let center = self.add_triangle(mids[0], mids[1], mids[2])?;
        out.extend(self.subdivide_with(center, steps - 1, smooth, cache)?);
        Ok(out)
    }

    /**
     * Splits the triangle into four, recursively `steps` times, and returns
     * the triangles replacing it. Midpoints are shared with any vertex that
     * already carries their name, see [`Mesh::mid_name`]. With `smooth > 0`,
     * midpoints follow a Hermite curve bent by the vertex normals instead of
     * the straight side. On failure the mesh is left unchanged.
     */
    pub fn subdivide(&mut self, t: TH, steps: i32, smooth: f32) -> Result<Vec<TH>, Error> {
        self.subdivide_all(&[t], steps, smooth)
    }

    /// Subdivides every given triangle, see [`Mesh::subdivide`].
    pub fn subdivide_all(
        &mut self,
        triangles: &[TH],
        steps: i32,
        smooth: f32,
    ) -> Result<Vec<TH>, Error> {
        for t in triangles {
            self.check_triangle(*t)?;
        }
        if triangles.is_empty() || steps <= 0 {
            return Ok(triangles.to_vec());
        }
        self.undo_on_error(|mesh| {
            let mut cache = mesh.midpoint_cache();
            let mut out = Vec::new();
            for t in triangles {
                out.extend(mesh.subdivide_with(*t, steps, smooth, &mut cache)?);
            }
            Ok(out)
        })
    }

    /// Applies the matrix to every vertex position. Normals and tangents are
    /// left alone.
    pub fn transform(&mut self, matrix: &Mat4) {
        let verts: Vec<VH> = self.vertices().collect();
        for v in verts {
            let p = matrix.project_point3(v.position(self));
            self.set_position(v, p);
        }
    }
}
