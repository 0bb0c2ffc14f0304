/*!
Mesh simplification by collapsing vertices onto their neighbours, ordered by
quadric error.

Reference: Surface Simplification Using Quadric Error Metrics, Garland and
Heckbert 1997.
*/

use crate::{element::VH, error::Error, mesh::Mesh};
use glam::Vec3;
use slotmap::SecondaryMap;
use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    ops::{Add, AddAssign},
};

/**
 * Sum of squared distances to a set of planes, as the quadratic form
 * `pᵀAp + 2Bᵀp + C`. `A` is symmetric and stores its upper triangle.
 */
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Quadric {
    a: [f32; 6],
    b: [f32; 3],
    c: f32,
}

impl Quadric {
    /// Adds the plane of normal `n` passing through `p`. The length of `n`
    /// weighs the plane.
    pub fn add_plane(&mut self, n: Vec3, p: Vec3) {
        self.a[0] += n.x * n.x;
        self.a[1] += n.x * n.y;
        self.a[2] += n.x * n.z;
        self.a[3] += n.y * n.y;
        self.a[4] += n.y * n.z;
        self.a[5] += n.z * n.z;
        let d = -p.dot(n);
        self.b[0] += d * n.x;
        self.b[1] += d * n.y;
        self.b[2] += d * n.z;
        self.c += d * d;
    }

    pub fn cost(&self, p: Vec3) -> f32 {
        let a = &self.a;
        let x = a[0] * p.x + a[1] * p.y + a[2] * p.z;
        let y = a[1] * p.x + a[3] * p.y + a[4] * p.z;
        let z = a[2] * p.x + a[4] * p.y + a[5] * p.z;
        let vtav = x * p.x + y * p.y + z * p.z;
        let btv = self.b[0] * p.x + self.b[1] * p.y + self.b[2] * p.z;
        vtav + 2.0 * btv + self.c
    }
}

impl AddAssign for Quadric {
    fn add_assign(&mut self, rhs: Self) {
        for (l, r) in self.a.iter_mut().zip(rhs.a) {
            *l += r;
        }
        for (l, r) in self.b.iter_mut().zip(rhs.b) {
            *l += r;
        }
        self.c += rhs.c;
    }
}

impl Add for Quadric {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

#[derive(Copy, Clone, Debug)]
struct Target {
    vertex: VH,
    cost: f32,
}

/// Heap entry. Entries whose stamp doesn't match the vertex are stale.
#[derive(Copy, Clone, Debug)]
struct Entry {
    cost: f32,
    vertex: VH,
    stamp: u32,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.vertex.cmp(&other.vertex))
            .then(self.stamp.cmp(&other.stamp))
    }
}

/**
 * Collapse state of a mesh: the quadric of every vertex and the neighbour it
 * is cheapest to collapse onto. The state must be created from the mesh it is
 * then applied to, with no other edits in between.
 */
pub struct Redux {
    quadrics: SecondaryMap<VH, Quadric>,
    targets: SecondaryMap<VH, Target>,
    stamps: SecondaryMap<VH, u32>,
    heap: BinaryHeap<Reverse<Entry>>,
}

impl Redux {
    /// Computes the normals of the mesh, then every quadric and collapse cost.
    pub fn new(mesh: &mut Mesh) -> Self {
        mesh.compute_normals();
        let nverts = mesh.num_vertices();
        let mut redux = Redux {
            quadrics: SecondaryMap::with_capacity(nverts),
            targets: SecondaryMap::with_capacity(nverts),
            stamps: SecondaryMap::with_capacity(nverts),
            heap: BinaryHeap::with_capacity(nverts),
        };
        for v in mesh.vertices() {
            redux.update_quadric(mesh, v);
        }
        for v in mesh.vertices() {
            redux.update_target(mesh, v);
        }
        redux
    }

    pub fn quadric(&self, v: VH) -> Option<&Quadric> {
        self.quadrics.get(v)
    }

    /// The neighbour `v` would be collapsed onto, and the cost of doing so.
    pub fn target(&self, v: VH) -> Option<(VH, f32)> {
        self.targets.get(v).map(|t| (t.vertex, t.cost))
    }

    /**
     * Planes of the triangles around `v`, through `v`. Each plane is weighted
     * by the inverse square root of the triangle area.
     */
    fn update_quadric(&mut self, mesh: &Mesh, v: VH) {
        let p = v.position(mesh);
        let mut q = Quadric::default();
        for t in mesh.triangles_around(v) {
            let surface = t.surface(mesh);
            if surface > 0.0 {
                q.add_plane(t.normal(mesh) / surface.sqrt(), p);
            }
        }
        self.quadrics.insert(v, q);
    }

    fn collapse_cost(&self, u: VH, v: VH, pos: Vec3) -> f32 {
        match (self.quadrics.get(u), self.quadrics.get(v)) {
            (Some(qu), Some(qv)) => (*qu + *qv).cost(pos),
            _ => f32::MAX,
        }
    }

    /**
     * Finds the cheapest neighbour of `u`, stopping at the first free one.
     * Only neighbours with a halfedge towards `u` are candidates, as that is
     * the halfedge being collapsed.
     */
    fn update_target(&mut self, mesh: &Mesh, u: VH) {
        let mut best: Option<Target> = None;
        for v in mesh.neighbor_vertices(u) {
            if mesh.halfedge_to(v, u).is_none() {
                continue;
            }
            let cost = self.collapse_cost(u, v, v.position(mesh));
            if best.is_none_or(|b| cost < b.cost) {
                best = Some(Target { vertex: v, cost });
                if cost <= 0.0 {
                    break;
                }
            }
        }
        let stamp = self.stamps.get(u).map_or(0, |s| s.wrapping_add(1));
        self.stamps.insert(u, stamp);
        match best {
            Some(target) => {
                self.targets.insert(u, target);
                self.heap.push(Reverse(Entry {
                    cost: target.cost,
                    vertex: u,
                    stamp,
                }));
            }
            None => {
                self.targets.remove(u);
            }
        }
    }

    /// Drops the target of `u` until one of its neighbours changes.
    fn clear_target(&mut self, u: VH) {
        self.targets.remove(u);
        if let Some(stamp) = self.stamps.get_mut(u) {
            *stamp = stamp.wrapping_add(1);
        }
    }

    /// Cheapest vertex with a target, if its cost doesn't exceed `max_cost`.
    fn pop_cheapest(&mut self, mesh: &Mesh, max_cost: f32) -> Option<(VH, VH)> {
        while let Some(Reverse(entry)) = self.heap.peek().copied() {
            if entry.cost > max_cost {
                return None;
            }
            self.heap.pop();
            let fresh = entry.vertex.is_valid(mesh)
                && self.stamps.get(entry.vertex) == Some(&entry.stamp);
            if !fresh {
                continue;
            }
            if let Some(target) = self.targets.get(entry.vertex) {
                return Some((entry.vertex, target.vertex));
            }
        }
        None
    }

    /**
     * Moves `u` onto `v` by collapsing the halfedge from `v` to `u`, then
     * updates the geometry, quadrics and targets around `v`. Returns `false`
     * if the collapse was refused, in which case `u` is no longer considered.
     */
    fn collapse_vertex(&mut self, mesh: &mut Mesh, u: VH, v: VH) -> Result<bool, Error> {
        if !v.is_valid(mesh) {
            // The target was collapsed earlier.
            self.update_target(mesh, u);
            return Ok(false);
        }
        let Some(h) = mesh.halfedge_to(v, u) else {
            self.clear_target(u);
            return Ok(false);
        };
        if let Err(e) = mesh.collapse(h) {
            log::debug!("Cannot collapse {} onto {}: {}", u.name(mesh), v.name(mesh), e);
            self.clear_target(u);
            return Ok(false);
        }
        mesh.del_vertex(u)?;
        self.quadrics.remove(u);
        self.targets.remove(u);
        self.stamps.remove(u);
        for t in mesh.triangles_around(v).collect::<Vec<_>>() {
            mesh.update_triangle_normal(t);
        }
        let neighbors = mesh.neighbor_vertices(v);
        mesh.update_vertex_normal(v);
        for n in &neighbors {
            mesh.update_vertex_normal(*n);
        }
        self.update_quadric(mesh, v);
        for n in &neighbors {
            self.update_quadric(mesh, *n);
        }
        self.update_target(mesh, v);
        for n in &neighbors {
            self.update_target(mesh, *n);
        }
        Ok(true)
    }

    /// Collapses up to `count` vertices, cheapest first. Returns the number of
    /// vertices removed.
    pub fn redux_count(&mut self, mesh: &mut Mesh, count: usize) -> Result<usize, Error> {
        let mut done = 0;
        while done < count {
            let Some((u, v)) = self.pop_cheapest(mesh, f32::MAX) else {
                break;
            };
            if self.collapse_vertex(mesh, u, v)? {
                done += 1;
            }
        }
        log::debug!("Mesh {}: {} vertices removed", mesh.name(), done);
        Ok(done)
    }

    /// Collapses vertices, cheapest first, while the cost doesn't exceed
    /// `max_cost`. Returns the number of vertices removed.
    pub fn redux_cost(&mut self, mesh: &mut Mesh, max_cost: f32) -> Result<usize, Error> {
        let mut done = 0;
        while let Some((u, v)) = self.pop_cheapest(mesh, max_cost) {
            if self.collapse_vertex(mesh, u, v)? {
                done += 1;
            }
        }
        log::debug!("Mesh {}: {} vertices removed", mesh.name(), done);
        Ok(done)
    }
}

impl Mesh {
    /// Removes `count` vertices, or as many as possible, with the least
    /// change in shape. See [`Redux`].
    pub fn redux_count(&mut self, count: usize) -> Result<usize, Error> {
        Redux::new(self).redux_count(self, count)
    }

    /// Removes vertices while doing so costs at most `max_cost`. See [`Redux`].
    pub fn redux_cost(&mut self, max_cost: f32) -> Result<usize, Error> {
        Redux::new(self).redux_cost(self, max_cost)
    }
}
