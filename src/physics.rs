use crate::mesh::Mesh;
use glam::{DVec3, Mat3, Vec3};

/**
 * Mass properties of the solid enclosed by a mesh of uniform density.
 *
 * The mesh must be closed with outward facing triangles, otherwise the values
 * are meaningless.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MassProperties {
    pub density: f32,
    pub volume: f32,
    pub mass: f32,
    /// Center of gravity.
    pub center: Vec3,
    /// Inertia tensor about the center of gravity.
    pub inertia: Mat3,
}

/**
 * Integrals over the enclosed volume, computed from surface integrals as
 * described in "Fast and Accurate Computation of Polyhedral Mass Properties",
 * Brian Mirtich, 1996.
 */
#[derive(Clone, Copy, Debug, Default)]
struct VolumeIntegrals {
    /// Integral of 1.
    t0: f64,
    /// Integrals of x, y and z.
    t1: DVec3,
    /// Integrals of x², y² and z².
    t2: DVec3,
    /// Integrals of xy, yz and zx.
    tp: DVec3,
}

/// Integrals over the projection of a triangle onto the plane of the axes
/// `alpha` and `beta`.
#[derive(Default)]
struct ProjectionIntegrals {
    p1: f64,
    pa: f64,
    pb: f64,
    paa: f64,
    pab: f64,
    pbb: f64,
    paaa: f64,
    paab: f64,
    pabb: f64,
    pbbb: f64,
}

impl ProjectionIntegrals {
    fn new(verts: &[DVec3; 3], alpha: usize, beta: usize) -> Self {
        let mut p = ProjectionIntegrals::default();
        for i in 0..3 {
            let (v0, v1) = (verts[i], verts[(i + 1) % 3]);
            let (a0, b0, a1, b1) = (v0[alpha], v0[beta], v1[alpha], v1[beta]);
            let (da, db) = (a1 - a0, b1 - b0);
            let (a0_2, b0_2) = (a0 * a0, b0 * b0);
            let (a0_3, b0_3) = (a0_2 * a0, b0_2 * b0);
            let (a0_4, b0_4) = (a0_3 * a0, b0_3 * b0);
            let (a1_2, b1_2) = (a1 * a1, b1 * b1);
            let (a1_3, b1_3) = (a1_2 * a1, b1_2 * b1);

            let c1 = a1 + a0;
            let ca = a1 * c1 + a0_2;
            let caa = a1 * ca + a0_3;
            let caaa = a1 * caa + a0_4;
            let cb = b1 * (b1 + b0) + b0_2;
            let cbb = b1 * cb + b0_3;
            let cbbb = b1 * cbb + b0_4;
            let cab = 3.0 * a1_2 + 2.0 * a1 * a0 + a0_2;
            let kab = a1_2 + 2.0 * a1 * a0 + 3.0 * a0_2;
            let caab = a0 * cab + 4.0 * a1_3;
            let kaab = a1 * kab + 4.0 * a0_3;
            let cabb = 4.0 * b1_3 + 3.0 * b1_2 * b0 + 2.0 * b1 * b0_2 + b0_3;
            let kabb = b1_3 + 2.0 * b1_2 * b0 + 3.0 * b1 * b0_2 + 4.0 * b0_3;

            p.p1 += db * c1;
            p.pa += db * ca;
            p.paa += db * caa;
            p.paaa += db * caaa;
            p.pb += da * cb;
            p.pbb += da * cbb;
            p.pbbb += da * cbbb;
            p.pab += db * (b1 * cab + b0 * kab);
            p.paab += db * (b1 * caab + b0 * kaab);
            p.pabb += da * (a1 * cabb + a0 * kabb);
        }
        p.p1 /= 2.0;
        p.pa /= 6.0;
        p.paa /= 12.0;
        p.paaa /= 20.0;
        p.pb /= -6.0;
        p.pbb /= -12.0;
        p.pbbb /= -20.0;
        p.pab /= 24.0;
        p.paab /= 60.0;
        p.pabb /= -60.0;
        p
    }
}

impl VolumeIntegrals {
    /// Adds the contribution of one triangle.
    fn add_triangle(&mut self, verts: &[DVec3; 3]) {
        let n = (verts[1] - verts[0])
            .cross(verts[2] - verts[0])
            .normalize_or_zero();
        if n == DVec3::ZERO {
            return;
        }
        let w = -n.dot(verts[0]);
        // Project onto the plane where the triangle is the largest.
        let an = n.abs();
        let gamma = if an.x > an.y && an.x > an.z {
            0
        } else if an.y > an.z {
            1
        } else {
            2
        };
        let alpha = (gamma + 1) % 3;
        let beta = (alpha + 1) % 3;
        let p = ProjectionIntegrals::new(verts, alpha, beta);

        let (na, nb, nc) = (n[alpha], n[beta], n[gamma]);
        let k1 = 1.0 / nc;
        let k2 = k1 * k1;
        let k3 = k2 * k1;
        let k4 = k3 * k1;

        let fa = k1 * p.pa;
        let fb = k1 * p.pb;
        let fc = -k2 * (na * p.pa + nb * p.pb + w * p.p1);

        let faa = k1 * p.paa;
        let fbb = k1 * p.pbb;
        let fcc = k3
            * (na * na * p.paa
                + 2.0 * na * nb * p.pab
                + nb * nb * p.pbb
                + w * (2.0 * (na * p.pa + nb * p.pb) + w * p.p1));

        let faaa = k1 * p.paaa;
        let fbbb = k1 * p.pbbb;
        let fccc = -k4
            * (na * na * na * p.paaa
                + 3.0 * na * na * nb * p.paab
                + 3.0 * na * nb * nb * p.pabb
                + nb * nb * nb * p.pbbb
                + 3.0 * w * (na * na * p.paa + 2.0 * na * nb * p.pab + nb * nb * p.pbb)
                + w * w * (3.0 * (na * p.pa + nb * p.pb) + w * p.p1));

        let faab = k1 * p.paab;
        let fbbc = -k2 * (na * p.pabb + nb * p.pbbb + w * p.pbb);
        let fcca = k3
            * (na * na * p.paaa
                + 2.0 * na * nb * p.paab
                + nb * nb * p.pabb
                + w * (2.0 * (na * p.paa + nb * p.pab) + w * p.pa));

        self.t0 += n.x
            * match (alpha, beta) {
                (0, _) => fa,
                (_, 0) => fb,
                _ => fc,
            };
        self.t1[alpha] += na * faa;
        self.t1[beta] += nb * fbb;
        self.t1[gamma] += nc * fcc;
        self.t2[alpha] += na * faaa;
        self.t2[beta] += nb * fbbb;
        self.t2[gamma] += nc * fccc;
        self.tp[alpha] += na * faab;
        self.tp[beta] += nb * fbbc;
        self.tp[gamma] += nc * fcca;
    }

    fn finish(mut self) -> Self {
        self.t1 /= 2.0;
        self.t2 /= 3.0;
        self.tp /= 2.0;
        self
    }
}

impl Mesh {
    fn volume_integrals(&self) -> VolumeIntegrals {
        self.triangles()
            .fold(VolumeIntegrals::default(), |mut acc, t| {
                acc.add_triangle(&self.triangle_vertices(t).map(|v| v.position(self).as_dvec3()));
                acc
            })
            .finish()
    }

    /// Volume enclosed by the mesh. Positions are read directly, cached
    /// normals need not be up to date.
    pub fn volume(&self) -> f32 {
        self.volume_integrals().t0 as f32
    }

    /**
     * Volume, mass, center of gravity and inertia tensor of the solid enclosed
     * by the mesh, filled with the given density. Returns `None` if the mesh
     * encloses no volume.
     */
    pub fn mass_properties(&self, density: f32) -> Option<MassProperties> {
        let vi = self.volume_integrals();
        if vi.t0.abs() <= f64::EPSILON {
            return None;
        }
        let d = density as f64;
        let mass = d * vi.t0;
        let r = vi.t1 / vi.t0;
        // Inertia about the origin, then moved to the center of gravity.
        let ixx = d * (vi.t2.y + vi.t2.z) - mass * (r.y * r.y + r.z * r.z);
        let iyy = d * (vi.t2.z + vi.t2.x) - mass * (r.z * r.z + r.x * r.x);
        let izz = d * (vi.t2.x + vi.t2.y) - mass * (r.x * r.x + r.y * r.y);
        let ixy = -d * vi.tp.x + mass * r.x * r.y;
        let iyz = -d * vi.tp.y + mass * r.y * r.z;
        let izx = -d * vi.tp.z + mass * r.z * r.x;
        let inertia = Mat3::from_cols(
            Vec3::new(ixx as f32, ixy as f32, izx as f32),
            Vec3::new(ixy as f32, iyy as f32, iyz as f32),
            Vec3::new(izx as f32, iyz as f32, izz as f32),
        );
        let out = MassProperties {
            density,
            volume: vi.t0 as f32,
            mass: mass as f32,
            center: r.as_vec3(),
            inertia,
        };
        log::debug!(
            "Mesh {}: volume = {}, mass = {}, center of gravity = {}",
            self.name(),
            out.volume,
            out.mass,
            out.center
        );
        Some(out)
    }
}
