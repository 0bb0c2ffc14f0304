use crate::{element::VH, error::Error, mesh::Mesh};
use glam::Vec3;
use std::f32::consts::PI;

/// Replaces the first `%d` of the template with `value`.
fn substitute(template: &str, value: impl ToString) -> String {
    template.replacen("%d", &value.to_string(), 1)
}

fn lattice_name(template: &str, i: usize, j: usize) -> String {
    substitute(&substitute(template, i), j)
}

/// Fewer vertices around a fold would repeat or degenerate its triangles.
fn check_fold(nb: usize, fold: bool, min: usize) -> Result<(), Error> {
    match fold && nb < min {
        true => Err(Error::FoldTooSmall(nb, min)),
        false => Ok(()),
    }
}

/// Addresses the vertices of a lattice created by one of the generators.
struct Lattice {
    nx: usize,
    num0: usize,
}

impl Lattice {
    fn at(&self, mesh: &Mesh, ix: usize, iz: usize) -> Result<VH, Error> {
        mesh.vertex_at(ix + iz * self.nx + self.num0)
    }
}

impl Mesh {
    fn add_lattice(
        &mut self,
        nb_x: usize,
        nb_z: usize,
        names: &str,
        position: impl Fn(usize, usize) -> Vec3,
    ) -> Lattice {
        let num0 = self.num_vertices();
        for iz in 0..nb_z {
            for ix in 0..nb_x {
                let v = self.add_vertex(&lattice_name(names, ix, iz));
                self.set_position(v, position(ix, iz));
            }
        }
        Lattice { nx: nb_x, num0 }
    }

    /**
     * Adds a flat grid of `nb_x` by `nb_z` vertices in the XZ plane, vertex
     * `(ix, iz)` being at `(ix, 0, iz)` and named after `names` with its two
     * `%d` replaced by `ix` and `iz`. Each cell is a quad. With `fold_x` the
     * last column is joined back to the first, with `fold_z` the last row to
     * the first, and with both the corner cell closes the torus.
     *
     * Returns `num0`, the list index of the first vertex added. Vertex `(ix,
     * iz)` is then at index `ix + iz * nb_x + num0`. The triangles are added
     * in an order that packs into long strips. Folding an axis with fewer than
     * three vertices fails before anything is added.
     */
    pub fn add_rectangular_surface(
        &mut self,
        nb_x: usize,
        nb_z: usize,
        names: &str,
        fold_x: bool,
        fold_z: bool,
    ) -> Result<usize, Error> {
        check_fold(nb_x, fold_x, 3)?;
        check_fold(nb_z, fold_z, 3)?;
        let grid = self.add_lattice(nb_x, nb_z, names, |ix, iz| {
            Vec3::new(ix as f32, 0.0, iz as f32)
        });
        let (lx, lz) = (nb_x.saturating_sub(1), nb_z.saturating_sub(1));
        for iz in 0..lz {
            for ix in 0..lx {
                let v00 = grid.at(self, ix, iz)?;
                let v01 = grid.at(self, ix, iz + 1)?;
                let v10 = grid.at(self, ix + 1, iz)?;
                let v11 = grid.at(self, ix + 1, iz + 1)?;
                self.add_quad(v00, v01, v11, v10)?;
            }
        }
        if fold_x {
            for iz in 0..lz {
                let v00 = grid.at(self, 0, iz)?;
                let v01 = grid.at(self, 0, iz + 1)?;
                let v10 = grid.at(self, lx, iz)?;
                let v11 = grid.at(self, lx, iz + 1)?;
                self.add_quad(v10, v11, v01, v00)?;
            }
        }
        if fold_z {
            for ix in 0..lx {
                let v00 = grid.at(self, ix, 0)?;
                let v01 = grid.at(self, ix, lz)?;
                let v10 = grid.at(self, ix + 1, 0)?;
                let v11 = grid.at(self, ix + 1, lz)?;
                self.add_quad(v00, v10, v11, v01)?;
            }
        }
        if fold_x && fold_z {
            let v00 = grid.at(self, 0, 0)?;
            let v01 = grid.at(self, 0, lz)?;
            let v10 = grid.at(self, lx, 0)?;
            let v11 = grid.at(self, lx, lz)?;
            self.add_quad(v00, v01, v11, v10)?;
        }
        Ok(grid.num0)
    }

    /**
     * Same as [`Mesh::add_rectangular_surface`] with equilateral triangles:
     * odd rows are shifted by half a step along X, and rows are `√3 / 2`
     * apart. Folding along Z needs an even `nb_z` to line up.
     */
    pub fn add_hexagonal_surface(
        &mut self,
        nb_x: usize,
        nb_z: usize,
        names: &str,
        fold_x: bool,
        fold_z: bool,
    ) -> Result<usize, Error> {
        check_fold(nb_x, fold_x, 3)?;
        check_fold(nb_z, fold_z, 3)?;
        let row = 3.0f32.sqrt() / 2.0;
        let grid = self.add_lattice(nb_x, nb_z, names, |ix, iz| {
            Vec3::new(ix as f32 - 0.5 * (iz % 2) as f32, 0.0, iz as f32 * row)
        });
        let (lx, lz) = (nb_x.saturating_sub(1), nb_z.saturating_sub(1));
        for iz in 0..lz {
            for ix in 0..lx {
                let v00 = grid.at(self, ix, iz)?;
                let v01 = grid.at(self, ix, iz + 1)?;
                let v10 = grid.at(self, ix + 1, iz)?;
                let v11 = grid.at(self, ix + 1, iz + 1)?;
                if iz % 2 == 0 {
                    self.add_triangle(v00, v01, v11)?;
                    self.add_triangle(v00, v11, v10)?;
                } else {
                    self.add_triangle(v00, v01, v10)?;
                    self.add_triangle(v10, v01, v11)?;
                }
            }
        }
        if fold_x {
            for iz in 0..lz {
                let v00 = grid.at(self, 0, iz)?;
                let v01 = grid.at(self, 0, iz + 1)?;
                let v10 = grid.at(self, lx, iz)?;
                let v11 = grid.at(self, lx, iz + 1)?;
                if iz % 2 == 0 {
                    self.add_triangle(v10, v11, v01)?;
                    self.add_triangle(v10, v01, v00)?;
                } else {
                    self.add_triangle(v10, v11, v00)?;
                    self.add_triangle(v00, v11, v01)?;
                }
            }
        }
        if fold_z {
            if nb_z % 2 != 0 {
                log::warn!(
                    "Hexagonal surface folded along Z with an odd number of rows: {}",
                    nb_z
                );
            }
            for ix in 0..lx {
                let v00 = grid.at(self, ix, 0)?;
                let v01 = grid.at(self, ix, lz)?;
                let v10 = grid.at(self, ix + 1, 0)?;
                let v11 = grid.at(self, ix + 1, lz)?;
                self.add_triangle(v01, v00, v11)?;
                self.add_triangle(v11, v00, v10)?;
            }
        }
        if fold_x && fold_z {
            let v00 = grid.at(self, 0, 0)?;
            let v01 = grid.at(self, 0, lz)?;
            let v10 = grid.at(self, lx, 0)?;
            let v11 = grid.at(self, lx, lz)?;
            self.add_triangle(v00, v01, v10)?;
            self.add_triangle(v10, v01, v11)?;
        }
        Ok(grid.num0)
    }

    /**
     * Adds a disc made of a center vertex and `segments` concentric rings of
     * `spokes` vertices, ring `is` having radius `is + 1`. The center is named
     * after `names` with its first `%d` replaced by `C`, ring vertex `(ir, is)`
     * with both `%d` replaced by the spoke and the ring indices.
     *
     * Returns `num0`, the list index of the center. Vertex `(ir, is)` is at
     * index `ir * segments + is + num0 + 1`.
     */
    pub fn add_revolution_surface(
        &mut self,
        spokes: usize,
        segments: usize,
        names: &str,
    ) -> Result<usize, Error> {
        check_fold(spokes, segments > 0, 2)?;
        let num0 = self.num_vertices();
        let center = self.add_vertex(&substitute(names, "C"));
        self.set_position(center, Vec3::ZERO);
        for ir in 0..spokes {
            let angle = ir as f32 / spokes as f32 * PI * 2.0;
            for is in 0..segments {
                let v = self.add_vertex(&lattice_name(names, ir, is));
                let radius = is as f32 + 1.0;
                self.set_position(
                    v,
                    Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin()),
                );
            }
        }
        let ring = |mesh: &Mesh, ir: usize, is: usize| {
            mesh.vertex_at((ir % spokes) * segments + is + num0 + 1)
        };
        for ir in 0..spokes {
            if segments > 0 {
                let v0 = ring(self, ir, 0)?;
                let v1 = ring(self, ir + 1, 0)?;
                self.add_triangle(center, v0, v1)?;
            }
            for is in 0..segments.saturating_sub(1) {
                let v00 = ring(self, ir, is)?;
                let v10 = ring(self, ir + 1, is)?;
                let v01 = ring(self, ir, is + 1)?;
                let v11 = ring(self, ir + 1, is + 1)?;
                self.add_quad(v00, v01, v11, v10)?;
            }
        }
        Ok(num0)
    }
}
