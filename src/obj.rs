use crate::{element::VH, error::Error, mesh::Mesh};
use glam::{Vec2, Vec3};
use std::{collections::HashMap, hash::Hash, path::Path};

/// Options for [`Mesh::load_obj`].
#[derive(Clone, Debug)]
pub struct ObjOptions {
    /// Factor applied to every position.
    pub scale: f32,
    /// When set, only the objects using this material are loaded.
    pub material: Option<String>,
}

impl Default for ObjOptions {
    fn default() -> Self {
        ObjOptions {
            scale: 1.0,
            material: None,
        }
    }
}

fn vec3_at(values: &[f64], i: usize) -> Option<Vec3> {
    values
        .get(3 * i..3 * i + 3)
        .map(|c| Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32))
}

fn vec2_at(values: &[f64], i: usize) -> Option<Vec2> {
    values
        .get(2 * i..2 * i + 2)
        .map(|c| Vec2::new(c[0] as f32, c[1] as f32))
}

/// Bit patterns of the `N` values at `i`, usable as a hash key.
fn bits_at<const N: usize>(values: &[f64], i: usize) -> Option<[u64; N]> {
    let slice = values.get(N * i..N * i + N)?;
    let mut out = [0u64; N];
    for (o, v) in out.iter_mut().zip(slice) {
        *o = v.to_bits();
    }
    Some(out)
}

/// Numbers distinct keys in order of first use.
struct Numbering<K> {
    ids: HashMap<K, i64>,
}

impl<K: Hash + Eq> Numbering<K> {
    fn new() -> Self {
        Numbering {
            ids: HashMap::new(),
        }
    }

    fn id(&mut self, key: K) -> i64 {
        let next = self.ids.len() as i64;
        *self.ids.entry(key).or_insert(next)
    }
}

impl Mesh {
    /**
     * Loads the polygons of an obj file. Every distinct combination of
     * position, texture coordinate and normal becomes one vertex, named
     * `v(p,t,n)`, -1 standing for a missing one. Distinct positions, texture
     * coordinates and normals are each numbered in order of first use over the
     * whole file, so the objects and groups of the file share their vertices.
     * Polygons are split into a fan of triangles around their first vertex.
     * Vertex normals are computed when the file has none.
     */
    pub fn load_obj(path: &Path, options: &ObjOptions) -> Result<Mesh, Error> {
        let (models, materials) = tobj::load_obj(path, &tobj::LoadOptions::default())
            .map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        let materials = match (materials, &options.material) {
            (Ok(materials), _) => materials,
            (Err(e), Some(_)) => return Err(Error::ObjLoadFailed(format!("{}", e))),
            (Err(e), None) => {
                log::warn!("Cannot load the materials of {}: {}", path.display(), e);
                Vec::new()
            }
        };
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "obj".to_string());
        let mut outmesh = Mesh::new(&name);
        let mut cache: HashMap<(i64, i64, i64), VH> = HashMap::new();
        // Models are indexed separately, so values identify the vertices.
        let mut pnums = Numbering::<[u64; 3]>::new();
        let mut tnums = Numbering::<[u64; 2]>::new();
        let mut nnums = Numbering::<[u64; 3]>::new();
        let mut has_normals = false;
        let mut fvs = Vec::new();
        for model in models {
            let msh = &model.mesh;
            if msh.positions.len() % 3 != 0 {
                return Err(Error::IncorrectNumberOfCoordinates(msh.positions.len()));
            }
            let material = msh
                .material_id
                .and_then(|i| materials.get(i))
                .map(|m| m.name.as_str());
            let skip = match &options.material {
                Some(wanted) => material != Some(wanted.as_str()),
                None => false,
            };
            if !skip {
                has_normals |= !msh.normal_indices.is_empty();
                let mut start = 0usize;
                let nfaces = match msh.face_arities.is_empty() {
                    true => msh.indices.len() / 3,
                    false => msh.face_arities.len(),
                };
                for f in 0..nfaces {
                    let size = msh.face_arities.get(f).map_or(3, |s| *s as usize);
                    fvs.clear();
                    for k in start..(start + size) {
                        let p = msh.indices[k] as usize;
                        let t = msh.texcoord_indices.get(k).map(|i| *i as usize);
                        let n = msh.normal_indices.get(k).map(|i| *i as usize);
                        let pbits = bits_at::<3>(&msh.positions, p)
                            .ok_or(Error::IncorrectNumberOfCoordinates(msh.positions.len()))?;
                        let key = (
                            pnums.id(pbits),
                            t.and_then(|i| bits_at::<2>(&msh.texcoords, i))
                                .map_or(-1, |b| tnums.id(b)),
                            n.and_then(|i| bits_at::<3>(&msh.normals, i))
                                .map_or(-1, |b| nnums.id(b)),
                        );
                        let v = match cache.get(&key) {
                            Some(v) => *v,
                            None => {
                                let v = outmesh.add_vertex(&format!(
                                    "v({},{},{})",
                                    key.0, key.1, key.2
                                ));
                                let pos = vec3_at(&msh.positions, p)
                                    .ok_or(Error::IncorrectNumberOfCoordinates(msh.positions.len()))?;
                                outmesh.set_position(v, pos * options.scale);
                                if let Some(uv) = t.and_then(|i| vec2_at(&msh.texcoords, i)) {
                                    outmesh.set_texcoord(v, uv);
                                }
                                if let Some(normal) = n.and_then(|i| vec3_at(&msh.normals, i)) {
                                    outmesh.set_normal(v, normal);
                                }
                                cache.insert(key, v);
                                v
                            }
                        };
                        fvs.push(v);
                    }
                    start += size;
                    if let Some((&first, rest)) = fvs.split_first() {
                        for pair in rest.windows(2) {
                            outmesh.add_triangle(first, pair[0], pair[1])?;
                        }
                    }
                }
            }
        }
        if has_normals {
            for t in outmesh.triangles().collect::<Vec<_>>() {
                outmesh.update_triangle_normal(t);
            }
            outmesh.renumber_vertices();
        } else {
            outmesh.compute_normals();
        }
        outmesh.info();
        Ok(outmesh)
    }
}
