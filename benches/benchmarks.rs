use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use trimesh::{Attribute, BufferLayout, Mesh};

fn rect(nx: usize, nz: usize, fold: bool) -> Mesh {
    let mut mesh = Mesh::new("rect");
    mesh.add_rectangular_surface(nx, nz, "p%d-%d", fold, fold)
        .unwrap();
    mesh
}

// Surface generation benchmarks
fn bench_surfaces(c: &mut Criterion) {
    let mut group = c.benchmark_group("surfaces");

    group.bench_function("rectangular_100x100", |b| {
        b.iter(|| black_box(rect(black_box(100), black_box(100), false)));
    });

    group.bench_function("rectangular_torus_100x100", |b| {
        b.iter(|| black_box(rect(black_box(100), black_box(100), true)));
    });

    group.bench_function("hexagonal_100x100", |b| {
        b.iter(|| {
            let mut mesh = Mesh::new("hex");
            mesh.add_hexagonal_surface(black_box(100), black_box(100), "h%d-%d", false, false)
                .unwrap();
            black_box(mesh);
        });
    });

    group.bench_function("revolution_64x64", |b| {
        b.iter(|| {
            let mut mesh = Mesh::new("disc");
            mesh.add_revolution_surface(black_box(64), black_box(64), "r%d-%d")
                .unwrap();
            black_box(mesh);
        });
    });

    group.finish();
}

// Normals and tangents
fn bench_normals(c: &mut Criterion) {
    let mut group = c.benchmark_group("normals");
    let base = rect(100, 100, false);

    group.bench_function("compute_normals", |b| {
        b.iter(|| {
            let mut mesh = base.clone();
            mesh.compute_normals();
            black_box(mesh);
        });
    });

    group.bench_function("compute_tangents", |b| {
        b.iter(|| {
            let mut mesh = base.clone();
            mesh.compute_tangents();
            black_box(mesh);
        });
    });

    group.finish();
}

// Mass properties
fn bench_physics(c: &mut Criterion) {
    let mut group = c.benchmark_group("physics");
    let torus = rect(100, 100, true);

    group.bench_function("mass_properties", |b| {
        b.iter(|| black_box(torus.mass_properties(black_box(1.0))));
    });

    group.bench_function("volume", |b| {
        b.iter(|| black_box(torus.volume()));
    });

    group.finish();
}

// Draw buffer packing
fn bench_drawing(c: &mut Criterion) {
    let mut group = c.benchmark_group("drawing");
    let attrs = [Attribute::Position, Attribute::Normal, Attribute::TexCoord];
    let mut mesh = rect(64, 64, false);
    mesh.compute_normals();

    group.bench_function("vbo_set_interleaved", |b| {
        b.iter(|| black_box(mesh.create_vbo_set(&attrs, BufferLayout::Interleaved)));
    });

    group.bench_function("vbo_set_separate", |b| {
        b.iter(|| black_box(mesh.create_vbo_set(&attrs, BufferLayout::Separate)));
    });

    group.bench_function("strip_vbo_set", |b| {
        b.iter(|| black_box(mesh.create_strip_vbo_set(&attrs, BufferLayout::Interleaved)));
    });

    group.finish();
}

// Editing operations
fn bench_processing(c: &mut Criterion) {
    let mut group = c.benchmark_group("processing");
    let mut base = rect(20, 20, false);
    base.compute_normals();

    group.bench_function("subdivide_all_2_steps", |b| {
        b.iter(|| {
            let mut mesh = base.clone();
            let triangles: Vec<_> = mesh.triangles().collect();
            mesh.subdivide_all(&triangles, black_box(2), 0.0).unwrap();
            black_box(mesh);
        });
    });

    group.bench_function("smooth_subdivide_all_2_steps", |b| {
        b.iter(|| {
            let mut mesh = base.clone();
            let triangles: Vec<_> = mesh.triangles().collect();
            mesh.subdivide_all(&triangles, black_box(2), 0.5).unwrap();
            black_box(mesh);
        });
    });

    group.bench_function("extrude_all_triangles", |b| {
        b.iter(|| {
            let mut mesh = base.clone();
            let triangles: Vec<_> = mesh.triangles().collect();
            for t in triangles {
                mesh.extrude_triangle(t, black_box(0.5)).unwrap();
            }
            black_box(mesh);
        });
    });

    group.finish();
}

// Quadric simplification
fn bench_redux(c: &mut Criterion) {
    let mut group = c.benchmark_group("redux");
    let base = rect(40, 40, false);

    group.bench_function("redux_count_half", |b| {
        b.iter(|| {
            let mut mesh = base.clone();
            mesh.redux_count(black_box(800)).unwrap();
            black_box(mesh);
        });
    });

    group.bench_function("redux_cost_flat", |b| {
        b.iter(|| {
            let mut mesh = base.clone();
            mesh.redux_cost(black_box(1e-6)).unwrap();
            black_box(mesh);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_surfaces,
    bench_normals,
    bench_physics,
    bench_drawing,
    bench_processing,
    bench_redux
);
criterion_main!(benches);
