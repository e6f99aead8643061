//! Benchmarks for chunk generation and meshing.
//!
//! Run with: cargo bench --bench terrain_benchmark

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use voxel_terrain::engine_state::{
    rendering::build_chunk_mesh,
    voxels::{
        chunk::{Chunk, CHUNK_WIDTH},
        generation::ChunkGenerator,
        world::TerrainStore,
    },
};

fn benchmark_chunk_generation(c: &mut Criterion) {
    let generator = ChunkGenerator::new(42);

    c.bench_function("single_chunk_generation", |b| {
        let mut coord = 0i32;
        b.iter(|| {
            coord = coord.wrapping_add(1);
            let chunk = Chunk::new(coord * CHUNK_WIDTH, (coord / 2) * CHUNK_WIDTH);
            generator.generate(&chunk);
            black_box(chunk)
        });
    });
}

fn benchmark_column_generation(c: &mut Criterion) {
    let generator = ChunkGenerator::new(42);
    let chunk = Chunk::new(0, 0);

    c.bench_function("single_column_generation", |b| {
        let mut column = 0i32;
        b.iter(|| {
            column = (column + 1) % (CHUNK_WIDTH * CHUNK_WIDTH);
            generator.generate_column(&chunk, column / CHUNK_WIDTH, column % CHUNK_WIDTH);
        });
    });
}

fn benchmark_chunk_meshing(c: &mut Criterion) {
    let generator = ChunkGenerator::new(42);
    let store = TerrainStore::new();

    // A 3x3 block of chunks so the center one has all four neighbors.
    let mut center = None;
    for i in -1..=1 {
        for j in -1..=1 {
            let chunk = store.instantiate_chunk_at(i * CHUNK_WIDTH, j * CHUNK_WIDTH);
            generator.generate(&chunk);
            if i == 0 && j == 0 {
                center = Some(chunk);
            }
        }
    }
    let Some(center): Option<Arc<Chunk>> = center else {
        return;
    };

    let mut group = c.benchmark_group("meshing");
    group.throughput(Throughput::Elements(1));
    group.bench_function("generated_chunk_with_neighbors", |b| {
        b.iter(|| black_box(build_chunk_mesh(&center)))
    });

    let solid = Arc::new(Chunk::new(0, 0));
    for x in 0..CHUNK_WIDTH {
        for z in 0..CHUNK_WIDTH {
            for y in 0..128 {
                let _ = solid.set_block_at(x, y, z, voxel_terrain::BlockType::Stone);
            }
        }
    }
    group.bench_function("half_filled_isolated_chunk", |b| {
        b.iter(|| black_box(build_chunk_mesh(&solid)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_chunk_generation,
    benchmark_column_generation,
    benchmark_chunk_meshing,
);
criterion_main!(benches);
