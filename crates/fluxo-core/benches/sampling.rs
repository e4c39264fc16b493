use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fluxo_core::sampling::{layer_sampling, uniform_sampling, BatchConfig, NeighborSamplerOptions};
use fluxo_core::{Bipartite, EdgeDir, IdArray, IdBits};

/// Ring lattice: `num_vertices` vertices, each pointing at its next
/// `degree` successors.
fn ring_graph(num_vertices: u64, degree: u64) -> Bipartite {
    let mut row = Vec::with_capacity((num_vertices * degree) as usize);
    let mut col = Vec::with_capacity((num_vertices * degree) as usize);
    for i in 0..num_vertices {
        for k in 1..=degree {
            row.push(i);
            col.push((i + k) % num_vertices);
        }
    }
    Bipartite::from_coo(
        num_vertices,
        num_vertices,
        IdArray::from_vec(row),
        IdArray::from_vec(col),
    )
    .unwrap()
}

fn bench_neighbor_sampling(c: &mut Criterion) {
    let graph = ring_graph(10_000, 16);
    graph.in_csr();
    let seeds = IdArray::range(0, 1024, IdBits::B64);
    let mut group = c.benchmark_group("neighbor_sampling");
    for expand_factor in [4usize, 16] {
        let opts = NeighborSamplerOptions {
            num_hops: 2,
            expand_factor,
            dir: EdgeDir::In,
            add_self_loop: false,
        };
        let batch = BatchConfig {
            batch_start_id: 0,
            batch_size: 128,
            max_num_workers: 4,
            seed: 42,
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(expand_factor),
            &opts,
            |b, opts| b.iter(|| uniform_sampling(&graph, &seeds, &batch, opts).unwrap()),
        );
    }
    group.finish();
}

fn bench_layer_sampling(c: &mut Criterion) {
    let graph = ring_graph(10_000, 16);
    graph.in_csr();
    let seeds = IdArray::range(0, 1024, IdBits::B64);
    let batch = BatchConfig {
        batch_start_id: 0,
        batch_size: 128,
        max_num_workers: 4,
        seed: 42,
    };
    c.bench_function("layer_sampling", |b| {
        b.iter(|| layer_sampling(&graph, &seeds, &batch, &[64, 64], EdgeDir::In).unwrap())
    });
}

criterion_group!(benches, bench_neighbor_sampling, bench_layer_sampling);
criterion_main!(benches);
