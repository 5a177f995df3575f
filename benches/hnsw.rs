//! Benchmarks for graph construction and search over seeded synthetic data.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;

use smallworld::{
    BuilderParams, DenseVectors, GraphBuilder, GraphSearcher, Similarity, VectorSource,
};

fn random_vectors(n: usize, dim: usize, seed: u64) -> DenseVectors {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<f32> = (0..n * dim).map(|_| rng.random::<f32>()).collect();
    DenseVectors::new(data, dim).expect("well-formed arena")
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);
    for &n in &[1_000usize, 5_000] {
        let vectors = random_vectors(n, 64, 42);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &vectors, |b, vectors| {
            b.iter(|| {
                let params = BuilderParams {
                    max_conn: 16,
                    beam_width: 50,
                    seed: 42,
                };
                let builder =
                    GraphBuilder::new(vectors, Similarity::Euclidean, params).unwrap();
                black_box(builder.build(&mut vectors.random_access()).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let n = 10_000;
    let dim = 64;
    let vectors = random_vectors(n, dim, 42);
    let params = BuilderParams {
        max_conn: 16,
        beam_width: 50,
        seed: 42,
    };
    let builder = GraphBuilder::new(&vectors, Similarity::Euclidean, params).unwrap();
    let graph = builder.build(&mut vectors.random_access()).unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    let query: Vec<f32> = (0..dim).map(|_| rng.random::<f32>()).collect();

    let mut searcher = GraphSearcher::new(Similarity::Euclidean, params.beam_width);
    let mut view = vectors.random_access();
    c.bench_function("search_top10", |b| {
        b.iter(|| black_box(searcher.search(&query, 10, &mut view, &graph).unwrap()));
    });
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
