use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use fsauc::projection::project_l1;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

fn random_vector(dim: usize) -> Array1<f64> {
    let mut rng = StdRng::seed_from_u64(0x5EED_A0C + dim as u64);
    Array1::from_shape_fn(dim, |_| rng.sample(StandardNormal))
}

fn benchmark_l1_projection(c: &mut Criterion) {
    let dims = [100_usize, 1_000, 10_000];
    let vectors: Vec<_> = dims.iter().map(|&dim| (dim, random_vector(dim))).collect();

    let mut group = c.benchmark_group("l1_projection");
    for (dim, vector) in vectors.iter() {
        group.throughput(Throughput::Elements(*dim as u64));
        // a radius below the expected L1 norm forces the sort-based path
        let radius = 0.1 * *dim as f64;

        group.bench_with_input(BenchmarkId::new("outside", dim), vector, |b, input| {
            b.iter(|| {
                let projected = project_l1(black_box(input.view()), black_box(radius));
                black_box(projected);
            });
        });

        group.bench_with_input(BenchmarkId::new("inside", dim), vector, |b, input| {
            b.iter(|| {
                let projected = project_l1(black_box(input.view()), black_box(f64::MAX));
                black_box(projected);
            });
        });
    }
    group.finish();
}

criterion_group!(l1_projection, benchmark_l1_projection);
criterion_main!(l1_projection);
