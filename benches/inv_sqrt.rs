use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use fastnorm::{FeatureMatrix, LookupTable, Method, Normalizer};

fn bench_strategies(c: &mut Criterion) {
    let table = LookupTable::shared();
    let inputs: Vec<f32> = (1..=1_024).map(|i| i as f32 * 0.037).collect();

    let mut group = c.benchmark_group("inv_sqrt");
    for method in Method::ALL {
        group.bench_function(method.name(), |b| {
            b.iter(|| {
                let mut acc = 0.0f32;
                for &x in &inputs {
                    acc += method.inv_sqrt(table, black_box(x));
                }
                black_box(acc);
            });
        });
    }
    group.finish();
}

fn bench_normalize_rows(c: &mut Criterion) {
    let matrix = build_matrix(10_000, 64);

    let mut group = c.benchmark_group("normalize_rows_10000x64");
    for method in Method::ALL {
        let normalizer = Normalizer::new(method);
        group.bench_function(method.name(), |b| {
            b.iter_batched(
                || matrix.clone(),
                |mut m| {
                    normalizer.normalize_rows(&mut m);
                    black_box(m);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn build_matrix(rows: usize, dims: usize) -> FeatureMatrix {
    let data: Vec<Vec<f32>> = (0..rows)
        .map(|r| (0..dims).map(|d| ((r * 31 + d * 7) % 97) as f32 / 97.0).collect())
        .collect();
    FeatureMatrix::from_rows(data).expect("uniform rows")
}

criterion_group!(benches, bench_strategies, bench_normalize_rows);
criterion_main!(benches);
