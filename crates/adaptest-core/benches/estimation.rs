use criterion::{black_box, criterion_group, criterion_main, Criterion};

use adaptest_core::estimator::{newton_raphson, standard_error};
use adaptest_core::model::ResponseRecord;

fn make_responses(n: usize) -> Vec<ResponseRecord> {
    (0..n)
        .map(|i| {
            let b = -2.0 + (i % 6) as f64;
            ResponseRecord::new(b, i % 3 != 0)
        })
        .collect()
}

fn bench_newton_raphson(c: &mut Criterion) {
    let mut group = c.benchmark_group("newton_raphson");

    for n in [5, 15, 30] {
        let responses = make_responses(n);
        group.bench_function(format!("responses={n}"), |b| {
            b.iter(|| newton_raphson(black_box(0.0), black_box(&responses)))
        });
    }

    group.finish();
}

fn bench_standard_error(c: &mut Criterion) {
    let responses = make_responses(30);
    c.bench_function("standard_error/responses=30", |b| {
        b.iter(|| standard_error(black_box(0.4), black_box(&responses)))
    });
}

criterion_group!(benches, bench_newton_raphson, bench_standard_error);
criterion_main!(benches);
