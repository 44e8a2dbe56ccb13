use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array1, Array2};
use std::hint::black_box;
use uq_math::linalg::{lstsq_qr, pivoted_row_selection};
use uq_math::orthopoly::PolyFamily;

fn design(m: usize, n: usize) -> Array2<f64> {
    Array2::from_shape_fn((m, n), |(i, j)| {
        let x = -1.0 + 2.0 * (i as f64 + 0.5) / m as f64;
        PolyFamily::Legendre.eval(j, x)
    })
}

fn bench_lstsq_200x120(c: &mut Criterion) {
    let a = design(200, 120);
    let b = Array1::from_shape_fn(200, |i| (i as f64 * 0.1).sin());

    c.bench_function("lstsq_qr_200x120", |bench| {
        bench.iter(|| {
            let sol = lstsq_qr(&a, &b);
            black_box(sol.map(|s| s.residual_norm).unwrap_or(f64::NAN));
        })
    });
}

fn bench_pivoted_selection(c: &mut Criterion) {
    let a = design(4096, 35);

    let mut group = c.benchmark_group("pivoted_row_selection");
    group.sample_size(10);
    group.bench_function("4096x35_pick_70", |bench| {
        bench.iter(|| {
            let picks = pivoted_row_selection(&a, 70).unwrap_or_default();
            black_box(picks.len());
        })
    });
    group.finish();
}

fn bench_gauss_rules(c: &mut Criterion) {
    c.bench_function("gauss_legendre_16", |bench| {
        bench.iter(|| {
            let rule = PolyFamily::Legendre.gauss_rule(black_box(16));
            black_box(rule.nodes[0]);
        })
    });
}

criterion_group!(
    benches,
    bench_lstsq_200x120,
    bench_pivoted_selection,
    bench_gauss_rules
);
criterion_main!(benches);
