//! Benchmarks for the estimators.
//!
//! Run with: cargo bench

use bayes_divergence::{
    divergence, entropy, get_from_implicit, measure_mu_grid, DivergenceMethod, DivergenceSummary,
    ExperimentSummary, ImplicitRelation, Measure, SolverConfig, Switchboard, Unit,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn generate_counts(n: usize, seed: u64) -> Vec<u64> {
    // Simple deterministic pseudo-random for reproducibility, roughly Zipf-shaped
    let mut counts = Vec::with_capacity(n);
    let mut x = seed;
    for i in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        let noise = (x >> 33) % 4;
        counts.push((200 / (i as u64 + 1)).saturating_sub(noise));
    }
    counts
}

fn bench_divergence_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("divergence");
    let board = Switchboard::new();

    for size in [10, 100, 1000, 10000].iter() {
        let a = generate_counts(*size, 42);
        let b = generate_counts(*size, 123);
        let summary = DivergenceSummary::from_counts(&a, &b, Some(*size as u64 * 2)).unwrap();

        group.throughput(Throughput::Elements(*size as u64));
        for method in [DivergenceMethod::Naive, DivergenceMethod::Jeffreys, DivergenceMethod::Minimax] {
            group.bench_with_input(BenchmarkId::new(method.name(), size), size, |bench, _| {
                bench.iter(|| {
                    board.divergence(
                        black_box(&summary),
                        method,
                        Unit::Log2,
                        Measure::KullbackLeibler,
                    )
                })
            });
        }
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");

    for size in [100, 1000].iter() {
        let a = generate_counts(*size, 42);
        let b = generate_counts(*size, 123);
        let summary = DivergenceSummary::from_counts(&a, &b, None).unwrap();
        let board = Switchboard::new();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |bench, _| {
            bench.iter(|| board.report(black_box(&summary), DivergenceMethod::Laplace, Unit::Ln))
        });
    }

    group.finish();
}

fn bench_closed_forms(c: &mut Criterion) {
    let mut group = c.benchmark_group("closed_forms");

    let a = generate_counts(1000, 7);
    let b = generate_counts(1000, 8);
    let pair_summary = DivergenceSummary::from_counts(&a, &b, None).unwrap();
    let single = ExperimentSummary::from_counts(&a, Some(5000)).unwrap();

    group.bench_function("naive_js", |bench| {
        bench.iter(|| divergence::naive(black_box(&pair_summary), Measure::JensenShannon))
    });
    group.bench_function("chao_shen", |bench| {
        bench.iter(|| entropy::chao_shen(black_box(&single)))
    });
    group.bench_function("dirichlet_entropy", |bench| {
        bench.iter(|| entropy::dirichlet(black_box(&single), 0.5))
    });

    group.finish();
}

fn bench_posterior_weight(c: &mut Criterion) {
    let mut group = c.benchmark_group("posterior_weight");
    let summary = ExperimentSummary::from_counts(&generate_counts(1000, 42), Some(2000)).unwrap();

    for points in [50, 500].iter() {
        let alphas: Vec<f64> = (0..*points)
            .map(|i| 10f64.powf(-4.0 + 8.0 * i as f64 / (*points - 1) as f64))
            .collect();

        group.throughput(Throughput::Elements(*points as u64));
        group.bench_with_input(BenchmarkId::from_parameter(points), points, |bench, _| {
            bench.iter(|| measure_mu_grid(black_box(&alphas), &summary))
        });
    }

    group.finish();
}

fn bench_implicit_inversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("implicit");
    let config = SolverConfig::default();

    for k in [10u64, 1000, 100000].iter() {
        let target = 0.5 * (*k as f64).ln();
        group.bench_with_input(BenchmarkId::from_parameter(k), k, |bench, &k| {
            bench.iter(|| {
                get_from_implicit(
                    ImplicitRelation::EntropyVsAlpha,
                    black_box(target),
                    1e-10,
                    1e5,
                    k as f64,
                    &config,
                )
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_divergence_methods,
    bench_report,
    bench_closed_forms,
    bench_posterior_weight,
    bench_implicit_inversion,
);

criterion_main!(benches);
