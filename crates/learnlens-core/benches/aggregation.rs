use criterion::{black_box, criterion_group, criterion_main, Criterion};

use learnlens_core::statistics::{group_stats, ols_slope, trend_label, MIN_TREND_POINTS};

fn scores(n: usize) -> Vec<f64> {
    (0..n).map(|i| 40.0 + ((i * 37) % 60) as f64).collect()
}

fn bench_group_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_stats");

    for &(rows, keys) in &[(1_000usize, 10usize), (10_000, 100), (100_000, 1_000)] {
        let records: Vec<(usize, f64)> = scores(rows)
            .into_iter()
            .enumerate()
            .map(|(i, s)| (i % keys, s))
            .collect();
        group.bench_function(format!("rows={rows},keys={keys}"), |b| {
            b.iter(|| group_stats(black_box(&records), |r| r.0, |r| r.1))
        });
    }

    group.finish();
}

fn bench_trend(c: &mut Criterion) {
    let mut group = c.benchmark_group("trend");

    for n in [5usize, 50, 500] {
        let series = scores(n);
        group.bench_function(format!("ols_slope n={n}"), |b| {
            b.iter(|| ols_slope(black_box(&series)))
        });
        group.bench_function(format!("trend_label n={n}"), |b| {
            b.iter(|| trend_label(black_box(&series), MIN_TREND_POINTS))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_group_stats, bench_trend);
criterion_main!(benches);
