//! Benchmarks for problem filter lookup.

use api_tools::filter::{arguments_equal, ApiProblemFilter, FilterStore, FilteredProblem};
use api_tools::model::{ProblemCategory, ProblemRecord};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

fn problem(index: usize) -> ProblemRecord {
    ProblemRecord::new(
        403_853_384 + u32::try_from(index % 16).unwrap_or_default(),
        ProblemCategory::Compatibility,
        "org.example.core",
        "removed",
    )
    .with_type_name(format!("org.example.api.Type{}", index % 64))
    .with_arguments(vec![
        format!("org.example.api.Type{}", index % 64),
        format!("method{index}(I)V"),
    ])
}

fn store_with(count: usize) -> FilterStore {
    let filters = (0..count)
        .map(|i| ApiProblemFilter::new("org.example.core", FilteredProblem::from(&problem(i))))
        .collect();
    FilterStore::with_filters("org.example.core", filters)
}

fn benchmark_is_filtered(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_filtered");
    for count in [10, 100, 1_000] {
        let store = store_with(count);
        let hit = problem(count / 2);
        let miss = problem(count + 1).with_arguments(vec!["Missing".to_string()]);
        group.bench_with_input(BenchmarkId::new("hit", count), &hit, |b, p| {
            b.iter(|| black_box(store.is_filtered(p)));
        });
        group.bench_with_input(BenchmarkId::new("miss", count), &miss, |b, p| {
            b.iter(|| black_box(store.is_filtered(p)));
        });
    }
    group.finish();
}

fn benchmark_arguments_equal(c: &mut Criterion) {
    let problem_args: Vec<String> = ["org.example.api.Widget", "resize(II)V", "org.example.api.Layout"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let filter_args: Vec<String> = ["Widget", "resize(II)V", "Layout"]
        .iter()
        .map(ToString::to_string)
        .collect();
    c.bench_function("arguments_equal/qualified_vs_simple", |b| {
        b.iter(|| black_box(arguments_equal(black_box(&problem_args), black_box(&filter_args))));
    });
}

criterion_group!(benches, benchmark_is_filtered, benchmark_arguments_equal);
criterion_main!(benches);
