use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use polars::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use solvency_features::{FeatureConfig, FeaturePipeline};

fn create_company_years(n_rows: usize) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(7);

    let mut columns: Vec<Column> = (1..=18)
        .map(|i| {
            let values: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(-1e3..1e5)).collect();
            Column::new(format!("X{i}").into(), values)
        })
        .collect();

    let labels: Vec<&str> = (0..n_rows)
        .map(|_| if rng.gen_bool(0.07) { "failed" } else { "alive" })
        .collect();
    let divisions: Vec<&str> = (0..n_rows)
        .map(|_| ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"][rng.gen_range(0..10)])
        .collect();
    let groups: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(1..100)).collect();
    columns.push(Column::new("status_label".into(), labels));
    columns.push(Column::new("Division".into(), divisions));
    columns.push(Column::new("MajorGroup".into(), groups));

    DataFrame::new(columns).unwrap()
}

fn bench_fit_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_transform");
    let pipeline = FeaturePipeline::new(FeatureConfig::default()).unwrap();

    for n_rows in [1_000, 10_000, 78_682] {
        let df = create_company_years(n_rows);
        group.bench_with_input(BenchmarkId::from_parameter(n_rows), &df, |b, df| {
            b.iter(|| pipeline.fit_transform(black_box(df.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let pipeline = FeaturePipeline::new(FeatureConfig::default()).unwrap();
    let (_, params) = pipeline
        .fit_transform(create_company_years(10_000))
        .unwrap();
    let df = create_company_years(10_000);

    c.bench_function("transform_fitted", |b| {
        b.iter(|| pipeline.transform(black_box(df.clone()), &params).unwrap())
    });
}

criterion_group!(benches, bench_fit_transform, bench_transform);
criterion_main!(benches);
