use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ev_range::artifact::ModelArtifact;
use ev_range::backend::Tensor2D;
use ev_range::config::Hyperparams;
use ev_range::dataset::InMemoryDataset;
use ev_range::preprocessing::PredictivePipeline;
use ev_range::schema::FeatureVector;
use ev_range::training::{fit_pipeline, TrainingReport};
use ev_range::{CpuBackend, Predictor};
use std::hint::black_box;

fn synthetic(n: usize) -> InMemoryDataset {
    let x: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let t = i as f64;
            vec![
                40.0 + (t * 7.3) % 60.0,
                150.0 + (t * 11.0) % 100.0,
                140.0 + (t * 13.7) % 80.0,
                4.0 + (t * 3.1) % 8.0,
                4000.0 + (t * 37.0) % 900.0,
                1750.0 + (t * 17.0) % 200.0,
                1450.0 + (t * 23.0) % 300.0,
            ]
        })
        .collect();
    let y = x.iter().map(|r| r[0] * 1000.0 / r[2]).collect();
    InMemoryDataset::new(x, y).expect("valid synthetic data")
}

/// Train a pipeline once for the prediction benchmarks
fn trained_pipeline() -> PredictivePipeline<CpuBackend> {
    let hp = Hyperparams {
        epochs: 100,
        ..Hyperparams::default()
    };
    fit_pipeline(&synthetic(200), &hp, 42).expect("Failed to fit pipeline")
}

fn bench_predict_single(c: &mut Criterion) {
    let pipeline = trained_pipeline();
    let report = TrainingReport {
        mae: 0.0,
        rmse: 0.0,
        r2: 0.0,
        n_train: 200,
        n_test: 0,
        hyperparams: Hyperparams::default(),
        cv_r2: None,
        feature_importance: Vec::new(),
    };
    let predictor = Predictor::from_artifact(ModelArtifact::new(&pipeline, report))
        .expect("Failed to build predictor");
    let features = FeatureVector::default();
    let map = features.to_map();

    c.bench_function("predict_vector", |b| {
        b.iter(|| black_box(predictor.predict_vector(black_box(&features))))
    });
    c.bench_function("predict_range_map", |b| {
        b.iter(|| black_box(predictor.predict_range(black_box(&map))))
    });
}

fn bench_predict_batch(c: &mut Criterion) {
    let pipeline = trained_pipeline();

    for batch_size in [10usize, 100, 1000] {
        let rows: Vec<f64> = (0..batch_size)
            .flat_map(|_| FeatureVector::default().as_slice().to_vec())
            .collect();
        let x = Tensor2D::<CpuBackend>::new(rows, batch_size, 7);

        c.bench_with_input(
            BenchmarkId::new("pipeline_predict", batch_size),
            &x,
            |b, x| b.iter(|| black_box(pipeline.predict(black_box(x)))),
        );
    }
}

criterion_group!(benches, bench_predict_single, bench_predict_batch);
criterion_main!(benches);
