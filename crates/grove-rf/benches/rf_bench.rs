//! Criterion benchmarks for grove-rf: random forest training and prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use grove_rf::{Dataset, DecisionTreeConfig, RandomForestConfig};

fn make_classification(n_samples: usize, n_features: usize, n_classes: usize, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % n_classes;
        labels.push(class);
        let row: Vec<f64> = (0..n_features)
            .map(|f| {
                let base = if f < 3 { class as f64 * 3.0 } else { 0.0 };
                base + rng.r#gen::<f64>() * 0.5
            })
            .collect();
        features.push(row);
    }
    Dataset::new(features, labels).unwrap()
}

fn bench_rf_train(c: &mut Criterion) {
    let data = make_classification(500, 20, 5, 42);
    let cfg = RandomForestConfig::new(50).unwrap().with_seed(42);

    c.bench_function("rf_train_500x20_5class_50trees", |b| {
        b.iter(|| cfg.train(&data).unwrap());
    });
}

fn bench_rf_predict_batch(c: &mut Criterion) {
    let data = make_classification(500, 20, 5, 42);
    let cfg = RandomForestConfig::new(50).unwrap().with_seed(42);
    let forest = cfg.train(&data).unwrap().into_forest();

    c.bench_function("rf_predict_batch_500x20_50trees", |b| {
        b.iter(|| forest.predict_batch(data.features()).unwrap());
    });
}

fn bench_single_tree(c: &mut Criterion) {
    let data = make_classification(500, 20, 5, 42);
    let cfg = DecisionTreeConfig::new();

    c.bench_function("tree_train_500x20_5class", |b| {
        b.iter(|| cfg.train(&data).unwrap());
    });
}

fn bench_cross_validate(c: &mut Criterion) {
    let data = make_classification(200, 10, 3, 42);
    let cfg = RandomForestConfig::new(10).unwrap().with_seed(42);

    c.bench_function("rf_cv_5fold_200x10_10trees", |b| {
        b.iter(|| cfg.cross_validate(&data, 5).unwrap());
    });
}

criterion_group!(
    benches,
    bench_rf_train,
    bench_rf_predict_batch,
    bench_single_tree,
    bench_cross_validate
);
criterion_main!(benches);
