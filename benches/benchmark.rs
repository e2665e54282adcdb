// Alignment and prediction throughput over synthetic village batches
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use sdgx_core::{
    align, predict, CategoricalIndex, FeatureSpec, KMeans, KPrototypes, Record, TaggedModel,
};

const NUMERIC: usize = 12;
const CATEGORIES: [&str; 4] = ["ada", "tidak ada", "sebagian", "rusak"];

fn feature_spec() -> FeatureSpec {
    let mut features: Vec<String> = (0..NUMERIC).map(|i| format!("r{}", 700 + i)).collect();
    features.push("r1502".to_string());
    features.push("r1503".to_string());
    FeatureSpec::new(features, CategoricalIndex::new(vec![NUMERIC, NUMERIC + 1])).unwrap()
}

fn generate_records(n: usize) -> Vec<Record> {
    let mut rng = rand::rng();
    (0..n)
        .map(|i| {
            let mut record = Record::new();
            record.insert("nama_desa".to_string(), format!("DESA {}", i).into());
            for j in 0..NUMERIC {
                record.insert(format!("r{}", 700 + j), rng.random_range(0.0..100.0f64).into());
            }
            for column in ["r1502", "r1503"] {
                let category = CATEGORIES[rng.random_range(0..CATEGORIES.len())];
                record.insert(column.to_string(), category.into());
            }
            record
        })
        .collect()
}

fn random_centroids(k: usize, width: usize) -> Vec<Vec<f64>> {
    let mut rng = rand::rng();
    (0..k)
        .map(|_| (0..width).map(|_| rng.random_range(0.0..100.0)).collect())
        .collect()
}

fn benchmark_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align");
    let spec = feature_spec();

    for size in [100, 1000, 10000].iter() {
        let records = generate_records(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| black_box(align(records, &spec).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");
    let spec = feature_spec();
    let matrix = align(&generate_records(10000), &spec).unwrap();

    let numeric_spec = FeatureSpec::new(
        spec.features()[..NUMERIC].to_vec(),
        CategoricalIndex::default(),
    )
    .unwrap();
    let numeric_matrix = align(&generate_records(10000), &numeric_spec).unwrap();

    let kmeans = TaggedModel::detect(Box::new(KMeans::new(random_centroids(3, NUMERIC)).unwrap())).unwrap();
    group.bench_function("kmeans", |b| {
        b.iter(|| black_box(predict(&kmeans, &numeric_matrix, numeric_spec.categorical()).unwrap()));
    });

    let prototypes: Vec<Vec<String>> = (0..3)
        .map(|i| vec![CATEGORIES[i].to_string(), CATEGORIES[i + 1].to_string()])
        .collect();
    let kprototypes = TaggedModel::detect(Box::new(
        KPrototypes::new(random_centroids(3, NUMERIC), prototypes, 0.5).unwrap(),
    ))
    .unwrap();
    group.bench_function("kprototypes", |b| {
        b.iter(|| black_box(predict(&kprototypes, &matrix, spec.categorical()).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, benchmark_align, benchmark_predict);
criterion_main!(benches);
