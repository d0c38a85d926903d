use astral::aspects::{classify, AspectCalculator};
use astral::Body;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::BTreeMap;

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify", |b| {
        b.iter(|| classify(black_box(100.0), black_box(278.0), black_box(8.0)))
    });
}

fn bench_natal_aspects(c: &mut Criterion) {
    let calculator = AspectCalculator::new();
    let positions: BTreeMap<Body, f64> = Body::ALL
        .iter()
        .enumerate()
        .map(|(i, &body)| (body, i as f64 * 37.5))
        .collect();

    c.bench_function("natal_aspects", |b| {
        b.iter(|| {
            calculator.natal_aspects(
                black_box(&positions),
                black_box(&Body::PERSONAL),
                black_box(8.0),
            )
        })
    });
}

criterion_group!(benches, bench_classify, bench_natal_aspects);
criterion_main!(benches);
