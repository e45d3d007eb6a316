//! Benchmarks for the per-tick hot path

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use halving_sentinel::feed::{parse_ticker, Tick};
use halving_sentinel::project::{Projection, Projector};
use rust_decimal_macros::dec;

const PAYLOAD: &str = r#"{"e":"24hrTicker","E":1700000000000,"s":"BTCUSDT","p":"812.40","P":"1.284","c":"64250.10","Q":"0.015","b":"64250.00","a":"64250.10","o":"63437.70","h":"64800.00","l":"63100.00","v":"23145.2","q":"1487654321.55"}"#;

fn benchmark_parse_ticker(c: &mut Criterion) {
    c.bench_function("parse_ticker", |b| b.iter(|| parse_ticker(black_box(PAYLOAD))));
}

fn benchmark_scaled_projection(c: &mut Criterion) {
    let projection = Projection::scaled(dec!(45000), dec!(1.4285)).unwrap();
    let tick = Tick::from_price(dec!(64250.10));

    c.bench_function("scaled_projection", |b| {
        b.iter(|| projection.project(black_box(&tick), black_box(Some(dec!(2.0)))))
    });
}

fn benchmark_identity_display(c: &mut Criterion) {
    let tick = Tick::from_price(dec!(64250.10));

    c.bench_function("identity_display", |b| {
        b.iter(|| Projection::Identity.display(black_box(&tick), black_box(Some(dec!(64250.00)))))
    });
}

criterion_group!(
    benches,
    benchmark_parse_ticker,
    benchmark_scaled_projection,
    benchmark_identity_display
);
criterion_main!(benches);
