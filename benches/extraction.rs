//! Benchmarks for breakout box extraction.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ivbox::config::CANDLE_INTERVAL_MINUTES;
use ivbox::prelude::*;

/// Generate `days` full days of candles at the configured interval
fn generate_candles(days: usize) -> Vec<Candle> {
  let per_day = (24 * 60 / CANDLE_INTERVAL_MINUTES) as usize;
  let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap();
  let step = Duration::minutes(i64::from(CANDLE_INTERVAL_MINUTES));

  let mut candles = Vec::with_capacity(days * per_day);
  let mut price = 17_000.0;

  for i in 0..days * per_day {
    let change = ((i * 7 + 13) % 100) as f64 / 2.0 - 25.0; // Deterministic "random"
    let volatility = 10.0 + ((i * 3) % 10) as f64 * 2.0;

    let o = price;
    let c = price + change;
    let h = o.max(c) + volatility * 0.5;
    let l = o.min(c) - volatility * 0.5;

    candles.push(Candle::new(start + step * i as i32, o, h, l, c));
    price = c;
  }

  candles
}

fn bench_extract(c: &mut Criterion) {
  let candles = generate_candles(MAX_HISTORY_DAYS as usize);
  let extractor = ExtractorBuilder::new().build().unwrap();

  c.bench_function("extract_59_days", |b| {
    b.iter(|| {
      let _ = black_box(extractor.extract("NQ=F", black_box(&candles)));
    })
  });
}

fn bench_extract_par(c: &mut Criterion) {
  let candles = generate_candles(MAX_HISTORY_DAYS as usize);
  let extractor = ExtractorBuilder::new().build().unwrap();

  c.bench_function("extract_par_59_days", |b| {
    b.iter(|| {
      let _ = black_box(extractor.extract_par("NQ=F", black_box(&candles)));
    })
  });
}

fn bench_scaling(c: &mut Criterion) {
  let extractor = ExtractorBuilder::new().build().unwrap();

  let mut group = c.benchmark_group("scaling");

  for days in [1, 5, 20, 59].iter() {
    let candles = generate_candles(*days);

    group.bench_with_input(BenchmarkId::new("extract", days), days, |b, _| {
      b.iter(|| {
        let _ = black_box(extractor.extract("NQ=F", black_box(&candles)));
      })
    });
  }

  group.finish();
}

fn bench_partition(c: &mut Criterion) {
  let candles = generate_candles(MAX_HISTORY_DAYS as usize);
  let extractor = ExtractorBuilder::new().build().unwrap();

  c.bench_function("partition_59_days", |b| {
    b.iter(|| {
      let _ = black_box(extractor.partition(black_box(&candles)));
    })
  });
}

fn bench_parallel_extract(c: &mut Criterion) {
  let candles1 = generate_candles(MAX_HISTORY_DAYS as usize);
  let candles2 = generate_candles(MAX_HISTORY_DAYS as usize);
  let candles3 = generate_candles(MAX_HISTORY_DAYS as usize);
  let candles4 = generate_candles(MAX_HISTORY_DAYS as usize);

  let extractor = ExtractorBuilder::new().build().unwrap();

  let instruments: Vec<(&str, &[Candle])> =
    vec![("NQ=F", &candles1), ("ES=F", &candles2), ("YM=F", &candles3), ("RTY=F", &candles4)];

  c.bench_function("parallel_extract_4_instruments", |b| {
    b.iter(|| {
      let _ = black_box(extract_parallel(black_box(&extractor), black_box(instruments.clone())));
    })
  });
}

criterion_group!(
  benches,
  bench_extract,
  bench_extract_par,
  bench_scaling,
  bench_partition,
  bench_parallel_extract,
);

criterion_main!(benches);
