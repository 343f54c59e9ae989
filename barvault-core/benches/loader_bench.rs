//! Criterion benchmarks for the loader hot paths.
//!
//! Benchmarks:
//! 1. Minute5 / Minute60 resampling loaders over a whole-file buffer
//! 2. Minute1 passthrough chunking
//! 3. Bare resampler over parsed records

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use barvault_core::{resample, BarWidth, RawRecord, ResourceKind, ResourcePolicy, TimeCode, TradeDate};

// ── Helpers ──────────────────────────────────────────────────────────

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

/// `days` trading days of 240 one-minute lines each, ending today.
fn make_minute_file(days: i64) -> Vec<u8> {
    let mut out = String::new();
    for d in (0..days).rev() {
        let date = TradeDate::from_naive(today() - Duration::days(d));
        for i in 0..240u32 {
            let minute = 9 * 60 + 31 + i;
            let time = TimeCode::from_hms(minute / 60, minute % 60, 0);
            let close = 10.0 + (f64::from(i) * 0.05).sin();
            out.push_str(&format!(
                "{date},{time},{:.2},{:.2},{:.2},{:.2},{:.2},{:.1},{},{},{},0\n",
                close - 0.01,
                close + 0.05,
                close - 0.05,
                close,
                close,
                close * 1000.0,
                1000 + i,
                50,
                12,
            ));
        }
    }
    out.into_bytes()
}

fn drain(policy: &ResourcePolicy<'_>, buf: &[u8]) -> usize {
    let mut offset = 0;
    let mut chunks = 0;
    while let Some(chunk) = policy.load_next(&buf[offset..]) {
        offset += chunk.consumed;
        chunks += 1;
    }
    chunks
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_resampling_loaders(c: &mut Criterion) {
    let mut group = c.benchmark_group("resampling_loader");
    for days in [5i64, 60] {
        let buf = make_minute_file(days);
        for kind in [ResourceKind::Minute5, ResourceKind::Minute60] {
            let policy = ResourcePolicy::new(kind, kind.key(), None, today());
            group.bench_with_input(BenchmarkId::new(kind.key(), days), &buf, |b, buf| {
                b.iter(|| drain(&policy, black_box(buf)))
            });
        }
    }
    group.finish();
}

fn bench_passthrough(c: &mut Criterion) {
    let buf = make_minute_file(10);
    let policy = ResourcePolicy::new(ResourceKind::Minute1, "m1", None, today());
    c.bench_function("passthrough_m1_10d", |b| b.iter(|| drain(&policy, black_box(&buf))));
}

fn bench_resampler(c: &mut Criterion) {
    let buf = make_minute_file(1);
    let records: Vec<RawRecord> = std::str::from_utf8(&buf)
        .unwrap()
        .lines()
        .filter_map(RawRecord::parse_line)
        .collect();
    c.bench_function("resample_240_to_5m", |b| {
        b.iter(|| resample(black_box(&records), BarWidth::MINUTES_5))
    });
}

criterion_group!(benches, bench_resampling_loaders, bench_passthrough, bench_resampler);
criterion_main!(benches);
