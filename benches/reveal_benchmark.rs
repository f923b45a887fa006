//! RevealBuffer benchmark: append and drain throughput.
//!
//! Target: tick cost independent of how much text is still pending.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trickle::producer::SAMPLE_RESPONSE;
use trickle::{RevealBuffer, RevealConfig, UnitMode};

fn drain(buffer: &mut RevealBuffer) {
    while let Some(token) = buffer.outstanding() {
        black_box(buffer.tick(token));
    }
}

fn reveal_append_small_chunks(c: &mut Criterion) {
    c.bench_function("reveal_append_3_chars", |b| {
        let mut buffer = RevealBuffer::default();
        b.iter(|| {
            if buffer.pending_units() > 100_000 {
                buffer.reset();
            }
            buffer.append(black_box("abc"));
        });
    });
}

fn reveal_drain_by_unit(c: &mut Criterion) {
    let mut group = c.benchmark_group("reveal_drain_sample");
    for unit in [UnitMode::Grapheme, UnitMode::Char, UnitMode::Word] {
        group.bench_with_input(BenchmarkId::from_parameter(unit), &unit, |b, &unit| {
            let config = RevealConfig::default().with_unit(unit);
            b.iter(|| {
                let mut buffer = RevealBuffer::new(config.clone()).unwrap();
                buffer.append(black_box(SAMPLE_RESPONSE));
                drain(&mut buffer);
                black_box(buffer.displayed().units())
            });
        });
    }
    group.finish();
}

fn reveal_tick_with_large_backlog(c: &mut Criterion) {
    let text = SAMPLE_RESPONSE.repeat(200);
    c.bench_function("reveal_tick_backlog_100k", |b| {
        let mut buffer = RevealBuffer::default();
        b.iter(|| {
            if buffer.is_empty() {
                buffer.reset();
                buffer.append(&text);
            }
            if let Some(token) = buffer.outstanding() {
                black_box(buffer.tick(token));
            }
        });
    });
}

fn reveal_batch_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("reveal_drain_batch");
    for batch_size in [1, 5, 20] {
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &batch_size,
            |b, &batch_size| {
                let config = RevealConfig::default().with_batch_size(batch_size);
                b.iter(|| {
                    let mut buffer = RevealBuffer::new(config.clone()).unwrap();
                    buffer.append(black_box(SAMPLE_RESPONSE));
                    drain(&mut buffer);
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    reveal_append_small_chunks,
    reveal_drain_by_unit,
    reveal_tick_with_large_backlog,
    reveal_batch_sizes
);
criterion_main!(benches);
