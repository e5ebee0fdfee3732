//! Benchmarks for verification log buffering
//!
//! Run with: cargo bench -p iamf-vlog-core
//!
//! These benchmarks cover:
//! - Sorted insertion (in order, reversed, interleaved)
//! - Rendering OBUs into record blocks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use iamf_vlog_core::obu::{AudioFrame, CodecConfig};
use iamf_vlog_core::{render_obu, Category, FourCc, Obu, OrderedLogStore, Payload, SampleTrim, DRAIN_ORDER};

// ============================================================================
// Store Benchmarks
// ============================================================================

fn fill(keys: impl Iterator<Item = u64>) -> OrderedLogStore {
    let mut store = OrderedLogStore::new();
    store.open();
    for key in keys {
        let payload = Payload::new("#0\nTemporalDelimiterOBU_0:\n##\n", 256).unwrap();
        store.insert(Category::Record, key, payload).unwrap();
    }
    store
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [100u64, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("in_order", size), &size, |b, &size| {
            b.iter(|| black_box(fill(0..size)))
        });

        group.bench_with_input(BenchmarkId::new("reversed", size), &size, |b, &size| {
            b.iter(|| black_box(fill((0..size).rev())))
        });

        // Two producers running a few records apart
        group.bench_with_input(BenchmarkId::new("interleaved", size), &size, |b, &size| {
            b.iter(|| black_box(fill((0..size).map(|k| if k % 2 == 0 { k } else { k.saturating_sub(8) }))))
        });
    }

    group.finish();
}

fn bench_drain(c: &mut Criterion) {
    c.bench_function("drain_10000", |b| {
        b.iter_batched(
            || fill(0..10_000),
            |mut store| black_box(store.drain_all(&DRAIN_ORDER)),
            criterion::BatchSize::SmallInput,
        )
    });
}

// ============================================================================
// Rendering Benchmarks
// ============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let frame = Obu::AudioFrame(AudioFrame {
        audio_substream_id: 0,
        size: 512,
    });
    group.bench_function("audio_frame", |b| {
        b.iter(|| black_box(render_obu(&frame, 42, SampleTrim::new(312, 0), 100_000).unwrap()))
    });

    let codec = Obu::CodecConfig(CodecConfig {
        codec_config_id: 0,
        codec_id: FourCc::OPUS,
        num_samples_per_frame: 960,
        roll_distance: -4,
        decoder_config: vec![1, 2, 0x01, 0x38, 0x00, 0x00, 0xBB, 0x80, 0x00, 0x00, 0],
    });
    group.bench_function("codec_config_opus", |b| {
        b.iter(|| black_box(render_obu(&codec, 1, SampleTrim::default(), 100_000).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_drain, bench_render);
criterion_main!(benches);
