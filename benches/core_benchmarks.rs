//! Criterion benchmarks for rust_logger_core

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_logger_core::prelude::*;
use std::sync::Arc;

fn json_core(level: impl LevelEnabler + 'static) -> CoreRef {
    new_core(
        Box::new(JsonEncoder::new(EncoderConfig::production())),
        Arc::new(Discard),
        level,
    )
}

fn log(core: &CoreRef, level: Level, msg: &str, fields: &[Field]) {
    let entry = Entry::new(level, msg);
    if let Some(mut ce) = core.clone().check(&entry, None) {
        ce.write(fields);
    }
}

// ============================================================================
// Level Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let core = json_core(Level::Warn);
    let dynamic = json_core(AtomicLevel::at(Level::Warn));

    group.bench_function("below_threshold", |b| {
        b.iter(|| log(&core, black_box(Level::Debug), "filtered", &[]));
    });

    group.bench_function("below_threshold_atomic", |b| {
        b.iter(|| log(&dynamic, black_box(Level::Debug), "filtered", &[]));
    });

    group.bench_function("above_threshold", |b| {
        b.iter(|| log(&core, black_box(Level::Error), "logged", &[]));
    });

    group.finish();
}

// ============================================================================
// Encoding Benchmarks
// ============================================================================

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");
    group.throughput(Throughput::Elements(1));

    let entry = Entry::new(Level::Info, "request served");
    let fields = [
        Field::string("method", "GET"),
        Field::string("path", "/api/v1/users"),
        Field::new("status", 200_u64),
        Field::new("latency", std::time::Duration::from_micros(1250)),
    ];

    let json = JsonEncoder::new(EncoderConfig::production());
    group.bench_function("json", |b| {
        b.iter(|| {
            let buf = json.encode_entry(black_box(&entry), black_box(&fields)).unwrap();
            black_box(buf.len());
            buf.free();
        });
    });

    let console = ConsoleEncoder::new(EncoderConfig::development());
    group.bench_function("console", |b| {
        b.iter(|| {
            let buf = console.encode_entry(black_box(&entry), black_box(&fields)).unwrap();
            black_box(buf.len());
            buf.free();
        });
    });

    group.finish();
}

// ============================================================================
// Composition Benchmarks
// ============================================================================

fn bench_composition(c: &mut Criterion) {
    let mut group = c.benchmark_group("composition");
    group.throughput(Throughput::Elements(1));

    let tee = new_tee(vec![json_core(Level::Debug), json_core(Level::Error)]);
    group.bench_function("tee_two_children", |b| {
        b.iter(|| log(&tee, black_box(Level::Info), "fan out", &[]));
    });

    let base = json_core(Level::Debug);
    group.bench_function("with_context", |b| {
        b.iter(|| black_box(base.with(&[Field::new("request_id", 42_u64)])));
    });

    group.bench_function("lazy_with_unused", |b| {
        b.iter(|| black_box(new_lazy_with(base.clone(), vec![Field::new("request_id", 42_u64)])));
    });

    group.finish();
}

// ============================================================================
// Concurrent Logging Benchmarks
// ============================================================================

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    let core = json_core(Level::Info);

    group.bench_function("multi_thread_4", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let core = core.clone();
                    std::thread::spawn(move || {
                        for _ in 0..100 {
                            log(&core, Level::Info, "concurrent message", &[]);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_level_filtering,
    bench_encoding,
    bench_composition,
    bench_concurrent_logging
);

criterion_main!(benches);
