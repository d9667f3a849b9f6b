//! Sealing and serialization benchmarks
//!
//! ## Running
//!
//! ```bash
//! cargo bench -p serror --bench serialize
//! cargo bench -p serror --bench serialize -- "seal/"
//! ```

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serror::{from_error, join, recover, SharedError, StructuredError};

fn sample(children: usize) -> StructuredError {
    let mut e = StructuredError::new("Validation")
        .with_status(400)
        .with_custom_code("E_INPUT")
        .with_message("request rejected")
        .with_meta("user", "alice")
        .with_meta("token", "s3cret")
        .with_redacted_key("token")
        .with_field_error("email", "format", "not an email");
    for i in 0..children {
        let child: SharedError = Arc::from(Box::<dyn std::error::Error + Send + Sync>::from(
            format!("child {}", i),
        ));
        e = e.with_error(child);
    }
    e
}

fn seal_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("seal");
    let entity = sample(0);

    group.bench_function("into_error", |b| {
        b.iter(|| black_box(entity.clone().into_error()))
    });

    let sealed = entity.to_error();
    group.bench_function("recover", |b| {
        b.iter(|| black_box(recover(&*sealed).map(|e| e.status_code())))
    });
    group.bench_function("from_error", |b| b.iter(|| black_box(from_error(&sealed))));

    let plain: Vec<SharedError> = (0..4)
        .map(|i| Arc::from(Box::<dyn std::error::Error + Send + Sync>::from(format!("e{}", i))))
        .collect();
    group.bench_function("join_plain_4", |b| {
        b.iter(|| black_box(join(plain.iter().cloned().map(Some))))
    });

    group.finish();
}

fn serialize_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");

    for children in [0usize, 4, 16] {
        let entity = sample(children);
        group.bench_with_input(BenchmarkId::new("to_json", children), &entity, |b, e| {
            b.iter(|| black_box(e.to_json()))
        });
        group.bench_with_input(BenchmarkId::new("to_json_safe", children), &entity, |b, e| {
            b.iter(|| black_box(e.to_json_safe()))
        });
        group.bench_with_input(BenchmarkId::new("to_fields", children), &entity, |b, e| {
            b.iter(|| black_box(e.to_fields()))
        });
    }

    group.finish();
}

criterion_group!(benches, seal_benchmarks, serialize_benchmarks);
criterion_main!(benches);
