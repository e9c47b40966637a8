//! Criterion benchmarks for round transitions.
//!
//! Run with:
//!   cargo bench -p nback
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use nback::prelude::*;

fn make_session(modalities: usize, n: usize, seed: u64) -> NBackSession {
    let config = SessionConfig::new(
        4,
        n,
        Modality::ALL.into_iter().take(modalities),
        500,
    )
    .with_seed(seed);
    NBackSession::configure(config).expect("valid bench config")
}

/// Benchmark advance() with a growing number of active modalities.
fn bench_advance_modalities(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance_modalities");
    group.throughput(Throughput::Elements(1));

    for count in [1usize, 3, 6].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut session = make_session(count, 2, 42);
            b.iter(|| {
                session
                    .declare_response(Modality::Position, true)
                    .expect("position is active");
                black_box(session.advance());
            });
        });
    }

    group.finish();
}

/// Benchmark a full session of fixed length, including setup.
fn bench_full_session(c: &mut Criterion) {
    c.bench_function("session_100_rounds", |b| {
        b.iter(|| {
            let mut session = make_session(6, 3, 7);
            for _ in 0..100 {
                session.advance();
            }
            black_box(session.scores())
        });
    });
}

criterion_group!(benches, bench_advance_modalities, bench_full_session);
criterion_main!(benches);
