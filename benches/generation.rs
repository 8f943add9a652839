//! Benchmarks for batch generation
//!
//! One full cycle builds 10,000 records; runs hourly, so this mostly guards
//! against accidental quadratic behaviour.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use decoy_board::core::Batch;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use time::OffsetDateTime;

fn bench_generate_batch(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(0xDEADBEEF);
    let now = OffsetDateTime::now_utc();

    c.bench_function("generate_batch_with_ids", |b| {
        b.iter(|| Batch::generate(&mut rng, black_box(true), now))
    });

    c.bench_function("generate_batch_without_ids", |b| {
        b.iter(|| Batch::generate(&mut rng, black_box(false), now))
    });
}

criterion_group!(benches, bench_generate_batch);
criterion_main!(benches);
