//! crates/hashing/benches/hash.rs
//!
//! End-to-end hash latency through the global dispatch slot.
//!
//! Run with: `cargo bench -p hashing`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use hashing::{Context, FixedArena, Variant, hash_ctx};

const PASSWORD: [u8; 16] = [0; 16];
const SALT: [u8; 16] = [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];

fn bench_variant(c: &mut Criterion, variant: Variant) {
    let mut group = c.benchmark_group(format!("hash/{}", variant.name()));
    let mut arena = FixedArena::with_capacity(16 * 1024).unwrap();

    for (m_cost, threads) in [(1024, 1), (4096, 1), (16 * 1024, 1), (16 * 1024, 4)] {
        group.throughput(Throughput::Bytes(u64::from(m_cost) * 1024));
        group.bench_with_input(
            BenchmarkId::new(format!("p{threads}"), m_cost),
            &(m_cost, threads),
            |b, &(m_cost, threads)| {
                let mut out = [0u8; 16];
                b.iter(|| {
                    let mut ctx = Context::new(&mut out, &PASSWORD, &SALT)
                        .with_time_cost(1)
                        .with_memory_cost(m_cost)
                        .with_parallelism(threads)
                        .with_allocator(&mut arena);
                    hash_ctx(&mut ctx, variant).unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_hash(c: &mut Criterion) {
    dispatch::select_implementation(None::<std::io::Stderr>, "").unwrap();
    bench_variant(c, Variant::Argon2d);
    bench_variant(c, Variant::Argon2i);
}

criterion_group!(benches, bench_hash);
criterion_main!(benches);
