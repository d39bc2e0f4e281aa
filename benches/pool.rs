use criterion::{black_box, criterion_group, criterion_main, Criterion};
use netexchange::socket::{Channel, ChannelManager, IdleChannelPool, PartitionKey};
use url::Url;

/// Benchmark the drain, offer and poll cycle of a redirected connection.
/// Pure in-memory operations, no network I/O.
fn benchmark_pool_operations(c: &mut Criterion) {
    c.bench_function("pool_new", |b| b.iter(|| black_box(IdleChannelPool::new())));

    let pool = IdleChannelPool::new();
    let partition = PartitionKey::from_url(&Url::parse("https://example.com").unwrap());

    c.bench_function("pool_drain_offer_poll", |b| {
        b.iter(|| {
            let channel = Channel::new();
            pool.drain_channel_and_offer(&channel, true, &partition);
            pool.complete_drain(&channel);
            black_box(pool.poll(black_box(&partition)))
        })
    });

    c.bench_function("pool_idle_channel_count", |b| {
        b.iter(|| black_box(pool.idle_channel_count()))
    });
}

criterion_group!(benches, benchmark_pool_operations);
criterion_main!(benches);
