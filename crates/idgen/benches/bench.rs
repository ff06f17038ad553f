use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use idgen::{
    BatchCoordinator, HardwareAddress, PoolConfig, Producer, generate_batch, spawn_producer,
};
use std::hint::black_box;

const HW: HardwareAddress = HardwareAddress::new([0x02, 0x42, 0xac, 0x11, 0x00, 0x02]);

/// One synchronous iteration: clock read, entropy fill, digest.
fn bench_next_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("producer");
    group.throughput(Throughput::Elements(1));

    let mut producer = Producer::with_defaults(HW, 0);
    group.bench_function("next_id", |b| b.iter(|| black_box(producer.next_id())));

    group.finish();
}

/// A single spawned producer behind a one-slot channel.
fn bench_spawned_producer(c: &mut Criterion) {
    let mut group = c.benchmark_group("producer");
    group.throughput(Throughput::Elements(1));

    let (tx, rx) = crossbeam_channel::bounded(1);
    let handle = spawn_producer(HW, 0, tx);
    group.bench_function("recv", |b| {
        b.iter(|| black_box(rx.recv().expect("producer exited")));
    });
    group.finish();

    handle.stop().expect("producer panicked");
}

/// Whole batches, including pool start-up and shutdown.
fn bench_generate_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");

    for n in [1_u64, 10_000, 100_000] {
        group.throughput(Throughput::Elements(n));
        group.bench_function(format!("elems/{n}"), |b| {
            b.iter(|| black_box(generate_batch(HW, n).expect("batch failed")));
        });
    }

    group.finish();
}

/// Throughput as the number of workers grows.
fn bench_worker_scaling(c: &mut Criterion) {
    const TOTAL_IDS: u64 = 100_000;
    let mut group = c.benchmark_group("batch/workers");

    for num_workers in [1, 2, 4, 8, 16] {
        let coordinator =
            BatchCoordinator::new(PoolConfig::default().with_num_workers(num_workers));
        group.throughput(Throughput::Elements(TOTAL_IDS));
        group.bench_function(
            format!("elems/{TOTAL_IDS}/workers/{num_workers}"),
            |b| {
                b.iter(|| black_box(coordinator.generate(HW, TOTAL_IDS).expect("batch failed")));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_next_id,
    bench_spawned_producer,
    bench_generate_batch,
    bench_worker_scaling
);
criterion_main!(benches);
