//! Ring queue hot-path benchmark

use criterion::{criterion_group, criterion_main, Criterion};
use ring_queue::RingQueue;
use std::hint::black_box;

fn bench_byte_cycle(c: &mut Criterion) {
    c.bench_function("enqueue_dequeue_byte", |b| {
        let mut queue = RingQueue::new(1024);
        b.iter(|| {
            assert!(queue.enqueue(black_box(&[0x5A])));
            black_box(queue.dequeue_byte());
        });
    });
}

fn bench_block_cycle(c: &mut Criterion) {
    c.bench_function("enqueue_dequeue_block_256", |b| {
        let mut queue = RingQueue::new(1024);
        let data = [0xA5u8; 256];
        let mut out = [0u8; 256];
        b.iter(|| {
            assert!(queue.enqueue(black_box(&data)));
            assert!(queue.dequeue(black_box(&mut out)));
        });
    });
}

criterion_group!(benches, bench_byte_cycle, bench_block_cycle);
criterion_main!(benches);
