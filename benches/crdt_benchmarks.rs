//! CRDT Benchmarks
//!
//! Measures baseline performance of the gossip layer's merge types:
//! - `LwwMap::set` throughput
//! - `LwwMap::merge` of two maps with overlapping keys
//! - `PnCounter::merge` throughput

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};

use swarmrt::{LwwMap, PnCounter};

fn lww_map_set(c: &mut Criterion) {
    c.bench_function("lww_map_set_1000", |b| {
        b.iter(|| {
            let mut map = LwwMap::new("bench");
            for i in 0..1000 {
                map.set(format!("key-{i}"), i as f32);
            }
            black_box(map);
        });
    });
}

fn lww_map_merge(c: &mut Criterion) {
    let mut left = LwwMap::new("left");
    for i in 0..500 {
        left.set(format!("key-{i}"), i as f32);
    }
    let mut right = LwwMap::new("right");
    for i in 250..750 {
        right.set(format!("key-{i}"), (i * 2) as f32);
    }

    c.bench_function("lww_map_merge_500_overlap", |b| {
        b.iter(|| {
            let mut merged = left.clone();
            merged.merge(&right);
            black_box(merged);
        });
    });
}

fn pn_counter_merge(c: &mut Criterion) {
    let mut left = PnCounter::new("left");
    left.increment(100);
    left.decrement(30);
    let mut right = PnCounter::new("right");
    right.increment(50);
    right.decrement(10);

    c.bench_function("pn_counter_merge", |b| {
        b.iter(|| {
            let mut merged = left.clone();
            merged.merge(&right);
            black_box(merged.value());
        });
    });
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(2))
        .without_plots()
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets =
        lww_map_set,
        lww_map_merge,
        pn_counter_merge
}

criterion_main!(benches);
