//! Actor System Benchmarks
//!
//! Measures baseline performance of actor lifecycle operations:
//! - Single actor spawn latency
//! - Batch actor spawn (10 actors)
//! - `tell` throughput into a single mailbox

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

// Layer 1: Standard library imports
use std::hint::black_box;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, Criterion};

// Layer 3: Internal module imports
use swarmrt::{Actor, ActorContext, ActorSystem, MessageKind, RuntimeConfig};

#[derive(Debug)]
struct BenchError;

impl std::fmt::Display for BenchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bench error")
    }
}
impl std::error::Error for BenchError {}

struct CounterActor {
    count: u64,
}

#[async_trait]
impl Actor for CounterActor {
    type Error = BenchError;

    async fn handle_message(
        &mut self,
        _message: MessageKind,
        _ctx: &mut ActorContext,
    ) -> Result<(), Self::Error> {
        self.count += 1;
        Ok(())
    }
}

fn actor_spawn_single(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("actor_spawn_single", |b| {
        b.to_async(&rt).iter(|| async {
            let system = ActorSystem::new(RuntimeConfig::default());
            let actor_ref = system
                .actor_of("counter", "bench-single", CounterActor { count: 0 })
                .await
                .expect("spawn");
            black_box(actor_ref);
        });
    });
}

fn actor_spawn_batch_small(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("actor_spawn_batch_small", |b| {
        b.to_async(&rt).iter(|| async {
            let system = ActorSystem::new(RuntimeConfig::default());
            let mut refs = Vec::with_capacity(10);
            for i in 0..10 {
                let actor_ref = system
                    .actor_of("counter", &format!("bench-{i}"), CounterActor { count: 0 })
                    .await
                    .expect("spawn");
                refs.push(actor_ref);
            }
            black_box(refs);
        });
    });
}

fn actor_message_throughput(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("actor_message_throughput", |b| {
        b.to_async(&rt).iter(|| async {
            let system = ActorSystem::new(RuntimeConfig::default());
            let actor_ref = system
                .actor_of("counter", "bench-throughput", CounterActor { count: 0 })
                .await
                .expect("spawn");

            for _ in 0..100 {
                actor_ref
                    .tell(MessageKind::HealthPing)
                    .await
                    .expect("tell");
            }
            black_box(&actor_ref);
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
        actor_spawn_single,
        actor_spawn_batch_small,
        actor_message_throughput
}

criterion_main!(benches);
