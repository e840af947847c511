//! Orchestrated Federated Learning Demo
//!
//! Spawns a coordinator, one aggregator, and three workers in a single
//! process and lets them run two rounds of FedAvg to completion, printing
//! each round's persisted state as it lands.
//!
//! Run with: cargo run --example orchestrated_fl

use std::sync::Arc;
use std::time::Duration;

use swarmrt::{
    AggregatorActor, ActorSystem, CoordinatorActor, CoordinatorConfig, InMemoryRoundStore,
    LinearSoftmax, RuntimeConfig, WorkerActor,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Orchestrated Federated Learning Demo ===\n");

    let system = ActorSystem::new(RuntimeConfig::default());
    let store = Arc::new(InMemoryRoundStore::new());

    let config = CoordinatorConfig { worker_count: 3, auto_start: true, max_rounds: 2 };

    println!("1. Spawning coordinator (worker_count=3, max_rounds=2)...");
    let coordinator = system
        .actor_of(
            "coordinator",
            "coord-1",
            CoordinatorActor::new(
                config,
                Arc::clone(&store),
                2,
                4,
                8,
                0.1,
                None,
                Duration::from_secs(5),
            ),
        )
        .await?;

    println!("2. Spawning aggregator...");
    system
        .actor_of(
            "aggregator",
            "agg-1",
            AggregatorActor::new("agg-1", "127.0.0.1", 0, coordinator.clone(), Arc::clone(&store)),
        )
        .await?;

    println!("3. Spawning three workers...\n");
    for i in 0..3 {
        system
            .actor_of(
                &format!("worker-{i}"),
                &format!("worker-{i}"),
                WorkerActor::new(
                    format!("worker-{i}"),
                    "127.0.0.1",
                    0,
                    1,
                    coordinator.clone(),
                    Box::new(LinearSoftmax::new(i as u64, 2, 4, 40)),
                ),
            )
            .await?;
    }

    tokio::time::sleep(Duration::from_millis(500)).await;

    for round in 1..=2u64 {
        match store.get_round(round) {
            Some(record) => println!(
                "Round {round}: weights persisted = {}, train metrics = {}",
                record.weights_blob.is_some(),
                record.train_metrics_json.as_deref().unwrap_or("<none>"),
            ),
            None => println!("Round {round}: not yet persisted"),
        }
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
