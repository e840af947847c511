//! Autonomous Gossip Learning Demo
//!
//! Spawns two gossip peers, each seeded with the other's endpoint, and
//! lets them train and gossip for a few seconds, printing each peer's
//! model state as it gets persisted.
//!
//! Run with: cargo run --example gossip_overlay

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use swarmrt::{
    ActorSystem, GossipConfig, GossipPeerActor, InMemoryRoundStore, LinearSoftmax, RuntimeConfig,
};

fn demo_config(seed_peers: Vec<String>) -> GossipConfig {
    GossipConfig {
        fanout: 2,
        gossip_interval: Duration::from_millis(500),
        local_epochs: 1,
        batch_size: 4,
        learning_rate: 0.1,
        convergence_eps: 1e-3,
        convergence_patience: 5,
        max_rounds: 20,
        seed_peers,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Autonomous Gossip Learning Demo ===\n");

    let system_a = ActorSystem::new(RuntimeConfig::default());
    let system_b = ActorSystem::new(RuntimeConfig::default());

    let bind_a: SocketAddr = "127.0.0.1:0".parse()?;
    let bind_b: SocketAddr = "127.0.0.1:0".parse()?;
    let port_a = system_a.listen(bind_a, None).await?;
    let port_b = system_b.listen(bind_b, None).await?;
    println!("1. peer-a listening on 127.0.0.1:{port_a}, peer-b on 127.0.0.1:{port_b}\n");

    tokio::time::sleep(Duration::from_millis(50)).await;

    let store_a = Arc::new(InMemoryRoundStore::new());
    let store_b = Arc::new(InMemoryRoundStore::new());

    println!("2. Spawning both peers, each seeded with the other's address...\n");
    system_a
        .actor_of(
            "gossip_peer",
            &format!("127.0.0.1:{port_a}"),
            GossipPeerActor::new(
                "peer-a",
                "127.0.0.1",
                port_a,
                demo_config(vec![format!("127.0.0.1:{port_b}")]),
                2,
                3,
                Box::new(LinearSoftmax::new(1, 2, 3, 30)),
                Arc::clone(&store_a),
                None,
            ),
        )
        .await?;

    system_b
        .actor_of(
            "gossip_peer",
            &format!("127.0.0.1:{port_b}"),
            GossipPeerActor::new(
                "peer-b",
                "127.0.0.1",
                port_b,
                demo_config(vec![format!("127.0.0.1:{port_a}")]),
                2,
                3,
                Box::new(LinearSoftmax::new(2, 2, 3, 30)),
                Arc::clone(&store_b),
                None,
            ),
        )
        .await?;

    println!("3. Training and gossiping for 5 seconds...\n");
    tokio::time::sleep(Duration::from_secs(5)).await;

    for round in 1..5u64 {
        if let Some(snapshot) = store_a.get_gossip_snapshot("peer-a", round) {
            let learned_peers = snapshot
                .lww
                .iter()
                .filter_map(|(key, _)| key.strip_prefix("model/")?.split('/').next())
                .collect::<std::collections::HashSet<_>>()
                .len();
            println!("peer-a round {round}: knows {learned_peers} peer model(s)");
        }
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
