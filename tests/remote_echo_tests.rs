//! Two-System Remote Echo Integration Test
//!
//! Scenario: two `ActorSystem`s bind OS-assigned ports. S1 hosts a counter
//! actor; S2 builds a `remote_ref` to it and sends a batch of pings over
//! the wire. The counter's local count reflects every remote send.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use swarmrt::{Actor, ActorContext, ActorSystem, MessageKind, RuntimeConfig};

#[derive(Debug)]
struct NeverError;
impl std::fmt::Display for NeverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "never")
    }
}
impl std::error::Error for NeverError {}

struct CounterActor {
    count: Arc<AtomicUsize>,
}

#[async_trait]
impl Actor for CounterActor {
    type Error = NeverError;

    async fn handle_message(
        &mut self,
        message: MessageKind,
        _ctx: &mut ActorContext,
    ) -> Result<(), Self::Error> {
        if matches!(message, MessageKind::HealthPing) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_remote_send_reaches_counter_on_another_system() {
    let system_one = ActorSystem::new(RuntimeConfig::default());
    let count = Arc::new(AtomicUsize::new(0));
    system_one
        .actor_of("counter", "counter-1", CounterActor { count: Arc::clone(&count) })
        .await
        .expect("spawn counter");

    let bind_addr: SocketAddr = "127.0.0.1:0".parse().expect("parse bind addr");
    let port = system_one.listen(bind_addr, None).await.expect("listen");

    // Give the accept loop a moment to come up before S2 dials it.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let system_two = ActorSystem::new(RuntimeConfig::default());
    let remote_counter = system_two.remote_ref(
        format!("127.0.0.1:{port}").parse().expect("parse remote addr"),
        "counter-1",
    );

    for _ in 0..10 {
        remote_counter
            .tell(MessageKind::HealthPing)
            .await
            .expect("remote tell");
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(count.load(Ordering::SeqCst), 10);
}
