//! A message-driven supervisor: health-probes its monitored children and
//! restarts them after consecutive failures.
//!
//! This replaces a generic `SupervisorTree`/`OneForOne`/`OneForAll`
//! strategy hierarchy with a single actor that speaks the same
//! [`MessageKind`] every other actor in this runtime speaks. One
//! `SupervisorActor` watches a flat set of children; nesting supervisors
//! is just spawning one as another's child with `actor_of_child`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::errors::SupervisorError;
use super::handle::SupervisorHandle;
use crate::actor::{Actor, ActorContext, ErrorAction};
use crate::message::MessageKind;
use crate::monitoring::{RuntimeEvent, SupervisionEvent, SupervisionEventKind};
use crate::system::{ActorRef, SupervisorConfig};
use crate::util::ActorId;

struct ChildHealth {
    awaiting_ack: bool,
    consecutive_failures: u32,
}

/// Supervises children registered via [`MessageKind::MonitorChild`]. Each
/// [`MessageKind::SupervisorTick`] pings every monitored child; an
/// unanswered ping after `health_timeout` counts as a failure, and
/// `max_consecutive_failures` failures in a row tears the child down and
/// respawns it through the paired [`SupervisorHandle`].
pub struct SupervisorActor {
    config: SupervisorConfig,
    handle: SupervisorHandle,
    children: HashMap<ActorId, ChildHealth>,
    ticker: Option<tokio::task::JoinHandle<()>>,
}

impl SupervisorActor {
    pub fn new(config: SupervisorConfig, handle: SupervisorHandle) -> Self {
        Self {
            config,
            handle,
            children: HashMap::new(),
            ticker: None,
        }
    }

    async fn emit(&self, ctx: &ActorContext, child_id: Option<ActorId>, kind: SupervisionEventKind) {
        let event = SupervisionEvent {
            timestamp: Utc::now(),
            supervisor_id: ctx.actor_ref().actor_id().clone(),
            child_id,
            event_kind: kind,
            metadata: HashMap::new(),
        };
        ctx.actor_ref().system.record_event(RuntimeEvent::from(event)).await;
    }

    fn child_ref(&self, ctx: &ActorContext, child_id: &ActorId) -> ActorRef {
        ActorRef {
            actor_id: child_id.clone(),
            system: Arc::clone(&ctx.actor_ref().system),
            remote_addr: None,
        }
    }

    async fn run_health_sweep(&mut self, ctx: &mut ActorContext) {
        let ids: Vec<ActorId> = self.children.keys().cloned().collect();
        for child_id in ids {
            if let Some(health) = self.children.get_mut(&child_id) {
                health.awaiting_ack = true;
            }
            let _ = self
                .child_ref(ctx, &child_id)
                .tell_from(MessageKind::HealthPing, Some(ctx.actor_ref().clone()))
                .await;

            let timeout_ref = ctx.actor_ref().clone();
            let timeout = self.config.health_timeout;
            let timeout_child_id = child_id.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                let _ = timeout_ref
                    .tell(MessageKind::HealthCheckTimeout {
                        child_id: timeout_child_id,
                    })
                    .await;
            });
        }
    }

    async fn handle_ack(&mut self, ctx: &ActorContext) {
        let Some(sender) = ctx.sender() else { return };
        let child_id = sender.actor_id().clone();
        if let Some(health) = self.children.get_mut(&child_id) {
            health.awaiting_ack = false;
            health.consecutive_failures = 0;
        }
        self.emit(ctx, Some(child_id), SupervisionEventKind::HealthAckReceived).await;
    }

    async fn handle_check_timeout(&mut self, ctx: &mut ActorContext, child_id: ActorId) {
        let still_awaiting = matches!(self.children.get(&child_id), Some(health) if health.awaiting_ack);
        if !still_awaiting {
            return;
        }
        let failed_checks = match self.children.get_mut(&child_id) {
            Some(health) => {
                health.consecutive_failures += 1;
                health.consecutive_failures
            }
            None => return,
        };
        self.emit(
            ctx,
            Some(child_id.clone()),
            SupervisionEventKind::HealthTimeout { failed_checks },
        )
        .await;
        if failed_checks >= self.config.max_consecutive_failures {
            self.restart_child(ctx, &child_id).await;
        }
    }

    async fn restart_child(&mut self, ctx: &mut ActorContext, child_id: &ActorId) {
        self.emit(ctx, Some(child_id.clone()), SupervisionEventKind::ChildRestarted).await;
        self.children.remove(child_id);
        ctx.actor_ref().system.stop_local(child_id).await;
        tokio::time::sleep(self.config.restart_quiescence).await;
        if self.handle.respawn(child_id).await {
            self.children.insert(
                child_id.clone(),
                ChildHealth {
                    awaiting_ack: false,
                    consecutive_failures: 0,
                },
            );
        }
    }
}

#[async_trait]
impl Actor for SupervisorActor {
    type Error = SupervisorError;

    async fn pre_start(&mut self, ctx: &mut ActorContext) -> Result<(), Self::Error> {
        let self_ref = ctx.actor_ref().clone();
        let interval = self.config.health_interval;
        self.ticker = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if self_ref.tell(MessageKind::SupervisorTick).await.is_err() {
                    break;
                }
            }
        }));
        Ok(())
    }

    async fn post_stop(&mut self, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        Ok(())
    }

    async fn handle_message(
        &mut self,
        message: MessageKind,
        ctx: &mut ActorContext,
    ) -> Result<(), Self::Error> {
        match message {
            MessageKind::MonitorChild { child_id } => {
                self.children.insert(
                    child_id.clone(),
                    ChildHealth {
                        awaiting_ack: false,
                        consecutive_failures: 0,
                    },
                );
                self.emit(ctx, Some(child_id), SupervisionEventKind::ChildMonitored).await;
            }
            MessageKind::HealthAck => self.handle_ack(ctx).await,
            MessageKind::ChildFailed { child_id, error } => {
                self.emit(
                    ctx,
                    Some(child_id.clone()),
                    SupervisionEventKind::ChildFailed { error },
                )
                .await;
                self.restart_child(ctx, &child_id).await;
            }
            MessageKind::RestartChild { child_id } => self.restart_child(ctx, &child_id).await,
            MessageKind::SupervisorTick => self.run_health_sweep(ctx).await,
            MessageKind::HealthCheckTimeout { child_id } => {
                self.handle_check_timeout(ctx, child_id).await
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{ActorSystem, RuntimeConfig};
    use std::time::Duration;

    #[derive(Debug)]
    struct NeverError;
    impl std::fmt::Display for NeverError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "never")
        }
    }
    impl std::error::Error for NeverError {}

    struct FlakyChild {
        fail_next: bool,
    }

    #[async_trait]
    impl Actor for FlakyChild {
        type Error = NeverError;

        async fn handle_message(
            &mut self,
            message: MessageKind,
            ctx: &mut ActorContext,
        ) -> Result<(), Self::Error> {
            if matches!(message, MessageKind::HealthPing) && !self.fail_next {
                ctx.reply(MessageKind::HealthAck).await;
            }
            Ok(())
        }
    }

    fn fast_config() -> SupervisorConfig {
        SupervisorConfig {
            health_interval: Duration::from_millis(20),
            health_timeout: Duration::from_millis(10),
            restart_quiescence: Duration::from_millis(1),
            max_consecutive_failures: 2,
        }
    }

    #[tokio::test]
    async fn test_monitor_child_then_receives_health_acks() {
        let system = ActorSystem::new(RuntimeConfig::default());
        let handle = SupervisorHandle::new();
        let supervisor = system
            .actor_of("supervisor", "sup1", SupervisorActor::new(fast_config(), handle))
            .await
            .expect("spawn supervisor");
        let _child = system
            .actor_of_child(
                "child",
                "c1",
                supervisor.actor_id(),
                FlakyChild { fail_next: false },
            )
            .await
            .expect("spawn child");

        supervisor
            .tell(MessageKind::MonitorChild {
                child_id: ActorId::from("c1"),
            })
            .await
            .expect("monitor");

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(system.actor_count(), 2);
    }

    #[tokio::test]
    async fn test_child_failed_triggers_respawn_recipe() {
        let system = ActorSystem::new(RuntimeConfig::default());
        let handle = SupervisorHandle::new();
        let respawned = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let supervisor = system
            .actor_of("supervisor", "sup2", SupervisorActor::new(fast_config(), handle.clone()))
            .await
            .expect("spawn supervisor");

        system
            .actor_of_child(
                "child",
                "c2",
                supervisor.actor_id(),
                FlakyChild { fail_next: false },
            )
            .await
            .expect("spawn child");

        let flag = Arc::clone(&respawned);
        let sys = system.clone();
        handle.register_restart(ActorId::from("c2"), move || {
            let flag = Arc::clone(&flag);
            let sys = sys.clone();
            async move {
                let _ = sys
                    .actor_of("child", "c2", FlakyChild { fail_next: false })
                    .await;
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
            }
        });

        supervisor
            .tell(MessageKind::ChildFailed {
                child_id: ActorId::from("c2"),
                error: "boom".to_string(),
            })
            .await
            .expect("tell");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(respawned.load(std::sync::atomic::Ordering::SeqCst));
    }
}
