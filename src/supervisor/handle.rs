//! Registration side-channel for child respawn recipes.
//!
//! `MessageKind` only carries serializable data, so a child's "how do I
//! come back after a restart" closure can't travel through a message.
//! Callers register a respawn recipe directly on a `SupervisorHandle`
//! the same way `ActorSystem::actor_of_child` is called directly rather
//! than through a message — before or after the child is first spawned.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;

use crate::util::ActorId;

type RespawnFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type RespawnFn = Box<dyn Fn() -> RespawnFuture + Send + Sync>;

/// Cheap, cloneable handle shared between whoever spawns children and the
/// [`super::actor::SupervisorActor`] that watches them.
#[derive(Clone, Default)]
pub struct SupervisorHandle {
    recipes: Arc<DashMap<ActorId, RespawnFn>>,
}

impl SupervisorHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register how to bring `child_id` back after a restart. Overwrites
    /// any prior recipe registered for the same id.
    pub fn register_restart<F, Fut>(&self, child_id: ActorId, respawn: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.recipes
            .insert(child_id, Box::new(move || Box::pin(respawn())));
    }

    /// Drop `child_id`'s respawn recipe, e.g. once it is deliberately
    /// retired rather than restarted.
    pub fn forget(&self, child_id: &ActorId) {
        self.recipes.remove(child_id);
    }

    pub(super) async fn respawn(&self, child_id: &ActorId) -> bool {
        let recipe = match self.recipes.get(child_id) {
            Some(recipe) => recipe,
            None => return false,
        };
        recipe.value()().await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_respawn_runs_the_registered_recipe() {
        let handle = SupervisorHandle::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let recorded = Arc::clone(&calls);
        handle.register_restart(ActorId::from("c1"), move || {
            let recorded = Arc::clone(&recorded);
            async move {
                recorded.fetch_add(1, Ordering::SeqCst);
            }
        });

        assert!(handle.respawn(&ActorId::from("c1")).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_respawn_of_unregistered_child_is_a_no_op() {
        let handle = SupervisorHandle::new();
        assert!(!handle.respawn(&ActorId::from("ghost")).await);
    }
}
