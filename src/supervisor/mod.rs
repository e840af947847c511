//! A message-driven supervisor actor.
//!
//! There is one supervision primitive here, not a strategy hierarchy:
//! [`SupervisorActor`] watches a flat set of children, restarting one
//! that stops acking health checks or reports its own failure. Nesting
//! follows from the actor model itself — spawn a `SupervisorActor` as
//! another's child with `ActorSystem::actor_of_child` to get a
//! supervision tree, with the usual post-order teardown.

pub mod actor;
pub mod errors;
pub mod handle;

pub use actor::SupervisorActor;
pub use errors::SupervisorError;
pub use handle::SupervisorHandle;
