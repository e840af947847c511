//! The `Actor` trait every spawned unit of state implements.
//!
//! Every actor handles the same [`crate::message::MessageKind`] — there is
//! no per-actor message type parameter — so the trait itself stays
//! non-generic over `Message`. Only the error type is associated, which
//! keeps `on_error` returning a concrete, caller-owned type.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use std::fmt;
//! use swarmrt::{Actor, ActorContext, MessageKind};
//!
//! struct PingActor {
//!     count: u32,
//! }
//!
//! #[derive(Debug)]
//! struct PingError(String);
//!
//! impl fmt::Display for PingError {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "{}", self.0)
//!     }
//! }
//! impl std::error::Error for PingError {}
//!
//! #[async_trait]
//! impl Actor for PingActor {
//!     type Error = PingError;
//!
//!     async fn handle_message(
//!         &mut self,
//!         message: MessageKind,
//!         ctx: &mut ActorContext,
//!     ) -> Result<(), Self::Error> {
//!         if matches!(message, MessageKind::HealthPing) {
//!             ctx.reply(MessageKind::HealthAck).await;
//!         }
//!         self.count += 1;
//!         Ok(())
//!     }
//! }
//! ```

// Layer 1: Standard library imports
use std::error::Error;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::context::ActorContext;
use crate::message::MessageKind;

/// Core actor trait. Implementors own their state and process messages one
/// at a time; the runtime never calls `handle_message` concurrently for the
/// same actor.
#[async_trait]
pub trait Actor: Send + Sync + 'static {
    /// The error type returned by this actor's hooks.
    type Error: Error + Send + Sync + 'static;

    /// Process one message. Called with exclusive access to `self`; the
    /// mailbox will not deliver the next message until this returns.
    async fn handle_message(
        &mut self,
        message: MessageKind,
        ctx: &mut ActorContext,
    ) -> Result<(), Self::Error>;

    /// Runs once before the mailbox loop starts. An error here means the
    /// actor never starts; the spawn caller (or supervisor, for a
    /// supervised child) observes the failure as `ChildFailed`.
    async fn pre_start(&mut self, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Runs once after the mailbox loop exits, before children are torn
    /// down. Errors here are logged via the monitor but do not stop
    /// teardown.
    async fn post_stop(&mut self, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when `handle_message` returns an error. The returned
    /// [`ErrorAction`] tells the runtime how to proceed; the default stops
    /// the actor, which is the conservative choice for an unrecognized
    /// failure mode.
    async fn on_error(&mut self, _error: Self::Error, _ctx: &mut ActorContext) -> ErrorAction {
        ErrorAction::Stop
    }

    /// Called when the currently active [`Behavior`] (installed via
    /// `become_`) returns an error, in place of `on_error`. The default
    /// mirrors `on_error`'s conservative stop.
    async fn on_behavior_error(&mut self, _error: BehaviorError, _ctx: &mut ActorContext) -> ErrorAction {
        ErrorAction::Stop
    }
}

/// Error type returned by a [`Behavior`] installed via
/// `ActorContext::become_`. Type-erased since the mailbox loop dispatches
/// to whichever behavior is currently active without knowing the actor's
/// concrete `Error` type.
pub type BehaviorError = Box<dyn Error + Send + Sync>;

/// A swapped-in message handler installed via `ActorContext::become_`.
/// While one is active, the mailbox loop calls it instead of
/// `Actor::handle_message`; `ActorContext::unbecome` (or the behavior
/// calling it on itself) reverts to whichever behavior was active before
/// it, or to the actor's own `handle_message` if none was.
#[async_trait]
pub trait Behavior: Send {
    async fn handle(&mut self, message: MessageKind, ctx: &mut ActorContext) -> Result<(), BehaviorError>;
}

/// Supervision decision returned by [`Actor::on_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Stop the actor permanently after running `post_stop`.
    Stop,
    /// Ignore the error and keep processing the mailbox.
    Resume,
    /// Run `post_stop`, then `pre_start` again, and resume processing.
    Restart,
    /// Forward a `ChildFailed` to the parent/supervisor and stop locally.
    Escalate,
}

impl Default for ErrorAction {
    fn default() -> Self {
        Self::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::ActorSystem;

    #[derive(Debug)]
    struct TestError(&'static str);

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }
    impl Error for TestError {}

    struct CounterActor {
        value: i32,
        should_fail: bool,
    }

    #[async_trait]
    impl Actor for CounterActor {
        type Error = TestError;

        async fn handle_message(
            &mut self,
            _message: MessageKind,
            _ctx: &mut ActorContext,
        ) -> Result<(), Self::Error> {
            if self.should_fail {
                return Err(TestError("boom"));
            }
            self.value += 1;
            Ok(())
        }

        async fn on_error(&mut self, _error: Self::Error, _ctx: &mut ActorContext) -> ErrorAction {
            ErrorAction::Restart
        }
    }

    #[tokio::test]
    async fn test_handle_message_success() {
        let system = ActorSystem::new(Default::default());
        let actor_ref = system
            .actor_of(
                "counter",
                "c1",
                CounterActor {
                    value: 0,
                    should_fail: false,
                },
            )
            .await
            .expect("spawn");
        actor_ref
            .tell(MessageKind::HealthPing)
            .await
            .expect("tell");
    }

    #[test]
    fn test_error_action_default() {
        assert_eq!(ErrorAction::default(), ErrorAction::Stop);
    }
}
