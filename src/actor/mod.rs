//! The `Actor` trait and its per-call context.
//!
//! Every actor in this runtime handles the same [`crate::message::MessageKind`]
//! — there is no per-actor message type parameter, so none of these types
//! carry a generic `Message` bound the way a pub-sub broker design would.
//!
//! - `traits.rs` — [`Actor`], [`Behavior`], and [`ErrorAction`]
//! - `context.rs` — [`ActorContext`]

pub mod context;
pub mod traits;

pub use context::ActorContext;
pub use traits::{Actor, Behavior, BehaviorError, ErrorAction};
