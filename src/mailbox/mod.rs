//! A single bounded-mailbox design: one FIFO queue per actor, default
//! capacity 1000, backpressure always applied by blocking the sender.
//! There is no configurable strategy or pluggable metrics recorder here
//! — this runtime only ever needs the one behavior.

pub mod bounded;
pub mod traits;

pub use bounded::{channel, Mailbox, MailboxSender};
pub use traits::MailboxError;

/// Mailbox capacity used when a caller does not specify one.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 1000;
