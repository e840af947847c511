//! Remote actor transport.
//!
//! A length-prefixed bincode wire format carries `(target, id, kind)`
//! between `ActorSystem`s, with optional TLS. There is no persistent
//! connection pool and no correlated remote `ask`: every send opens a
//! fresh connection, and an actor that needs a reply across the wire
//! gets one by `tell`-ing back to an `ActorRef` it learned through an
//! explicit registration message (`RegisterWorker`, `GossipPeerJoin`,
//! ...), which already carries the sender's host and port.

pub mod codec;
pub mod connection;
pub mod errors;
pub mod listener;
pub mod tls;

pub use codec::{Frame, MAX_FRAME_BYTES};
pub use connection::send;
pub use errors::TransportError;
pub use listener::serve;
