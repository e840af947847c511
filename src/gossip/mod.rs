//! Autonomous gossip-based federated learning: peers train locally and
//! exchange CRDT-merged model state with a random fanout of neighbors, with
//! no coordinator.
//!
//! - `peer.rs` — [`GossipPeerActor`], the training/gossip/membership loop
//! - `observer.rs` — [`ObserverActor`], a passive summary listener
//! - `errors.rs` — [`GossipError`]

pub mod errors;
pub mod observer;
pub mod peer;

pub use errors::GossipError;
pub use observer::{ObserverActor, PeerView};
pub use peer::GossipPeerActor;
