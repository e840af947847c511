//! Errors from the autonomous gossip peer protocol.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GossipError {
    /// A configured seed peer's `"host:port"` string did not parse as a
    /// socket address.
    #[error("invalid seed peer address: {0}")]
    InvalidSeedAddr(String),
}
