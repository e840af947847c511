//! Errors from the wire transport.

use thiserror::Error;

/// Errors produced while sending or receiving frames over the wire.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode or decode a frame: {0}")]
    Codec(#[from] bincode::Error),

    #[error("frame of {0} bytes exceeds the maximum frame size")]
    FrameTooLarge(usize),

    #[error("tls error: {0}")]
    Tls(String),
}
