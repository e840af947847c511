//! Outbound delivery: one TCP (optionally TLS) connection per send.
//!
//! There is no persistent connection pool. Every remote send pays a
//! fresh handshake, which is the simplest correct behavior for the
//! message volumes this runtime targets — supervised health checks,
//! federated-learning round messages, and gossip exchanges on the order
//! of seconds, not a request-per-millisecond RPC workload.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::rustls::ServerName;
use tokio_rustls::TlsConnector;

use super::codec::{write_frame, Frame};
use super::errors::TransportError;
use super::tls::client_config;
use crate::message::MessageKind;
use crate::system::config::TlsConfig;
use crate::util::{ActorId, MessageId};

pub async fn send(
    addr: SocketAddr,
    target: &ActorId,
    id: MessageId,
    kind: MessageKind,
    tls: Option<&TlsConfig>,
) -> Result<(), TransportError> {
    let stream = TcpStream::connect(addr).await?;
    let frame = Frame {
        target: target.clone(),
        id,
        kind,
    };

    match tls {
        Some(tls_config) => {
            let config = client_config(tls_config)?;
            let connector = TlsConnector::from(Arc::new(config));
            let server_name = ServerName::try_from(addr.ip().to_string().as_str())
                .map_err(|_| TransportError::Tls("invalid server name".to_string()))?;
            let mut tls_stream = connector.connect(server_name, stream).await?;
            write_frame(&mut tls_stream, &frame).await
        }
        None => {
            let mut stream = stream;
            write_frame(&mut stream, &frame).await
        }
    }
}
