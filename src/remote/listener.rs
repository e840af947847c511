//! Inbound transport: accept connections and deliver each frame straight
//! into the local actor registry.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;

use super::codec::read_frame;
use super::errors::TransportError;
use super::tls::server_acceptor;
use crate::message::Envelope;
use crate::system::actor_ref::SystemInternal;
use crate::system::config::TlsConfig;

/// Binds `bind_addr` and routes every inbound frame to `system` via
/// `deliver_local`, running until the process shuts down. Returns the
/// bound port (useful when `bind_addr`'s port is 0).
pub async fn serve(
    bind_addr: SocketAddr,
    tls: Option<TlsConfig>,
    system: Arc<dyn SystemInternal>,
) -> Result<u16, TransportError> {
    let listener = TcpListener::bind(bind_addr).await?;
    let port = listener.local_addr()?.port();
    let acceptor = match &tls {
        Some(tls) => Some(server_acceptor(tls)?),
        None => None,
    };

    tokio::spawn(async move {
        loop {
            let (stream, _peer) = match listener.accept().await {
                Ok(pair) => pair,
                Err(_) => continue,
            };
            let system = Arc::clone(&system);
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                match acceptor {
                    Some(acceptor) => {
                        if let Ok(tls_stream) = acceptor.accept(stream).await {
                            handle_connection(tls_stream, system).await;
                        }
                    }
                    None => handle_connection(stream, system).await,
                }
            });
        }
    });

    Ok(port)
}

async fn handle_connection<S>(mut stream: S, system: Arc<dyn SystemInternal>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        match read_frame(&mut stream).await {
            Ok(Some(frame)) => {
                let envelope = Envelope {
                    id: frame.id,
                    sender: None,
                    kind: frame.kind,
                    timestamp: Utc::now(),
                };
                let _ = system.deliver_local(&frame.target, envelope).await;
            }
            Ok(None) | Err(_) => break,
        }
    }
}
