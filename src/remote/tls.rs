//! TLS configuration for the remote transport, built on `tokio-rustls`.

use std::sync::Arc;
use std::time::SystemTime;

use tokio_rustls::rustls::client::{ServerCertVerified, ServerCertVerifier};
use tokio_rustls::rustls::{Certificate, ClientConfig, Error as RustlsError, PrivateKey, RootCertStore, ServerConfig, ServerName};
use tokio_rustls::TlsAcceptor;

use super::errors::TransportError;
use crate::system::config::TlsConfig;

/// Accepts any server certificate. Used only when
/// `TlsConfig::insecure_skip_verify` is set, for local demos and test
/// harnesses where issuing a real chain is impractical.
struct NoServerVerification;

impl ServerCertVerifier for NoServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }
}

fn load_certs(path: &std::path::Path) -> Result<Vec<Certificate>, TransportError> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let certs = rustls_pemfile::certs(&mut reader)
        .map_err(|_| TransportError::Tls(format!("invalid certificate file: {}", path.display())))?;
    Ok(certs.into_iter().map(Certificate).collect())
}

fn load_private_key(path: &std::path::Path) -> Result<PrivateKey, TransportError> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let mut keys = rustls_pemfile::pkcs8_private_keys(&mut reader)
        .map_err(|_| TransportError::Tls(format!("invalid private key file: {}", path.display())))?;
    let key = keys
        .pop()
        .ok_or_else(|| TransportError::Tls(format!("no private key found in {}", path.display())))?;
    Ok(PrivateKey(key))
}

pub(super) fn client_config(tls: &TlsConfig) -> Result<ClientConfig, TransportError> {
    let builder = ClientConfig::builder().with_safe_defaults();
    let config = if tls.insecure_skip_verify {
        builder
            .with_custom_certificate_verifier(Arc::new(NoServerVerification))
            .with_no_client_auth()
    } else {
        let mut roots = RootCertStore::empty();
        if let Some(ca_path) = &tls.ca_path {
            for cert in load_certs(ca_path)? {
                roots
                    .add(&cert)
                    .map_err(|e| TransportError::Tls(e.to_string()))?;
            }
        }
        builder.with_root_certificates(roots).with_no_client_auth()
    };
    Ok(config)
}

fn server_config(tls: &TlsConfig) -> Result<ServerConfig, TransportError> {
    let certs = load_certs(&tls.cert_path)?;
    let key = load_private_key(&tls.key_path)?;
    ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| TransportError::Tls(e.to_string()))
}

pub fn server_acceptor(tls: &TlsConfig) -> Result<TlsAcceptor, TransportError> {
    Ok(TlsAcceptor::from(Arc::new(server_config(tls)?)))
}
