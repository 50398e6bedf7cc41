//! TLS and QUIC parameters for DoQ, and the dial itself.

use super::channel::EphemeralChannel;
use super::resolver::ResolvedServer;
use doq_client_application::QueryContext;
use doq_client_domain::{DoqClientConfig, DoqError, QueryPhase};
use std::sync::Arc;
use tracing::debug;

/// ALPN token for DNS-over-QUIC (RFC 9250 §4.1.1).
pub const DOQ_ALPN: &[u8] = b"doq";

/// Installs the aws-lc-rs provider as the process default. Safe to call
/// repeatedly; later calls are no-ops.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Builds the client TLS configuration: trust anchors from `config`, ALPN `doq`.
pub fn build_tls_config(config: &DoqClientConfig) -> Result<rustls::ClientConfig, DoqError> {
    install_crypto_provider();

    let mut root_store = rustls::RootCertStore::empty();
    if config.use_webpki_roots {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }
    if let Some(path) = &config.ca_file {
        load_ca_file(&mut root_store, path)?;
    }
    if root_store.is_empty() {
        return Err(DoqError::Config("No trust anchors configured".to_string()));
    }

    let mut tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    tls_config.alpn_protocols = vec![DOQ_ALPN.to_vec()];

    Ok(tls_config)
}

fn load_ca_file(root_store: &mut rustls::RootCertStore, path: &str) -> Result<(), DoqError> {
    let pem = std::fs::read(path)
        .map_err(|e| DoqError::Config(format!("Failed to read CA file {}: {}", path, e)))?;

    let mut reader = std::io::BufReader::new(pem.as_slice());
    let mut added = 0usize;
    for cert in rustls_pemfile::certs(&mut reader) {
        let cert = cert
            .map_err(|e| DoqError::Config(format!("Invalid PEM in CA file {}: {}", path, e)))?;
        root_store.add(cert).map_err(|e| {
            DoqError::Config(format!("Rejected CA certificate from {}: {}", path, e))
        })?;
        added += 1;
    }

    if added == 0 {
        return Err(DoqError::Config(format!(
            "No certificates found in CA file {}",
            path
        )));
    }

    debug!(path, certificates = added, "Loaded extra trust anchors");
    Ok(())
}

/// Default QUIC transport parameters over the given TLS configuration.
fn quic_client_config(tls_config: Arc<rustls::ClientConfig>) -> Result<quinn::ClientConfig, String> {
    let crypto = quinn::crypto::rustls::QuicClientConfig::try_from(tls_config)
        .map_err(|e| format!("TLS configuration unusable for QUIC: {}", e))?;
    Ok(quinn::ClientConfig::new(Arc::new(crypto)))
}

/// Dials `target` over `channel`. Only the handshake itself is bounded by
/// `ctx`; the caller owns the connection afterwards.
pub async fn dial(
    ctx: &QueryContext,
    channel: &EphemeralChannel,
    target: &ResolvedServer,
    tls_config: Arc<rustls::ClientConfig>,
) -> Result<quinn::Connection, DoqError> {
    let handshake_error = |reason: String| DoqError::Handshake {
        server: target.socket_addr.to_string(),
        reason,
    };

    let client_config = quic_client_config(tls_config).map_err(handshake_error)?;

    let connecting = channel
        .endpoint()
        .connect_with(client_config, target.socket_addr, &target.server_name)
        .map_err(|e| handshake_error(format!("Failed to initiate QUIC connection: {}", e)))?;

    let connection = ctx
        .run(QueryPhase::Handshake, connecting)
        .await?
        .map_err(|e| handshake_error(e.to_string()))?;

    debug!(
        server = %target.socket_addr,
        server_name = %target.server_name,
        local = %channel.local_addr(),
        "QUIC connection established"
    );

    Ok(connection)
}
