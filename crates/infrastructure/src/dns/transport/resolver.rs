use doq_client_application::QueryContext;
use doq_client_domain::{DoqError, QueryPhase, ServerAddr};
use std::net::{IpAddr, SocketAddr};
use tracing::debug;

/// UDP target of a query plus the name to verify the server certificate against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedServer {
    pub socket_addr: SocketAddr,
    pub server_name: String,
}

/// Turns a textual `host:port` into a UDP endpoint. IP literals skip the
/// system resolver; hostnames use the first address it returns.
pub async fn resolve_server(
    ctx: &QueryContext,
    server: &ServerAddr,
) -> Result<ResolvedServer, DoqError> {
    let (host, port) = server.split_host_port()?;
    let server_name = server.tls_server_name()?.to_string();

    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ResolvedServer {
            socket_addr: SocketAddr::new(ip, port),
            server_name,
        });
    }

    let resolution_error = |reason: String| DoqError::AddressResolution {
        address: server.address().to_string(),
        reason,
    };

    let mut addrs = ctx
        .run(QueryPhase::Resolve, tokio::net::lookup_host((host, port)))
        .await?
        .map_err(|e| resolution_error(format!("DNS resolution failed: {}", e)))?;

    let socket_addr = addrs
        .next()
        .ok_or_else(|| resolution_error("No addresses found".to_string()))?;

    debug!(
        server = %server,
        resolved = %socket_addr,
        "Resolved DoQ server address"
    );

    Ok(ResolvedServer {
        socket_addr,
        server_name,
    })
}
