//! Per-query UDP socket wrapped in its own QUIC endpoint.
//!
//! Nothing here is pooled: every query binds a fresh ephemeral port and the
//! endpoint goes away with the query.

use doq_client_domain::DoqError;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tracing::debug;

pub struct EphemeralChannel {
    endpoint: quinn::Endpoint,
    local_addr: SocketAddr,
}

impl EphemeralChannel {
    /// Binds an unspecified-address, OS-assigned-port socket of the same
    /// family as `remote`. Must be called from within a Tokio runtime.
    pub fn open(remote: SocketAddr) -> Result<Self, DoqError> {
        let socket = bind_ephemeral_socket(&remote)
            .map_err(|e| DoqError::ChannelOpen(format!("Failed to bind UDP socket: {}", e)))?;

        let local_addr = socket.local_addr().map_err(|e| {
            DoqError::ChannelOpen(format!("Failed to read UDP socket address: {}", e))
        })?;

        let endpoint = quinn::Endpoint::new(
            quinn::EndpointConfig::default(),
            None,
            socket,
            Arc::new(quinn::TokioRuntime),
        )
        .map_err(|e| DoqError::ChannelOpen(format!("Failed to create QUIC endpoint: {}", e)))?;

        debug!(local = %local_addr, remote = %remote, "Ephemeral QUIC channel opened");

        Ok(Self {
            endpoint,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub(crate) fn endpoint(&self) -> &quinn::Endpoint {
        &self.endpoint
    }
}

fn bind_ephemeral_socket(remote: &SocketAddr) -> io::Result<std::net::UdpSocket> {
    use socket2::{Domain, Protocol, Socket, Type};

    let socket = Socket::new(
        Domain::for_address(*remote),
        Type::DGRAM,
        Some(Protocol::UDP),
    )?;

    let bind_addr = if remote.is_ipv4() {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
    };

    socket.bind(&bind_addr.into())?;
    socket.set_nonblocking(true)?;

    Ok(socket.into())
}
