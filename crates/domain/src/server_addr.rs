use crate::errors::DoqError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Default DoQ port (RFC 9250 §4.1.1). `ServerAddr` parsing never fills it in.
pub const DOQ_DEFAULT_PORT: u16 = 853;

/// A DNS-over-QUIC resolver endpoint, as a textual `host:port` address.
///
/// The address is kept verbatim and only split/resolved when a query runs, so
/// a `ServerAddr` naming a hostname follows DNS changes between queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerAddr {
    address: Arc<str>,
    server_name: Option<Arc<str>>,
}

impl ServerAddr {
    pub fn new(address: impl Into<Arc<str>>) -> Self {
        Self {
            address: address.into(),
            server_name: None,
        }
    }

    /// Overrides the name used for TLS SNI and certificate verification.
    pub fn with_server_name(mut self, server_name: impl Into<Arc<str>>) -> Self {
        self.server_name = Some(server_name.into());
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn server_name_override(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    pub fn split_host_port(&self) -> Result<(&str, u16), DoqError> {
        split_host_port(&self.address).map_err(|reason| DoqError::AddressResolution {
            address: self.address.to_string(),
            reason,
        })
    }

    /// Name presented to the server during the TLS handshake: the override
    /// when set, otherwise the bare host part of the address.
    pub fn tls_server_name(&self) -> Result<&str, DoqError> {
        match self.server_name.as_deref() {
            Some(name) => Ok(name),
            None => self.split_host_port().map(|(host, _)| host),
        }
    }
}

/// Splits `host:port` or `[v6-host]:port`.
pub fn split_host_port(s: &str) -> Result<(&str, u16), String> {
    let (host, port_str) = if let Some(rest) = s.strip_prefix('[') {
        let end = rest
            .find(']')
            .ok_or_else(|| format!("missing ']' in address '{}'", s))?;
        let host = &rest[..end];
        let port_str = rest[end + 1..]
            .strip_prefix(':')
            .ok_or_else(|| format!("missing port in address '{}'", s))?;
        (host, port_str)
    } else {
        let (host, port_str) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("missing port in address '{}'", s))?;
        if host.contains(':') {
            return Err(format!("too many colons in address '{}'", s));
        }
        (host, port_str)
    };

    if host.is_empty() {
        return Err(format!("missing host in address '{}'", s));
    }
    let port = port_str
        .parse::<u16>()
        .map_err(|e| format!("invalid port '{}' in address '{}': {}", port_str, s, e))?;
    Ok((host, port))
}

impl FromStr for ServerAddr {
    type Err = DoqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let address = s
            .strip_prefix("doq://")
            .or_else(|| s.strip_prefix("quic://"))
            .unwrap_or(s);
        split_host_port(address).map_err(|reason| DoqError::AddressResolution {
            address: s.to_string(),
            reason,
        })?;
        Ok(Self::new(address))
    }
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.server_name {
            Some(name) => write!(f, "doq://{} ({})", self.address, name),
            None => write!(f, "doq://{}", self.address),
        }
    }
}
