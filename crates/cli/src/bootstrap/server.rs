use doq_client_domain::{DoqError, ServerAddr, DOQ_DEFAULT_PORT};
use std::net::Ipv6Addr;

/// Parses a command-line server, appending the DoQ port when none is given.
pub fn parse_server(raw: &str, server_name: Option<&str>) -> Result<ServerAddr, DoqError> {
    let server: ServerAddr = match raw.parse() {
        Ok(server) => server,
        Err(_) if raw.parse::<Ipv6Addr>().is_ok() => {
            format!("[{}]:{}", raw, DOQ_DEFAULT_PORT).parse()?
        }
        Err(_) => format!("{}:{}", raw, DOQ_DEFAULT_PORT).parse()?,
    };

    Ok(match server_name {
        Some(name) => server.with_server_name(name),
        None => server,
    })
}
