pub mod channel;
pub mod framing;
pub mod handshake;
pub mod quic;
pub mod resolver;

pub use channel::EphemeralChannel;
pub use quic::{DoqErrorCode, QuicTransport};
pub use resolver::{resolve_server, ResolvedServer};
