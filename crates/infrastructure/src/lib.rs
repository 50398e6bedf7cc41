//! DoQ Client Infrastructure Layer
pub mod dns;

pub use dns::transport::handshake::install_crypto_provider;
pub use dns::transport::{DoqErrorCode, QuicTransport};
pub use dns::TracingQueryObserver;
