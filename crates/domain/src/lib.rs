//! DoQ Client Domain Layer
pub mod config;
pub mod errors;
pub mod server_addr;

pub use config::{
    CliOverrides, Config, ConfigError, DoqClientConfig, LogFormat, LoggingConfig, MessageFraming,
};
pub use errors::{DoqError, QueryPhase};
pub use server_addr::{split_host_port, ServerAddr, DOQ_DEFAULT_PORT};
