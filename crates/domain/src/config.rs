mod client;
mod errors;
mod logging;
mod root;

pub use client::{DoqClientConfig, MessageFraming};
pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
