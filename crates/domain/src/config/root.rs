use serde::{Deserialize, Serialize};

use super::client::{DoqClientConfig, MessageFraming};
use super::errors::ConfigError;
use super::logging::{LogFormat, LoggingConfig};

const LOCAL_CONFIG_PATH: &str = "doq-client.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/doq-client/config.toml";

/// Main configuration structure for the DoQ client
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Query transport configuration (timeout, framing, trust anchors)
    #[serde(default)]
    pub client: DoqClientConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. doq-client.toml in current directory
    /// 3. /etc/doq-client/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.client.timeout_ms = timeout_ms;
        }
        if let Some(framing) = overrides.framing {
            self.client.framing = framing;
        }
        if let Some(ca_file) = overrides.ca_file {
            self.client.ca_file = Some(ca_file);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "client.timeout_ms must be greater than 0".to_string(),
            ));
        }

        if !self.client.use_webpki_roots && self.client.ca_file.is_none() {
            return Err(ConfigError::Validation(
                "No trust anchors: enable client.use_webpki_roots or set client.ca_file"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub timeout_ms: Option<u64>,
    pub framing: Option<MessageFraming>,
    pub ca_file: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}
