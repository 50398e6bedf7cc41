use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How DNS messages are delimited on a DoQ stream.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MessageFraming {
    /// RFC 9250 §4.2: 2-octet big-endian length, then the message.
    #[default]
    LengthPrefixed,

    /// Pre-RFC drafts: bare message, delimited by the stream FIN.
    StreamDelimited,
}

impl MessageFraming {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LengthPrefixed => "length-prefixed",
            Self::StreamDelimited => "stream-delimited",
        }
    }
}

impl std::str::FromStr for MessageFraming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "length-prefixed" => Ok(Self::LengthPrefixed),
            "stream-delimited" => Ok(Self::StreamDelimited),
            other => Err(format!(
                "Invalid framing '{}'. Expected 'length-prefixed' or 'stream-delimited'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DoqClientConfig {
    /// Per-query budget in milliseconds, turned into a context deadline by the caller
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub framing: MessageFraming,

    /// Trust the Mozilla root set shipped with `webpki-roots`
    #[serde(default = "default_true")]
    pub use_webpki_roots: bool,

    /// Extra PEM bundle of trust anchors
    #[serde(default)]
    pub ca_file: Option<String>,
}

impl DoqClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DoqClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            framing: MessageFraming::default(),
            use_webpki_roots: true,
            ca_file: None,
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}
