use std::fmt;
use thiserror::Error;

/// Step of a single DNS-over-QUIC exchange, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryPhase {
    Start,
    Encode,
    Resolve,
    OpenChannel,
    Handshake,
    Send,
    Receive,
    Decode,
}

impl QueryPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Encode => "encode",
            Self::Resolve => "resolve",
            Self::OpenChannel => "open-channel",
            Self::Handshake => "handshake",
            Self::Send => "send",
            Self::Receive => "receive",
            Self::Decode => "decode",
        }
    }
}

impl fmt::Display for QueryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DoqError {
    #[error("Failed to resolve server address {address}: {reason}")]
    AddressResolution { address: String, reason: String },

    #[error("Failed to open QUIC channel: {0}")]
    ChannelOpen(String),

    #[error("QUIC handshake with {server} failed: {reason}")]
    Handshake { server: String, reason: String },

    #[error("Failed to encode DNS query: {0}")]
    Encoding(String),

    #[error("QUIC stream error with {server} during {phase}: {reason}")]
    Stream {
        server: String,
        phase: QueryPhase,
        reason: String,
    },

    #[error("Failed to decode DNS response from {server}: {reason}")]
    Decoding { server: String, reason: String },

    #[error("Query canceled during {phase}")]
    Canceled { phase: QueryPhase },

    #[error("Query deadline exceeded during {phase}")]
    DeadlineExceeded { phase: QueryPhase },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DoqError {
    /// The step that produced this error.
    pub fn phase(&self) -> QueryPhase {
        match self {
            Self::AddressResolution { .. } => QueryPhase::Resolve,
            Self::ChannelOpen(_) => QueryPhase::OpenChannel,
            Self::Handshake { .. } => QueryPhase::Handshake,
            Self::Encoding(_) => QueryPhase::Encode,
            Self::Stream { phase, .. } => *phase,
            Self::Decoding { .. } => QueryPhase::Decode,
            Self::Canceled { phase } | Self::DeadlineExceeded { phase } => *phase,
            Self::Config(_) => QueryPhase::Start,
        }
    }

    pub fn is_context_error(&self) -> bool {
        matches!(self, Self::Canceled { .. } | Self::DeadlineExceeded { .. })
    }
}
