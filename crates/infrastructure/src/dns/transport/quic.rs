use super::channel::EphemeralChannel;
use super::framing::{read_message, write_message};
use super::handshake::{build_tls_config, dial, DOQ_ALPN};
use super::resolver::{resolve_server, ResolvedServer};
use crate::dns::message_codec::MessageCodec;
use async_trait::async_trait;
use doq_client_application::ports::{DnsExchange, NoopQueryObserver, QueryObserver};
use doq_client_application::QueryContext;
use doq_client_domain::{DoqClientConfig, DoqError, MessageFraming, QueryPhase, ServerAddr};
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tracing::{debug, warn};

/// Application error codes for stream resets and connection close
/// (RFC 9250 §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DoqErrorCode {
    NoError = 0x0,
    InternalError = 0x1,
    ProtocolError = 0x2,
    RequestCancelled = 0x3,
    ExcessiveLoad = 0x4,
    UnspecifiedError = 0x5,
    ErrorReserved = 0xd098_ea5e,
}

impl DoqErrorCode {
    pub fn code(self) -> u32 {
        self as u32
    }

    fn reason(self) -> &'static [u8] {
        match self {
            Self::NoError => b"",
            Self::InternalError => b"internal error",
            Self::ProtocolError => b"protocol error",
            Self::RequestCancelled => b"request cancelled",
            Self::ExcessiveLoad => b"excessive load",
            Self::UnspecifiedError => b"unspecified error",
            Self::ErrorReserved => b"reserved",
        }
    }
}

impl From<DoqErrorCode> for quinn::VarInt {
    fn from(code: DoqErrorCode) -> Self {
        quinn::VarInt::from_u32(code.code())
    }
}

/// Connection plus the endpoint it runs on, owned by exactly one query.
/// Dropping it closes the connection with `NoError`; an earlier explicit
/// close keeps its own code.
struct QuicSession {
    connection: quinn::Connection,
    _channel: EphemeralChannel,
}

impl QuicSession {
    fn close(&self, code: DoqErrorCode) {
        self.connection.close(code.into(), code.reason());
    }
}

impl Drop for QuicSession {
    fn drop(&mut self) {
        self.close(DoqErrorCode::NoError);
    }
}

/// DNS-over-dedicated-QUIC client transport (RFC 9250).
///
/// Every query resolves the server, binds a fresh UDP socket, performs a full
/// handshake and uses a single bidirectional stream. Nothing is pooled.
pub struct QuicTransport {
    tls_config: Arc<rustls::ClientConfig>,
    framing: MessageFraming,
    observer: Arc<dyn QueryObserver>,
}

impl QuicTransport {
    pub fn new(config: &DoqClientConfig) -> Result<Self, DoqError> {
        let tls_config = build_tls_config(config)?;
        Ok(Self {
            tls_config: Arc::new(tls_config),
            framing: config.framing,
            observer: Arc::new(NoopQueryObserver),
        })
    }

    /// Uses a prepared TLS configuration. Its ALPN list is replaced by `doq`.
    pub fn with_tls_config(mut tls_config: rustls::ClientConfig) -> Self {
        tls_config.alpn_protocols = vec![DOQ_ALPN.to_vec()];
        Self {
            tls_config: Arc::new(tls_config),
            framing: MessageFraming::default(),
            observer: Arc::new(NoopQueryObserver),
        }
    }

    pub fn with_framing(mut self, framing: MessageFraming) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn QueryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Sends `query` to `server` and waits for the response.
    ///
    /// The ID of `query` is set to 0 before it is serialized, and the caller
    /// sees that change. A context that is already done fails before any
    /// socket is created.
    pub async fn query(
        &self,
        ctx: &QueryContext,
        server: &ServerAddr,
        query: &mut Message,
    ) -> Result<Message, DoqError> {
        if let Some(err) = ctx.err(QueryPhase::Start) {
            return Err(err);
        }

        query.set_id(0);
        let raw_query = MessageCodec::encode(query)?;

        let target = resolve_server(ctx, server).await?;

        if let Some(err) = ctx.err(QueryPhase::OpenChannel) {
            return Err(err);
        }
        let channel = EphemeralChannel::open(target.socket_addr)?;

        let started_at = SystemTime::now();
        let timer = Instant::now();
        self.observer.on_query(ctx, server, &raw_query, started_at);

        let connection = dial(ctx, &channel, &target, Arc::clone(&self.tls_config)).await?;
        let session = QuicSession {
            connection,
            _channel: channel,
        };

        let raw_response = self.exchange_on_stream(ctx, &session, &target, &raw_query).await?;

        self.observer
            .on_response(ctx, server, started_at, &raw_query, &raw_response);

        let peer = target.socket_addr.to_string();
        let response = match MessageCodec::decode(&raw_response, &peer) {
            Ok(response) => response,
            Err(e) => {
                session.close(DoqErrorCode::ProtocolError);
                return Err(e);
            }
        };

        if response.id() != 0 {
            warn!(server = %peer, id = response.id(), "DoQ response carried nonzero message ID");
            session.close(DoqErrorCode::ProtocolError);
            return Err(DoqError::Decoding {
                server: peer,
                reason: format!("response message ID must be 0, got {}", response.id()),
            });
        }

        if let Some(err) = ctx.err(QueryPhase::Decode) {
            return Err(err);
        }

        debug!(
            server = %peer,
            query_bytes = raw_query.len(),
            response_bytes = raw_response.len(),
            answers = response.answer_count(),
            elapsed_us = timer.elapsed().as_micros() as u64,
            "DoQ response received"
        );

        Ok(response)
    }

    /// Opens the query's only stream, writes and half-closes it, then reads
    /// one framed response.
    async fn exchange_on_stream(
        &self,
        ctx: &QueryContext,
        session: &QuicSession,
        target: &ResolvedServer,
        raw_query: &[u8],
    ) -> Result<Vec<u8>, DoqError> {
        let peer = target.socket_addr;

        let (mut send_stream, mut recv_stream) = ctx
            .run(QueryPhase::Send, session.connection.open_bi())
            .await?
            .map_err(|e| stream_error(peer, QueryPhase::Send, format!("open stream: {}", e)))?;

        match ctx
            .run(
                QueryPhase::Send,
                write_message(&mut send_stream, raw_query, self.framing),
            )
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(stream_error(peer, QueryPhase::Send, e.to_string())),
            Err(ctx_err) => {
                let _ = send_stream.reset(DoqErrorCode::RequestCancelled.into());
                return Err(ctx_err);
            }
        }

        send_stream.finish().map_err(|e| {
            stream_error(peer, QueryPhase::Send, format!("finish stream: {}", e))
        })?;

        debug!(
            server = %peer,
            bytes = raw_query.len(),
            framing = self.framing.as_str(),
            "DoQ query sent"
        );

        match ctx
            .run(
                QueryPhase::Receive,
                read_message(&mut recv_stream, self.framing),
            )
            .await
        {
            Ok(Ok(raw_response)) => Ok(raw_response),
            Ok(Err(e)) => Err(stream_error(peer, QueryPhase::Receive, e.to_string())),
            Err(ctx_err) => {
                let _ = recv_stream.stop(DoqErrorCode::RequestCancelled.into());
                debug!(server = %peer, phase = %ctx_err.phase(), "DoQ query abandoned");
                Err(ctx_err)
            }
        }
    }
}

fn stream_error(peer: SocketAddr, phase: QueryPhase, reason: String) -> DoqError {
    DoqError::Stream {
        server: peer.to_string(),
        phase,
        reason,
    }
}

#[async_trait]
impl DnsExchange for QuicTransport {
    async fn exchange(
        &self,
        ctx: &QueryContext,
        server: &ServerAddr,
        query: &mut Message,
    ) -> Result<Message, DoqError> {
        self.query(ctx, server, query).await
    }

    fn protocol_name(&self) -> &'static str {
        "QUIC"
    }
}
