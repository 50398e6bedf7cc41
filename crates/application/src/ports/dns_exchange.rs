use crate::context::QueryContext;
use async_trait::async_trait;
use doq_client_domain::{DoqError, ServerAddr};
use hickory_proto::op::Message;

/// One query/response round trip against a single server.
///
/// Retry and fallback belong to callers; an implementation makes exactly one
/// attempt per call.
#[async_trait]
pub trait DnsExchange: Send + Sync {
    /// `query` may be normalized in place (e.g. its ID rewritten) before it is
    /// serialized.
    async fn exchange(
        &self,
        ctx: &QueryContext,
        server: &ServerAddr,
        query: &mut Message,
    ) -> Result<Message, DoqError>;

    fn protocol_name(&self) -> &'static str;
}
