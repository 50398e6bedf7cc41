use crate::context::QueryContext;
use doq_client_domain::ServerAddr;
use std::time::SystemTime;

/// Side-effect-only hooks around a single query exchange.
///
/// Implementations must not block: they run inline on the query task.
pub trait QueryObserver: Send + Sync {
    /// Called with the serialized query right before the connection is dialed.
    fn on_query(
        &self,
        ctx: &QueryContext,
        server: &ServerAddr,
        raw_query: &[u8],
        started_at: SystemTime,
    );

    /// Called with the raw response frame before it is parsed.
    fn on_response(
        &self,
        _ctx: &QueryContext,
        _server: &ServerAddr,
        _started_at: SystemTime,
        _raw_query: &[u8],
        _raw_response: &[u8],
    ) {
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopQueryObserver;

impl QueryObserver for NoopQueryObserver {
    fn on_query(&self, _: &QueryContext, _: &ServerAddr, _: &[u8], _: SystemTime) {}
}
