use doq_client_application::ports::QueryObserver;
use doq_client_application::QueryContext;
use doq_client_domain::ServerAddr;
use std::time::SystemTime;
use tracing::debug;

/// Observer that reports each exchange as `tracing` debug events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingQueryObserver;

impl QueryObserver for TracingQueryObserver {
    fn on_query(
        &self,
        ctx: &QueryContext,
        server: &ServerAddr,
        raw_query: &[u8],
        _started_at: SystemTime,
    ) {
        debug!(
            server = %server,
            query_bytes = raw_query.len(),
            remaining_ms = ctx.remaining().map(|d| d.as_millis() as u64),
            "DoQ query dispatched"
        );
    }

    fn on_response(
        &self,
        _ctx: &QueryContext,
        server: &ServerAddr,
        started_at: SystemTime,
        raw_query: &[u8],
        raw_response: &[u8],
    ) {
        let elapsed_us = SystemTime::now()
            .duration_since(started_at)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);

        debug!(
            server = %server,
            query_bytes = raw_query.len(),
            response_bytes = raw_response.len(),
            elapsed_us,
            "DoQ response frame read"
        );
    }
}
