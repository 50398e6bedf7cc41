use crate::context::QueryContext;
use crate::ports::DnsExchange;
use doq_client_domain::{DoqError, ServerAddr};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

pub struct QueryUpstreamUseCase {
    exchange: Arc<dyn DnsExchange>,
}

impl QueryUpstreamUseCase {
    pub fn new(exchange: Arc<dyn DnsExchange>) -> Self {
        Self { exchange }
    }

    /// Build a recursive `name`/`record_type` query and run it against `server`.
    pub async fn execute(
        &self,
        ctx: &QueryContext,
        server: &ServerAddr,
        name: &str,
        record_type: RecordType,
    ) -> Result<Message, DoqError> {
        let mut query = Self::build_query(name, record_type)?;

        debug!(
            server = %server,
            name,
            record_type = %record_type,
            protocol = self.exchange.protocol_name(),
            "Querying upstream"
        );

        self.exchange.exchange(ctx, server, &mut query).await
    }

    pub fn build_query(name: &str, record_type: RecordType) -> Result<Message, DoqError> {
        let name = Name::from_str(name)
            .map_err(|e| DoqError::Encoding(format!("Invalid domain '{}': {}", name, e)))?;

        let mut query = Query::query(name, record_type);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new();
        message
            .set_id(fastrand::u16(..))
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true);
        message.add_query(query);

        Ok(message)
    }
}
