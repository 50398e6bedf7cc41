#![allow(dead_code)]

use async_trait::async_trait;
use doq_client_application::ports::DnsExchange;
use doq_client_application::QueryContext;
use doq_client_domain::{DoqError, QueryPhase, ServerAddr};
use hickory_proto::op::{Message, MessageType};
use std::sync::{Arc, Mutex};

/// Records every exchanged query and answers with a copy of it marked as a response.
#[derive(Clone, Default)]
pub struct MockDnsExchange {
    seen: Arc<Mutex<Vec<(ServerAddr, Message)>>>,
    failure: Arc<Mutex<Option<DoqError>>>,
}

impl MockDnsExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_with(error: DoqError) -> Self {
        let mock = Self::default();
        *mock.failure.lock().unwrap() = Some(error);
        mock
    }

    pub fn seen(&self) -> Vec<(ServerAddr, Message)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsExchange for MockDnsExchange {
    async fn exchange(
        &self,
        ctx: &QueryContext,
        server: &ServerAddr,
        query: &mut Message,
    ) -> Result<Message, DoqError> {
        if let Some(err) = ctx.err(QueryPhase::Start) {
            return Err(err);
        }
        self.seen
            .lock()
            .unwrap()
            .push((server.clone(), query.clone()));

        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }

        let mut response = query.clone();
        response.set_message_type(MessageType::Response);
        Ok(response)
    }

    fn protocol_name(&self) -> &'static str {
        "MOCK"
    }
}
