//! DNS message wire codec
//!
//! Thin wrapper over `hickory-proto` binary encoding so transport code deals
//! in `DoqError` instead of `ProtoError`.

use doq_client_domain::DoqError;
use hickory_proto::op::Message;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};

pub struct MessageCodec;

impl MessageCodec {
    /// Serialize a Message to wire format bytes
    pub fn encode(message: &Message) -> Result<Vec<u8>, DoqError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DoqError::Encoding(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }

    /// Parse wire format bytes received from `server`
    pub fn decode(bytes: &[u8], server: &str) -> Result<Message, DoqError> {
        Message::from_vec(bytes).map_err(|e| DoqError::Decoding {
            server: server.to_string(),
            reason: e.to_string(),
        })
    }
}
