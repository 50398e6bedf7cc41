pub mod message_codec;
pub mod query_logger;
pub mod transport;

pub use message_codec::MessageCodec;
pub use query_logger::TracingQueryObserver;
