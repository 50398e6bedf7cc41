mod dns_exchange;
mod query_observer;

pub use dns_exchange::DnsExchange;
pub use query_observer::{NoopQueryObserver, QueryObserver};
