pub mod dns;

pub use dns::QueryUpstreamUseCase;
