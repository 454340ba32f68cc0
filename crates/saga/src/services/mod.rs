//! External provider gateway consumed by order placement.

pub mod http;
pub mod provider;

pub use http::HttpProviderGateway;
pub use provider::{
    AddOrder, InMemoryProviderGateway, ProviderBehavior, ProviderError, ProviderGateway,
};
