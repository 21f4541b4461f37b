//! Clients for services reached over the network.

mod http;
mod mock;

pub use http::HttpCartProvider;
pub use mock::MockCartProvider;
