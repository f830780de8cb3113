//! HTTP forward proxy endpoint.
//!
//! Replays GET/POST requests against the URL named in `X-Proxy-Url` and
//! relays a filtered view of the response back to the caller.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::ProxyHandler;
