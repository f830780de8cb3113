//! Proxy handler.
//!
//! # Data Flow
//! ```text
//! IncomingRequest
//!     → target resolution (X-Proxy-Url, short-circuit when missing)
//!     → outbound.rs (filtered headers/cookies, flattened data)
//!     → upstream.rs (send, follow redirects, cap body)
//!     → http::response (filtered relay + X-Location)
//!     → OutgoingResponse
//! ```
//!
//! # Design Decisions
//! - Stateless: each request is handled in isolation by its own task
//! - No retries; one upstream failure is one downstream failure
//! - Dropping the handler future (caller disconnect, inbound timeout) drops
//!   the in-flight upstream call

pub mod error;
pub mod outbound;
pub mod upstream;

use axum::body::Body;
use axum::http::Response;

use crate::http::request::IncomingRequest;
use crate::http::response::relay_response;
use crate::proxy::error::{ProxyError, ProxyResult};
use crate::proxy::outbound::OutboundRequest;
use crate::proxy::upstream::UpstreamClient;

pub use error::MISSING_TARGET_BODY;

/// Replays inbound requests against the URL named in `X-Proxy-Url`.
#[derive(Clone)]
pub struct ProxyHandler {
    client: UpstreamClient,
    max_body_size: usize,
}

impl ProxyHandler {
    pub fn new(client: UpstreamClient, max_body_size: usize) -> Self {
        Self {
            client,
            max_body_size,
        }
    }

    /// Proxy one request.
    ///
    /// Returns [`ProxyError::MissingTarget`] without touching the network when
    /// the caller did not name a target.
    pub async fn handle(&self, incoming: IncomingRequest) -> ProxyResult<Response<Body>> {
        let target = incoming.target.as_deref().ok_or(ProxyError::MissingTarget)?;

        let outbound = OutboundRequest::build(target, &incoming, self.max_body_size)?;
        tracing::debug!(
            method = %outbound.method,
            target = %outbound.url,
            headers = outbound.headers.len(),
            cookies = outbound.cookies.len(),
            data = outbound.data.len(),
            "Outbound request built"
        );

        let upstream = self.client.execute(outbound).await?;
        tracing::debug!(
            status = %upstream.status,
            final_url = %upstream.url,
            bytes = upstream.body.len(),
            "Upstream responded"
        );

        relay_response(upstream)
    }
}
