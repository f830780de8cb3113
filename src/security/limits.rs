//! Request and response size limits.
//!
//! # Responsibilities
//! - Cap the upstream response body read back by the proxy
//! - Cap the inbound form body buffered for parameter extraction
//!
//! # Design Decisions
//! - A declared Content-Length above the cap is rejected before reading
//! - Streamed bodies abort as soon as the running total crosses the cap
//! - Oversized bodies are an error, never silently truncated

use axum::body::{Body, Bytes};

use crate::proxy::error::ProxyError;

/// Largest upstream response body relayed to the caller (10 MiB).
pub const MAX_RESPONSE_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Default cap on an inbound request body (2 MiB).
pub const DEFAULT_MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Read an upstream response body, failing once it exceeds `limit` bytes.
pub async fn read_capped_body(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Bytes, ProxyError> {
    if let Some(declared) = response.content_length() {
        if declared > limit as u64 {
            return Err(ProxyError::BodyTooLarge { limit });
        }
    }

    let mut buf = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    while let Some(chunk) = response.chunk().await.map_err(ProxyError::from_upstream)? {
        if buf.len() + chunk.len() > limit {
            return Err(ProxyError::BodyTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(buf))
}

/// Buffer an inbound request body up to `limit` bytes.
pub async fn read_request_body(body: Body, limit: usize) -> Result<Bytes, ProxyError> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| ProxyError::RequestBody(e.to_string()))
}
