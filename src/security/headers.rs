//! Header filter tables.
//!
//! # Responsibilities
//! - Deny-list for inbound headers that must never reach the target
//! - Allow-list for upstream headers that may be relayed to the caller
//! - Transport headers the upstream client owns and computes itself
//!
//! # Design Decisions
//! - Header names are compared in lower case. `http::HeaderName` is always
//!   lower-cased on ingestion, so the deny-list literals match as-is and the
//!   allow-list is folded before comparison.
//! - Inbound is a strict deny-list, outbound a strict allow-list.

use axum::http::HeaderName;

/// Name of the inbound header carrying the absolute target URL.
pub const X_PROXY_URL: &str = "x-proxy-url";

/// Synthetic response header exposing the final (post-redirect) upstream URL.
pub const X_LOCATION: &str = "x-location";

/// Upstream response headers relayed to the caller.
pub const ALLOWED_RESPONSE_HEADERS: &[&str] = &["Content-Type"];

/// Inbound headers never forwarded to the target.
pub const RESTRICTED_REQUEST_HEADERS: &[&str] = &["cookie", "host", X_PROXY_URL];

/// Headers the upstream client derives from the outbound request it builds.
/// Copying the inbound values would describe a body that is no longer sent.
pub const TRANSPORT_HEADERS: &[&str] = &[
    "content-length",
    "transfer-encoding",
    "connection",
    "keep-alive",
    "upgrade",
    "te",
    "trailer",
    "accept-encoding",
];

/// Returns true if an inbound header must not be sent upstream.
pub fn is_restricted_request_header(name: &HeaderName) -> bool {
    RESTRICTED_REQUEST_HEADERS.contains(&name.as_str())
}

/// Returns true if the upstream client manages this header itself.
pub fn is_transport_header(name: &HeaderName) -> bool {
    TRANSPORT_HEADERS.contains(&name.as_str())
}

/// Returns true if an upstream response header may be relayed downstream.
pub fn is_allowed_response_header(name: &HeaderName) -> bool {
    ALLOWED_RESPONSE_HEADERS
        .iter()
        .any(|allowed| name.as_str().eq_ignore_ascii_case(allowed))
}
