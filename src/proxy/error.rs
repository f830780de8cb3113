//! Proxy error taxonomy and its mapping onto HTTP responses.

use axum::http::{header::InvalidHeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::observability::metrics;

/// Body written when the caller did not name a target.
pub const MISSING_TARGET_BODY: &str = "X-Proxy-Url is not defined";

/// Errors raised while proxying a single request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No `X-Proxy-Url` header. Answered locally, not a server failure.
    #[error("X-Proxy-Url is not defined")]
    MissingTarget,

    /// Target URL could not be parsed or uses an unsupported scheme.
    #[error("Invalid target URL '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    /// Inbound body could not be buffered (too large or aborted).
    #[error("Request body rejected: {0}")]
    RequestBody(String),

    /// DNS, connect, or TLS failure reaching the target.
    #[error("Upstream connection failed: {0}")]
    UpstreamConnection(#[source] reqwest::Error),

    /// Target did not answer within the configured deadline.
    #[error("Upstream timed out: {0}")]
    UpstreamTimeout(#[source] reqwest::Error),

    /// Target answered with a status the client treats as an error.
    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { status: StatusCode, url: String },

    /// Malformed response or unusable redirect.
    #[error("Upstream protocol error: {0}")]
    UpstreamProtocol(String),

    /// Upstream body exceeded the cap.
    #[error("Upstream body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// A relayed value is not a valid header value.
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

/// Result type for proxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

impl ProxyError {
    /// Classify a reqwest failure.
    pub fn from_upstream(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProxyError::UpstreamTimeout(err)
        } else if err.is_connect() || err.is_request() || err.is_redirect() {
            ProxyError::UpstreamConnection(err)
        } else {
            ProxyError::UpstreamProtocol(err.to_string())
        }
    }

    /// Status code returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingTarget => StatusCode::OK,
            ProxyError::InvalidTarget { .. } => StatusCode::BAD_REQUEST,
            ProxyError::RequestBody(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::UpstreamConnection(_)
            | ProxyError::UpstreamStatus { .. }
            | ProxyError::UpstreamProtocol(_)
            | ProxyError::BodyTooLarge { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::InvalidHeader(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::MissingTarget => "missing_target",
            ProxyError::InvalidTarget { .. } => "invalid_target",
            ProxyError::RequestBody(_) => "request_body",
            ProxyError::UpstreamConnection(_) => "connection",
            ProxyError::UpstreamTimeout(_) => "timeout",
            ProxyError::UpstreamStatus { .. } => "status",
            ProxyError::UpstreamProtocol(_) => "protocol",
            ProxyError::BodyTooLarge { .. } => "body_too_large",
            ProxyError::InvalidHeader(_) => "invalid_header",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        if let ProxyError::MissingTarget = self {
            return MISSING_TARGET_BODY.into_response();
        }

        metrics::record_error(self.kind());
        let status = self.status();
        let body = match status {
            StatusCode::BAD_GATEWAY => "Upstream request failed".to_string(),
            StatusCode::GATEWAY_TIMEOUT => "Upstream request timed out".to_string(),
            _ => self.to_string(),
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_target_is_plain_ok() {
        let response = ProxyError::MissingTarget.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], MISSING_TARGET_BODY.as_bytes());
    }

    #[test]
    fn test_status_mapping() {
        let invalid = ProxyError::InvalidTarget {
            url: "ftp://x".into(),
            reason: "unsupported scheme".into(),
        };
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::BodyTooLarge { limit: 10 }.status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ProxyError::UpstreamStatus {
                status: StatusCode::NOT_FOUND,
                url: "http://x/".into()
            }
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ProxyError::RequestBody("too big".into()).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[tokio::test]
    async fn test_body_too_large_does_not_leak_payload() {
        let response = ProxyError::BodyTooLarge { limit: 10 }.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Upstream request failed");
    }
}
