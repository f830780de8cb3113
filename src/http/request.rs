//! Inbound request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for tracing
//! - Resolve the target URL from `X-Proxy-Url`
//! - Collect cookies and parameters (query string + form body)
//!
//! # Design Decisions
//! - Header lookups go through `HeaderMap`, so names are case-insensitive
//! - Parameters keep first-appearance key order and every repeated value
//! - Form bodies are only parsed for POST with a urlencoded content type

use axum::http::{header, request::Parts, HeaderMap, HeaderValue, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::security::cookies::parse_cookie_header;
use crate::security::headers::X_PROXY_URL;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Request ID generator backed by UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Read the request ID assigned by the request-id layer.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Ordered multi-valued parameter map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, Vec<String>)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `key`, creating the key on first use.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Append every pair of an urlencoded string.
    pub fn extend_urlencoded(&mut self, input: &[u8]) {
        for (key, value) in url::form_urlencoded::parse(input) {
            self.append(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `(key, value)` pair per value, preserving order.
    pub fn flatten(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.clone(), v.clone())))
            .collect()
    }
}

/// Inbound request as seen by the proxy handler.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    /// Value of `X-Proxy-Url`, `None` when absent or blank.
    pub target: Option<String>,
    pub headers: HeaderMap,
    /// Cookies in the order sent, duplicates preserved.
    pub cookies: Vec<(String, String)>,
    pub params: Parameters,
}

impl IncomingRequest {
    /// Build from request parts and the buffered body.
    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        let target = parts
            .headers
            .get(X_PROXY_URL)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let cookies = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(parse_cookie_header)
            .collect();

        let mut params = Parameters::new();
        if let Some(query) = parts.uri.query() {
            params.extend_urlencoded(query.as_bytes());
        }
        if parts.method == Method::POST && is_form(&parts.headers) {
            params.extend_urlencoded(body);
        }

        Self {
            method: parts.method.clone(),
            target,
            headers: parts.headers.clone(),
            cookies,
            params,
        }
    }

    /// Whether the body has to be buffered to extract parameters.
    pub fn needs_body(parts: &Parts) -> bool {
        parts.method == Method::POST && is_form(&parts.headers)
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case(FORM_URLENCODED))
        .unwrap_or(false)
}
