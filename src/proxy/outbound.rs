//! Outbound request construction.
//!
//! Turns an [`IncomingRequest`] into the request replayed against the target:
//! same method, filtered headers and cookies, flattened parameters.

use axum::http::{header, HeaderMap, HeaderValue, Method};
use url::Url;

use crate::http::request::IncomingRequest;
use crate::proxy::error::{ProxyError, ProxyResult};
use crate::security::cookies::{is_restricted_cookie, CookieJar};
use crate::security::headers::{is_restricted_request_header, is_transport_header};

/// Content type of a re-encoded form body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Request issued to the target server.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: Url,
    pub method: Method,
    pub headers: HeaderMap,
    pub cookies: CookieJar,
    /// Form/query payload, one entry per parameter value.
    pub data: Vec<(String, String)>,
    /// Largest response body accepted back.
    pub max_body_size: usize,
}

impl OutboundRequest {
    /// Build the outbound request for `target` from the inbound request.
    pub fn build(
        target: &str,
        incoming: &IncomingRequest,
        max_body_size: usize,
    ) -> ProxyResult<Self> {
        let url = parse_target(target)?;

        let mut cookies = CookieJar::new();
        for (name, value) in &incoming.cookies {
            if !is_restricted_cookie(name) {
                cookies.set(name.as_str(), value.as_str());
            }
        }

        // One entry per name, first value wins. Includes x-request-id, whether
        // the caller sent it or the request-id layer generated it.
        let mut headers = HeaderMap::new();
        for name in incoming.headers.keys() {
            if is_restricted_request_header(name) || is_transport_header(name) {
                continue;
            }
            if let Some(value) = incoming.headers.get(name) {
                headers.insert(name.clone(), value.clone());
            }
        }

        Ok(Self {
            url,
            method: incoming.method.clone(),
            headers,
            cookies,
            data: incoming.params.flatten(),
            max_body_size,
        })
    }

    /// Whether the data is sent as a form body rather than in the query.
    pub fn sends_body(&self) -> bool {
        self.method != Method::GET && self.method != Method::HEAD
    }

    /// Target URL with data appended to the query for bodiless methods.
    pub fn request_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.sends_body() && !self.data.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.data);
        }
        url
    }

    /// Headers sent on the wire: the forwarded set, with the form content
    /// type replacing any forwarded one when a form body is sent.
    pub fn request_headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone();
        if self.form_body().is_some() {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(FORM_CONTENT_TYPE),
            );
        }
        headers
    }

    /// Replay as a GET without data, as after a 301/302/303.
    pub fn downgrade_to_get(&mut self) {
        self.method = Method::GET;
        self.data.clear();
        self.headers.remove(header::CONTENT_TYPE);
    }

    /// Urlencoded form body, if the method carries one and there is data.
    pub fn form_body(&self) -> Option<String> {
        if !self.sends_body() || self.data.is_empty() {
            return None;
        }
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.data)
            .finish();
        Some(encoded)
    }
}

/// Parse an absolute http(s) target URL.
pub fn parse_target(target: &str) -> ProxyResult<Url> {
    let url = Url::parse(target).map_err(|e| ProxyError::InvalidTarget {
        url: target.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ProxyError::InvalidTarget {
            url: target.to_string(),
            reason: format!("unsupported scheme '{scheme}'"),
        }),
    }
}
