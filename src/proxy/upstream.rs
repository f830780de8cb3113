//! Upstream execution.
//!
//! # Responsibilities
//! - Send the outbound request to the target
//! - Follow redirects, carrying cookies across hops
//! - Enforce the status policy and the response body cap
//!
//! # Design Decisions
//! - reqwest's own redirect handling is off so cookies set on intermediate
//!   hops can be carried forward and relayed
//! - No cookie store and no idle pooling: nothing outlives one request
//! - 301/302/303 switch to GET and drop the data; 307/308 replay as-is

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use std::time::Duration;
use url::Url;

use crate::config::ProxyConfig;
use crate::observability::metrics;
use crate::proxy::error::{ProxyError, ProxyResult};
use crate::proxy::outbound::OutboundRequest;
use crate::security::cookies::{is_restricted_cookie, parse_set_cookie, CookieJar};
use crate::security::limits::read_capped_body;

/// Response read back from the target.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// Final resolved URL, after redirects.
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Cookies set by the final response and every redirect hop before it.
    pub cookies: CookieJar,
    pub body: Bytes,
}

/// HTTP client used for every outbound call.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    follow_redirects: bool,
    max_redirects: u32,
    relay_error_status: bool,
}

impl UpstreamClient {
    /// Build the client from configuration.
    pub fn new(config: &ProxyConfig) -> ProxyResult<Self> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .timeout(Duration::from_secs(config.timeouts.upstream_secs))
            .pool_max_idle_per_host(0);
        if !config.upstream.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(ProxyError::from_upstream)?;

        Ok(Self {
            client,
            follow_redirects: config.upstream.follow_redirects,
            max_redirects: config.upstream.max_redirects,
            relay_error_status: config.upstream.relay_error_status,
        })
    }

    /// Execute the outbound request and read the full response.
    pub async fn execute(&self, mut request: OutboundRequest) -> ProxyResult<UpstreamResponse> {
        let mut collected = CookieJar::new();
        let mut hops = 0u32;

        loop {
            let response = self.send(&request).await?;
            let status = response.status();
            let hop_cookies = response_cookies(response.headers());
            collected.merge(&hop_cookies);

            if self.follow_redirects && status.is_redirection() {
                if let Some(location) = response.headers().get(header::LOCATION) {
                    hops += 1;
                    if hops > self.max_redirects {
                        return Err(ProxyError::UpstreamProtocol(format!(
                            "Too many redirects ({})",
                            self.max_redirects
                        )));
                    }

                    let next = resolve_location(&request.url, location)?;
                    tracing::debug!(
                        from = %request.url,
                        to = %next,
                        status = %status,
                        "Following upstream redirect"
                    );
                    metrics::record_redirect();

                    request.url = next;
                    for (name, value) in hop_cookies.iter() {
                        if !is_restricted_cookie(name) {
                            request.cookies.set(name, value);
                        }
                    }
                    if status != StatusCode::TEMPORARY_REDIRECT
                        && status != StatusCode::PERMANENT_REDIRECT
                    {
                        request.downgrade_to_get();
                    }
                    continue;
                }
            }

            if !self.relay_error_status && (status.as_u16() < 200 || status.as_u16() >= 400) {
                return Err(ProxyError::UpstreamStatus {
                    status,
                    url: request.url.to_string(),
                });
            }

            let headers = response.headers().clone();
            let body = read_capped_body(response, request.max_body_size).await?;

            return Ok(UpstreamResponse {
                url: request.url,
                status,
                headers,
                cookies: collected,
                body,
            });
        }
    }

    async fn send(&self, request: &OutboundRequest) -> ProxyResult<reqwest::Response> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.request_url())
            .headers(request.request_headers());

        if let Some(cookie) = request.cookies.to_header_value() {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(form) = request.form_body() {
            builder = builder.body(form);
        }

        builder.send().await.map_err(ProxyError::from_upstream)
    }
}

/// Cookies set by one response.
fn response_cookies(headers: &HeaderMap) -> CookieJar {
    let mut jar = CookieJar::new();
    for value in headers.get_all(header::SET_COOKIE) {
        if let Some((name, value)) = value.to_str().ok().and_then(parse_set_cookie) {
            jar.set(name, value);
        }
    }
    jar
}

/// Resolve a `Location` header against the URL that produced it.
fn resolve_location(base: &Url, location: &HeaderValue) -> ProxyResult<Url> {
    let location = location
        .to_str()
        .map_err(|_| ProxyError::UpstreamProtocol("Non-ASCII redirect location".into()))?;
    let next = base.join(location).map_err(|e| {
        ProxyError::UpstreamProtocol(format!("Invalid redirect location '{location}': {e}"))
    })?;

    match next.scheme() {
        "http" | "https" => Ok(next),
        scheme => Err(ProxyError::UpstreamProtocol(format!(
            "Redirect to unsupported scheme '{scheme}'"
        ))),
    }
}
