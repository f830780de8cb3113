//! Outgoing response construction.
//!
//! # Responsibilities
//! - Copy upstream status and body verbatim
//! - Relay only allow-listed upstream headers
//! - Recreate non-restricted upstream cookies without attributes
//! - Expose the final upstream URL in `X-Location`
//!
//! # Design Decisions
//! - The body is fully buffered upstream-side, so the response is complete
//!   before a single byte is written; failures never look like success
//! - Cookies with values that are not valid header text are skipped

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, Response};

use crate::proxy::error::ProxyResult;
use crate::proxy::upstream::UpstreamResponse;
use crate::security::cookies::{format_bare_set_cookie, is_restricted_cookie};
use crate::security::headers::{is_allowed_response_header, X_LOCATION};

/// Build the response relayed to the original caller.
pub fn relay_response(upstream: UpstreamResponse) -> ProxyResult<Response<Body>> {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;

    let headers = response.headers_mut();

    for (name, value) in upstream.cookies.iter() {
        if is_restricted_cookie(name) {
            continue;
        }
        match HeaderValue::from_str(&format_bare_set_cookie(name, value)) {
            Ok(v) => {
                headers.append(header::SET_COOKIE, v);
            }
            Err(_) => tracing::warn!(cookie = %name, "Dropping cookie with invalid value"),
        }
    }

    for name in upstream.headers.keys() {
        if !is_allowed_response_header(name) {
            continue;
        }
        if let Some(value) = upstream.headers.get(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    headers.insert(
        HeaderName::from_static(X_LOCATION),
        HeaderValue::from_str(upstream.url.as_str())?,
    );

    Ok(response)
}
