//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check addresses parse before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("timeouts.request_secs ({request}) must be >= timeouts.upstream_secs ({upstream})")]
    RequestShorterThanUpstream { request: u64, upstream: u64 },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("timeouts.connect_secs", timeouts.connect_secs),
        ("timeouts.upstream_secs", timeouts.upstream_secs),
        ("timeouts.request_secs", timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }
    if timeouts.request_secs < timeouts.upstream_secs {
        errors.push(ValidationError::RequestShorterThanUpstream {
            request: timeouts.request_secs,
            upstream: timeouts.upstream_secs,
        });
    }

    if config.limits.max_request_body_bytes == 0 {
        errors.push(ValidationError::Zero {
            field: "limits.max_request_body_bytes",
        });
    }
    if config.limits.max_response_body_bytes == 0 {
        errors.push(ValidationError::Zero {
            field: "limits.max_response_body_bytes",
        });
    }

    if config.upstream.follow_redirects && config.upstream.max_redirects == 0 {
        errors.push(ValidationError::Zero {
            field: "upstream.max_redirects",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
