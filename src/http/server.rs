//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler on GET and POST
//! - Wire up middleware (tracing, request ID, inbound timeout)
//! - Bind server to listener and serve until shutdown
//! - Buffer form bodies and hand requests to the ProxyHandler
//! - Observability (metrics, correlation IDs)

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::request::{request_id, IncomingRequest, UuidRequestId};
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::proxy::error::{ProxyError, ProxyResult};
use crate::proxy::upstream::UpstreamClient;
use crate::proxy::ProxyHandler;
use crate::security::limits::read_request_body;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub handler: ProxyHandler,
    pub max_request_body_bytes: usize,
}

/// HTTP server for the proxy endpoint.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> ProxyResult<Self> {
        let client = UpstreamClient::new(&config)?;
        let state = AppState {
            handler: ProxyHandler::new(client, config.limits.max_response_body_bytes),
            max_request_body_bytes: config.limits.max_request_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(proxy_handler).post(proxy_handler))
            .route("/{*path}", get(proxy_handler).post(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Router with all layers applied, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C, SIGTERM, or the shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown requested");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Buffers form bodies, then replays the request against `X-Proxy-Url`.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().to_string();

    let (parts, body) = request.into_parts();
    let body = if IncomingRequest::needs_body(&parts) {
        match read_request_body(body, state.max_request_body_bytes).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Rejecting request body");
                return finish(e.into_response(), &method, start_time);
            }
        }
    } else {
        Bytes::new()
    };

    let incoming = IncomingRequest::from_parts(&parts, &body);
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        target = incoming.target.as_deref().unwrap_or("-"),
        "Proxying request"
    );

    let response = match state.handler.handle(incoming).await {
        Ok(response) => response,
        Err(ProxyError::MissingTarget) => {
            tracing::info!(request_id = %request_id, "Request without X-Proxy-Url");
            ProxyError::MissingTarget.into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Proxy request failed");
            e.into_response()
        }
    };

    finish(response, &method, start_time)
}

fn finish(response: Response, method: &str, start_time: Instant) -> Response {
    metrics::record_request(method, response.status().as_u16(), start_time);
    response
}
