//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, body buffering)
//!     → request.rs (request ID, target, cookies, parameters)
//!     → [proxy handler replays against the target]
//!     → response.rs (filter headers/cookies, add X-Location)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{IncomingRequest, Parameters, UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
