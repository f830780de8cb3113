//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handler + upstream client produce:
//!     → logging.rs (structured log events, request ID attached)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
