//! Security subsystem.
//!
//! The only trust boundary in the proxy: what crosses from the caller to the
//! target, and what crosses back.
//!
//! # Data Flow
//! ```text
//! Inbound request:
//!     → headers.rs (drop restricted + transport headers)
//!     → cookies.rs (drop restricted cookies)
//!     → limits.rs (cap buffered form body)
//!     → Outbound request
//!
//! Upstream response:
//!     → limits.rs (cap body at 10 MiB)
//!     → headers.rs (keep allow-listed headers only)
//!     → cookies.rs (drop restricted cookies, strip attributes)
//!     → Outgoing response
//! ```
//!
//! # Design Decisions
//! - Filter tables are `'static` constants, shared without synchronisation
//! - Restricted cookies are blocked in both directions
//! - Header filtering is asymmetric: deny-list in, allow-list out

pub mod cookies;
pub mod headers;
pub mod limits;
