//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Filter and server produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (resolution outcome counters)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Per-request events are trace/debug level only
//! - Metrics are cheap (atomic increments) and no-ops without a recorder

pub mod logging;
pub mod metrics;
