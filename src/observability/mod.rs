//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stderr/stdout log collection
//!     → Prometheus scrape (only with -metrics-address)
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) is attached to every front door span
//! - Metrics are cheap (atomic increments) and always recorded

pub mod logging;
pub mod metrics;
