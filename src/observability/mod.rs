//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handlers produce:
//!     → tracing events (structured fields, request_id correlation)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log output (stdout, EnvFilter-controlled)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through all log events
//! - Metrics are cheap (atomic increments behind the recorder)

pub mod metrics;
