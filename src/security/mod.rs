//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs filter_inbound (allow-listed headers only)
//!     → forwarded upstream
//! Upstream response:
//!     → headers.rs filter_outbound (caller-relevant headers only)
//!     → CORS trio merged in
//!     → returned to caller
//! ```
//!
//! # Design Decisions
//! - Fail closed: headers not on an allow-list never cross the gateway
//! - No trust in client input

pub mod headers;

pub use headers::{cors_headers, HeaderPolicy};
