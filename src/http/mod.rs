//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, mount routing, middleware)
//!     → request.rs (request ID, body buffering, context extraction)
//!     → [resolver + header policy + upstream client]
//!     → response.rs (JSON translation, error mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use response::{ProxyResponse, INVALID_JSON_MESSAGE};
pub use server::HttpServer;
