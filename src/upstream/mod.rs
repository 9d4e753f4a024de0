//! Upstream communication subsystem.
//!
//! One backend, one pooled client, one call per inbound request. Failures
//! are typed so the HTTP layer can map them onto 502/504 responses.

pub mod client;

pub use client::{ForwardError, UpstreamClient, UpstreamResponse};
