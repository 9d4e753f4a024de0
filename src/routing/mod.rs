//! Request routing subsystem.
//!
//! Mount prefixes themselves are registered with the HTTP router; this
//! module owns what happens after a mount matches: turning the inbound
//! path and query into the concrete upstream destination.

pub mod resolver;

pub use resolver::{resolve, segments_from_path, UpstreamTarget};
