//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Bind listener → Serve
//!
//! Shutdown:
//!     SIGTERM / Ctrl+C (signals.rs)
//!         → Shutdown::trigger (shutdown.rs)
//!         → server stops accepting, drains connections, exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
