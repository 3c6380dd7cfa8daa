//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config / routing produce:
//!     → tracing events (route registered, router built, redirects)
//!
//! Consumers:
//!     → logging.rs (fmt subscriber on stderr, filtered by level)
//! ```
//!
//! # Design Decisions
//! - Structured key-value fields rather than formatted messages
//! - Registration and redirect decisions log at debug, startup at info

pub mod logging;

pub use logging::init_logging;
