//! Radix tree HTTP request router.

pub mod config;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use routing::{Dispatch, InsertError, Lookup, Node, Params, Router};
