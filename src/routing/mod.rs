//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     (method, pattern, handler)
//!     → pattern.rs (count wildcards)
//!     → tree.rs (insert into the method's radix tree)
//!     → error.rs (typed rejection of conflicting patterns)
//!
//! Incoming Request (method, path):
//!     → router.rs (pick the method's tree)
//!     → matcher.rs (walk the tree, extract params)
//!     → on miss: path.rs + case_insensitive.rs (redirect target)
//!     → Return: Matched, Redirect, Options, MethodNotAllowed or NotFound
//! ```
//!
//! # Design Decisions
//! - One tree per method, built at startup, read-only afterwards
//! - No regex and no backtracking: a static child and a wildcard child never
//!   share a parent, so every path has at most one candidate route
//! - Children ordered by priority so popular branches are probed first

pub mod case_insensitive;
pub mod error;
pub mod matcher;
pub mod params;
pub mod path;
pub mod pattern;
pub mod router;
pub mod tree;

pub use error::{InsertError, InsertResult, RouterError};
pub use matcher::Lookup;
pub use params::{Param, Params};
pub use path::clean_path;
pub use pattern::count_params;
pub use router::{Dispatch, Router};
pub use tree::{Node, NodeKind};
