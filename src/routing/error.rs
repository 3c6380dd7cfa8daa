//! Route registration errors.

use thiserror::Error;

/// Reasons a route pattern cannot be inserted into a tree.
///
/// Every variant is a programmer error found at registration time; callers
/// are expected to abort startup rather than serve a partially built tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertError {
    /// The pattern does not begin with `/`.
    #[error("path must begin with '/' in path '{pattern}'")]
    InvalidPattern { pattern: String },

    /// A wildcard at this position already exists under a different name or shape.
    #[error(
        "'{segment}' in new path '{pattern}' conflicts with existing wildcard '{wildcard}' in existing prefix '{prefix}'"
    )]
    WildcardConflict {
        segment: String,
        pattern: String,
        wildcard: String,
        prefix: String,
    },

    /// The exact pattern already carries a handler.
    #[error("a handler is already registered for path '{pattern}'")]
    DuplicateRoute { pattern: String },

    /// A second `:` or `*` appears inside one path segment.
    #[error("only one wildcard per path segment is allowed, has: '{segment}' in path '{pattern}'")]
    MultipleWildcardsInSegment { segment: String, pattern: String },

    /// `:` or `*` without a name.
    #[error("wildcards must be named with a non-empty name in path '{pattern}'")]
    UnnamedWildcard { pattern: String },

    /// A wildcard would shadow static children that already exist.
    #[error("wildcard route '{wildcard}' conflicts with existing children in path '{pattern}'")]
    WildcardBlockedByChildren { wildcard: String, pattern: String },

    /// A catch-all that is not the final segment.
    #[error("catch-all routes are only allowed at the end of the path in path '{pattern}'")]
    CatchAllNotAtEnd { pattern: String },

    /// A catch-all not preceded by `/`.
    #[error("no / before catch-all in path '{pattern}'")]
    CatchAllMissingSlash { pattern: String },

    /// A catch-all whose segment root already has a handler-bearing node.
    #[error("catch-all conflicts with existing handle for the path segment root in path '{pattern}'")]
    CatchAllConflictsWithRoot { pattern: String },
}

/// Result type for route registration.
pub type InsertResult<T> = Result<T, InsertError>;

/// Errors building a [`Router`](crate::routing::Router) from configuration.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The configured method is not a valid HTTP method token.
    #[error("route '{route}': invalid method '{method}'")]
    InvalidMethod { route: String, method: String },

    /// The tree rejected the route's pattern.
    #[error("route '{route}': {source}")]
    Insert {
        route: String,
        #[source]
        source: InsertError,
    },
}
