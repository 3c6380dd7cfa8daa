//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check method tokens and pattern shape
//! - Detect duplicate route names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Pattern conflicts are left to the tree, which reports them precisely

use std::collections::HashSet;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::RouterConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("route '{route}' has invalid method '{method}'")]
    InvalidMethod { route: String, method: String },

    #[error("route '{route}' path '{path}' must begin with '/'")]
    InvalidPath { route: String, path: String },

    #[error("route name '{route}' is used more than once")]
    DuplicateName { route: String },
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for (index, route) in config.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                route: route.name.clone(),
            });
        }

        if Method::from_bytes(route.method.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod {
                route: route.name.clone(),
                method: route.method.clone(),
            });
        }

        if !route.path.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                route: route.name.clone(),
                path: route.path.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
