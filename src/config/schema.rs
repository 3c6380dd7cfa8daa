//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration: dispatcher behaviour, logging and the route table.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Dispatcher behaviour on a lookup miss.
    pub router: RouterOptions,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions, registered in order.
    pub routes: Vec<RouteConfig>,
}

/// How the dispatcher reacts when no route matches exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Redirect to the same path with or without a trailing slash when only
    /// that variant has a handler (301 for GET, 307 otherwise).
    pub redirect_trailing_slash: bool,

    /// Clean the path and retry case-insensitively; redirect to the
    /// registered spelling when found. Independent of
    /// `redirect_trailing_slash`, though it also fixes trailing slashes when
    /// that option is on.
    pub redirect_fixed_path: bool,

    /// Answer 405 with an `Allow` list when another method matches the path.
    pub handle_method_not_allowed: bool,

    /// Answer OPTIONS requests with the `Allow` list automatically.
    pub handle_options: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            redirect_trailing_slash: true,
            redirect_fixed_path: true,
            handle_method_not_allowed: true,
            handle_options: true,
        }
    }
}

/// A single route: method, pattern and the name reported on match.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging and lookup results.
    pub name: String,

    /// HTTP method token (e.g. "GET").
    #[serde(default = "default_method")]
    pub method: String,

    /// Pattern with optional `:param` and trailing `*catchall` segments.
    pub path: String,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert!(config.routes.is_empty());
        assert_eq!(config.router, RouterOptions::default());
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_parse_routes() {
        let config: RouterConfig = toml::from_str(
            r#"
            [router]
            redirect_fixed_path = false

            [[routes]]
            name = "user"
            path = "/user/:id"

            [[routes]]
            name = "create-user"
            method = "POST"
            path = "/user"
            "#,
        )
        .unwrap();

        assert!(!config.router.redirect_fixed_path);
        assert!(config.router.redirect_trailing_slash);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].method, "GET");
        assert_eq!(config.routes[1].method, "POST");
    }
}
