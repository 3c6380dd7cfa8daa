//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Keep one radix tree per HTTP method
//! - Resolve (method, path) to a handler and its parameters
//! - Decide what to do on a miss: redirect, 405, OPTIONS or 404
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Trees kept in registration order; `Allow` lists are sorted by name
//! - Explicit `NotFound` rather than silent default
//! - Handlers are opaque: the router never invokes them

use axum::http::{Method, Request, StatusCode};

use crate::config::{RouterConfig, RouterOptions};
use crate::routing::error::{InsertResult, RouterError};
use crate::routing::matcher::Lookup;
use crate::routing::params::Params;
use crate::routing::path::clean_path;
use crate::routing::tree::Node;

/// The dispatcher's decision for one request.
#[derive(Debug)]
pub enum Dispatch<'r, 'p, H> {
    /// A handler is registered for the method and path.
    Matched {
        handler: &'r H,
        params: Params<'r, 'p>,
    },
    /// The path should be fixed by the client.
    Redirect { location: String, status: StatusCode },
    /// Automatic answer to an OPTIONS request.
    Options { allow: String },
    /// The path exists for other methods only.
    MethodNotAllowed { allow: String },
    NotFound,
}

impl<H> Dispatch<'_, '_, H> {
    /// Status code a server should answer with.
    pub fn status(&self) -> StatusCode {
        match self {
            Dispatch::Matched { .. } | Dispatch::Options { .. } => StatusCode::OK,
            Dispatch::Redirect { status, .. } => *status,
            Dispatch::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Dispatch::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// A request router with one tree per HTTP method.
#[derive(Debug, Clone)]
pub struct Router<H> {
    trees: Vec<(Method, Node<H>)>,
    options: RouterOptions,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Router<H> {
    /// Create a router with the default options (all enabled).
    pub fn new() -> Self {
        Self::with_options(RouterOptions::default())
    }

    pub fn with_options(options: RouterOptions) -> Self {
        Self {
            trees: Vec::new(),
            options,
        }
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Register `handler` for `method` and `pattern`.
    pub fn handle(&mut self, method: Method, pattern: &str, handler: H) -> InsertResult<()> {
        let idx = match self.trees.iter().position(|(m, _)| *m == method) {
            Some(idx) => idx,
            None => {
                self.trees.push((method.clone(), Node::new()));
                self.trees.len() - 1
            }
        };

        self.trees[idx].1.insert(pattern, handler)?;
        tracing::debug!(%method, pattern, "Route registered");
        Ok(())
    }

    pub fn get(&mut self, pattern: &str, handler: H) -> InsertResult<()> {
        self.handle(Method::GET, pattern, handler)
    }

    pub fn head(&mut self, pattern: &str, handler: H) -> InsertResult<()> {
        self.handle(Method::HEAD, pattern, handler)
    }

    pub fn options_route(&mut self, pattern: &str, handler: H) -> InsertResult<()> {
        self.handle(Method::OPTIONS, pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: H) -> InsertResult<()> {
        self.handle(Method::POST, pattern, handler)
    }

    pub fn put(&mut self, pattern: &str, handler: H) -> InsertResult<()> {
        self.handle(Method::PUT, pattern, handler)
    }

    pub fn patch(&mut self, pattern: &str, handler: H) -> InsertResult<()> {
        self.handle(Method::PATCH, pattern, handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: H) -> InsertResult<()> {
        self.handle(Method::DELETE, pattern, handler)
    }

    /// The tree for `method`, if any route was registered for it.
    pub fn tree(&self, method: &Method) -> Option<&Node<H>> {
        self.trees
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, tree)| tree)
    }

    /// Methods with at least one route, in registration order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.trees.iter().map(|(m, _)| m)
    }

    /// Match `path` in the tree for `method`. `None` when the method has no
    /// routes at all.
    pub fn lookup<'r, 'p>(&'r self, method: &Method, path: &'p str) -> Option<Lookup<'r, 'p, H>> {
        self.tree(method).map(|tree| tree.lookup(path))
    }

    /// Methods, other than `req_method` and OPTIONS, that have a handler for
    /// `path`. The path `*` asks for every registered method. A non-empty
    /// result always ends up including OPTIONS.
    pub fn allowed(&self, path: &str, req_method: &Method) -> Vec<Method> {
        let mut allow: Vec<Method> = self
            .trees
            .iter()
            .filter(|(m, _)| *m != Method::OPTIONS)
            .filter(|(m, tree)| {
                if path == "*" {
                    true
                } else {
                    m != req_method && tree.lookup(path).handler.is_some()
                }
            })
            .map(|(m, _)| m.clone())
            .collect();

        if !allow.is_empty() {
            allow.push(Method::OPTIONS);
            allow.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        }
        allow
    }

    fn allow_header(&self, path: &str, req_method: &Method) -> Option<String> {
        let allow = self.allowed(path, req_method);
        if allow.is_empty() {
            return None;
        }
        Some(
            allow
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    /// Decide how to answer `method` on `path`.
    pub fn dispatch<'r, 'p>(&'r self, method: &Method, path: &'p str) -> Dispatch<'r, 'p, H> {
        if let Some(tree) = self.tree(method) {
            let found = tree.lookup(path);
            if let Some(handler) = found.handler {
                return Dispatch::Matched {
                    handler,
                    params: found.params,
                };
            }

            if *method != Method::CONNECT && path != "/" {
                let status = if *method == Method::GET {
                    StatusCode::MOVED_PERMANENTLY
                } else {
                    StatusCode::TEMPORARY_REDIRECT
                };

                if found.trailing_slash_redirect && self.options.redirect_trailing_slash {
                    let location = match path.strip_suffix('/') {
                        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
                        _ => format!("{path}/"),
                    };
                    tracing::debug!(%method, path, %location, "Trailing slash redirect");
                    return Dispatch::Redirect { location, status };
                }

                if self.options.redirect_fixed_path {
                    let fixed = tree.find_case_insensitive(
                        &clean_path(path),
                        self.options.redirect_trailing_slash,
                    );
                    if let Some(location) = fixed {
                        tracing::debug!(%method, path, %location, "Fixed path redirect");
                        return Dispatch::Redirect { location, status };
                    }
                }
            }
        }

        if *method == Method::OPTIONS {
            if self.options.handle_options {
                if let Some(allow) = self.allow_header(path, method) {
                    return Dispatch::Options { allow };
                }
            }
        } else if self.options.handle_method_not_allowed {
            if let Some(allow) = self.allow_header(path, method) {
                return Dispatch::MethodNotAllowed { allow };
            }
        }

        Dispatch::NotFound
    }

    /// Dispatch a request by its method and URI path. Redirect locations
    /// keep the original query string.
    pub fn dispatch_request<'r, 'p, B>(&'r self, req: &'p Request<B>) -> Dispatch<'r, 'p, H> {
        let dispatch = self.dispatch(req.method(), req.uri().path());
        match (dispatch, req.uri().query()) {
            (Dispatch::Redirect { location, status }, Some(query)) => Dispatch::Redirect {
                location: format!("{location}?{query}"),
                status,
            },
            (dispatch, _) => dispatch,
        }
    }
}

impl Router<String> {
    /// Build a router whose handlers are the configured route names.
    ///
    /// Stops at the first route the tree rejects; a partially built router is
    /// never returned.
    pub fn from_config(config: &RouterConfig) -> Result<Self, RouterError> {
        let mut router = Router::with_options(config.router);

        for route in &config.routes {
            let method = Method::from_bytes(route.method.as_bytes()).map_err(|_| {
                RouterError::InvalidMethod {
                    route: route.name.clone(),
                    method: route.method.clone(),
                }
            })?;

            router
                .handle(method, &route.path, route.name.clone())
                .map_err(|source| RouterError::Insert {
                    route: route.name.clone(),
                    source,
                })?;
        }

        tracing::info!(routes = config.routes.len(), "Router built");
        Ok(router)
    }
}
