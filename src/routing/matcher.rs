//! Route matching logic.
//!
//! # Responsibilities
//! - Walk the tree along the request path (case-sensitive)
//! - Extract `:param` and `*catch-all` values in pattern order
//! - Recommend a trailing-slash redirect when one extra or one missing `/`
//!   would have matched
//!
//! # Design Decisions
//! - Read-only: any number of threads may match against a finished tree
//! - Values borrow from the request path, keys from the tree; no copies
//! - The parameter buffer is allocated once, on the first wildcard, sized by
//!   the node's `max_params`

use crate::routing::params::Params;
use crate::routing::tree::{Node, NodeKind};

/// Result of matching a path against one tree.
#[derive(Debug)]
pub struct Lookup<'t, 'p, H> {
    /// Handler registered for the matched route, if any.
    pub handler: Option<&'t H>,
    /// Extracted parameters. Empty when `handler` is `None`.
    pub params: Params<'t, 'p>,
    /// No handler was found, but adding or removing a trailing `/` would
    /// reach one. Advisory only.
    pub trailing_slash_redirect: bool,
}

impl<H> Node<H> {
    /// Find the handler registered for `path`.
    pub fn lookup<'t, 'p>(&'t self, path: &'p str) -> Lookup<'t, 'p, H> {
        let mut params = Params::new();
        let (handler, trailing_slash_redirect) = self.walk(path, &mut params);
        if handler.is_none() {
            params.clear();
        }

        Lookup {
            handler,
            params,
            trailing_slash_redirect,
        }
    }

    fn walk<'t, 'p>(&'t self, full: &'p str, params: &mut Params<'t, 'p>) -> (Option<&'t H>, bool) {
        let mut n = self;
        let mut path = full.as_bytes();
        let mut consumed = 0;
        // whether the node `n` was entered from carries a handler
        let mut parent_handler = false;

        loop {
            let prefix = n.path.as_slice();

            if path.len() > prefix.len() {
                if !path.starts_with(prefix) {
                    break;
                }
                path = &path[prefix.len()..];
                consumed += prefix.len();

                if !n.wild_child {
                    let c = path[0];
                    if let Some(pos) = n.indices.iter().position(|&b| b == c) {
                        parent_handler = n.handler.is_some();
                        n = &n.children[pos];
                        continue;
                    }

                    // the same URL without the trailing slash has a handler
                    return (None, path == b"/" && n.handler.is_some());
                }

                parent_handler = n.handler.is_some();
                n = &n.children[0];
                match n.kind {
                    NodeKind::Param => {
                        let end = path.iter().position(|&b| b == b'/').unwrap_or(path.len());

                        if params.capacity() == 0 {
                            *params = Params::with_capacity(n.max_params.into());
                        }
                        params.push(as_str(&n.path[1..]), slice(full, consumed, consumed + end));

                        if end < path.len() {
                            if let Some(child) = n.children.first() {
                                path = &path[end..];
                                consumed += end;
                                parent_handler = n.handler.is_some();
                                n = child;
                                continue;
                            }
                            return (None, path.len() == end + 1 && n.handler.is_some());
                        }

                        if let Some(handler) = n.handler.as_ref() {
                            return (Some(handler), false);
                        }
                        if let [child] = n.children.as_slice() {
                            return (None, child.path == b"/" && child.handler.is_some());
                        }
                        return (None, false);
                    }
                    NodeKind::CatchAll => {
                        if params.capacity() == 0 {
                            *params = Params::with_capacity(n.max_params.into());
                        }
                        // the leaf's fragment is `/*name`; the value skips that `/`
                        params.push(as_str(&n.path[2..]), slice(full, consumed + 1, full.len()));
                        return (n.handler.as_ref(), false);
                    }
                    NodeKind::Static | NodeKind::Root => return (None, false),
                }
            } else if path == prefix {
                if let Some(handler) = n.handler.as_ref() {
                    return (Some(handler), false);
                }

                // the same URL without the trailing slash ends at the parent
                if path == b"/" && n.wild_child && n.kind != NodeKind::Root {
                    return (None, parent_handler);
                }

                // a handler for this path plus a trailing slash?
                if let Some(pos) = n.indices.iter().position(|&b| b == b'/') {
                    let child = &n.children[pos];
                    let tsr = (child.path.len() == 1 && child.handler.is_some())
                        || (child.kind == NodeKind::CatchAll
                            && child.children.first().is_some_and(|c| c.handler.is_some()));
                    return (None, tsr);
                }
                return (None, false);
            }

            break;
        }

        // nothing found; would one more or one less `/` match?
        let tsr = (path == b"/" && parent_handler)
            || (n.path.len() == path.len() + 1
                && n.path[path.len()] == b'/'
                && path == &n.path[..path.len()]
                && n.handler.is_some());
        (None, tsr)
    }
}

/// Fragment bytes always come from a whole pattern segment, so they are
/// valid UTF-8.
pub(crate) fn as_str(bytes: &[u8]) -> &str {
    std::str::from_utf8(bytes).unwrap_or_default()
}

/// Parameter boundaries fall on `/` or directly after a complete pattern
/// prefix, so they are always char boundaries of `full`.
fn slice(full: &str, from: usize, to: usize) -> &str {
    full.get(from..to).unwrap_or_default()
}
