//! Radix tree nodes and route insertion.
//!
//! # Responsibilities
//! - Hold the compressed prefix tree for one HTTP method
//! - Insert route patterns, splitting nodes on partial prefix matches
//! - Reject conflicting wildcards and duplicate routes with typed errors
//! - Keep children ordered by priority so hot subtrees are probed first
//!
//! # Design Decisions
//! - Fragments are raw bytes: a shared prefix may end inside a multi-byte
//!   UTF-8 sequence
//! - Children are owned by their parent; promotion swaps `children` and
//!   `indices` in lockstep
//! - Mutation requires `&mut self`, so a tree being served (`&self`) cannot
//!   change underneath concurrent readers

use std::mem;

use crate::routing::error::{InsertError, InsertResult};
use crate::routing::pattern::count_params;

/// What a node stands for in the route pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    /// Literal bytes.
    #[default]
    Static,
    /// The first node of a tree.
    Root,
    /// A named parameter, `:name`.
    Param,
    /// A catch-all parameter, `*name`.
    CatchAll,
}

/// A node of the routing tree. The root node owns the whole tree.
#[derive(Debug, Clone)]
pub struct Node<H> {
    pub(crate) path: Vec<u8>,
    pub(crate) wild_child: bool,
    pub(crate) kind: NodeKind,
    pub(crate) max_params: u8,
    pub(crate) indices: Vec<u8>,
    pub(crate) children: Vec<Node<H>>,
    pub(crate) handler: Option<H>,
    pub(crate) priority: u32,
}

impl<H> Default for Node<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Node<H> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            path: Vec::new(),
            wild_child: false,
            kind: NodeKind::Static,
            max_params: 0,
            indices: Vec::new(),
            children: Vec::new(),
            handler: None,
            priority: 0,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Number of insertions that passed through this node.
    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.children.is_empty()
    }

    /// Register `handler` for `pattern`.
    ///
    /// Not safe to interleave with lookups on the same tree; the borrow
    /// checker enforces this for safe callers.
    pub fn insert(&mut self, pattern: &str, handler: H) -> InsertResult<()> {
        if !pattern.starts_with('/') {
            return Err(InsertError::InvalidPattern {
                pattern: pattern.to_string(),
            });
        }

        let full = pattern;
        let mut path = pattern.as_bytes();
        let mut num_params = count_params(pattern);
        self.priority += 1;

        if self.is_empty() {
            self.max_params = num_params;
            self.insert_child(num_params, path, full, handler)?;
            self.kind = NodeKind::Root;
            return Ok(());
        }

        let mut n = self;
        loop {
            if num_params > n.max_params {
                n.max_params = num_params;
            }

            let i = common_prefix(path, &n.path);

            if i < n.path.len() {
                n.split_at(i);
            }

            if i == path.len() {
                if n.handler.is_some() {
                    return Err(InsertError::DuplicateRoute {
                        pattern: full.to_string(),
                    });
                }
                n.handler = Some(handler);
                return Ok(());
            }

            path = &path[i..];

            if n.wild_child {
                n = &mut n.children[0];
                n.priority += 1;
                if num_params > n.max_params {
                    n.max_params = num_params;
                }
                num_params = num_params.saturating_sub(1);

                if wildcard_compatible(&n.path, path) {
                    continue;
                }
                return Err(wildcard_conflict(n, path, full));
            }

            // a catch-all leaf always ends its pattern
            if n.kind == NodeKind::CatchAll {
                return Err(InsertError::CatchAllNotAtEnd {
                    pattern: full.to_string(),
                });
            }

            let c = path[0];

            // `/` after a param
            if n.kind == NodeKind::Param && c == b'/' && n.children.len() == 1 {
                n = &mut n.children[0];
                n.priority += 1;
                continue;
            }

            if let Some(pos) = n.indices.iter().position(|&b| b == c) {
                let pos = n.increment_child_prio(pos);
                n = &mut n.children[pos];
                continue;
            }

            if c != b':' && c != b'*' {
                n.indices.push(c);
                n.children.push(Node {
                    max_params: num_params,
                    ..Node::new()
                });
                let pos = n.increment_child_prio(n.children.len() - 1);
                n = &mut n.children[pos];
            }

            return n.insert_child(num_params, path, full, handler);
        }
    }

    /// Move everything after byte `i` of this node's fragment into a new
    /// static child.
    fn split_at(&mut self, i: usize) {
        let suffix = self.path.split_off(i);
        let children = mem::take(&mut self.children);
        let max_params = children.iter().map(|c| c.max_params).max().unwrap_or(0);

        let child = Node {
            indices: mem::take(&mut self.indices),
            wild_child: self.wild_child,
            kind: NodeKind::Static,
            handler: self.handler.take(),
            priority: self.priority.saturating_sub(1),
            max_params,
            children,
            path: suffix,
        };

        self.indices = vec![child.path[0]];
        self.children = vec![child];
        self.wild_child = false;
    }

    /// Bump the priority of the child at `pos` and move it forward past
    /// every sibling with a lower priority. Returns the child's new position.
    fn increment_child_prio(&mut self, pos: usize) -> usize {
        self.children[pos].priority += 1;
        let priority = self.children[pos].priority;

        let mut new_pos = pos;
        while new_pos > 0 && self.children[new_pos - 1].priority < priority {
            self.children.swap(new_pos - 1, new_pos);
            self.indices.swap(new_pos - 1, new_pos);
            new_pos -= 1;
        }
        new_pos
    }

    /// Materialize the wildcard structure of `path` below this node and
    /// attach the handler at the end.
    fn insert_child(
        &mut self,
        mut num_params: u8,
        path: &[u8],
        full: &str,
        handler: H,
    ) -> InsertResult<()> {
        let mut n = self;
        let mut offset = 0;
        let max = path.len();
        let mut i = 0;

        while num_params > 0 && i < max {
            let c = path[i];
            if c != b':' && c != b'*' {
                i += 1;
                continue;
            }

            let mut end = i + 1;
            while end < max && path[end] != b'/' {
                if matches!(path[end], b':' | b'*') {
                    return Err(InsertError::MultipleWildcardsInSegment {
                        segment: lossy(&path[i..]),
                        pattern: full.to_string(),
                    });
                }
                end += 1;
            }

            if !n.children.is_empty() {
                return Err(InsertError::WildcardBlockedByChildren {
                    wildcard: lossy(&path[i..end]),
                    pattern: full.to_string(),
                });
            }

            if end - i < 2 {
                return Err(InsertError::UnnamedWildcard {
                    pattern: full.to_string(),
                });
            }

            if c == b':' {
                if i > 0 {
                    n.path = path[offset..i].to_vec();
                    offset = i;
                }

                n.children = vec![Node {
                    kind: NodeKind::Param,
                    max_params: num_params,
                    ..Node::new()
                }];
                n.wild_child = true;
                n = &mut n.children[0];
                n.priority += 1;
                num_params -= 1;

                // more pattern follows the param: continue in a static child
                if end < max {
                    n.path = path[offset..end].to_vec();
                    offset = end;

                    n.children = vec![Node {
                        max_params: num_params,
                        priority: 1,
                        ..Node::new()
                    }];
                    n = &mut n.children[0];
                }

                i = end;
                continue;
            }

            if end != max || num_params > 1 {
                return Err(InsertError::CatchAllNotAtEnd {
                    pattern: full.to_string(),
                });
            }

            if n.path.last() == Some(&b'/') {
                return Err(InsertError::CatchAllConflictsWithRoot {
                    pattern: full.to_string(),
                });
            }

            if i == 0 || path[i - 1] != b'/' {
                return Err(InsertError::CatchAllMissingSlash {
                    pattern: full.to_string(),
                });
            }
            let slash = i - 1;

            n.path = path[offset..slash].to_vec();

            let leaf = Node {
                path: path[slash..].to_vec(),
                kind: NodeKind::CatchAll,
                max_params: 1,
                handler: Some(handler),
                priority: 1,
                ..Node::new()
            };
            n.children = vec![Node {
                wild_child: true,
                kind: NodeKind::CatchAll,
                max_params: 1,
                priority: 1,
                children: vec![leaf],
                ..Node::new()
            }];
            n.indices = vec![b'/'];
            return Ok(());
        }

        n.path = path[offset..].to_vec();
        n.handler = Some(handler);
        Ok(())
    }
}

/// Length of the longest common byte prefix of `a` and `b`.
pub(crate) fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// An existing wildcard accepts the remaining pattern when its fragment is a
/// prefix of it and is followed by nothing or by `/`.
fn wildcard_compatible(wildcard: &[u8], rest: &[u8]) -> bool {
    rest.starts_with(wildcard) && (rest.len() == wildcard.len() || rest[wildcard.len()] == b'/')
}

fn wildcard_conflict<H>(wild: &Node<H>, rest: &[u8], full: &str) -> InsertError {
    let segment = if wild.kind == NodeKind::CatchAll {
        lossy(rest)
    } else {
        lossy(rest.split(|&b| b == b'/').next().unwrap_or(rest))
    };
    let wildcard = lossy(&wild.path);
    let prefix = match full.find(segment.as_str()) {
        Some(at) => format!("{}{}", &full[..at], wildcard),
        None => wildcard.clone(),
    };

    InsertError::WildcardConflict {
        segment,
        pattern: full.to_string(),
        wildcard,
        prefix,
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Walk the tree and assert the structural invariants hold everywhere.
    pub(crate) fn check_invariants<H>(n: &Node<H>) {
        if n.wild_child {
            assert_eq!(n.children.len(), 1, "wild node must have one child");
            assert!(n.indices.is_empty(), "wild node must not index children");
            assert!(matches!(
                n.children[0].kind,
                NodeKind::Param | NodeKind::CatchAll
            ));
        } else {
            assert_eq!(n.indices.len(), n.children.len());
            for (idx, child) in n.indices.iter().zip(&n.children) {
                if child.kind == NodeKind::CatchAll {
                    assert_eq!(*idx, b'/');
                } else {
                    assert_eq!(Some(idx), child.path.first());
                }
            }
            for pair in n.children.windows(2) {
                assert!(pair[0].priority >= pair[1].priority, "children out of priority order");
            }
        }

        if n.kind == NodeKind::Param {
            assert_eq!(n.path.first(), Some(&b':'));
            assert!(n.path.len() > 1);
        }

        for child in &n.children {
            check_invariants(child);
        }
    }

    fn tree(routes: &[&str]) -> Node<String> {
        let mut root = Node::new();
        for route in routes {
            root.insert(route, route.to_string()).unwrap();
        }
        check_invariants(&root);
        root
    }

    #[test]
    fn test_first_insert_makes_root() {
        let root = tree(&["/hello"]);
        assert_eq!(root.kind(), NodeKind::Root);
        assert_eq!(root.path, b"/hello");
        assert_eq!(root.handler.as_deref(), Some("/hello"));
    }

    #[test]
    fn test_split_moves_handler_into_child() {
        let root = tree(&["/search", "/support"]);
        assert_eq!(root.path, b"/s");
        assert!(root.handler.is_none());
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].path, b"earch");
        assert_eq!(root.children[0].handler.as_deref(), Some("/search"));
        assert_eq!(root.children[1].path, b"upport");
    }

    #[test]
    fn test_priority_promotes_busy_child() {
        let root = tree(&["/a", "/b", "/b/1", "/b/2"]);
        assert_eq!(root.indices[0], b'b');
        assert_eq!(root.children[0].priority, 3);
        assert_eq!(root.priority, 4);
    }

    #[test]
    fn test_param_nodes() {
        let root = tree(&["/user/:id/profile"]);
        assert_eq!(root.path, b"/user/");
        assert!(root.wild_child);
        let param = &root.children[0];
        assert_eq!(param.kind, NodeKind::Param);
        assert_eq!(param.path, b":id");
        assert_eq!(param.children[0].path, b"/profile");
        assert_eq!(root.max_params, 1);
    }

    #[test]
    fn test_catch_all_shape() {
        let root = tree(&["/src/*filepath"]);
        assert_eq!(root.path, b"/src");
        assert_eq!(root.indices, b"/");
        let anchor = &root.children[0];
        assert_eq!(anchor.kind, NodeKind::CatchAll);
        assert!(anchor.path.is_empty());
        assert!(anchor.wild_child);
        let leaf = &anchor.children[0];
        assert_eq!(leaf.path, b"/*filepath");
        assert_eq!(leaf.handler.as_deref(), Some("/src/*filepath"));
    }

    #[test]
    fn test_multibyte_prefix_split() {
        let root = tree(&["/äpfel", "/über"]);
        assert_eq!(root.path, b"/\xC3");
        assert_eq!(root.indices, vec![0xA4, 0xBC]);
    }

    #[test]
    fn test_invalid_pattern() {
        let mut root = Node::new();
        assert_eq!(
            root.insert("user", 1),
            Err(InsertError::InvalidPattern {
                pattern: "user".into()
            })
        );
    }

    #[test]
    fn test_duplicate_route() {
        let mut root = Node::new();
        root.insert("/doc/", 1).unwrap();
        root.insert("/doc/go", 2).unwrap();
        let err = root.insert("/doc/", 3).unwrap_err();
        assert_eq!(
            err,
            InsertError::DuplicateRoute {
                pattern: "/doc/".into()
            }
        );
    }

    #[test]
    fn test_wildcard_name_conflict() {
        let mut root = Node::new();
        root.insert("/a/:x", 1).unwrap();
        let err = root.insert("/a/:y", 2).unwrap_err();
        assert_eq!(
            err,
            InsertError::WildcardConflict {
                segment: ":y".into(),
                pattern: "/a/:y".into(),
                wildcard: ":x".into(),
                prefix: "/a/:x".into(),
            }
        );
    }

    #[test]
    fn test_static_after_param_conflicts() {
        let mut root = Node::new();
        root.insert("/user/:id", 1).unwrap();
        assert!(matches!(
            root.insert("/user/list", 2),
            Err(InsertError::WildcardConflict { .. })
        ));
    }

    #[test]
    fn test_param_after_static_is_blocked() {
        let mut root = Node::new();
        root.insert("/user/list", 1).unwrap();
        assert!(matches!(
            root.insert("/user/:id", 2),
            Err(InsertError::WildcardBlockedByChildren { .. })
        ));
    }

    #[test]
    fn test_shared_param_with_different_tails() {
        let root = tree(&["/user/:id", "/user/:id/posts", "/user/:id/friends"]);
        check_invariants(&root);
    }

    #[test]
    fn test_two_wildcards_in_one_segment() {
        let mut root = Node::new();
        assert!(matches!(
            root.insert("/:a:b", 1),
            Err(InsertError::MultipleWildcardsInSegment { .. })
        ));
        assert!(matches!(
            root.insert("/:a*b", 1),
            Err(InsertError::MultipleWildcardsInSegment { .. })
        ));
    }

    #[test]
    fn test_unnamed_wildcards() {
        let mut root = Node::new();
        assert!(matches!(
            root.insert("/user:", 1),
            Err(InsertError::UnnamedWildcard { .. })
        ));
        assert!(matches!(
            root.insert("/src/*", 1),
            Err(InsertError::UnnamedWildcard { .. })
        ));
    }

    #[test]
    fn test_catch_all_rules() {
        let mut root = Node::new();
        assert!(matches!(
            root.insert("/src/*filepath/x", 1),
            Err(InsertError::CatchAllNotAtEnd { .. })
        ));
        assert!(matches!(
            root.insert("/src*filepath", 1),
            Err(InsertError::CatchAllMissingSlash { .. })
        ));

        let mut root = Node::new();
        root.insert("/src/", 1).unwrap();
        assert!(matches!(
            root.insert("/src/*filepath", 2),
            Err(InsertError::CatchAllConflictsWithRoot { .. })
        ));
    }

    #[test]
    fn test_nothing_grows_below_catch_all() {
        let mut root = Node::new();
        root.insert("/src/*filepath", 1).unwrap();
        assert!(matches!(
            root.insert("/src/*filepath/more", 2),
            Err(InsertError::CatchAllNotAtEnd { .. })
        ));
        assert!(matches!(
            root.insert("/src/other", 3),
            Err(InsertError::WildcardConflict { .. })
        ));
        assert!(matches!(
            root.insert("/src/*other", 4),
            Err(InsertError::WildcardConflict { .. })
        ));
        root.insert("/src", 5).unwrap();
    }
}
