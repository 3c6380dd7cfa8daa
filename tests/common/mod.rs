//! Shared utilities for integration testing.

#![allow(dead_code)]

use radix_router::routing::Node;

/// A conflict-free route set exercising every node kind.
pub const ROUTES: &[&str] = &[
    "/",
    "/cmd/:tool/:sub",
    "/cmd/:tool/",
    "/src/*filepath",
    "/search/",
    "/search/:query",
    "/user_:name",
    "/user_:name/about",
    "/files/:dir/*filepath",
    "/doc/",
    "/doc/go_faq.html",
    "/doc/go1.html",
    "/info/:user/public",
    "/info/:user/project/:project",
];

/// Build a tree whose handlers are the patterns themselves.
pub fn build_tree<'a>(routes: impl IntoIterator<Item = &'a str>) -> Node<String> {
    let mut root = Node::new();
    for route in routes {
        root.insert(route, route.to_string()).unwrap();
    }
    root
}

/// Replace every wildcard of `pattern` with a concrete value. Returns the
/// request path and the `(key, value)` pairs a lookup should extract.
pub fn substitute(pattern: &str) -> (String, Vec<(String, String)>) {
    let mut path = String::new();
    let mut params = Vec::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' => {
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '/' {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                let value = format!("{name}-Wert-ä");
                path.push_str(&value);
                params.push((name, value));
            }
            '*' => {
                let name: String = chars.by_ref().collect();
                let value = format!("deep/{name}/file.txt");
                path.push_str(&value);
                params.push((name, value));
            }
            c => path.push(c),
        }
    }

    (path, params)
}

/// Rebuild a concrete path from a pattern and the values extracted for it.
pub fn reconstruct(pattern: &str, values: &[&str]) -> String {
    let mut path = String::new();
    let mut values = values.iter();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' | '*' => {
                while let Some(&next) = chars.peek() {
                    if c == ':' && next == '/' {
                        break;
                    }
                    chars.next();
                }
                if let Some(value) = values.next() {
                    path.push_str(value);
                }
            }
            c => path.push(c),
        }
    }

    path
}
