//! Properties of the radix tree that must hold for any route set.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use radix_router::routing::{InsertError, Node};

mod common;

use common::{build_tree, reconstruct, substitute, ROUTES};

/// Outcome of one probe, detached from the tree's lifetime.
type Outcome = (Option<String>, Vec<(String, String)>, bool, Option<String>);

fn probe(root: &Node<String>, path: &str) -> Outcome {
    let found = root.lookup(path);
    (
        found.handler.cloned(),
        found
            .params
            .iter()
            .map(|p| (p.key.to_string(), p.value.to_string()))
            .collect(),
        found.trailing_slash_redirect,
        root.find_case_insensitive(path, true),
    )
}

fn probe_paths() -> Vec<String> {
    let mut paths: Vec<String> = ROUTES.iter().map(|r| substitute(r).0).collect();
    paths.extend(
        [
            "/cmd/test",
            "/cmd/test/3/",
            "/search",
            "/SEARCH/",
            "/Doc/GO1.HTML",
            "/doc",
            "/src",
            "/info/gordon",
            "/info/gordon/public/",
            "/user_/about",
            "/nothing/here",
        ]
        .map(String::from),
    );
    paths
}

#[test]
fn test_substituted_patterns_resolve_to_their_route() {
    let root = build_tree(ROUTES.iter().copied());

    for pattern in ROUTES {
        let (path, expected) = substitute(pattern);
        let found = root.lookup(&path);

        assert_eq!(found.handler.map(String::as_str), Some(*pattern), "path '{path}'");
        let params: Vec<(String, String)> = found
            .params
            .iter()
            .map(|p| (p.key.to_string(), p.value.to_string()))
            .collect();
        assert_eq!(params, expected, "params for '{path}'");
    }
}

#[test]
fn test_round_trip_reconstruction() {
    let root = build_tree(ROUTES.iter().copied());

    for pattern in ROUTES {
        let (path, _) = substitute(pattern);
        let found = root.lookup(&path);
        let handler = found.handler.expect("substituted path must match");
        let values: Vec<&str> = found.params.iter().map(|p| p.value).collect();

        assert_eq!(reconstruct(handler, &values), path);
    }
}

#[test]
fn test_insertion_order_does_not_change_results() {
    let reference = build_tree(ROUTES.iter().copied());
    let paths = probe_paths();
    let expected: Vec<Outcome> = paths.iter().map(|p| probe(&reference, p)).collect();

    let mut rng = StdRng::seed_from_u64(0x5eed);
    for round in 0..16 {
        let mut routes = ROUTES.to_vec();
        routes.shuffle(&mut rng);

        let root = build_tree(routes.iter().copied());
        assert_eq!(root.priority() as usize, ROUTES.len());

        for (path, want) in paths.iter().zip(&expected) {
            assert_eq!(&probe(&root, path), want, "round {round}, order {routes:?}, path '{path}'");
        }
    }
}

#[test]
fn test_case_insensitive_restores_registered_spelling() {
    let root = build_tree(["/Foo/Bar", "/Straße/:id", "/ÜBER/*rest"]);

    assert_eq!(root.find_case_insensitive("/foo/bar", false).as_deref(), Some("/Foo/Bar"));
    assert_eq!(root.find_case_insensitive("/FOO/BAR/", true).as_deref(), Some("/Foo/Bar"));
    assert_eq!(root.find_case_insensitive("/FOO/BAR/", false), None);
    assert_eq!(
        root.find_case_insensitive("/STRASSE/x", false),
        None,
        "multi-char folds are not applied"
    );
    assert_eq!(
        root.find_case_insensitive("/straße/MiXeD", false).as_deref(),
        Some("/Straße/MiXeD")
    );
    assert_eq!(
        root.find_case_insensitive("/über/A/b", false).as_deref(),
        Some("/ÜBER/A/b")
    );
}

#[test]
fn test_conflicts_leave_earlier_routes_intact() {
    let mut root = build_tree(ROUTES.iter().copied());

    assert!(matches!(
        root.insert("/cmd/:other/x", String::new()),
        Err(InsertError::WildcardConflict { .. })
    ));
    assert!(matches!(
        root.insert("/doc/", String::new()),
        Err(InsertError::DuplicateRoute { .. })
    ));

    for pattern in ROUTES {
        let (path, _) = substitute(pattern);
        assert_eq!(root.lookup(&path).handler.map(String::as_str), Some(*pattern));
    }
}
