//! Case-insensitive path correction.
//!
//! Used only after a regular lookup misses: walks the same tree comparing
//! fragments with Unicode simple case folding and rebuilds the path with the
//! registered spelling of every static fragment.
//!
//! Static children are indexed by their first byte, which for a multi-byte
//! character may be a continuation byte. A 4-byte rune buffer carries the
//! folded bytes of a character whose leading bytes were consumed by the parent
//! fragment, so the byte cursor never drifts away from the index.

use crate::routing::tree::{Node, NodeKind};

type RuneBuf = [u8; 4];

impl<H> Node<H> {
    /// Find a registered path that equals `path` ignoring case.
    ///
    /// With `fix_trailing_slash`, a path that only matches after adding or
    /// removing one trailing `/` is corrected as well. Returns `None` when no
    /// correction exists.
    pub fn find_case_insensitive(&self, path: &str, fix_trailing_slash: bool) -> Option<String> {
        let mut ci_path = Vec::with_capacity(path.len() + 1);
        if self.find_case_insensitive_rec(path.as_bytes(), &mut ci_path, [0; 4], false, fix_trailing_slash) {
            String::from_utf8(ci_path).ok()
        } else {
            None
        }
    }

    fn find_case_insensitive_rec(
        &self,
        mut path: &[u8],
        ci_path: &mut Vec<u8>,
        mut rb: RuneBuf,
        mut parent_handler: bool,
        fix_trailing_slash: bool,
    ) -> bool {
        let mut n = self;
        let mut np_len = n.path.len();

        'walk: while path.len() >= np_len && fragment_matches(path, &n.path, &rb) {
            let old_path = path;
            path = &path[np_len..];
            ci_path.extend_from_slice(&n.path);

            if path.is_empty() {
                if n.handler.is_some() {
                    return true;
                }

                // try the path with an added trailing slash
                if fix_trailing_slash {
                    if let Some(pos) = n.indices.iter().position(|&b| b == b'/') {
                        let child = &n.children[pos];
                        if (child.path.len() == 1 && child.handler.is_some())
                            || (child.kind == NodeKind::CatchAll
                                && child.children.first().is_some_and(|c| c.handler.is_some()))
                        {
                            ci_path.push(b'/');
                            return true;
                        }
                        return false;
                    }
                }
                return false;
            }

            if !n.wild_child {
                rb = shift_rune_bytes(rb, np_len);

                if rb[0] != 0 {
                    // finish the rune started in the parent fragment
                    if let Some(pos) = n.indices.iter().position(|&b| b == rb[0]) {
                        parent_handler = n.handler.is_some();
                        n = &n.children[pos];
                        np_len = n.path.len();
                        continue 'walk;
                    }
                } else {
                    let (rune, off) = rune_at(old_path, np_len);

                    match rune {
                        Some(rv) => {
                            let lo = simple_lower(rv);
                            let folded = shift_rune_bytes(encode(lo), off);

                            // both cases may be indexed, so the lowercase
                            // branch is tried recursively first
                            if let Some(pos) = n.indices.iter().position(|&b| b == folded[0]) {
                                let mark = ci_path.len();
                                if n.children[pos].find_case_insensitive_rec(
                                    path,
                                    ci_path,
                                    folded,
                                    n.handler.is_some(),
                                    fix_trailing_slash,
                                ) {
                                    return true;
                                }
                                ci_path.truncate(mark);
                            }

                            let up = simple_upper(rv);
                            if up != lo {
                                let folded = shift_rune_bytes(encode(up), off);
                                if let Some(pos) = n.indices.iter().position(|&b| b == folded[0]) {
                                    rb = folded;
                                    parent_handler = n.handler.is_some();
                                    n = &n.children[pos];
                                    np_len = n.path.len();
                                    continue 'walk;
                                }
                            }
                        }
                        None => {
                            // not valid UTF-8: fall back to the raw byte
                            if let Some(pos) = n.indices.iter().position(|&b| b == path[0]) {
                                parent_handler = n.handler.is_some();
                                n = &n.children[pos];
                                np_len = n.path.len();
                                continue 'walk;
                            }
                        }
                    }
                }

                // the same URL without the trailing slash has a handler
                return fix_trailing_slash && path == b"/" && n.handler.is_some();
            }

            parent_handler = n.handler.is_some();
            n = &n.children[0];
            match n.kind {
                NodeKind::Param => {
                    let end = path.iter().position(|&b| b == b'/').unwrap_or(path.len());
                    ci_path.extend_from_slice(&path[..end]);

                    if end < path.len() {
                        if let Some(child) = n.children.first() {
                            path = &path[end..];
                            parent_handler = n.handler.is_some();
                            n = child;
                            np_len = n.path.len();
                            rb = [0; 4];
                            continue 'walk;
                        }
                        return fix_trailing_slash && path.len() == end + 1 && n.handler.is_some();
                    }

                    if n.handler.is_some() {
                        return true;
                    }
                    if fix_trailing_slash {
                        if let [child] = n.children.as_slice() {
                            if child.path == b"/" && child.handler.is_some() {
                                ci_path.push(b'/');
                                return true;
                            }
                        }
                    }
                    return false;
                }
                NodeKind::CatchAll => {
                    ci_path.extend_from_slice(path);
                    return true;
                }
                NodeKind::Static | NodeKind::Root => return false,
            }
        }

        // try to fix the path by adding or removing a trailing slash
        if fix_trailing_slash {
            // dropping the slash leaves the path of the node we came from
            if path == b"/" {
                return parent_handler;
            }
            if !path.is_empty()
                && path.len() + 1 == np_len
                && n.path[path.len()] == b'/'
                && fragment_matches(path, &n.path[..path.len()], &rb)
                && n.handler.is_some()
            {
                ci_path.extend_from_slice(&n.path);
                return true;
            }
        }
        false
    }
}

/// Drop the first `n` bytes of the buffer, zero-filling from the right.
fn shift_rune_bytes(rb: RuneBuf, n: usize) -> RuneBuf {
    match n {
        0 => rb,
        1 => [rb[1], rb[2], rb[3], 0],
        2 => [rb[2], rb[3], 0, 0],
        3 => [rb[3], 0, 0, 0],
        _ => [0; 4],
    }
}

fn encode(c: char) -> RuneBuf {
    let mut rb = [0; 4];
    c.encode_utf8(&mut rb);
    rb
}

fn is_rune_start(b: u8) -> bool {
    b & 0xC0 != 0x80
}

/// Decode the character covering byte `at` of `bytes`, looking back at most
/// three bytes for its start. Returns the character and how many of its bytes
/// precede `at`.
fn rune_at(bytes: &[u8], at: usize) -> (Option<char>, usize) {
    for off in 0..=at.min(3) {
        let start = at - off;
        if is_rune_start(bytes[start]) {
            return (decode_rune(&bytes[start..]), off);
        }
    }
    (None, 0)
}

fn decode_rune(bytes: &[u8]) -> Option<char> {
    let head = &bytes[..bytes.len().min(4)];
    let valid = match std::str::from_utf8(head) {
        Ok(s) => s,
        Err(e) => std::str::from_utf8(&head[..e.valid_up_to()]).ok()?,
    };
    valid.chars().next()
}

/// Lowercase mapping restricted to one-to-one mappings; characters whose
/// lowercase form is several characters are left unchanged.
fn simple_lower(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

fn simple_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn chars_fold_eq(a: char, b: char) -> bool {
    a == b || simple_lower(a) == simple_lower(b) || simple_upper(a) == simple_upper(b)
}

/// Whether the first `fragment.len()` bytes of `path` fold to `fragment`.
///
/// A fragment may begin with the continuation bytes of a character whose
/// lead byte sits in the parent fragment. `rb` holds the still unconsumed
/// bytes of that character, case-folded to the spelling chosen at the
/// parent's index; the fragment's leading continuation bytes must equal them.
fn fragment_matches(path: &[u8], fragment: &[u8], rb: &RuneBuf) -> bool {
    let Some(path) = path.get(..fragment.len()) else {
        return false;
    };
    let continuation = |bytes: &[u8]| bytes.iter().take_while(|&&b| !is_rune_start(b)).count();

    let skip = continuation(fragment);
    if skip != continuation(path) {
        return false;
    }
    if skip > 0 && rb.get(..skip) != Some(&fragment[..skip]) {
        return false;
    }
    equal_fold(&path[skip..], &fragment[skip..])
}

/// Case-insensitive comparison of two byte strings that may begin or end in
/// the middle of a multi-byte character. Invalid stretches compare bytewise.
pub(crate) fn equal_fold(a: &[u8], b: &[u8]) -> bool {
    let (mut a, mut b) = (a, b);
    loop {
        if a.is_empty() || b.is_empty() {
            return a.is_empty() && b.is_empty();
        }
        match (decode_rune(a), decode_rune(b)) {
            (Some(ca), Some(cb)) => {
                if !chars_fold_eq(ca, cb) {
                    return false;
                }
                a = &a[ca.len_utf8()..];
                b = &b[cb.len_utf8()..];
            }
            (None, None) => {
                if a[0] != b[0] {
                    return false;
                }
                a = &a[1..];
                b = &b[1..];
            }
            _ => return false,
        }
    }
}
