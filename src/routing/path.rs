//! Lexical URL path normalization.

/// Return the canonical form of a URL path.
///
/// Applied iteratively until nothing changes:
/// 1. Replace multiple slashes with a single slash.
/// 2. Eliminate each `.` path element.
/// 3. Eliminate each `..` element together with the element that precedes it.
/// 4. Eliminate `..` elements that begin a rooted path.
///
/// The result always starts with `/`; a trailing `/` is kept. An empty input
/// yields `/`. The filesystem is never consulted.
pub fn clean_path(p: &str) -> String {
    if p.is_empty() {
        return "/".to_string();
    }

    let bytes = p.as_bytes();
    let n = bytes.len();
    let mut buf: Vec<u8> = Vec::with_capacity(n + 1);
    buf.push(b'/');

    let mut r = usize::from(bytes[0] == b'/');
    let mut trailing = n > 1 && bytes[n - 1] == b'/';

    while r < n {
        match bytes[r] {
            // empty element
            b'/' => r += 1,
            b'.' if r + 1 == n => {
                trailing = true;
                r += 1;
            }
            b'.' if bytes[r + 1] == b'/' => r += 1,
            b'.' if bytes[r + 1] == b'.' && (r + 2 == n || bytes[r + 2] == b'/') => {
                r += 2;

                // drop the last written element
                if buf.len() > 1 {
                    let mut w = buf.len() - 1;
                    while w > 1 && buf[w] != b'/' {
                        w -= 1;
                    }
                    buf.truncate(w);
                }
            }
            _ => {
                if buf.len() > 1 {
                    buf.push(b'/');
                }
                while r < n && bytes[r] != b'/' {
                    buf.push(bytes[r]);
                    r += 1;
                }
            }
        }
    }

    if trailing && buf.len() > 1 {
        buf.push(b'/');
    }

    // only whole `/`-delimited elements are copied, so the bytes stay valid UTF-8
    String::from_utf8(buf).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
