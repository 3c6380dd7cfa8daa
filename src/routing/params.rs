//! Path parameters extracted during lookup.

use serde::Serialize;

/// A single URL parameter: the wildcard name and the matched value.
///
/// The key borrows from the tree, the value from the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Param<'k, 'v> {
    pub key: &'k str,
    pub value: &'v str,
}

/// Ordered list of parameters, in the order the wildcards appear in the pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params<'k, 'v> {
    inner: Vec<Param<'k, 'v>>,
}

impl<'k, 'v> Params<'k, 'v> {
    /// Create an empty parameter list.
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, key: &'k str, value: &'v str) {
        self.inner.push(Param { key, value });
    }

    pub(crate) fn clear(&mut self) {
        self.inner.clear();
    }

    /// Value of the first parameter named `name`.
    pub fn get(&self, name: &str) -> Option<&'v str> {
        self.inner
            .iter()
            .find(|p| p.key == name)
            .map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param<'k, 'v>> {
        self.inner.iter()
    }

    /// Number of slots reserved for parameters.
    pub(crate) fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

impl<'a, 'k, 'v> IntoIterator for &'a Params<'k, 'v> {
    type Item = &'a Param<'k, 'v>;
    type IntoIter = std::slice::Iter<'a, Param<'k, 'v>>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
