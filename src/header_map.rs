//! Ordered multi-map of decoded header fields.

use std::borrow::Cow;

use crate::hpack::H2Header;

/// Decoded headers in wire order.
///
/// A name may appear more than once; every occurrence is kept and lookups
/// return them in the order they were added. Names are compared as raw
/// bytes, with no case folding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMap {
    entries: Vec<H2Header>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, keeping any earlier values for the same name.
    pub fn push(&mut self, header: H2Header) {
        self.entries.push(header);
    }

    pub fn add(&mut self, name: impl Into<Vec<u8>>, value: impl Into<String>) {
        self.push(H2Header::new(name, value));
    }

    /// First value for `name`.
    pub fn get(&self, name: impl AsRef<[u8]>) -> Option<&str> {
        let name = name.as_ref();
        self.entries
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
    }

    /// All values for `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a [u8]) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |h| h.name == name)
            .map(|h| h.value.as_str())
    }

    pub fn contains(&self, name: impl AsRef<[u8]>) -> bool {
        let name = name.as_ref();
        self.entries.iter().any(|h| h.name == name)
    }

    /// Number of fields, counting repeated names once per occurrence.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, H2Header> {
        self.entries.iter()
    }

    /// `(name, value)` pairs with lossy UTF-8 names, handy for assertions and logging.
    pub fn pairs(&self) -> impl Iterator<Item = (Cow<'_, str>, &str)> {
        self.entries.iter().map(|h| (h.name_str(), h.value.as_str()))
    }

    pub fn into_vec(self) -> Vec<H2Header> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a HeaderMap {
    type Item = &'a H2Header;
    type IntoIter = std::slice::Iter<'a, H2Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for HeaderMap {
    type Item = H2Header;
    type IntoIter = std::vec::IntoIter<H2Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<H2Header> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = H2Header>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
