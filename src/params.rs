//! Path parameters extracted during route matching.

/// Records name→value pairs discovered while matching wildcard segments.
///
/// The trie writes captures through this interface but owns neither the
/// storage nor its lifecycle — implementations are request-scoped and must
/// never be shared across concurrent requests. Repeated `add`/`delete` of the
/// same name must be tolerated.
pub trait ParamRecorder {
    fn add(&mut self, name: &str, value: &str);
    fn lookup(&self, name: &str) -> Option<&str>;
    fn delete(&mut self, name: &str);
}

/// The default recorder, handed to handlers via
/// [`Request::param`](crate::Request::param).
///
/// A plain vector beats a hash map here: routes carry a handful of parameters
/// at most, and a linear scan over a few entries is faster than hashing.
#[derive(Debug, Default)]
pub struct RouteParams {
    entries: Vec<(String, String)>,
}

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl ParamRecorder for RouteParams {
    fn add(&mut self, name: &str, value: &str) {
        self.entries.push((name.to_owned(), value.to_owned()));
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn delete(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }
}
