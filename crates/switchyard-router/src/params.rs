//! Path parameter storage.
//!
//! Bindings are kept as an ordered list of `(name, value)` pairs in a
//! small vector, so the common one-to-four parameter case stays on the
//! stack. Parameters bound by an enclosing mount prefix come first; a later
//! binding with the same name shadows an earlier one.

use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Extracted path parameters from a route match.
///
/// # Example
///
/// ```rust
/// use switchyard_router::Params;
///
/// let mut params = Params::new();
/// params.push("articleID", "123");
/// params.push("format", "json");
///
/// assert_eq!(params.get("articleID"), Some("123"));
/// assert_eq!(params.get("format"), Some("json"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a params set with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: SmallVec::with_capacity(capacity),
        }
    }

    /// Adds a binding.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the most recent value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the bindings in the order they were made.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Drops every binding made after the first `len`.
    ///
    /// The matcher uses this to undo bindings when it backtracks out of a
    /// branch.
    pub fn truncate(&mut self, len: usize) {
        self.inner.truncate(len);
    }

    /// Appends all bindings from `other`, keeping their order.
    pub fn extend_from(&mut self, other: &Params) {
        self.inner.extend(other.inner.iter().cloned());
    }

    /// Clears all parameters, retaining allocated capacity.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.inner
            .iter()
            .map(as_pair as fn(&'a (String, String)) -> (&'a str, &'a str))
    }
}

fn as_pair((name, value): &(String, String)) -> (&str, &str) {
    (name.as_str(), value.as_str())
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_new() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn test_params_push_and_get() {
        let mut params = Params::new();
        params.push("id", "123");
        params.push("name", "alice");

        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.get("name"), Some("alice"));
        assert_eq!(params.get("unknown"), None);
    }

    #[test]
    fn test_later_binding_shadows_earlier() {
        let mut params = Params::new();
        params.push("id", "outer");
        params.push("id", "inner");

        assert_eq!(params.get("id"), Some("inner"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_params_truncate() {
        let mut params = Params::new();
        params.push("a", "1");
        let mark = params.len();
        params.push("b", "2");
        params.push("c", "3");

        params.truncate(mark);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("b"), None);
        assert_eq!(params.get("a"), Some("1"));
    }

    #[test]
    fn test_params_extend_from() {
        let mut outer = Params::new();
        outer.push("articleID", "123");
        let mut inner = Params::new();
        inner.push("format", "json");

        outer.extend_from(&inner);
        let pairs: Vec<_> = outer.iter().collect();
        assert_eq!(pairs, vec![("articleID", "123"), ("format", "json")]);
    }

    #[test]
    fn test_params_from_iterator() {
        let pairs = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ];

        let params: Params = pairs.into_iter().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("b"), Some("2"));
    }

    #[test]
    fn test_params_many_params() {
        let mut params = Params::new();
        for i in 0..10 {
            params.push(format!("key{i}"), format!("value{i}"));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("key5"), Some("value5"));
    }
}
