//! HTTP method-based routing.
//!
//! [`MethodRouter`] maps HTTP methods to the values registered for a single
//! path pattern.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to values for one route pattern.
///
/// # Example
///
/// ```rust
/// use switchyard_router::MethodRouter;
/// use http::Method;
///
/// let mut router = MethodRouter::new();
/// router.insert(Method::GET, "listArticles").unwrap();
/// router.insert(Method::POST, "createArticle").unwrap();
///
/// assert_eq!(router.get(&Method::GET), Some(&"listArticles"));
/// assert_eq!(router.get(&Method::DELETE), None);
/// assert_eq!(router.allowed_methods(), vec![Method::GET, Method::POST]);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    entries: SmallVec<[(Method, T); 4]>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates a new empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` for `method`.
    ///
    /// # Errors
    ///
    /// Hands `value` back if the method is already registered; the first
    /// registration is kept.
    pub fn insert(&mut self, method: Method, value: T) -> Result<(), T> {
        if self.contains(&method) {
            return Err(value);
        }
        self.entries.push((method, value));
        Ok(())
    }

    /// Returns the value registered for `method`.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, v)| v)
    }

    /// Returns true if `method` is registered.
    #[must_use]
    pub fn contains(&self, method: &Method) -> bool {
        self.entries.iter().any(|(m, _)| m == method)
    }

    /// Returns true if any methods are registered.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Returns the registered methods in registration order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.entries.iter().map(|(m, _)| m.clone()).collect()
    }

    /// Iterates over `(method, value)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Method, &T)> {
        self.entries.iter().map(|(m, v)| (m, v))
    }
}
