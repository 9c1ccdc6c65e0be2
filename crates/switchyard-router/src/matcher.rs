//! Matcher front-ends over the segment tree.
//!
//! [`PathMatcher`] stores full routes keyed by method and pattern.
//! [`PrefixMatcher`] stores mount points that claim every path under a
//! prefix and hand the remainder on.

use http::Method;

use crate::error::InsertError;
use crate::method_router::MethodRouter;
use crate::node::Node;
use crate::params::Params;
use crate::pattern::{split_path, Pattern};
use crate::RouteMatch;

/// Methods registered at one tree position, plus the pattern that created it.
#[derive(Debug, Clone)]
struct Endpoint<T> {
    pattern: String,
    methods: MethodRouter<T>,
}

/// Route table keyed by method and path pattern.
///
/// When several patterns match a path, the most specific one registered for
/// the request method wins: literal segments beat constrained parameters,
/// which beat composite segments, which beat plain parameters, which beat a
/// trailing wildcard. Branches that fail deeper in the path are backtracked
/// out of, so a less specific sibling still gets its chance.
///
/// # Example
///
/// ```rust
/// use switchyard_router::PathMatcher;
/// use http::Method;
///
/// let mut matcher = PathMatcher::new();
/// matcher.insert(Method::GET, "/articles/{articleID}", "getArticle").unwrap();
/// matcher.insert(Method::GET, "/articles/search", "searchArticles").unwrap();
///
/// let found = matcher.match_route(&Method::GET, "/articles/42").unwrap();
/// assert_eq!(*found.value, "getArticle");
/// assert_eq!(found.params.get("articleID"), Some("42"));
/// assert_eq!(found.pattern, "/articles/{articleID}");
/// ```
#[derive(Debug, Clone)]
pub struct PathMatcher<T> {
    root: Node<Endpoint<T>>,
    route_count: usize,
}

impl<T> Default for PathMatcher<T> {
    fn default() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }
}

impl<T> PathMatcher<T> {
    /// Creates an empty matcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` for `method` on `pattern`.
    ///
    /// # Errors
    ///
    /// Fails if the pattern does not parse or if the same method is already
    /// registered on an identical pattern.
    pub fn insert(&mut self, method: Method, pattern: &str, value: T) -> Result<(), InsertError> {
        let parsed = Pattern::parse(pattern)?;
        self.insert_pattern(method, &parsed, value)
    }

    /// Registers `value` for `method` on an already parsed pattern.
    ///
    /// # Errors
    ///
    /// Fails if the same method is already registered on an identical
    /// pattern, or on one that differs only in parameter names.
    pub fn insert_pattern(
        &mut self,
        method: Method,
        pattern: &Pattern,
        value: T,
    ) -> Result<(), InsertError> {
        let mut twins = Vec::new();
        self.root.renamed_twins(pattern.segments(), &mut twins);
        if let Some(existing) = twins.into_iter().find(|e| e.methods.contains(&method)) {
            return Err(InsertError::ShadowedRoute {
                method,
                pattern: pattern.as_str().to_string(),
                existing: existing.pattern.clone(),
            });
        }

        let endpoint = self
            .root
            .slot_mut(pattern.segments())
            .get_or_insert_with(|| Endpoint {
                pattern: pattern.as_str().to_string(),
                methods: MethodRouter::new(),
            });

        if endpoint.methods.insert(method.clone(), value).is_err() {
            return Err(InsertError::DuplicateRoute {
                method,
                pattern: pattern.as_str().to_string(),
            });
        }
        self.route_count += 1;
        Ok(())
    }

    /// Finds the most specific route registered for `method` that matches
    /// `path`.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let segments = split_path(path);
        let mut params = Params::new();
        let endpoint = self.root.find(&segments, &mut params, &mut |endpoint| {
            endpoint.methods.contains(method)
        })?;
        let value = endpoint.methods.get(method)?;
        Some(RouteMatch {
            value,
            params,
            pattern: &endpoint.pattern,
        })
    }

    /// Returns true if any route, under any method, matches `path`.
    #[must_use]
    pub fn matches_path(&self, path: &str) -> bool {
        let segments = split_path(path);
        self.root
            .find(&segments, &mut Params::new(), &mut |_| true)
            .is_some()
    }

    /// Returns every method registered on any pattern that matches `path`.
    ///
    /// Methods are listed once each, in the order they are first found. An
    /// empty result means no route matches the path at all.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let segments = split_path(path);
        let mut allowed: Vec<Method> = Vec::new();
        // Rejecting every candidate forces a walk over all matching branches.
        self.root
            .find(&segments, &mut Params::new(), &mut |endpoint| {
                for method in endpoint.methods.allowed_methods() {
                    if !allowed.contains(&method) {
                        allowed.push(method);
                    }
                }
                false
            });
        allowed
    }

    /// Lists every registered `(method, pattern)` pair.
    pub fn routes(&self) -> Vec<(Method, &str)> {
        let mut routes = Vec::with_capacity(self.route_count);
        self.root.for_each_value(&mut |endpoint| {
            for (method, _) in endpoint.methods.iter() {
                routes.push((method.clone(), endpoint.pattern.as_str()));
            }
        });
        routes
    }

    /// Returns the number of `(method, pattern)` pairs registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}

/// A prefix that matched the start of a path.
#[derive(Debug, Clone)]
pub struct PrefixMatch<'a, V> {
    /// Value stored for the prefix.
    pub value: &'a V,
    /// Bindings made by the prefix itself.
    pub params: Params,
    /// The rest of the path, always starting with `/`.
    pub remainder: String,
}

/// Mount table: values keyed by path prefix.
///
/// Prefixes may contain parameters and constraints but no wildcard. A
/// prefix matches when its segments match the leading segments of a path.
///
/// # Example
///
/// ```rust
/// use switchyard_router::PrefixMatcher;
///
/// let mut mounts = PrefixMatcher::new();
/// mounts.insert("/articles", "articles").unwrap();
/// mounts.insert("/articles/{articleID}", "article").unwrap();
///
/// let hits = mounts.match_prefix("/articles/7/comments");
/// assert_eq!(*hits[0].value, "article");
/// assert_eq!(hits[0].remainder, "/comments");
/// assert_eq!(*hits[1].value, "articles");
/// assert_eq!(hits[1].remainder, "/7/comments");
/// ```
#[derive(Debug, Clone)]
pub struct PrefixMatcher<V> {
    root: Node<V>,
    count: usize,
}

impl<V> Default for PrefixMatcher<V> {
    fn default() -> Self {
        Self {
            root: Node::root(),
            count: 0,
        }
    }
}

impl<V> PrefixMatcher<V> {
    /// Creates an empty prefix table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` under `prefix`.
    ///
    /// # Errors
    ///
    /// Fails if the prefix does not parse, ends in a wildcard, or is already
    /// registered.
    pub fn insert(&mut self, prefix: &str, value: V) -> Result<(), InsertError> {
        let parsed = Pattern::parse(prefix)?;
        if parsed.has_wildcard() {
            return Err(InsertError::WildcardPrefix {
                prefix: prefix.to_string(),
            });
        }

        let slot = self.root.slot_mut(parsed.segments());
        if slot.is_some() {
            return Err(InsertError::DuplicatePrefix {
                prefix: prefix.to_string(),
            });
        }
        *slot = Some(value);
        self.count += 1;
        Ok(())
    }

    /// Returns every prefix matching the start of `path`.
    ///
    /// Longer prefixes come first; prefixes of equal length are ordered by
    /// specificity and then registration.
    #[must_use]
    pub fn match_prefix(&self, path: &str) -> Vec<PrefixMatch<'_, V>> {
        let segments = split_path(path);
        let mut hits = Vec::new();
        self.root
            .collect_prefixes(&segments, 0, &mut Params::new(), &mut hits);
        hits.sort_by(|a, b| b.consumed.cmp(&a.consumed));

        hits.into_iter()
            .map(|hit| PrefixMatch {
                value: hit.value,
                params: hit.params,
                remainder: remainder(&segments[hit.consumed..]),
            })
            .collect()
    }

    /// Lists every stored value.
    pub fn values(&self) -> Vec<&V> {
        let mut values = Vec::with_capacity(self.count);
        self.root.for_each_value(&mut |v| values.push(v));
        values
    }

    /// Returns the number of prefixes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

fn remainder(segments: &[&str]) -> String {
    let mut out = String::with_capacity(segments.iter().map(|s| s.len() + 1).sum::<usize>() + 1);
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_route_rejected() {
        let mut matcher = PathMatcher::new();
        matcher.insert(Method::GET, "/articles", 1).unwrap();

        let err = matcher.insert(Method::GET, "/articles/", 2).unwrap_err();
        assert!(matches!(err, InsertError::DuplicateRoute { .. }));
        assert_eq!(matcher.len(), 1);

        // Same pattern, different method is fine.
        matcher.insert(Method::POST, "/articles", 3).unwrap();
        assert_eq!(matcher.len(), 2);
    }

    #[test]
    fn test_renamed_params_rejected_per_method() {
        let mut matcher = PathMatcher::new();
        matcher.insert(Method::GET, "/articles/{id}", 1).unwrap();

        let err = matcher.insert(Method::GET, "/articles/{name}", 2).unwrap_err();
        assert_eq!(
            err,
            InsertError::ShadowedRoute {
                method: Method::GET,
                pattern: "/articles/{name}".to_string(),
                existing: "/articles/{id}".to_string(),
            }
        );
        assert_eq!(matcher.len(), 1);

        // Another method may bind its own name.
        matcher.insert(Method::PUT, "/articles/{name}", 3).unwrap();
        let found = matcher.match_route(&Method::PUT, "/articles/7").unwrap();
        assert_eq!(found.params.get("name"), Some("7"));

        // A narrower constraint is a different route, not a rename.
        matcher.insert(Method::GET, "/articles/{n:[0-9]+}", 4).unwrap();
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut matcher = PathMatcher::new();
        let err = matcher.insert(Method::GET, "/{id", 1).unwrap_err();
        assert!(matches!(err, InsertError::Pattern(_)));
        assert!(matcher.is_empty());
    }

    #[test]
    fn test_method_specific_fallback() {
        let mut matcher = PathMatcher::new();
        matcher.insert(Method::GET, "/articles/search", "search").unwrap();
        matcher.insert(Method::DELETE, "/articles/{id}", "delete").unwrap();

        // The static node only has GET, so DELETE falls through to the param.
        let found = matcher.match_route(&Method::DELETE, "/articles/search").unwrap();
        assert_eq!(*found.value, "delete");
        assert_eq!(found.params.get("id"), Some("search"));
    }

    #[test]
    fn test_allowed_methods_union() {
        let mut matcher = PathMatcher::new();
        matcher.insert(Method::GET, "/articles/search", "search").unwrap();
        matcher.insert(Method::PUT, "/articles/{id}", "update").unwrap();
        matcher.insert(Method::DELETE, "/articles/{id}", "delete").unwrap();

        assert_eq!(
            matcher.allowed_methods("/articles/search"),
            vec![Method::GET, Method::PUT, Method::DELETE]
        );
        assert_eq!(
            matcher.allowed_methods("/articles/7"),
            vec![Method::PUT, Method::DELETE]
        );
        assert!(matcher.allowed_methods("/users").is_empty());
    }

    #[test]
    fn test_matches_path_ignores_method() {
        let mut matcher = PathMatcher::new();
        matcher.insert(Method::POST, "/articles", ()).unwrap();

        assert!(matcher.matches_path("/articles"));
        assert!(matcher.match_route(&Method::GET, "/articles").is_none());
        assert!(!matcher.matches_path("/users"));
    }

    #[test]
    fn test_routes_listing() {
        let mut matcher = PathMatcher::new();
        matcher.insert(Method::GET, "/", ()).unwrap();
        matcher.insert(Method::GET, "/articles", ()).unwrap();
        matcher.insert(Method::POST, "/articles", ()).unwrap();

        let mut routes = matcher.routes();
        routes.sort_by(|a, b| (a.1, a.0.as_str()).cmp(&(b.1, b.0.as_str())));
        assert_eq!(
            routes,
            vec![
                (Method::GET, "/"),
                (Method::GET, "/articles"),
                (Method::POST, "/articles"),
            ]
        );
    }

    #[test]
    fn test_prefix_exact_match_has_root_remainder() {
        let mut mounts = PrefixMatcher::new();
        mounts.insert("/admin", "admin").unwrap();

        let hits = mounts.match_prefix("/admin");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].remainder, "/");

        assert!(mounts.match_prefix("/administrator").is_empty());
    }

    #[test]
    fn test_prefix_params() {
        let mut mounts = PrefixMatcher::new();
        mounts.insert("/{articleID}", "article").unwrap();

        let hits = mounts.match_prefix("/42/comments");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].params.get("articleID"), Some("42"));
        assert_eq!(hits[0].remainder, "/comments");
    }

    #[test]
    fn test_prefix_errors() {
        let mut mounts = PrefixMatcher::new();
        mounts.insert("/api", 1).unwrap();

        assert!(matches!(
            mounts.insert("/api/", 2).unwrap_err(),
            InsertError::DuplicatePrefix { .. }
        ));
        assert!(matches!(
            mounts.insert("/files/*", 3).unwrap_err(),
            InsertError::WildcardPrefix { .. }
        ));
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts.values(), vec![&1]);
    }

    #[test]
    fn test_root_prefix_matches_everything() {
        let mut mounts = PrefixMatcher::new();
        mounts.insert("/", "root").unwrap();
        mounts.insert("/api", "api").unwrap();

        let hits = mounts.match_prefix("/api/users");
        let values: Vec<_> = hits.iter().map(|h| *h.value).collect();
        assert_eq!(values, vec!["api", "root"]);
        assert_eq!(hits[1].remainder, "/api/users");
    }
}
