//! Path matching for Switchyard.
//!
//! This crate compiles route patterns into a segment tree and finds the most
//! specific pattern for a request path. It knows nothing about handlers or
//! middleware: every table is generic over the value stored at a route.
//!
//! # Features
//!
//! - **Literal segments**: `/articles/search`
//! - **Named parameters**: `/articles/{articleID}`
//! - **Constrained parameters**: `/articles/{articleSlug:[a-z-]+}`
//! - **Composite segments**: `/articles/{month}-{day}-{year}`
//! - **Wildcards**: `/files/*` or `/files/*path`
//! - **Prefix tables** for mounting sub-routers under `/admin` or
//!   `/{articleID}`
//!
//! # Example
//!
//! ```rust
//! use switchyard_router::PathMatcher;
//! use http::Method;
//!
//! let mut matcher = PathMatcher::new();
//! matcher.insert(Method::GET, "/articles/{month}-{day}-{year}", "listByDate").unwrap();
//! matcher.insert(Method::GET, "/articles/{articleSlug:[a-z-]+}", "getBySlug").unwrap();
//!
//! let found = matcher.match_route(&Method::GET, "/articles/01-16-2017").unwrap();
//! assert_eq!(*found.value, "listByDate");
//! assert_eq!(found.params.get("year"), Some("2017"));
//!
//! let found = matcher.match_route(&Method::GET, "/articles/home-is-toronto").unwrap();
//! assert_eq!(*found.value, "getBySlug");
//! ```
//!
//! # Architecture
//!
//! ```text
//!                    (root)
//!                      │
//!                  "articles"
//!                      │
//!        ┌─────────────┼──────────────┐
//!        │             │              │
//!    "search"   {slug:[a-z-]+}  {month}-{day}-{year}
//!     [GET]        [GET]           [GET]
//! ```
//!
//! Literal children are looked up by binary search. The remaining children
//! are tried in [`Specificity`] order and the walk backtracks out of any
//! branch that fails further down.

mod error;
mod matcher;
mod method_router;
mod node;
mod params;
mod pattern;

pub use error::{InsertError, PatternError};
pub use matcher::{PathMatcher, PrefixMatch, PrefixMatcher};
pub use method_router::MethodRouter;
pub use node::{Node, PrefixHit};
pub use params::Params;
pub use pattern::{split_path, Pattern, Segment, SegmentMatcher, Specificity, WILDCARD_PARAM};

/// A matched route with its value and extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The value registered for the route.
    pub value: &'a T,
    /// Extracted path parameters.
    pub params: Params,
    /// The pattern the route was registered with.
    pub pattern: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_basic_routing() {
        let mut matcher = PathMatcher::new();
        matcher.insert(Method::GET, "/", "index").unwrap();
        matcher.insert(Method::GET, "/articles", "listArticles").unwrap();
        matcher.insert(Method::GET, "/articles/{articleID}", "getArticle").unwrap();

        let m = matcher.match_route(&Method::GET, "/").unwrap();
        assert_eq!(*m.value, "index");

        let m = matcher.match_route(&Method::GET, "/articles").unwrap();
        assert_eq!(*m.value, "listArticles");
        assert!(m.params.is_empty());

        let m = matcher.match_route(&Method::GET, "/articles/123").unwrap();
        assert_eq!(*m.value, "getArticle");
        assert_eq!(m.params.get("articleID"), Some("123"));
    }

    #[test]
    fn test_method_routing() {
        let mut matcher = PathMatcher::new();
        matcher.insert(Method::GET, "/articles", "listArticles").unwrap();
        matcher.insert(Method::POST, "/articles", "createArticle").unwrap();

        assert_eq!(
            *matcher.match_route(&Method::GET, "/articles").unwrap().value,
            "listArticles"
        );
        assert_eq!(
            *matcher.match_route(&Method::POST, "/articles").unwrap().value,
            "createArticle"
        );
        assert!(matcher.match_route(&Method::DELETE, "/articles").is_none());
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let mut matcher = PathMatcher::new();
        matcher.insert(Method::GET, "/articles", "listArticles").unwrap();

        assert!(matcher.match_route(&Method::GET, "/articles/").is_some());
        assert!(matcher.match_route(&Method::GET, "//articles").is_some());
    }

    #[test]
    fn test_wildcard_routing() {
        let mut matcher = PathMatcher::new();
        matcher.insert(Method::GET, "/files/*", "serveFile").unwrap();

        let m = matcher
            .match_route(&Method::GET, "/files/images/logo.png")
            .unwrap();
        assert_eq!(*m.value, "serveFile");
        assert_eq!(m.params.get(WILDCARD_PARAM), Some("images/logo.png"));

        // A wildcard needs at least one segment to swallow.
        assert!(matcher.match_route(&Method::GET, "/files").is_none());
    }

    #[test]
    fn test_empty_segment_never_binds_param() {
        let mut matcher = PathMatcher::new();
        matcher.insert(Method::GET, "/articles/{articleID}", "getArticle").unwrap();

        assert!(matcher.match_route(&Method::GET, "/articles/").is_none());
    }

    #[test]
    fn test_multiple_params() {
        let mut matcher = PathMatcher::new();
        matcher
            .insert(Method::GET, "/orgs/{orgId}/users/{userId}", "getOrgUser")
            .unwrap();

        let m = matcher
            .match_route(&Method::GET, "/orgs/acme/users/123")
            .unwrap();
        assert_eq!(*m.value, "getOrgUser");
        assert_eq!(m.params.get("orgId"), Some("acme"));
        assert_eq!(m.params.get("userId"), Some("123"));
        assert_eq!(m.pattern, "/orgs/{orgId}/users/{userId}");
    }
}
