//! Request routing with middleware stacks and mounted sub-routers.
//!
//! A [`Router`] owns three things:
//!
//! 1. An ordered middleware stack that applies to everything it serves
//! 2. A route table keyed by method and path pattern
//! 3. Sub-routers mounted at path prefixes
//!
//! Routers are built with `&mut self` and then frozen behind an `Arc` for
//! serving. [`Router::resolve`] turns a method and path into a ready
//! [`Chain`]: the middleware of every router on the way down, outermost
//! first, then any route-specific middleware, then the handler.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use switchyard_core::{handler_fn, Response, ResponseExt};
//! use switchyard_middleware::RequestIdMiddleware;
//! use switchyard_server::{Resolution, Router};
//!
//! # fn main() -> Result<(), switchyard_server::RouterError> {
//! let mut router = Router::new();
//! router.use_middleware(RequestIdMiddleware::new())?;
//! router.get("/", handler_fn(|_ctx, _req| async { Response::text("hi") }))?;
//!
//! router.route("/articles", |r| {
//!     r.get("/{articleID}", handler_fn(|ctx, _req| async move {
//!         Response::text(ctx.param("articleID").unwrap_or_default().to_string())
//!     }))
//! })?;
//!
//! match router.resolve(&Method::GET, "/articles/42") {
//!     Resolution::Matched(route) => {
//!         assert_eq!(route.params.get("articleID"), Some("42"));
//!         assert_eq!(route.pattern, "/articles/{articleID}");
//!         assert_eq!(route.chain.names(), vec!["request_id"]);
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use http::Method;
use switchyard_core::{handler_fn, BoxedHandler, ErrorKind, Handler, Params};
use switchyard_middleware::{chain, BoxedMiddleware, Chain, Middleware};
use switchyard_router::{PathMatcher, PrefixMatcher};

use crate::error::RouterError;

/// A handler plus the middleware attached to that route alone.
struct Route {
    middleware: Vec<BoxedMiddleware>,
    handler: BoxedHandler,
}

/// A sub-router and the prefix it was mounted at.
struct Mount {
    prefix: String,
    router: Box<Router>,
}

/// A resolved request, ready to execute.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    /// Composed middleware chain ending in the route's handler.
    pub chain: Chain,
    /// Parameters bound by mount prefixes and the route pattern.
    pub params: Params,
    /// The full pattern that matched, mount prefixes included.
    pub pattern: String,
}

/// The result of [`Router::resolve`].
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A route matched the method and path.
    Matched(ResolvedRoute),
    /// No route matches the path under any method.
    NotFound,
    /// Routes match the path, but only under the listed methods.
    MethodNotAllowed(Vec<Method>),
}

/// HTTP request router.
///
/// Within one router, routes are matched most-specific-first (see
/// [`PathMatcher`]). Own routes are tried before mounts; mounts are tried
/// longest prefix first, and each mounted router repeats the same process
/// on the rest of the path.
#[derive(Default)]
pub struct Router {
    middleware: Vec<BoxedMiddleware>,
    routes: PathMatcher<Route>,
    mounts: PrefixMatcher<Mount>,
    not_found: Option<BoxedHandler>,
    method_not_allowed: Option<BoxedHandler>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware to this router's stack.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::MiddlewareAfterRoutes`] once a route or mount
    /// has been registered.
    pub fn use_middleware<M: Middleware>(&mut self, middleware: M) -> Result<(), RouterError> {
        self.use_boxed(Arc::new(middleware))
    }

    /// Appends an already shared middleware to this router's stack.
    ///
    /// # Errors
    ///
    /// Same as [`use_middleware`](Self::use_middleware).
    pub fn use_boxed(&mut self, middleware: BoxedMiddleware) -> Result<(), RouterError> {
        if self.has_routes() {
            return Err(RouterError::MiddlewareAfterRoutes);
        }
        self.middleware.push(middleware);
        Ok(())
    }

    /// Registers `handler` for `method` on `pattern`.
    ///
    /// # Errors
    ///
    /// Fails if the pattern is malformed or already registered for `method`.
    pub fn handle<H: Handler>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
    ) -> Result<(), RouterError> {
        self.handle_with(method, pattern, Vec::new(), handler)
    }

    /// Registers `handler` behind extra middleware that applies to this
    /// route only. The route middleware runs inside the router's own.
    ///
    /// # Errors
    ///
    /// Fails if the pattern is malformed or already registered for `method`.
    pub fn handle_with<H: Handler>(
        &mut self,
        method: Method,
        pattern: &str,
        middleware: Vec<BoxedMiddleware>,
        handler: H,
    ) -> Result<(), RouterError> {
        let route = Route {
            middleware,
            handler: Arc::new(handler),
        };
        self.routes.insert(method, pattern, route)?;
        Ok(())
    }

    /// Registers a `GET` route.
    ///
    /// # Errors
    ///
    /// See [`handle`](Self::handle).
    pub fn get<H: Handler>(&mut self, pattern: &str, handler: H) -> Result<(), RouterError> {
        self.handle(Method::GET, pattern, handler)
    }

    /// Registers a `POST` route.
    ///
    /// # Errors
    ///
    /// See [`handle`](Self::handle).
    pub fn post<H: Handler>(&mut self, pattern: &str, handler: H) -> Result<(), RouterError> {
        self.handle(Method::POST, pattern, handler)
    }

    /// Registers a `PUT` route.
    ///
    /// # Errors
    ///
    /// See [`handle`](Self::handle).
    pub fn put<H: Handler>(&mut self, pattern: &str, handler: H) -> Result<(), RouterError> {
        self.handle(Method::PUT, pattern, handler)
    }

    /// Registers a `PATCH` route.
    ///
    /// # Errors
    ///
    /// See [`handle`](Self::handle).
    pub fn patch<H: Handler>(&mut self, pattern: &str, handler: H) -> Result<(), RouterError> {
        self.handle(Method::PATCH, pattern, handler)
    }

    /// Registers a `DELETE` route.
    ///
    /// # Errors
    ///
    /// See [`handle`](Self::handle).
    pub fn delete<H: Handler>(&mut self, pattern: &str, handler: H) -> Result<(), RouterError> {
        self.handle(Method::DELETE, pattern, handler)
    }

    /// Registers a `HEAD` route.
    ///
    /// # Errors
    ///
    /// See [`handle`](Self::handle).
    pub fn head<H: Handler>(&mut self, pattern: &str, handler: H) -> Result<(), RouterError> {
        self.handle(Method::HEAD, pattern, handler)
    }

    /// Registers an `OPTIONS` route.
    ///
    /// # Errors
    ///
    /// See [`handle`](Self::handle).
    pub fn options<H: Handler>(&mut self, pattern: &str, handler: H) -> Result<(), RouterError> {
        self.handle(Method::OPTIONS, pattern, handler)
    }

    /// Mounts `router` at `prefix`.
    ///
    /// Requests under the prefix are resolved by `router` against the rest
    /// of the path. The prefix may bind parameters (`/{articleID}`); it may
    /// not end in a wildcard.
    ///
    /// # Errors
    ///
    /// Fails if the prefix is malformed or already mounted.
    pub fn mount(&mut self, prefix: &str, router: Router) -> Result<(), RouterError> {
        let mount = Mount {
            prefix: prefix.to_string(),
            router: Box::new(router),
        };
        self.mounts.insert(prefix, mount)?;
        Ok(())
    }

    /// Builds a sub-router with `build` and mounts it at `prefix`.
    ///
    /// # Errors
    ///
    /// Propagates errors from `build`, then fails like [`mount`](Self::mount).
    pub fn route<F>(&mut self, prefix: &str, build: F) -> Result<(), RouterError>
    where
        F: FnOnce(&mut Router) -> Result<(), RouterError>,
    {
        let mut sub = Router::new();
        build(&mut sub)?;
        self.mount(prefix, sub)
    }

    /// Replaces the default 404 response.
    ///
    /// Only the router handed to the dispatcher consults this. The handler
    /// runs inside that router's middleware.
    pub fn not_found<H: Handler>(&mut self, handler: H) {
        self.not_found = Some(Arc::new(handler));
    }

    /// Replaces the default 405 response.
    ///
    /// The dispatcher adds an `Allow` header if the handler does not.
    pub fn method_not_allowed<H: Handler>(&mut self, handler: H) {
        self.method_not_allowed = Some(Arc::new(handler));
    }

    /// Resolves `method` and `path` to a chain.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution {
        let mut allowed = Vec::new();
        match self.lookup(method, path, &[], &Params::new(), "", &mut allowed) {
            Some(route) => Resolution::Matched(route),
            None if allowed.is_empty() => Resolution::NotFound,
            None => Resolution::MethodNotAllowed(allowed),
        }
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
        outer: &[BoxedMiddleware],
        params: &Params,
        prefix: &str,
        allowed: &mut Vec<Method>,
    ) -> Option<ResolvedRoute> {
        let mut stack: Vec<BoxedMiddleware> =
            outer.iter().chain(&self.middleware).cloned().collect();

        if let Some(found) = self.routes.match_route(method, path) {
            let route = found.value;
            stack.extend(route.middleware.iter().cloned());

            let mut bound = params.clone();
            bound.extend_from(&found.params);

            return Some(ResolvedRoute {
                chain: chain::build(&stack, Arc::clone(&route.handler)),
                params: bound,
                pattern: join_pattern(prefix, found.pattern),
            });
        }

        for method in self.routes.allowed_methods(path) {
            if !allowed.contains(&method) {
                allowed.push(method);
            }
        }

        for hit in self.mounts.match_prefix(path) {
            let mut bound = params.clone();
            bound.extend_from(&hit.params);
            let mount_prefix = join_pattern(prefix, &hit.value.prefix);

            let found = hit.value.router.lookup(
                method,
                &hit.remainder,
                &stack,
                &bound,
                &mount_prefix,
                allowed,
            );
            if found.is_some() {
                return found;
            }
        }

        None
    }

    /// Returns the 404 chain: this router's middleware around the not-found
    /// handler.
    #[must_use]
    pub fn not_found_chain(&self) -> Chain {
        let handler = self.not_found.clone().unwrap_or_else(default_not_found);
        chain::build(&self.middleware, handler)
    }

    /// Returns the 405 chain: this router's middleware around the
    /// method-not-allowed handler.
    #[must_use]
    pub fn method_not_allowed_chain(&self) -> Chain {
        let handler = self
            .method_not_allowed
            .clone()
            .unwrap_or_else(default_method_not_allowed);
        chain::build(&self.middleware, handler)
    }

    /// Lists every `(method, pattern)` pair, mounted routes included with
    /// their full pattern.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut out = Vec::new();
        self.collect_routes("", &mut out);
        out
    }

    fn collect_routes(&self, prefix: &str, out: &mut Vec<(Method, String)>) {
        for (method, pattern) in self.routes.routes() {
            out.push((method, join_pattern(prefix, pattern)));
        }
        for mount in self.mounts.values() {
            mount
                .router
                .collect_routes(&join_pattern(prefix, &mount.prefix), out);
        }
    }

    /// Returns the names of this router's own middleware, outermost first.
    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    fn has_routes(&self) -> bool {
        !self.routes.is_empty() || !self.mounts.is_empty()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("middleware", &self.middleware_names())
            .field("routes", &self.routes.len())
            .field("mounts", &self.mounts.len())
            .finish_non_exhaustive()
    }
}

fn default_not_found() -> BoxedHandler {
    Arc::new(handler_fn(|_ctx, _req| async {
        ErrorKind::NotFound.into_response()
    }))
}

fn default_method_not_allowed() -> BoxedHandler {
    Arc::new(handler_fn(|_ctx, _req| async {
        ErrorKind::MethodNotAllowed.into_response()
    }))
}

fn join_pattern(prefix: &str, pattern: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if pattern.starts_with('/') {
        format!("{prefix}{pattern}")
    } else {
        format!("{prefix}/{pattern}")
    }
}
