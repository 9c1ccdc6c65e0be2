//! Authorization gate.
//!
//! [`Authorize`] consults an injected predicate and either forwards the
//! request or answers `403 Forbidden` without running anything further
//! down the chain. The decision logic is the caller's: the gate only
//! consumes the boolean.
//!
//! # Example
//!
//! ```rust
//! use switchyard_core::ContextKey;
//! use switchyard_middleware::stages::Authorize;
//!
//! struct Permission;
//!
//! impl ContextKey for Permission {
//!     type Value = Vec<String>;
//!     const NAME: &'static str = "acl.permission";
//! }
//!
//! // Deny unless an upstream middleware granted the "admin" permission.
//! let admin_only = Authorize::from_context::<Permission, _>(|perms| {
//!     perms.iter().any(|p| p == "admin")
//! });
//! ```

use std::fmt;
use std::sync::Arc;

use switchyard_core::{BoxFuture, ContextKey, ErrorKind, Request, RequestContext, Response};

use crate::middleware::{Middleware, Next};

type Predicate = Arc<dyn Fn(&RequestContext, &Request) -> bool + Send + Sync>;

/// Middleware that lets a request through only when a predicate allows it.
#[derive(Clone)]
pub struct Authorize {
    predicate: Predicate,
}

impl Authorize {
    /// Creates a gate from a predicate over the context and request.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&RequestContext, &Request) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Creates a gate that checks the context value stored under `K`.
    ///
    /// A missing value denies the request.
    pub fn from_context<K, F>(check: F) -> Self
    where
        K: ContextKey,
        F: Fn(&K::Value) -> bool + Send + Sync + 'static,
    {
        Self::new(move |ctx, _request| ctx.value::<K>().is_some_and(&check))
    }

    /// Creates a gate that lets every request through.
    #[must_use]
    pub fn allow_all() -> Self {
        Self::new(|_, _| true)
    }

    /// Creates a gate that refuses every request.
    #[must_use]
    pub fn deny_all() -> Self {
        Self::new(|_, _| false)
    }

    /// Evaluates the predicate.
    pub fn is_allowed(&self, ctx: &RequestContext, request: &Request) -> bool {
        (self.predicate)(ctx, request)
    }
}

impl fmt::Debug for Authorize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorize").finish_non_exhaustive()
    }
}

impl Middleware for Authorize {
    fn name(&self) -> &'static str {
        "authorize"
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next,
    ) -> BoxFuture<'a, Response> {
        if self.is_allowed(&ctx, &request) {
            return next.run(ctx, request);
        }

        tracing::debug!(
            path = %request.uri().path(),
            request_id = ?ctx.request_id(),
            "authorization denied"
        );
        Box::pin(async { ErrorKind::AuthorizationDenied.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoxedMiddleware;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use switchyard_core::{body_text, handler_fn, Handler, ResponseExt};

    struct Role;
    impl ContextKey for Role {
        type Value = &'static str;
        const NAME: &'static str = "role";
    }

    fn request(path: &str) -> Request {
        http::Request::builder()
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    async fn run(gate: Authorize, ctx: RequestContext) -> (StatusCode, usize) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handler = handler_fn(move |_ctx, _req| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Response::text("accounts") }
        });
        let middleware: BoxedMiddleware = Arc::new(gate);
        let chain = crate::chain::build(&[middleware], Arc::new(handler));

        let response = chain.call(ctx, request("/admin/accounts")).await;
        (response.status(), calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_deny_short_circuits() {
        let (status, calls) = run(Authorize::deny_all(), RequestContext::new()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(calls, 0, "handler must not run");
    }

    #[tokio::test]
    async fn test_allow_forwards() {
        let (status, calls) = run(Authorize::allow_all(), RequestContext::new()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_from_context() {
        let gate = || Authorize::from_context::<Role, _>(|role| *role == "admin");

        let (status, _) = run(gate(), RequestContext::new()).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "missing value denies");

        let ctx = RequestContext::new().with_value::<Role>("viewer");
        let (status, _) = run(gate(), ctx).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let ctx = RequestContext::new().with_value::<Role>("admin");
        let (status, calls) = run(gate(), ctx).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_predicate_sees_request() {
        let gate = Authorize::new(|_ctx, req| req.headers().contains_key("x-admin"));
        let middleware: BoxedMiddleware = Arc::new(gate);
        let chain = crate::chain::build(
            &[middleware],
            Arc::new(handler_fn(|_ctx, _req| async { Response::text("ok") })),
        );

        let mut req = request("/admin");
        req.headers_mut()
            .insert("x-admin", http::HeaderValue::from_static("1"));
        let response = chain.call(RequestContext::new(), req).await;
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_denied_body_is_json_error() {
        let middleware: BoxedMiddleware = Arc::new(Authorize::deny_all());
        let chain = crate::chain::build(
            &[middleware],
            Arc::new(handler_fn(|_ctx, _req| async { Response::text("ok") })),
        );

        let response = chain.call(RequestContext::new(), request("/admin")).await;
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }
}
