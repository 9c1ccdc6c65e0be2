//! Core middleware trait and types.
//!
//! A [`Middleware`] sits between the dispatcher and a handler. It receives
//! the request context, the request, and a [`Next`] that runs the rest of
//! the chain. It may extend the context, forward, inspect or rewrite the
//! response, or answer on its own without forwarding.
//!
//! # Example
//!
//! ```rust
//! use switchyard_core::{BoxFuture, Request, RequestContext, Response};
//! use switchyard_middleware::{Middleware, Next};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: RequestContext,
//!         request: Request,
//!         next: Next,
//!     ) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             let response = next.run(ctx.clone(), request).await;
//!             tracing::debug!(elapsed_ms = ctx.elapsed().as_millis() as u64, "done");
//!             response
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use switchyard_core::{BoxFuture, BoxedHandler, Request, RequestContext, Response};

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The core middleware trait.
///
/// # Invariants
///
/// - Forwarding happens through [`Next::run`], which consumes the `Next`, so
///   a middleware forwards at most once.
/// - Not forwarding short-circuits the chain; the middleware's own response
///   is final.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Processes the request.
    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next,
    ) -> BoxFuture<'a, Response>;
}

/// Shared state of a built chain.
pub(crate) struct ChainInner {
    pub(crate) middleware: Vec<BoxedMiddleware>,
    pub(crate) handler: BoxedHandler,
}

/// The remainder of a chain, from one middleware inward.
pub struct Next {
    chain: Arc<ChainInner>,
    index: usize,
}

impl Next {
    pub(crate) fn new(chain: Arc<ChainInner>, index: usize) -> Self {
        Self { chain, index }
    }

    /// Runs the next middleware, or the handler once the middleware are
    /// exhausted.
    pub fn run(self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response> {
        match self.chain.middleware.get(self.index).cloned() {
            Some(middleware) => {
                let next = Self::new(self.chain, self.index + 1);
                Box::pin(async move { middleware.process(ctx, request, next).await })
            }
            None => self.chain.handler.call(ctx, request),
        }
    }

    /// Returns the number of middleware still to run before the handler.
    pub fn remaining(&self) -> usize {
        self.chain.middleware.len().saturating_sub(self.index)
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("remaining", &self.remaining())
            .finish()
    }
}

/// A middleware created from an async function.
///
/// # Example
///
/// ```rust
/// use switchyard_core::{RequestContext, Request};
/// use switchyard_middleware::{from_fn, Next};
///
/// let middleware = from_fn("noop", |ctx: RequestContext, req: Request, next: Next| async move {
///     next.run(ctx, req).await
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(RequestContext, Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next,
    ) -> BoxFuture<'a, Response> {
        Box::pin((self.func)(ctx, request, next))
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Wraps an async function as a [`Middleware`].
pub fn from_fn<F, Fut>(name: &'static str, func: F) -> FnMiddleware<F>
where
    F: Fn(RequestContext, Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    FnMiddleware::new(name, func)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use switchyard_core::{handler_fn, ResponseExt};

    fn request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn chain(middleware: Vec<BoxedMiddleware>) -> Arc<ChainInner> {
        Arc::new(ChainInner {
            middleware,
            handler: Arc::new(handler_fn(|_ctx, _req| async { Response::text("OK") })),
        })
    }

    #[tokio::test]
    async fn test_next_runs_handler_at_end() {
        let next = Next::new(chain(Vec::new()), 0);
        assert_eq!(next.remaining(), 0);

        let response = next.run(RequestContext::new(), request()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fn_middleware_short_circuits() {
        let deny: BoxedMiddleware = Arc::new(from_fn("deny", |_ctx, _req, _next| async {
            Response::error(StatusCode::FORBIDDEN, "Forbidden")
        }));
        assert_eq!(deny.name(), "deny");

        let next = Next::new(chain(vec![deny]), 0);
        assert_eq!(next.remaining(), 1);

        let response = next.run(RequestContext::new(), request()).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
