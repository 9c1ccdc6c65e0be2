//! Handler trait for request processing.
//!
//! A [`Handler`] turns a context and a request into exactly one response.
//! The returned future is `'static` so the dispatcher can run it on its own
//! task; anything the handler needs from `self` must be cloned into it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::types::{Request, Response};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Terminal request handler.
///
/// # Example
///
/// ```rust
/// use switchyard_core::{BoxFuture, Handler, Request, RequestContext, Response, ResponseExt};
///
/// struct Hello;
///
/// impl Handler for Hello {
///     fn call(&self, _ctx: RequestContext, _request: Request) -> BoxFuture<'static, Response> {
///         Box::pin(async { Response::text("hi") })
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Handles the request.
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response>;
}

/// A shared, type-erased handler.
pub type BoxedHandler = Arc<dyn Handler>;

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response> {
        (**self).call(ctx, request)
    }
}

/// Adapts an async function or closure into a [`Handler`].
///
/// Created by [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    func: F,
}

impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(RequestContext, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response> {
        Box::pin((self.func)(ctx, request))
    }
}

impl<F> std::fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerFn").finish_non_exhaustive()
    }
}

/// Wraps `func` as a [`Handler`].
///
/// # Example
///
/// ```rust
/// use switchyard_core::{handler_fn, Request, RequestContext, Response, ResponseExt};
///
/// async fn get_article(ctx: RequestContext, _request: Request) -> Response {
///     let id = ctx.param("articleID").unwrap_or_default().to_string();
///     Response::text(format!("article {id}"))
/// }
///
/// let handler = handler_fn(get_article);
/// ```
pub fn handler_fn<F, Fut>(func: F) -> HandlerFn<F>
where
    F: Fn(RequestContext, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    HandlerFn { func }
}
