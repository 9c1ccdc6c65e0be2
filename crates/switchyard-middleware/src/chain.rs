//! Middleware chain composition.
//!
//! [`build`] turns an ordered middleware list and a terminal handler into a
//! single [`Chain`]. The first middleware in the list is outermost: it sees
//! the request first and the response last.
//!
//! ```text
//!   request ──► m[0] ──► m[1] ──► … ──► handler
//!   response ◄─ m[0] ◄── m[1] ◄── … ◄───┘
//! ```
//!
//! Building only clones `Arc`s. Nothing runs until the chain is called.

use std::fmt;
use std::sync::Arc;

use switchyard_core::{BoxFuture, BoxedHandler, Handler, Request, RequestContext, Response};

use crate::middleware::{BoxedMiddleware, ChainInner, Next};

/// A composed middleware chain ending in a handler.
#[derive(Clone)]
pub struct Chain {
    inner: Arc<ChainInner>,
}

impl Chain {
    /// Returns a [`Next`] positioned at the outermost middleware.
    pub fn entry(&self) -> Next {
        Next::new(Arc::clone(&self.inner), 0)
    }

    /// Returns the middleware names, outermost first.
    pub fn names(&self) -> Vec<&'static str> {
        self.inner.middleware.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of middleware in the chain.
    pub fn len(&self) -> usize {
        self.inner.middleware.len()
    }

    /// Returns true if the chain is just the handler.
    pub fn is_empty(&self) -> bool {
        self.inner.middleware.is_empty()
    }
}

impl Handler for Chain {
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response> {
        self.entry().run(ctx, request)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("middleware", &self.names())
            .finish_non_exhaustive()
    }
}

/// Composes `middleware` around `handler`.
pub fn build(middleware: &[BoxedMiddleware], handler: BoxedHandler) -> Chain {
    Chain {
        inner: Arc::new(ChainInner {
            middleware: middleware.to_vec(),
            handler,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{from_fn, Middleware};
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use std::sync::Mutex;
    use switchyard_core::{body_text, handler_fn, ContextKey, ResponseExt};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Middleware for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: RequestContext,
            request: Request,
            next: Next,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                self.log.lock().unwrap().push(format!("{}:in", self.name));
                let response = next.run(ctx, request).await;
                self.log.lock().unwrap().push(format!("{}:out", self.name));
                response
            })
        }
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn recording_handler(log: Log) -> BoxedHandler {
        Arc::new(handler_fn(move |_ctx, _req| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push("handler".to_string());
                Response::text("OK")
            }
        }))
    }

    #[tokio::test]
    async fn test_first_middleware_is_outermost() {
        let log: Log = Arc::default();
        let middleware: Vec<BoxedMiddleware> = vec![
            Arc::new(Recorder { name: "a", log: Arc::clone(&log) }),
            Arc::new(Recorder { name: "b", log: Arc::clone(&log) }),
        ];

        let chain = build(&middleware, recording_handler(Arc::clone(&log)));
        assert_eq!(chain.names(), vec!["a", "b"]);

        let response = chain.call(RequestContext::new(), request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:in", "b:in", "handler", "b:out", "a:out"]
        );
    }

    #[tokio::test]
    async fn test_building_runs_nothing() {
        let log: Log = Arc::default();
        let middleware: Vec<BoxedMiddleware> =
            vec![Arc::new(Recorder { name: "a", log: Arc::clone(&log) })];

        let chain = build(&middleware, recording_handler(Arc::clone(&log)));
        assert_eq!(chain.len(), 1);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_short_circuit_skips_inner_layers() {
        let log: Log = Arc::default();
        let middleware: Vec<BoxedMiddleware> = vec![
            Arc::new(Recorder { name: "outer", log: Arc::clone(&log) }),
            Arc::new(from_fn("gate", |_ctx, _req, _next| async {
                Response::error(StatusCode::FORBIDDEN, "Forbidden")
            })),
            Arc::new(Recorder { name: "inner", log: Arc::clone(&log) }),
        ];

        let chain = build(&middleware, recording_handler(Arc::clone(&log)));
        let response = chain.call(RequestContext::new(), request()).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(*log.lock().unwrap(), vec!["outer:in", "outer:out"]);
    }

    #[tokio::test]
    async fn test_context_values_flow_inward_only() {
        struct Stamp;
        impl ContextKey for Stamp {
            type Value = &'static str;
            const NAME: &'static str = "stamp";
        }

        let seen_by_outer: Arc<Mutex<Option<bool>>> = Arc::default();
        let seen = Arc::clone(&seen_by_outer);

        let middleware: Vec<BoxedMiddleware> = vec![
            Arc::new(from_fn("outer", move |ctx: RequestContext, req, next: Next| {
                let seen = Arc::clone(&seen);
                async move {
                    let response = next.run(ctx.clone(), req).await;
                    *seen.lock().unwrap() = Some(ctx.contains::<Stamp>());
                    response
                }
            })),
            Arc::new(from_fn("stamp", |ctx: RequestContext, req, next: Next| async move {
                next.run(ctx.with_value::<Stamp>("stamped"), req).await
            })),
        ];

        let handler: BoxedHandler = Arc::new(handler_fn(|ctx: RequestContext, _req| async move {
            Response::text(ctx.value::<Stamp>().copied().unwrap_or("missing"))
        }));

        let chain = build(&middleware, handler);
        let response = chain.call(RequestContext::new(), request()).await;

        assert_eq!(body_text(response).await, "stamped");
        assert_eq!(*seen_by_outer.lock().unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_empty_chain_calls_handler() {
        let log: Log = Arc::default();
        let chain = build(&[], recording_handler(Arc::clone(&log)));
        assert!(chain.is_empty());

        let response = chain.call(RequestContext::new(), request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), vec!["handler"]);
    }
}
