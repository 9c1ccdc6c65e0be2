//! Request ID middleware.
//!
//! Assigns every request a [`RequestId`], stores it in the context under
//! [`RequestIdKey`] and echoes it in the `X-Request-ID` response header.
//!
//! An incoming `X-Request-ID` is reused only when the middleware is built
//! with [`RequestIdMiddleware::trust_incoming`] and the value parses as a
//! UUID; otherwise a fresh UUID v7 is generated.

use http::HeaderValue;
use switchyard_core::{BoxFuture, Request, RequestContext, RequestId, RequestIdKey, Response};

use crate::middleware::{Middleware, Next};

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that generates or propagates request IDs.
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    /// Whether to reuse incoming request ID headers.
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a middleware that always generates a fresh ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that reuses a valid incoming `X-Request-ID`.
    ///
    /// Use this behind a proxy or gateway that already assigns IDs.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn incoming(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }

        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let request_id = self.incoming(&request).unwrap_or_else(RequestId::new);

            let ctx = ctx.with_value::<RequestIdKey>(request_id);
            let mut response = next.run(ctx, request).await;

            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain;
    use crate::middleware::BoxedMiddleware;
    use bytes::Bytes;
    use http_body_util::Full;
    use std::sync::Arc;
    use switchyard_core::{body_text, handler_fn, Handler, ResponseExt};
    use uuid::Uuid;

    fn request_with_id(request_id: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/test");
        if let Some(id) = request_id {
            builder = builder.header(REQUEST_ID_HEADER, id);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    /// Runs the middleware in front of a handler that echoes the context ID.
    async fn run(middleware: RequestIdMiddleware, request: Request) -> (String, String) {
        let handler = handler_fn(|ctx: RequestContext, _req| async move {
            Response::text(ctx.request_id().map(|id| id.to_string()).unwrap_or_default())
        });
        let middleware: BoxedMiddleware = Arc::new(middleware);
        let chain = chain::build(&[middleware], Arc::new(handler));
        let response = chain.call(RequestContext::new(), request).await;

        let header = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        (header, body_text(response).await)
    }

    #[tokio::test]
    async fn test_generates_request_id_when_missing() {
        let (header, seen) = run(RequestIdMiddleware::new(), request_with_id(None)).await;

        assert!(Uuid::parse_str(&header).is_ok());
        assert_eq!(header, seen, "handler and response should agree");
    }

    #[tokio::test]
    async fn test_ignores_incoming_id_when_not_trusted() {
        let incoming = "01234567-89ab-7def-8123-456789abcdef";
        let (header, _) = run(RequestIdMiddleware::new(), request_with_id(Some(incoming))).await;
        assert_ne!(header, incoming);
    }

    #[tokio::test]
    async fn test_uses_incoming_id_when_trusted() {
        let incoming = "01234567-89ab-7def-8123-456789abcdef";
        let (header, seen) = run(
            RequestIdMiddleware::trust_incoming(),
            request_with_id(Some(incoming)),
        )
        .await;

        assert_eq!(header, incoming);
        assert_eq!(seen, incoming);
    }

    #[tokio::test]
    async fn test_ignores_invalid_incoming_id() {
        let (header, _) = run(
            RequestIdMiddleware::trust_incoming(),
            request_with_id(Some("not-a-valid-uuid")),
        )
        .await;

        assert_ne!(header, "not-a-valid-uuid");
        assert!(Uuid::parse_str(&header).is_ok());
    }

    #[tokio::test]
    async fn test_sets_header_on_short_circuit_response() {
        let gate = crate::from_fn("gate", |_ctx, _req, _next| async {
            Response::error(http::StatusCode::FORBIDDEN, "Forbidden")
        });
        let middleware: Vec<BoxedMiddleware> =
            vec![Arc::new(RequestIdMiddleware::new()), Arc::new(gate)];
        let chain = chain::build(
            &middleware,
            Arc::new(handler_fn(|_ctx, _req| async { Response::text("unreachable") })),
        );

        let response = chain.call(RequestContext::new(), request_with_id(None)).await;
        assert_eq!(response.status(), http::StatusCode::FORBIDDEN);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[test]
    fn test_middleware_name() {
        assert_eq!(RequestIdMiddleware::new().name(), "request_id");
    }
}
