//! Request logging middleware.
//!
//! Emits one `tracing` event per request once the response is known:
//!
//! ```text
//! INFO request completed method=GET path=/articles/42 status=200 duration_ms=0.41 request_id=0192… remote_ip=10.0.0.7
//! ```
//!
//! Server errors are logged at `WARN`. Install after [`RequestIdMiddleware`]
//! and [`RealIpMiddleware`] so their values are available.
//!
//! [`RequestIdMiddleware`]: crate::stages::RequestIdMiddleware
//! [`RealIpMiddleware`]: crate::stages::RealIpMiddleware

use switchyard_core::{BoxFuture, Request, RequestContext, Response};

use crate::middleware::{Middleware, Next};
use crate::stages::real_ip::RealIpKey;

/// Middleware that logs each completed request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerMiddleware;

impl LoggerMiddleware {
    /// Creates the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for LoggerMiddleware {
    fn name(&self) -> &'static str {
        "logger"
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let method = request.method().clone();
            let path = request.uri().path().to_string();
            let request_id = ctx.request_id().map(|id| id.to_string()).unwrap_or_default();
            let remote_ip = ctx
                .value::<RealIpKey>()
                .map(ToString::to_string)
                .unwrap_or_default();
            let started = std::time::Instant::now();

            let response = next.run(ctx, request).await;

            let status = response.status().as_u16();
            let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
            if response.status().is_server_error() {
                tracing::warn!(
                    %method, %path, status, duration_ms, %request_id, %remote_ip,
                    "request failed"
                );
            } else {
                tracing::info!(
                    %method, %path, status, duration_ms, %request_id, %remote_ip,
                    "request completed"
                );
            }
            response
        })
    }
}
