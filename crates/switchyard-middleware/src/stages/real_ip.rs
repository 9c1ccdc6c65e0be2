//! Client address resolution.
//!
//! Behind a reverse proxy the socket peer is the proxy, not the client.
//! [`RealIpMiddleware`] looks at the usual proxy headers, in order:
//!
//! 1. `True-Client-IP`
//! 2. `X-Real-IP`
//! 3. `X-Forwarded-For` (first, left-most entry)
//!
//! and falls back to the socket peer the server recorded as a
//! [`RemoteAddr`] request extension. The result is stored under
//! [`RealIpKey`]. Only install this stage when the proxy in front of the
//! service overwrites these headers; otherwise clients can spoof them.

use std::net::{IpAddr, SocketAddr};

use switchyard_core::{BoxFuture, ContextKey, Request, RequestContext, Response};

use crate::middleware::{Middleware, Next};

const TRUE_CLIENT_IP: &str = "true-client-ip";
const X_REAL_IP: &str = "x-real-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Socket peer address, attached to requests by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddr(pub SocketAddr);

/// Context key for the resolved client address.
#[derive(Debug)]
pub struct RealIpKey;

impl ContextKey for RealIpKey {
    type Value = IpAddr;
    const NAME: &'static str = "real_ip";
}

/// Middleware that resolves the client IP address.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealIpMiddleware;

impl RealIpMiddleware {
    /// Creates the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolves the client address for `request`.
    #[must_use]
    pub fn resolve(request: &Request) -> Option<IpAddr> {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        };

        header(TRUE_CLIENT_IP)
            .and_then(|v| v.parse().ok())
            .or_else(|| header(X_REAL_IP).and_then(|v| v.parse().ok()))
            .or_else(|| {
                header(X_FORWARDED_FOR)
                    .and_then(|v| v.split(',').next())
                    .and_then(|v| v.trim().parse().ok())
            })
            .or_else(|| {
                request
                    .extensions()
                    .get::<RemoteAddr>()
                    .map(|addr| addr.0.ip())
            })
    }
}

impl Middleware for RealIpMiddleware {
    fn name(&self) -> &'static str {
        "real_ip"
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next,
    ) -> BoxFuture<'a, Response> {
        let ctx = match Self::resolve(&request) {
            Some(ip) => ctx.with_value::<RealIpKey>(ip),
            None => ctx,
        };
        next.run(ctx, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;

    fn request(headers: &[(&str, &str)]) -> Request {
        let mut builder = http::Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    fn ip(s: &str) -> Option<IpAddr> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_forwarded_for_takes_first_entry() {
        let req = request(&[("x-forwarded-for", "192.168.1.1, 10.0.0.1, 172.16.0.1")]);
        assert_eq!(RealIpMiddleware::resolve(&req), ip("192.168.1.1"));
    }

    #[test]
    fn test_header_precedence() {
        let req = request(&[
            ("x-forwarded-for", "10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
            ("true-client-ip", "10.0.0.3"),
        ]);
        assert_eq!(RealIpMiddleware::resolve(&req), ip("10.0.0.3"));

        let req = request(&[("x-forwarded-for", "10.0.0.1"), ("x-real-ip", "10.0.0.2")]);
        assert_eq!(RealIpMiddleware::resolve(&req), ip("10.0.0.2"));
    }

    #[test]
    fn test_ipv6() {
        let req = request(&[("x-real-ip", "2001:db8::1")]);
        assert_eq!(RealIpMiddleware::resolve(&req), ip("2001:db8::1"));
    }

    #[test]
    fn test_invalid_header_falls_through() {
        let req = request(&[("x-real-ip", "not-an-ip"), ("x-forwarded-for", "10.1.1.1")]);
        assert_eq!(RealIpMiddleware::resolve(&req), ip("10.1.1.1"));
    }

    #[test]
    fn test_remote_addr_fallback() {
        let mut req = request(&[]);
        assert_eq!(RealIpMiddleware::resolve(&req), None);

        req.extensions_mut()
            .insert(RemoteAddr("127.0.0.1:54321".parse().unwrap()));
        assert_eq!(RealIpMiddleware::resolve(&req), ip("127.0.0.1"));
    }

    #[tokio::test]
    async fn test_stores_ip_in_context() {
        use std::sync::Arc;
        use switchyard_core::{body_text, handler_fn, Handler, ResponseExt};

        let handler = handler_fn(|ctx: RequestContext, _req| async move {
            Response::text(
                ctx.value::<RealIpKey>()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            )
        });
        let middleware: crate::BoxedMiddleware = Arc::new(RealIpMiddleware::new());
        let chain = crate::chain::build(&[middleware], Arc::new(handler));

        let response = chain
            .call(
                RequestContext::new(),
                request(&[("x-forwarded-for", "203.0.113.9")]),
            )
            .await;
        assert_eq!(body_text(response).await, "203.0.113.9");
    }
}
