//! # Switchyard Middleware
//!
//! Middleware composition for Switchyard.
//!
//! A middleware wraps "the rest of the chain" and decides whether and how
//! to call it. Chains are built once, at resolution time, from the
//! middleware of every router between the root and the matched route:
//!
//! ```text
//! Request → root mw → … → sub-router mw → route mw → Handler
//!                                                      ↓
//! Response ← root mw ← … ← sub-router mw ← route mw ←──┘
//! ```
//!
//! ## Built-in stages
//!
//! | Stage | Middleware | Purpose |
//! |-------|------------|---------|
//! | `request_id` | [`RequestIdMiddleware`] | Generate/propagate request ID (UUID v7) |
//! | `real_ip` | [`RealIpMiddleware`] | Resolve client IP from proxy headers |
//! | `logger` | [`LoggerMiddleware`] | One structured log event per request |
//! | `authorize` | [`Authorize`] | Injected predicate; 403 on refusal |
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use switchyard_core::{handler_fn, Response, ResponseExt};
//! use switchyard_middleware::{chain, BoxedMiddleware, RequestIdMiddleware, LoggerMiddleware};
//!
//! let middleware: Vec<BoxedMiddleware> = vec![
//!     Arc::new(RequestIdMiddleware::new()),
//!     Arc::new(LoggerMiddleware::new()),
//! ];
//! let chain = chain::build(
//!     &middleware,
//!     Arc::new(handler_fn(|_ctx, _req| async { Response::text("hi") })),
//! );
//! assert_eq!(chain.names(), vec!["request_id", "logger"]);
//! ```

#![doc(html_root_url = "https://docs.rs/switchyard-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod middleware;
pub mod stages;

pub use chain::Chain;
pub use middleware::{from_fn, BoxedMiddleware, FnMiddleware, Middleware, Next};
pub use stages::{
    Authorize, LoggerMiddleware, RealIpKey, RealIpMiddleware, RemoteAddr, RequestIdMiddleware,
    REQUEST_ID_HEADER,
};
pub use switchyard_core::{BoxFuture, Request, Response, ResponseExt};
