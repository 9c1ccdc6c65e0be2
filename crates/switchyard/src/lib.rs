//! # Switchyard
//!
//! **HTTP request dispatcher with pattern routing, middleware chains and a
//! typed request context.**
//!
//! - **Pattern routing** – literal, `{param}`, `{param:regex}`, composite
//!   `{month}-{day}-{year}` and trailing `*` segments, most specific first
//! - **Mountable routers** – sub-routers under `/admin` or `/{articleID}`,
//!   each with its own middleware stack
//! - **Middleware chains** – ordered, outer to inner, with built-in request
//!   ID, real IP, logging and authorization stages
//! - **Request context** – immutable, typed, request-scoped values plus a
//!   deadline and cancellation signal
//! - **Contained failures** – a panicking handler yields a 500 and a request
//!   past its deadline yields a 504, without affecting other requests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use switchyard::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.use_middleware(RequestIdMiddleware::new())?;
//!     router.use_middleware(LoggerMiddleware::new())?;
//!
//!     router.get("/", handler_fn(|_ctx, _req| async { Response::text("root.") }))?;
//!     router.route("/articles", |r| {
//!         r.get("/{articleID}", handler_fn(|ctx, _req| async move {
//!             Response::text(format!("article {}", ctx.param("articleID").unwrap_or_default()))
//!         }))
//!     })?;
//!
//!     let config = ServerConfig::builder().http_addr("0.0.0.0:3333").build();
//!     Server::new(config, router).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → root mw → sub-router mw → route mw → Handler
//!                                                  ↓
//! Response ← root mw ← sub-router mw ← route mw ←──┘
//! ```

#![doc(html_root_url = "https://docs.rs/switchyard/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use switchyard_core as core;

// Re-export server types
pub use switchyard_server as server;

// Re-export middleware types
pub use switchyard_middleware as middleware;

// Re-export path matching
pub use switchyard_router as router;

// Re-export configuration
pub use switchyard_config as config;

// Re-export logging setup
pub use switchyard_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use switchyard::prelude::*;
///
/// let mut router = Router::new();
/// router
///     .get("/", handler_fn(|_ctx, _req| async { Response::text("hi") }))
///     .unwrap();
/// ```
pub mod prelude {
    pub use switchyard_core::{
        handler_fn, BoxedHandler, Cancellation, ContextKey, ErrorKind, Handler, Params, Request,
        RequestContext, RequestId, Response, ResponseExt,
    };

    pub use switchyard_middleware::{
        from_fn, Authorize, BoxedMiddleware, LoggerMiddleware, Middleware, Next, RealIpKey,
        RealIpMiddleware, RequestIdMiddleware,
    };

    pub use switchyard_server::{
        Dispatcher, Outcome, Router, RouterError, Server, ServerConfig, ServerError,
        ShutdownSignal,
    };

    pub use switchyard_config::{ConfigLoader, SwitchyardConfig};
}
