//! # Switchyard Server
//!
//! Router, dispatch loop and HTTP server for Switchyard.
//!
//! - [`Router`] - route table, middleware stack and mounted sub-routers
//! - [`Dispatcher`] - resolves a request, runs its chain on its own task,
//!   and turns panics into 500s and expired deadlines into 504s
//! - [`Server`] - HTTP/1.1 over Hyper with graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use switchyard_core::{handler_fn, Response, ResponseExt};
//! use switchyard_middleware::{LoggerMiddleware, RequestIdMiddleware};
//! use switchyard_server::{Router, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.use_middleware(RequestIdMiddleware::new())?;
//!     router.use_middleware(LoggerMiddleware::new())?;
//!     router.get("/", handler_fn(|_ctx, _req| async { Response::text("root.") }))?;
//!
//!     let config = ServerConfig::builder().http_addr("0.0.0.0:3333").build();
//!     Server::new(config, router).run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/switchyard-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod dispatch;
mod error;
mod router;
mod server;
mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_BODY_TIMEOUT_SECS, DEFAULT_HTTP_ADDR,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use dispatch::{
    DispatchConfig, Dispatched, Dispatcher, Outcome, DEFAULT_CANCEL_GRACE,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use error::{RouterError, ServerError};
pub use router::{Resolution, ResolvedRoute, Router};
pub use server::Server;
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
