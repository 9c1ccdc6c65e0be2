//! HTTP server.
//!
//! Built on Hyper and Tokio. Each connection is served on its own task.
//! Every request is:
//!
//! 1. Buffered under the body deadline
//! 2. Tagged with the peer address
//! 3. Handed to the [`Dispatcher`]
//!
//! On shutdown the listener stops accepting. Open connections finish
//! their in-flight request and close, bounded by the shutdown timeout.
//!
//! # Example
//!
//! ```rust,no_run
//! use switchyard_core::{handler_fn, Response, ResponseExt};
//! use switchyard_server::{Router, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.get("/", handler_fn(|_ctx, _req| async { Response::text("hi") }))?;
//!
//!     let config = ServerConfig::builder().http_addr("127.0.0.1:3333").build();
//!     Server::new(config, router).run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};

use switchyard_core::{Response, ResponseExt};
use switchyard_middleware::RemoteAddr;

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::error::ServerError;
use crate::router::Router;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// The Switchyard HTTP server.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    dispatcher: Dispatcher,
}

impl Server {
    /// Creates a server that routes through `router`.
    #[must_use]
    pub fn new(config: ServerConfig, router: Router) -> Self {
        let dispatcher = Dispatcher::with_config(Arc::new(router), config.dispatch());
        Self { config, dispatcher }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Runs until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and runs until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|e| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                reason: e.to_string(),
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            if let Some(max) = server.config.max_connections() {
                                if tracker.active_connections() >= max {
                                    tracing::warn!(
                                        remote_addr = %remote_addr,
                                        max_connections = max,
                                        "connection limit reached, dropping connection"
                                    );
                                    continue;
                                }
                            }

                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                    tracing::debug!(
                                        remote_addr = %remote_addr,
                                        error = %e,
                                        "connection error"
                                    );
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting");
                    break;
                }
            }
        }

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            active = tracker.active_connections(),
            timeout = ?shutdown_timeout,
            "draining connections"
        );

        tokio::select! {
            () = tracker.wait_for_shutdown() => {
                tracing::info!("all connections closed");
            }
            () = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    active = tracker.active_connections(),
                    "shutdown timeout reached with connections still open"
                );
            }
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);

        let service = service_fn(move |req: http::Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(req, remote_addr).await }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                tracing::debug!(remote_addr = %remote_addr, "closing connection for shutdown");
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle_request(
        &self,
        req: http::Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> Result<Response, Infallible> {
        let (parts, body) = req.into_parts();

        let bytes = match tokio::time::timeout(self.config.body_timeout(), body.collect()).await {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "failed to read request body");
                return Ok(Response::json_error(
                    StatusCode::BAD_REQUEST,
                    "BODY_READ_ERROR",
                    "Failed to read request body",
                ));
            }
            Err(_) => {
                tracing::warn!(path = %parts.uri.path(), "request body timed out");
                return Ok(Response::json_error(
                    StatusCode::REQUEST_TIMEOUT,
                    "REQUEST_TIMEOUT",
                    "Request body collection timed out",
                ));
            }
        };

        let mut request = http::Request::from_parts(parts, Full::new(bytes));
        request.extensions_mut().insert(RemoteAddr(remote_addr));

        Ok(self.dispatcher.dispatch(request).await.response)
    }
}
