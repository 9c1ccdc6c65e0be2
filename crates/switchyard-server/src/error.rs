//! Error types for router construction and the server loop.

use std::io;

use switchyard_router::InsertError;
use thiserror::Error;

/// A route, mount or middleware could not be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Middleware was added after the router already had routes or mounts.
    #[error("middleware must be registered before any route or mount")]
    MiddlewareAfterRoutes,

    /// The pattern is malformed, or the route or prefix already exists.
    #[error(transparent)]
    Insert(#[from] InsertError),
}

/// The server could not start or stopped abnormally.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address does not parse.
    #[error("invalid address `{addr}`: {reason}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Binding the listener failed.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
