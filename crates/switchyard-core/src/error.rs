//! Failure classes surfaced to clients.
//!
//! Each [`ErrorKind`] has a fixed status code and a machine-readable code
//! used in the JSON error body `{"error":{"code":…,"message":…}}`. Messages
//! are generic; internal details go to the log, not the client.

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::types::{Response, ResponseExt};

/// Categories of request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No route matches the path.
    NotFound,
    /// A route matches the path, but not for this method.
    MethodNotAllowed,
    /// An authorization gate refused the request.
    AuthorizationDenied,
    /// A value a handler relies on is absent from the context.
    ContextValueMissing,
    /// The handler panicked.
    HandlerFault,
    /// The request outlived its deadline.
    Timeout,
}

impl ErrorKind {
    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::AuthorizationDenied => StatusCode::FORBIDDEN,
            Self::ContextValueMissing => StatusCode::UNPROCESSABLE_ENTITY,
            Self::HandlerFault => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Returns the machine-readable code for the error body.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::AuthorizationDenied => "FORBIDDEN",
            Self::ContextValueMissing => "UNPROCESSABLE_ENTITY",
            Self::HandlerFault => "INTERNAL_ERROR",
            Self::Timeout => "TIMEOUT",
        }
    }

    /// Returns the client-facing message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::AuthorizationDenied => "Forbidden",
            Self::ContextValueMissing => "Unprocessable Entity",
            Self::HandlerFault => "Internal Server Error",
            Self::Timeout => "Gateway Timeout",
        }
    }

    /// Builds the JSON error response for this kind.
    #[must_use]
    pub fn into_response(self) -> Response {
        Response::json_error(self.status_code(), self.code(), self.message())
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
