//! Request and response types used throughout the dispatcher.
//!
//! Bodies are fully buffered: the server collects the request body before
//! dispatch and handlers return a complete response body.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use serde::Serialize;

/// The HTTP request type seen by middleware and handlers.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by middleware and handlers.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building common responses.
pub trait ResponseExt {
    /// Creates a `200 OK` plain-text response.
    fn text(body: impl Into<Bytes>) -> Response;

    /// Creates a JSON response, or a 500 if `value` cannot be serialized.
    fn json<T: Serialize>(status: StatusCode, value: &T) -> Response;

    /// Creates a plain-text error response.
    fn error(status: StatusCode, message: &str) -> Response;

    /// Creates a JSON error response `{"error":{"code":…,"message":…}}`.
    fn json_error(status: StatusCode, code: &str, message: &str) -> Response;
}

impl ResponseExt for Response {
    fn text(body: impl Into<Bytes>) -> Response {
        with_content_type(
            StatusCode::OK,
            "text/plain; charset=utf-8",
            body.into(),
        )
    }

    fn json<T: Serialize>(status: StatusCode, value: &T) -> Response {
        match serde_json::to_vec(value) {
            Ok(body) => with_content_type(status, "application/json", Bytes::from(body)),
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize response body");
                Self::json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal Server Error",
                )
            }
        }
    }

    fn error(status: StatusCode, message: &str) -> Response {
        with_content_type(
            status,
            "text/plain; charset=utf-8",
            Bytes::from(message.to_string()),
        )
    }

    fn json_error(status: StatusCode, code: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });

        with_content_type(status, "application/json", Bytes::from(body.to_string()))
    }
}

fn with_content_type(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
    let mut response = http::Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Reads a buffered body into bytes.
pub async fn body_bytes(body: Full<Bytes>) -> Bytes {
    match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    }
}

/// Reads a response body as UTF-8 text, replacing invalid sequences.
pub async fn body_text(response: Response) -> String {
    let bytes = body_bytes(response.into_body()).await;
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Builds a `GET /` request with an empty body.
#[cfg(test)]
pub(crate) fn empty_request() -> Request {
    http::Request::new(Full::new(Bytes::new()))
}
