//! Built-in middleware stages.
//!
//! A typical base stack, outermost first:
//!
//! 1. [`request_id`] - assign or propagate a request ID
//! 2. [`real_ip`] - resolve the client address from proxy headers
//! 3. [`logger`] - one structured log event per request
//!
//! [`authorize`] is usually installed on a sub-router to gate it.

pub mod authorize;
pub mod logger;
pub mod real_ip;
pub mod request_id;

pub use authorize::Authorize;
pub use logger::LoggerMiddleware;
pub use real_ip::{RealIpKey, RealIpMiddleware, RemoteAddr};
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
