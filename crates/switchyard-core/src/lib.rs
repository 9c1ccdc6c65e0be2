//! # Switchyard Core
//!
//! Core types shared by every Switchyard crate:
//!
//! - [`RequestContext`] - immutable, typed, request-scoped values plus the
//!   request's deadline and cancellation signal
//! - [`ContextKey`] - typed keys for context values
//! - [`Cancellation`] - cooperative cancellation signal
//! - [`RequestId`] - UUID v7 request identifier
//! - [`Handler`] - terminal request handler, with [`handler_fn`] for closures
//! - [`ErrorKind`] - failure classes and their responses
//! - [`Request`], [`Response`], [`ResponseExt`] - buffered HTTP types

#![doc(html_root_url = "https://docs.rs/switchyard-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cancel;
mod context;
mod error;
mod handler;
mod request_id;
mod types;

pub use cancel::Cancellation;
pub use context::{ContextKey, RequestContext};
pub use error::ErrorKind;
pub use handler::{handler_fn, BoxFuture, BoxedHandler, Handler, HandlerFn};
pub use request_id::{RequestId, RequestIdKey};
pub use switchyard_router::Params;
pub use types::{body_bytes, body_text, Request, Response, ResponseExt};
