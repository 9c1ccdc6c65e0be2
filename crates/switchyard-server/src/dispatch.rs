//! The dispatch loop.
//!
//! [`Dispatcher::dispatch`] turns one buffered request into one response:
//!
//! 1. Create a fresh [`RequestContext`] with the request deadline
//! 2. Resolve the percent-decoded path, or fall back to the 404/405 chain
//! 3. Run the chain on its own task
//! 4. Turn a panic into a 500 and an expired deadline into a 504
//!
//! A panic or a stuck handler only ever affects its own request. On expiry
//! the request's cancellation signal fires first. A handler that answers
//! within the cancel grace period keeps its own response; otherwise the
//! task is aborted and the client gets a 504.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::header::ALLOW;
use http::{HeaderValue, Method, StatusCode};
use percent_encoding::percent_decode_str;
use tokio::task::JoinError;
use switchyard_core::{ErrorKind, Handler, Request, RequestContext, Response};
use switchyard_middleware::Chain;

use crate::router::{Resolution, Router};

/// Default per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default time a handler gets to notice cancellation before it is aborted.
pub const DEFAULT_CANCEL_GRACE: Duration = Duration::from_millis(100);

/// Timing knobs for the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Deadline applied to every request.
    pub request_timeout: Duration,
    /// Time between signalling cancellation and aborting the handler task.
    pub cancel_grace: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cancel_grace: DEFAULT_CANCEL_GRACE,
        }
    }
}

/// How a dispatched request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A route matched and its chain produced the response.
    Completed,
    /// No route matched the path.
    NotFound,
    /// The path matched, the method did not.
    MethodNotAllowed,
    /// The deadline expired. The response is the handler's own if it
    /// answered within the grace period, a 504 otherwise.
    Cancelled,
    /// The chain panicked; the response is a 500.
    Faulted,
}

impl Outcome {
    /// Returns the outcome as a lowercase label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::Cancelled => "cancelled",
            Self::Faulted => "faulted",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response together with how it was produced.
#[derive(Debug)]
pub struct Dispatched {
    /// The response to send.
    pub response: Response,
    /// How the request ended.
    pub outcome: Outcome,
}

enum Target {
    Route,
    NotFound,
    MethodNotAllowed(Vec<Method>),
}

enum Execution {
    Finished(Response),
    /// Deadline passed; carries the handler's own reply if it gave one
    /// within the grace period.
    Cancelled(Option<Response>),
    Faulted,
}

/// Routes requests through a frozen [`Router`].
///
/// Cheap to clone; every clone shares the same router.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Creates a dispatcher with the default timing.
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self::with_config(Arc::new(router), DispatchConfig::default())
    }

    /// Creates a dispatcher over a shared router.
    #[must_use]
    pub fn with_config(router: Arc<Router>, config: DispatchConfig) -> Self {
        Self { router, config }
    }

    /// Returns the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Returns the timing configuration.
    #[must_use]
    pub fn config(&self) -> DispatchConfig {
        self.config
    }

    /// Dispatches one request.
    pub async fn dispatch(&self, request: Request) -> Dispatched {
        let method = request.method().clone();
        let path = decode_path(request.uri().path());
        let ctx = RequestContext::with_timeout(self.config.request_timeout);

        let (chain, ctx, target) = match self.router.resolve(&method, &path) {
            Resolution::Matched(route) => {
                tracing::debug!(
                    method = %method,
                    path = %path,
                    pattern = %route.pattern,
                    "route matched"
                );
                (route.chain, ctx.with_params(route.params), Target::Route)
            }
            Resolution::NotFound => {
                tracing::debug!(method = %method, path = %path, "no route");
                (self.router.not_found_chain(), ctx, Target::NotFound)
            }
            Resolution::MethodNotAllowed(allowed) => {
                tracing::debug!(method = %method, path = %path, "method not allowed");
                (
                    self.router.method_not_allowed_chain(),
                    ctx,
                    Target::MethodNotAllowed(allowed),
                )
            }
        };

        let (response, outcome) = match self.execute(chain, ctx, request, &method, &path).await {
            Execution::Finished(mut response) => match target {
                Target::Route => (response, Outcome::Completed),
                Target::NotFound => (response, Outcome::NotFound),
                Target::MethodNotAllowed(allowed) => {
                    set_allow(&mut response, &allowed);
                    (response, Outcome::MethodNotAllowed)
                }
            },
            Execution::Cancelled(Some(response)) => (response, Outcome::Cancelled),
            Execution::Cancelled(None) => (ErrorKind::Timeout.into_response(), Outcome::Cancelled),
            Execution::Faulted => (ErrorKind::HandlerFault.into_response(), Outcome::Faulted),
        };

        tracing::debug!(
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            outcome = %outcome,
            "request dispatched"
        );

        Dispatched { response, outcome }
    }

    async fn execute(
        &self,
        chain: Chain,
        ctx: RequestContext,
        request: Request,
        method: &Method,
        path: &str,
    ) -> Execution {
        let cancellation = ctx.cancellation().clone();
        let mut task = tokio::spawn(chain.call(ctx, request));

        match tokio::time::timeout(self.config.request_timeout, &mut task).await {
            Ok(Ok(response)) => Execution::Finished(response),
            Ok(Err(err)) => {
                tracing::error!(
                    method = %method,
                    path = %path,
                    panic = %panic_message(err),
                    "handler panicked"
                );
                Execution::Faulted
            }
            Err(_) => {
                cancellation.cancel();
                tracing::warn!(
                    method = %method,
                    path = %path,
                    timeout = ?self.config.request_timeout,
                    "request deadline exceeded"
                );

                match tokio::time::timeout(self.config.cancel_grace, &mut task).await {
                    Ok(Ok(response)) => {
                        tracing::debug!(
                            path = %path,
                            status = response.status().as_u16(),
                            "handler responded after cancellation"
                        );
                        Execution::Cancelled(Some(response))
                    }
                    Ok(Err(err)) => {
                        tracing::warn!(
                            path = %path,
                            panic = %panic_message(err),
                            "handler panicked after cancellation"
                        );
                        Execution::Cancelled(None)
                    }
                    Err(_) => {
                        task.abort();
                        tracing::warn!(path = %path, "handler ignored cancellation, aborted");
                        Execution::Cancelled(None)
                    }
                }
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("router", &self.router)
            .field("config", &self.config)
            .finish()
    }
}

fn set_allow(response: &mut Response, allowed: &[Method]) {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED
        || response.headers().contains_key(ALLOW)
    {
        return;
    }
    let joined = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&joined) {
        response.headers_mut().insert(ALLOW, value);
    }
}

/// Percent-decodes a request path. Paths that do not decode to UTF-8 are
/// matched as sent.
fn decode_path(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map_or_else(|_| raw.to_string(), Cow::into_owned)
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
