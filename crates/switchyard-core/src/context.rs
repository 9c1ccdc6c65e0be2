//! Request-scoped context.
//!
//! A [`RequestContext`] is created by the dispatcher for every request and
//! passed by value through the middleware chain into the handler. It is
//! immutable: [`RequestContext::with_value`] returns a new context whose
//! lookup chain starts with the new entry and then falls back to the old
//! one. The old context is untouched, so a value attached by one middleware
//! is visible to everything it forwards to and to nothing else.
//!
//! Keys are types. A middleware that keeps its key type private owns that
//! slot outright: nobody else can read or shadow it.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use switchyard_router::Params;

use crate::cancel::Cancellation;
use crate::request_id::{RequestId, RequestIdKey};

/// A typed key for values stored in a [`RequestContext`].
///
/// The implementing type itself is the key; it is never instantiated.
///
/// # Example
///
/// ```rust
/// use switchyard_core::{ContextKey, RequestContext};
///
/// struct Tenant;
///
/// impl ContextKey for Tenant {
///     type Value = String;
///     const NAME: &'static str = "tenant";
/// }
///
/// let ctx = RequestContext::new().with_value::<Tenant>("acme".to_string());
/// assert_eq!(ctx.value::<Tenant>().map(String::as_str), Some("acme"));
/// ```
pub trait ContextKey: 'static {
    /// Type of the value stored under this key.
    type Value: Send + Sync + 'static;

    /// Name shown in debug output.
    const NAME: &'static str;
}

/// Path parameters bound while resolving the route.
struct PathParams;

impl ContextKey for PathParams {
    type Value = Params;
    const NAME: &'static str = "path_params";
}

struct Entry {
    key: TypeId,
    name: &'static str,
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

/// State shared by every context derived from the same request.
#[derive(Debug)]
struct Shared {
    started_at: Instant,
    deadline: Option<Instant>,
    cancellation: Cancellation,
}

/// Per-request context that flows through the middleware chain.
///
/// Cloning is cheap (two `Arc` bumps). Contexts are `Send + Sync` and
/// belong to exactly one request.
#[derive(Clone)]
pub struct RequestContext {
    shared: Arc<Shared>,
    values: Option<Arc<Entry>>,
}

impl RequestContext {
    /// Creates a context with no deadline and a fresh cancellation signal.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a context that expires at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::build(Some(deadline))
    }

    /// Creates a context that expires `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Instant::now().checked_add(timeout))
    }

    fn build(deadline: Option<Instant>) -> Self {
        Self {
            shared: Arc::new(Shared {
                started_at: Instant::now(),
                deadline,
                cancellation: Cancellation::new(),
            }),
            values: None,
        }
    }

    /// Returns a new context that also maps `K` to `value`.
    ///
    /// `self` is left unchanged. If `K` is already present the new value
    /// shadows it for lookups through the returned context.
    #[must_use]
    pub fn with_value<K: ContextKey>(&self, value: K::Value) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            values: Some(Arc::new(Entry {
                key: TypeId::of::<K>(),
                name: K::NAME,
                value: Box::new(value),
                parent: self.values.clone(),
            })),
        }
    }

    /// Returns the newest value stored under `K`.
    #[must_use]
    pub fn value<K: ContextKey>(&self) -> Option<&K::Value> {
        let wanted = TypeId::of::<K>();
        let mut cursor = self.values.as_deref();
        while let Some(entry) = cursor {
            if entry.key == wanted {
                return entry.value.downcast_ref::<K::Value>();
            }
            cursor = entry.parent.as_deref();
        }
        None
    }

    /// Returns true if a value is stored under `K`.
    #[must_use]
    pub fn contains<K: ContextKey>(&self) -> bool {
        self.value::<K>().is_some()
    }

    /// Names of the stored keys, newest first. Shadowed keys appear once
    /// per write.
    pub fn key_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut cursor = self.values.as_deref();
        while let Some(entry) = cursor {
            names.push(entry.name);
            cursor = entry.parent.as_deref();
        }
        names
    }

    /// Returns a new context carrying the route's path parameters.
    #[must_use]
    pub fn with_params(&self, params: Params) -> Self {
        self.with_value::<PathParams>(params)
    }

    /// Returns the path parameters bound for this request.
    #[must_use]
    pub fn params(&self) -> &Params {
        static EMPTY: OnceLock<Params> = OnceLock::new();
        self.value::<PathParams>()
            .unwrap_or_else(|| EMPTY.get_or_init(Params::new))
    }

    /// Returns the value bound to the path parameter `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params().get(name)
    }

    /// Returns the request ID, if the request-id stage has run.
    #[must_use]
    pub fn request_id(&self) -> Option<RequestId> {
        self.value::<RequestIdKey>().copied()
    }

    /// Returns the cancellation signal for this request.
    #[must_use]
    pub fn cancellation(&self) -> &Cancellation {
        &self.shared.cancellation
    }

    /// Returns true once the request has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancellation.is_cancelled()
    }

    /// Completes when the request is cancelled.
    pub async fn cancelled(&self) {
        self.shared.cancellation.cancelled().await;
    }

    /// Returns the instant after which the request is abandoned.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.shared.deadline
    }

    /// Returns the time left before the deadline, zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.shared
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Returns the time elapsed since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.shared.started_at.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("keys", &self.key_names())
            .field("deadline", &self.shared.deadline)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
