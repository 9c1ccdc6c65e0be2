//! # Switchyard Articles
//!
//! A small articles service showing the router surface end to end:
//!
//! ```text
//! GET    /
//! GET    /articles
//! POST   /articles
//! GET    /articles/{month}-{day}-{year}
//! GET    /articles/search
//! GET    /articles/{articleSlug:[a-z-]+}
//! GET    /articles/{articleID}          (article_ctx)
//! PUT    /articles/{articleID}          (article_ctx)
//! DELETE /articles/{articleID}          (article_ctx)
//! GET    /admin/                        (admin gate)
//! GET    /admin/accounts                (admin gate)
//! ```
//!
//! Every route runs behind the base stack: request id, real ip, logger
//! and acl.

pub mod admin;
pub mod articles;
pub mod store;

use switchyard::core::{handler_fn, Response, ResponseExt};
use switchyard::middleware::{
    Authorize, LoggerMiddleware, RealIpMiddleware, RequestIdMiddleware,
};
use switchyard::server::{Router, RouterError};

pub use store::{Article, ArticleDraft, ArticleStore, MemoryStore, SharedStore};

/// Dependencies injected into the routes.
#[derive(Clone)]
pub struct AppState {
    /// Article storage.
    pub store: SharedStore,
    /// Gate in front of `/admin`.
    pub admin_gate: Authorize,
}

impl AppState {
    /// Creates state with the default admin gate.
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            admin_gate: admin::admin_only(),
        }
    }

    /// Replaces the admin gate.
    #[must_use]
    pub fn with_admin_gate(mut self, gate: Authorize) -> Self {
        self.admin_gate = gate;
        self
    }
}

/// Builds the service's root router.
pub fn build_router(state: AppState) -> Result<Router, RouterError> {
    let mut r = Router::new();
    r.use_middleware(RequestIdMiddleware::new())?;
    r.use_middleware(RealIpMiddleware::new())?;
    r.use_middleware(LoggerMiddleware::new())?;
    r.use_middleware(admin::acl())?;

    r.get("/", handler_fn(|_ctx, _req| async { Response::text("hi") }))?;
    r.mount("/articles", articles::router(&state.store)?)?;
    r.mount("/admin", admin::router(state.admin_gate)?)?;

    Ok(r)
}
