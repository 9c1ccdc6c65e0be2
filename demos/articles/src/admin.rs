//! `/admin` routes and the permission they require.

use http::StatusCode;
use serde::Serialize;
use switchyard::core::{handler_fn, ContextKey, Request, RequestContext, Response, ResponseExt};
use switchyard::middleware::{from_fn, Authorize, Middleware, Next};
use switchyard::server::{Router, RouterError};

/// Request header the demo reads the caller's role from.
pub const ROLE_HEADER: &str = "x-acl-role";

/// Caller permissions, as resolved by [`acl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission {
    admin: bool,
}

impl Permission {
    /// A caller with administrator rights.
    pub const ADMIN: Self = Self { admin: true };

    /// A caller without administrator rights.
    pub const READER: Self = Self { admin: false };

    /// Returns true for administrators.
    pub const fn is_admin(&self) -> bool {
        self.admin
    }
}

/// Context key for the caller's [`Permission`].
pub struct PermissionKey;

impl ContextKey for PermissionKey {
    type Value = Permission;
    const NAME: &'static str = "acl.permission";
}

/// Resolves the caller's permission from [`ROLE_HEADER`].
///
/// A stand-in for a real identity layer; anything other than `admin` is a
/// reader.
pub fn acl() -> impl Middleware {
    from_fn("acl", |ctx: RequestContext, req: Request, next: Next| async move {
        let permission = match req.headers().get(ROLE_HEADER).map(|v| v.as_bytes()) {
            Some(b"admin") => Permission::ADMIN,
            _ => Permission::READER,
        };
        next.run(ctx.with_value::<PermissionKey>(permission), req)
            .await
    })
}

/// The default admin gate: requires an administrator [`Permission`] in the
/// context. A request with no permission at all is refused.
pub fn admin_only() -> Authorize {
    Authorize::from_context::<PermissionKey, _>(Permission::is_admin)
}

#[derive(Serialize)]
struct Account {
    name: &'static str,
    role: &'static str,
}

/// Builds the admin sub-router behind `gate`.
pub fn router(gate: Authorize) -> Result<Router, RouterError> {
    let mut r = Router::new();
    r.use_middleware(gate)?;

    r.get(
        "/",
        handler_fn(|_ctx, _req| async { Response::text("admin: index") }),
    )?;
    r.get(
        "/accounts",
        handler_fn(|_ctx, _req| async {
            let accounts = [
                Account {
                    name: "ada",
                    role: "admin",
                },
                Account {
                    name: "grace",
                    role: "reader",
                },
            ];
            Response::json(StatusCode::OK, &accounts)
        }),
    )?;

    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;

    #[test]
    fn test_admin_only() {
        let gate = admin_only();
        let req = http::Request::new(Full::new(Bytes::new()));

        assert!(!gate.is_allowed(&RequestContext::new(), &req));

        let reader = RequestContext::new().with_value::<PermissionKey>(Permission::READER);
        assert!(!gate.is_allowed(&reader, &req));

        let admin = RequestContext::new().with_value::<PermissionKey>(Permission::ADMIN);
        assert!(gate.is_allowed(&admin, &req));
    }
}
