//! The role gate.
//!
//! A declarative allowed-role set enforced per route. Evaluation order:
//!
//! 1. no principal -> 401;
//! 2. principal's role outside the allowed set -> 403 naming the actual role
//!    and the full allowed set;
//! 3. role is allowed but requires approval and the account is not approved
//!    -> 403 approval pending.
//!
//! The approval precondition only fires when the principal's own role is in
//! the allowed set: a pending seller hitting an admin-only route gets the
//! role mismatch, not the approval message.

use axum::{
    body::Body,
    extract::Request,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use super::roles::Role;
use super::Principal;
use crate::error::{BazaarError, Result};
use crate::middleware::auth::AuthOutcome;

// ═══════════════════════════════════════════════════════════════════════════════
// Gate Decision
// ═══════════════════════════════════════════════════════════════════════════════

/// Decide whether `principal` may pass a gate that admits `allowed`.
///
/// Returns the principal on success so callers can thread it through.
pub fn authorize<'a>(principal: Option<&'a Principal>, allowed: &[Role]) -> Result<&'a Principal> {
    let principal = principal
        .ok_or_else(|| BazaarError::unauthenticated("Not authorized to access this route"))?;

    if !allowed.contains(&principal.role) {
        let names: Vec<&'static str> = allowed.iter().map(Role::as_str).collect();
        return Err(BazaarError::role_not_allowed(principal.role, &names));
    }

    if principal.role.requires_approval() && !principal.is_approved() {
        return Err(BazaarError::approval_pending(principal.role));
    }

    Ok(principal)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tower Layer
// ═══════════════════════════════════════════════════════════════════════════════

/// Layer that wraps services with an allowed-role set.
///
/// ```rust,ignore
/// let admin_only = Router::new()
///     .route("/users", get(list_users))
///     .route_layer(RequireRoleLayer::new(&[Role::Admin]));
/// ```
#[derive(Clone)]
pub struct RequireRoleLayer {
    allowed: Arc<[Role]>,
}

impl RequireRoleLayer {
    pub fn new(allowed: &[Role]) -> Self {
        Self {
            allowed: allowed.into(),
        }
    }
}

impl<S> Layer<S> for RequireRoleLayer {
    type Service = RequireRoleService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireRoleService {
            inner,
            allowed: self.allowed.clone(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tower Service
// ═══════════════════════════════════════════════════════════════════════════════

/// Service that enforces the allowed-role set per request.
#[derive(Clone)]
pub struct RequireRoleService<S> {
    inner: S,
    allowed: Arc<[Role]>,
}

impl<S> Service<Request<Body>> for RequireRoleService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let allowed = self.allowed.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // Set by the upstream authentication middleware.
            let outcome = request.extensions().get::<AuthOutcome>().cloned();

            let principal = match outcome {
                Some(AuthOutcome::Authenticated(principal)) => Some(principal),
                // A protected route surfaces the credential failure as-is.
                Some(AuthOutcome::Failed(failure)) => {
                    return Ok(failure.into_error().into_response());
                }
                Some(AuthOutcome::Anonymous) | None => None,
            };

            match authorize(principal.as_ref(), &allowed) {
                Ok(_) => {
                    // Handlers extract the principal from extensions.
                    if let Some(principal) = principal {
                        request.extensions_mut().insert(principal);
                    }
                    inner.call(request).await
                }
                Err(error) => Ok(error.into_response()),
            }
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
