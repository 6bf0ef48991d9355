//! Role-based access control.
//!
//! The authentication middleware resolves credentials into a [`Principal`];
//! the [`gate`] module enforces per-route allowed-role sets on top of it.
//! Role membership and the seller/deliverer approval precondition are
//! decided here in one place so handlers only ever see principals that
//! already passed the gate.

pub mod gate;
pub mod roles;

pub use gate::{authorize, RequireRoleLayer, RequireRoleService};
pub use roles::{Role, UnknownRole};

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::approval::ApprovalStatus;

// ═══════════════════════════════════════════════════════════════════════════════
// Principal
// ═══════════════════════════════════════════════════════════════════════════════

/// A fully resolved caller identity.
///
/// Built by the authentication middleware after the credential was validated
/// against the revocation set and the backing account was loaded and found
/// active. `approval` is `Some` exactly for roles that go through the
/// approval workflow.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalStatus>,

    /// Credential identifier, used for revocation on logout.
    #[serde(skip)]
    pub token_id: String,

    /// Natural expiry of the presenting credential.
    #[serde(skip)]
    pub token_expires_at: DateTime<Utc>,
}

impl Principal {
    /// Approved, or exempt from the approval workflow altogether.
    pub fn is_approved(&self) -> bool {
        self.approval.map_or(true, |s| s == ApprovalStatus::Approved)
    }

    /// Whether this principal is the given account.
    pub fn is_self(&self, id: Uuid) -> bool {
        self.id == id
    }
}

/// Axum extractor for routes behind a [`RequireRoleLayer`].
#[axum::async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Principal>().cloned().ok_or_else(|| {
            let body = serde_json::json!({
                "success": false,
                "statusCode": 500,
                "message": "Authorization context not available. Ensure the role gate is applied.",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        })
    }
}
