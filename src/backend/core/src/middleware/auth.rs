//! Credential validation and identity resolution.
//!
//! The [`AuthLayer`] runs on every request. It never rejects by itself; it
//! classifies the request into an [`AuthOutcome`] and stores it in the
//! request extensions:
//!
//! - no `Authorization: Bearer` header -> [`AuthOutcome::Anonymous`]
//! - a valid token whose account resolves, is active, and (for approval-bearing
//!   roles) carries its approval state -> [`AuthOutcome::Authenticated`]
//! - anything else -> [`AuthOutcome::Failed`] with the reason
//!
//! Downstream, the role gate turns `Failed` into the 401 it carries, while
//! routes that merely personalize their answer treat `Failed` as anonymous
//! through [`OptionalPrincipal`].
//!
//! Tokens carry a `jti` so logout can revoke them individually. Revocations
//! live in an in-process set and are pruned once the underlying token would
//! have expired anyway.

use axum::{
    body::Body,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    response::Response,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use dashmap::DashMap;
use futures::future::BoxFuture;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::debug;
use uuid::Uuid;

use crate::db::Store;
use crate::error::{BazaarError, ErrorCode, Result};
use crate::rbac::{Principal, Role};

// ═══════════════════════════════════════════════════════════════════════════════
// Claims
// ═══════════════════════════════════════════════════════════════════════════════

/// JWT claims for an account session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: Uuid,
    /// Account role, fixing the collection the id resolves in.
    pub role: Role,
    pub email: String,
    /// Token id, the unit of revocation.
    pub jti: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════════════════════════

/// Settings for token issuance and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for HS256 signing.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            token_ttl_secs: 7 * 24 * 60 * 60,
            leeway_secs: 30,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Failure Classification
// ═══════════════════════════════════════════════════════════════════════════════

/// Why a presented credential did not yield a principal.
///
/// Cheap to clone so it can travel through request extensions; protected
/// routes convert it back into the error it describes.
#[derive(Debug, Clone)]
pub struct AuthFailure {
    pub code: ErrorCode,
    pub message: String,
}

impl AuthFailure {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn into_error(self) -> BazaarError {
        BazaarError::new(self.code, self.message)
    }
}

impl From<BazaarError> for AuthFailure {
    fn from(error: BazaarError) -> Self {
        Self::new(error.code(), error.user_message().to_string())
    }
}

/// What credential validation concluded about a request.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Authenticated(Principal),
    /// No credential was presented.
    Anonymous,
    /// A credential was presented but did not resolve to a usable principal.
    Failed(AuthFailure),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Revocation
// ═══════════════════════════════════════════════════════════════════════════════

/// Where revoked token ids live until their tokens expire on their own.
///
/// Lookups sit on the hot path, so implementations must be read-your-writes:
/// a revocation must be visible to the next `contains` call.
pub trait RevocationStore: Send + Sync {
    fn add(&self, token_id: &str, expires_at: DateTime<Utc>);
    fn contains(&self, token_id: &str) -> bool;
    /// Drop entries whose tokens have expired anyway.
    fn prune(&self);
}

/// In-process revocation set.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    revoked: DashMap<String, DateTime<Utc>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RevocationStore for InMemoryRevocationStore {
    fn add(&self, token_id: &str, expires_at: DateTime<Utc>) {
        self.revoked.insert(token_id.to_string(), expires_at);
    }

    fn contains(&self, token_id: &str) -> bool {
        self.revoked.contains_key(token_id)
    }

    fn prune(&self) {
        let now = Utc::now();
        self.revoked.retain(|_, exp| *exp > now);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Authenticator
// ═══════════════════════════════════════════════════════════════════════════════

/// Issues, validates, and revokes session tokens.
pub struct Authenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
    revoked_tokens: Arc<dyn RevocationStore>,
}

impl Authenticator {
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_revocation_store(config, Arc::new(InMemoryRevocationStore::new()))
    }

    pub fn with_revocation_store(config: &AuthConfig, revoked: Arc<dyn RevocationStore>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            token_ttl: Duration::seconds(config.token_ttl_secs as i64),
            revoked_tokens: revoked,
        }
    }

    /// Issue a token for an account. Returns the encoded token and its claims.
    pub fn issue_token(
        &self,
        id: Uuid,
        role: Role,
        email: impl Into<String>,
    ) -> Result<(String, Claims)> {
        let now = Utc::now();
        let claims = Claims {
            sub: id,
            role,
            email: email.into(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| BazaarError::internal(format!("Token signing failed: {}", e)))?;

        Ok((token, claims))
    }

    /// Validate a token's signature, expiry, and revocation state.
    pub fn validate_token(&self, token: &str) -> std::result::Result<Claims, AuthFailure> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthFailure::new(
                    ErrorCode::TokenExpired,
                    "Token has expired. Please login again.",
                ),
                _ => AuthFailure::new(ErrorCode::InvalidToken, "Invalid authentication token"),
            }
        })?;

        if self.revoked_tokens.contains(&data.claims.jti) {
            return Err(AuthFailure::new(
                ErrorCode::TokenRevoked,
                "Token has been invalidated. Please login again.",
            ));
        }

        Ok(data.claims)
    }

    /// Revoke a token until it would have expired on its own. Idempotent.
    pub fn revoke_token(&self, token_id: &str, expires_at: DateTime<Utc>) {
        self.revoked_tokens.add(token_id, expires_at);
        counter!("bazaar_tokens_revoked_total").increment(1);
    }

    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.revoked_tokens.contains(token_id)
    }

    /// Drop revocation entries whose tokens have expired anyway.
    pub fn prune_revoked_tokens(&self) {
        self.revoked_tokens.prune();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Identity Resolution
// ═══════════════════════════════════════════════════════════════════════════════

/// Look the claims up in the collection their role names and build the
/// principal, enforcing the active flag.
async fn resolve_principal(
    store: &dyn Store,
    claims: &Claims,
) -> std::result::Result<Principal, AuthFailure> {
    // (name, email, is_active, approval)
    let account = match claims.role {
        Role::Admin => store
            .admin(claims.sub)
            .await?
            .map(|a| (a.name, a.email, a.is_active, None)),
        Role::Customer => store
            .customer(claims.sub)
            .await?
            .map(|c| (c.name, c.email, c.is_active, None)),
        Role::Seller => store
            .seller(claims.sub)
            .await?
            .map(|s| (s.name, s.email, s.is_active, Some(s.approval.status))),
        Role::Deliverer => store
            .deliverer(claims.sub)
            .await?
            .map(|d| (d.name, d.email, d.is_active, Some(d.approval.status))),
    };

    let Some((name, email, is_active, approval)) = account else {
        return Err(AuthFailure::new(
            ErrorCode::Unauthenticated,
            "No user found with this id",
        ));
    };

    if !is_active {
        return Err(BazaarError::account_deactivated().into());
    }

    Ok(Principal {
        id: claims.sub,
        role: claims.role,
        name,
        email,
        approval,
        token_id: claims.jti.clone(),
        token_expires_at: claims.expires_at(),
    })
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tower Layer
// ═══════════════════════════════════════════════════════════════════════════════

/// Layer that classifies every request into an [`AuthOutcome`].
#[derive(Clone)]
pub struct AuthLayer {
    authenticator: Arc<Authenticator>,
    store: Arc<dyn Store>,
}

impl AuthLayer {
    pub fn new(authenticator: Arc<Authenticator>, store: Arc<dyn Store>) -> Self {
        Self {
            authenticator,
            store,
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            authenticator: self.authenticator.clone(),
            store: self.store.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    authenticator: Arc<Authenticator>,
    store: Arc<dyn Store>,
}

impl<S> Service<Request<Body>> for AuthService<S>
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
        let authenticator = self.authenticator.clone();
        let store = self.store.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let outcome = match bearer_token(&request) {
                None => AuthOutcome::Anonymous,
                Some(token) => match authenticator.validate_token(token) {
                    Ok(claims) => match resolve_principal(store.as_ref(), &claims).await {
                        Ok(principal) => AuthOutcome::Authenticated(principal),
                        Err(failure) => AuthOutcome::Failed(failure),
                    },
                    Err(failure) => AuthOutcome::Failed(failure),
                },
            };

            if let AuthOutcome::Failed(failure) = &outcome {
                debug!(code = ?failure.code, "credential validation failed");
                counter!(
                    "bazaar_auth_failures_total",
                    "code" => format!("{:?}", failure.code)
                )
                .increment(1);
            }

            request.extensions_mut().insert(outcome);
            inner.call(request).await
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Optional Principal
// ═══════════════════════════════════════════════════════════════════════════════

/// Extractor for routes that serve anonymous callers too.
///
/// A bad credential does not fail these routes; it just yields `None`, the
/// same as no credential at all.
#[derive(Debug, Clone)]
pub struct OptionalPrincipal(pub Option<Principal>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalPrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let principal = match parts.extensions.get::<AuthOutcome>() {
            Some(AuthOutcome::Authenticated(principal)) => Some(principal.clone()),
            _ => None,
        };
        Ok(OptionalPrincipal(principal))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
