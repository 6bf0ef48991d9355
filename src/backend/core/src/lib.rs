//! # Bazaar Core
//!
//! A multi-role marketplace REST backend.
//!
//! ## Architecture
//!
//! - **Credential validation**: JWT bearer tokens with per-token revocation
//! - **Identity resolution**: role-dispatched account lookup into a `Principal`
//! - **Role gate**: declarative allowed-role sets with an approval precondition
//! - **Ownership scoping**: per (resource, role) list filters and write checks
//! - **Approval workflow**: pending/approved/rejected lifecycle for sellers
//!   and deliverers, driven by admins
//! - **Storage**: a `Store` trait with PostgreSQL and in-memory backends

pub mod api;
pub mod approval;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod pagination;
pub mod rbac;
pub mod scope;

pub use error::{BazaarError, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{build_router, AppState};
    pub use crate::approval::{ApprovalRecord, ApprovalStatus};
    pub use crate::config::Config;
    pub use crate::db::{Database, MemoryStore, Store};
    pub use crate::error::{BazaarError, ErrorCode, Result};
    pub use crate::middleware::auth::{
        AuthConfig, AuthLayer, AuthOutcome, Authenticator, Claims, OptionalPrincipal,
    };
    pub use crate::pagination::{OffsetPagination, PageMetadata};
    pub use crate::rbac::{authorize, Principal, RequireRoleLayer, Role};
}
