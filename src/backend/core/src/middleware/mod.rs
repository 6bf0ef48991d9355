//! HTTP middleware.

pub mod auth;

pub use auth::{
    AuthConfig, AuthFailure, AuthLayer, AuthOutcome, Authenticator, Claims,
    InMemoryRevocationStore, OptionalPrincipal, RevocationStore,
};
