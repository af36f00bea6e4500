//! Access control collaborators for the admin surface.
//!
//! Authentication ([`TokenVerifier`]) and authorization ([`AccessPolicy`])
//! are separate seams; [`middleware::require_admin`] composes them in front
//! of the admin routes.

pub mod claims;
pub mod context;
pub mod jwks;
pub mod middleware;
pub mod policy;

pub use claims::Claims;
pub use context::AuthContext;
pub use jwks::JwksCache;
pub use middleware::require_admin;
pub use policy::{AccessPolicy, RoleAccessPolicy};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("signing keys unavailable")]
    KeysUnavailable(#[source] anyhow::Error),
}

/// Turns a bearer token into verified claims
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Claims, VerifyError>;
}
