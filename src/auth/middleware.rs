use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{AuthContext, VerifyError};
use crate::app::AppState;
use crate::error::ApiError;

/// Guard for the admin router.
///
/// Verifies the bearer token, asks the access policy, and on success leaves
/// the [`AuthContext`] in the request extensions for handlers.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    let claims = state.verifier.verify(token).await.map_err(|e| match e {
        VerifyError::InvalidToken(reason) => {
            tracing::warn!(error = %reason, "JWT verification failed");
            ApiError::Unauthorized("Invalid or expired token".to_string())
        }
        VerifyError::KeysUnavailable(source) => ApiError::Internal(source),
    })?;

    let ctx = AuthContext::from_claims(&claims).map_err(|e| {
        tracing::warn!(error = %e, "Failed to build auth context");
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    if !state.access.allows(&ctx) {
        tracing::warn!(subject = %ctx.subject, "Non-admin principal attempted to access admin route");
        return Err(ApiError::Forbidden("Admin privileges required".to_string()));
    }

    tracing::debug!(
        subject = %ctx.subject,
        email = ?ctx.email,
        issuer = %ctx.issuer,
        "Admin access granted"
    );

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization token".to_string()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid authorization format".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".to_string()))?;

    if token.is_empty() {
        return Err(ApiError::Unauthorized("Missing authorization token".to_string()));
    }

    Ok(token)
}
