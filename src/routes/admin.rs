//! Admin routes
//!
//! Read-only user administration:
//! - `GET /admin/users` lists every user, newest first
//! - `GET /admin/users/:id` shows one user
//!
//! Both load company, quotes and jobs up front. The admin guard runs before
//! either handler.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};
use std::sync::Arc;

use crate::app::AppState;
use crate::auth::AuthContext;
use crate::domain::{Includes, UserId};
use crate::error::{ApiError, ApiResult};
use crate::views;

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthContext>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(admin = %admin.subject, "Listing users");

    let users = state.users.list_users(Includes::all()).await?;

    Ok(views::users::index(users))
}

/// GET /admin/users/:id
///
/// A path token that is not a user id cannot match a user, so it is a 404.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthContext>,
    Path(raw_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(admin = %admin.subject, user_id = %raw_id, "Getting user");

    let user_id: UserId = raw_id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("User {} not found", raw_id)))?;

    let user = state.users.find_user(user_id, Includes::all()).await?;

    Ok(views::users::show(user))
}
