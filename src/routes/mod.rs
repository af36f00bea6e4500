pub mod admin;
pub mod health;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::app::AppState;
use crate::auth::require_admin;

/// Build the API router with all routes
pub fn api_router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let admin = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/:id", get(admin::get_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Admin routes
        .nest("/admin", admin)
}
