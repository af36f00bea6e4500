mod api;
mod app;
mod auth;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod middleware;
mod repository;
mod routes;
mod views;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::sync::Arc;

use auth::{JwksCache, RoleAccessPolicy};
use repository::PgUserRepository;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = config::Settings::from_env()?;

    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting admin-users"
    );

    let pool = db::create_pool(&settings).await?;
    let users = Arc::new(PgUserRepository::new(pool));

    let jwks_cache = JwksCache::new(
        settings.jwt_jwks_url.clone(),
        settings.jwt_issuer.clone(),
        settings.jwt_audience.clone(),
        settings.jwks_cache_ttl_seconds,
    )?;

    if let Err(e) = jwks_cache.warm_cache().await {
        tracing::warn!(error = %e, "Failed to warm JWKS cache - will fetch on first request");
    }

    let access = Arc::new(RoleAccessPolicy::new(settings.admin_roles.clone()));
    tracing::info!(roles = ?settings.admin_roles, "Admin access policy configured");

    let state = app::AppState::new(settings.clone(), users, Arc::new(jwks_cache), access);

    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
