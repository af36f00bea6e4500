//! Shared fixtures for router-level tests

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tower::ServiceExt;

use crate::app::{create_app, AppState};
use crate::auth::{Claims, RoleAccessPolicy, TokenVerifier, VerifyError};
use crate::config::{Environment, Settings};
use crate::domain::{User, UserId};
use crate::repository::memory::InMemoryUserRepository;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const MEMBER_TOKEN: &str = "member-token";
pub const KEYS_DOWN_TOKEN: &str = "keys-down";

/// Accepts a fixed set of opaque tokens instead of real JWTs
pub struct StubVerifier;

#[async_trait]
impl TokenVerifier for StubVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let role = match token {
            ADMIN_TOKEN => "admin",
            MEMBER_TOKEN => "authenticated",
            KEYS_DOWN_TOKEN => {
                return Err(VerifyError::KeysUnavailable(anyhow::anyhow!(
                    "jwks endpoint unreachable"
                )))
            }
            _ => return Err(VerifyError::InvalidToken("unknown token".to_string())),
        };

        Ok(Claims {
            sub: format!("{role}-subject"),
            aud: "authenticated".to_string(),
            iss: "https://issuer.example.com".to_string(),
            iat: 0,
            exp: i64::MAX,
            nbf: None,
            email: None,
            role: Some(role.to_string()),
        })
    }
}

pub fn settings() -> Settings {
    Settings {
        env: Environment::Dev,
        server_addr: "127.0.0.1:0".to_string(),
        database_url: "postgres://localhost/admin_users_test".to_string(),
        database_max_connections: 1,
        cors_allow_origins: vec!["http://localhost:3000".to_string()],
        jwt_jwks_url: "http://localhost/jwks.json".to_string(),
        jwt_issuer: "https://issuer.example.com".to_string(),
        jwt_audience: "authenticated".to_string(),
        jwks_cache_ttl_seconds: 60,
        admin_roles: vec!["admin".to_string()],
    }
}

pub fn app(repo: Arc<InMemoryUserRepository>) -> Router {
    let settings = settings();
    let access = Arc::new(RoleAccessPolicy::new(settings.admin_roles.clone()));
    create_app(AppState::new(settings, repo, Arc::new(StubVerifier), access))
}

/// User created at noon on the given day of January 2024
pub fn user_on_day(id: i64, day: u32) -> User {
    let at = Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap();
    User {
        id: UserId(id),
        email: format!("user{id}@example.com"),
        name: Some(format!("User {id}")),
        company_id: None,
        created_at: at,
        updated_at: at,
    }
}

/// Send a GET, returning status and parsed JSON body
pub async fn get(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };

    (status, json)
}
