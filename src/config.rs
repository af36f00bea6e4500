use anyhow::{Context, Result};
use std::convert::Infallible;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

/// Unknown names fall back to `Dev`
impl FromStr for Environment {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        })
    }
}

impl Environment {
    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // JWT verification
    pub jwt_jwks_url: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwks_cache_ttl_seconds: u64,

    // Roles allowed through the admin guard
    pub admin_roles: Vec<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env: Environment = env::var("ENV")
            .unwrap_or_else(|_| "dev".to_string())
            .parse()
            .unwrap_or(Environment::Dev);
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Database
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        // CORS
        let cors_allow_origins = split_list(
            &env::var("CORS_ALLOW_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        );

        // JWT verification
        let jwt_jwks_url = env::var("JWT_JWKS_URL").context("JWT_JWKS_URL must be set")?;
        let jwt_issuer = env::var("JWT_ISSUER").context("JWT_ISSUER must be set")?;
        let jwt_audience =
            env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string());
        let jwks_cache_ttl_seconds = env::var("JWKS_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1800); // 30 minutes default

        let admin_roles = split_list(&env::var("ADMIN_ROLES").unwrap_or_else(|_| "admin".to_string()));

        Ok(Settings {
            env,
            server_addr,
            database_url,
            database_max_connections,
            cors_allow_origins,
            jwt_jwks_url,
            jwt_issuer,
            jwt_audience,
            jwks_cache_ttl_seconds,
            admin_roles,
        })
    }
}

/// Comma separated list, trimmed, empty entries dropped
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
