//! JWKS-backed JWT verification

use anyhow::{Context, Result};
use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{Claims, TokenVerifier, VerifyError};

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

/// Only RSA keys carry `n`/`e`; EC and OKP entries omit them
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    #[serde(default)]
    kid: Option<String>,
    kty: String,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

/// RSA decoding keys by kid. Other key types and malformed entries are skipped.
fn rsa_keys(jwks: JwksResponse) -> Vec<(String, DecodingKey)> {
    jwks.keys
        .into_iter()
        .filter_map(|jwk| {
            let (Some(kid), "RSA", Some(n), Some(e)) =
                (jwk.kid, jwk.kty.as_str(), jwk.n.as_deref(), jwk.e.as_deref())
            else {
                return None;
            };

            match DecodingKey::from_rsa_components(n, e) {
                Ok(key) => Some((kid, key)),
                Err(err) => {
                    tracing::warn!("Failed to parse JWK {}: {}", kid, err);
                    None
                }
            }
        })
        .collect()
}

#[derive(Clone)]
struct CachedKey {
    key: DecodingKey,
    cached_at: Instant,
}

/// RS256 verifier with a TTL cache of the issuer's signing keys
#[derive(Clone)]
pub struct JwksCache {
    inner: Arc<RwLock<JwksCacheInner>>,
    http: reqwest::Client,
    jwks_url: String,
    issuer: String,
    audience: String,
    ttl: Duration,
}

struct JwksCacheInner {
    keys: HashMap<String, CachedKey>,
    last_fetch: Option<Instant>,
}

impl JwksCache {
    pub fn new(
        jwks_url: String,
        issuer: String,
        audience: String,
        ttl_seconds: u64,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            inner: Arc::new(RwLock::new(JwksCacheInner {
                keys: HashMap::new(),
                last_fetch: None,
            })),
            http,
            jwks_url,
            issuer,
            audience,
            ttl: Duration::from_secs(ttl_seconds),
        })
    }

    fn cached_key(&self, kid: &str) -> Option<DecodingKey> {
        let cache = self.inner.read();
        cache
            .keys
            .get(kid)
            .filter(|cached| cached.cached_at.elapsed() < self.ttl)
            .map(|cached| cached.key.clone())
    }

    async fn get_or_fetch_key(&self, kid: &str) -> Result<Option<DecodingKey>> {
        if let Some(key) = self.cached_key(kid) {
            return Ok(Some(key));
        }

        self.refresh_keys().await?;

        Ok(self.cached_key(kid))
    }

    async fn refresh_keys(&self) -> Result<()> {
        {
            let cache = self.inner.read();
            if let Some(last) = cache.last_fetch {
                // At most one fetch per second
                if last.elapsed() < Duration::from_secs(1) {
                    return Ok(());
                }
            }
        }

        tracing::debug!("Fetching JWKS from {}", self.jwks_url);

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .context("Failed to fetch JWKS")?;

        if !response.status().is_success() {
            anyhow::bail!("JWKS fetch failed with status: {}", response.status());
        }

        let jwks: JwksResponse = response.json().await.context("Failed to parse JWKS")?;

        let mut cache = self.inner.write();
        cache.last_fetch = Some(Instant::now());

        for (kid, key) in rsa_keys(jwks) {
            tracing::debug!("Cached JWKS key: {}", kid);
            cache.keys.insert(
                kid,
                CachedKey {
                    key,
                    cached_at: Instant::now(),
                },
            );
        }

        tracing::info!("JWKS cache refreshed with {} keys", cache.keys.len());
        Ok(())
    }

    /// Pre-warm the cache by fetching keys
    pub async fn warm_cache(&self) -> Result<()> {
        self.refresh_keys().await
    }
}

#[async_trait]
impl TokenVerifier for JwksCache {
    async fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let header =
            decode_header(token).map_err(|e| VerifyError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| VerifyError::InvalidToken("JWT missing kid header".to_string()))?;

        let decoding_key = self
            .get_or_fetch_key(&kid)
            .await
            .map_err(VerifyError::KeysUnavailable)?
            .ok_or_else(|| VerifyError::InvalidToken(format!("Unknown signing key {kid}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| VerifyError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims)
    }
}
