use serde::{Deserialize, Serialize};

/// JWT claims accepted by the admin guard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Audience
    pub aud: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp) - optional
    #[serde(default)]
    pub nbf: Option<i64>,

    /// User email - optional
    #[serde(default)]
    pub email: Option<String>,

    /// User role - optional
    #[serde(default)]
    pub role: Option<String>,
}
