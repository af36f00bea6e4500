use super::Claims;

/// Authenticated principal, attached to request extensions by the admin guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Subject claim, as issued
    pub subject: String,

    pub email: Option<String>,

    pub role: Option<String>,

    pub issuer: String,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Result<Self, &'static str> {
        if claims.sub.trim().is_empty() {
            return Err("Token subject is empty");
        }

        Ok(Self {
            subject: claims.sub.clone(),
            email: claims.email.clone(),
            role: claims.role.clone(),
            issuer: claims.iss.clone(),
        })
    }
}
