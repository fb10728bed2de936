//! Read-only inspection of bearer credentials
//!
//! The backend issues HS256 JWTs. The client cannot verify them (it does not
//! hold the secret), so this only decodes the claims for display. Admission
//! decisions never look at these values.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Claims the backend puts in its tokens
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Subject (user ID)
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Unverified view of a credential
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub claims: TokenClaims,
}

impl TokenInfo {
    /// Decode the claims without checking the signature. Opaque tokens give None.
    pub fn inspect(credential: &str) -> Option<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<TokenClaims>(credential, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| Self {
                claims: data.claims,
            })
            .ok()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims
            .exp
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.claims
            .iat
            .and_then(|iat| Utc.timestamp_opt(iat, 0).single())
    }

    /// Whether the claimed expiry has passed. Tokens without `exp` never expire here.
    pub fn is_expired(&self) -> bool {
        self.claims
            .exp
            .map(|exp| Utc::now().timestamp() > exp)
            .unwrap_or(false)
    }
}
