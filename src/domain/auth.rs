use crate::error::{AppError, Result};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Portal roles issued by the identity provider. Only `Admin` may change
/// organization settings; messaging itself is role-agnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Staff,
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    #[must_use]
    pub fn new(user_id: Uuid, role: Role, ttl_secs: i64) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self { sub: user_id, role, exp: now + ttl_secs, iat: now }
    }

    /// Signs the claims into a compact JWT.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if signing fails.
    pub fn encode(&self, secret: &str) -> Result<String> {
        encode(&Header::default(), self, &EncodingKey::from_secret(secret.as_bytes()))
            .map_err(|_| AppError::Internal)
    }

    /// Verifies a token signature and expiry.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` for any invalid, expired, or
    /// mis-signed token.
    pub fn decode(token: &str, secret: &str) -> Result<Self> {
        decode::<Self>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::AuthError)
    }
}
