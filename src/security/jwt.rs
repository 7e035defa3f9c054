//! Bearer token issuing and verification
//!
//! HS256 access tokens carrying the authenticated subject plus the username
//! and email the rest of the system keys likes and comments on. The codec is
//! an explicit handle constructed once from settings and injected where
//! needed; there is no process-global key storage.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtSettings;
use crate::error::{AppError, Result};

/// JWT claims: standard subject/time claims plus identity fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Username at issue time
    pub username: String,
    /// Email at issue time
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl JwtCodec {
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::default();
        // Exact expiry, no leeway
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
            expiry: Duration::seconds(settings.expiry_seconds as i64),
        }
    }

    /// Issue an access token for the given identity.
    pub fn issue(&self, user_id: Uuid, username: &str, email: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Verify a token and return its claims.
    ///
    /// Every failure mode (bad signature, malformed, expired) collapses to
    /// `Unauthorized`; callers never branch on why a credential was bad.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }
}
