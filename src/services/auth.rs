//! Bearer credential resolution
//!
//! Pure verification: every call re-verifies the token and re-reads the
//! subject's backing record. No session cache, no side effects. All failure
//! modes collapse to `Unauthorized` before any domain logic runs.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Identity;
use crate::security::jwt::JwtCodec;
use crate::store::UserStore;

pub struct AuthGate {
    users: Arc<dyn UserStore>,
    jwt: Arc<JwtCodec>,
}

impl AuthGate {
    pub fn new(users: Arc<dyn UserStore>, jwt: Arc<JwtCodec>) -> Self {
        Self { users, jwt }
    }

    /// Resolve an `Authorization`-style header value to an identity.
    pub async fn authenticate(&self, bearer: Option<&str>) -> Result<Identity> {
        let header = bearer.ok_or(AppError::Unauthorized)?;
        let token = header
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let claims = self.jwt.verify(token)?;
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;

        // The subject must still resolve to a live record; username/email
        // come from the store, not the token.
        let author = self
            .users
            .find_author(id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(Identity {
            id: author.id,
            username: author.username,
            email: author.email,
        })
    }
}
